//! Quest Manager
//!
//! Owns quest definitions and their instances, drives the quest state
//! machine from normalized messages, and resolves host quest ids.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use tracing::{debug, info, warn};

use super::definition::{ExternalIdRule, QuestDefinition, RawQuestFile};
use super::state::{Quest, QuestState, QuestTransition};
use crate::error::{EngineError, Result};
use crate::loader;
use crate::message::Message;
use crate::offer::Offer;

pub struct QuestManager {
    /// One instance per quest name
    quests: HashMap<String, Quest>,
    /// Memoized host ids, keyed by internal quest name
    game_ids: DashMap<String, i64>,
    next_game_id: AtomicI64,
}

impl QuestManager {
    /// `id_base` is the first id handed out to quests without a fixed id
    pub fn new(id_base: i64) -> Self {
        Self {
            quests: HashMap::new(),
            game_ids: DashMap::new(),
            next_game_id: AtomicI64::new(id_base),
        }
    }

    /// Register a definition. A known quest keeps its current state.
    pub fn add_definition(&mut self, definition: QuestDefinition) {
        let definition = Arc::new(definition);
        match self.quests.get_mut(&definition.name) {
            Some(quest) => quest.redefine(definition),
            None => {
                self.quests
                    .insert(definition.name.clone(), Quest::new(definition));
            }
        }
    }

    /// Load all quest definitions under `<data_dir>/quests`
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<usize> {
        let quests_dir = data_dir.join("quests");
        let paths = loader::collect_toml_files(&quests_dir)?;

        let mut count = 0;
        for path in paths {
            match self.load_quest_file(&path) {
                Ok(()) => count += 1,
                Err(e) => warn!("Failed to load quest {:?}: {}", path, e),
            }
        }

        info!("Loaded {} quest definitions", count);
        Ok(count)
    }

    fn load_quest_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let raw: RawQuestFile = toml::from_str(&content).map_err(|e| EngineError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let definition = QuestDefinition::from_raw(&raw.quest).map_err(|reason| EngineError::Load {
            path: path.to_path_buf(),
            reason,
        })?;

        if let ExternalIdRule::Fixed(id) = definition.external_id {
            if let Some(owner) = self.fixed_id_owner(id).filter(|owner| *owner != definition.name) {
                return Err(EngineError::Load {
                    path: path.to_path_buf(),
                    reason: format!("external id {} is already used by quest '{}'", id, owner),
                });
            }
        }

        debug!("Loaded quest: {} ({})", definition.title, definition.full_name());
        self.add_definition(definition);
        Ok(())
    }

    /// Offer quests the message makes eligible.
    ///
    /// Every candidate offer interested in the message whose quest is
    /// still unseen moves it to Offered, recording the message. Quests
    /// already offered or further along are left alone, so redelivering
    /// the same message changes nothing.
    pub fn adjust_quest<'a, I>(&mut self, message: &Message, offers: I) -> Vec<QuestTransition>
    where
        I: IntoIterator<Item = &'a Offer>,
    {
        let mut transitions = Vec::new();

        for offer in offers {
            if !offer.is_interested_in(message) {
                continue;
            }

            let Some(quest) = self.fetch_mut(&offer.quest_name) else {
                debug!("Offer references unknown quest '{}'", offer.quest_name);
                continue;
            };

            if quest.state() != QuestState::Unseen {
                continue;
            }

            if let Some(from) = quest.advance(QuestState::Offered, Some(message)) {
                info!(
                    "Quest '{}' offered by {} message #{} from {}",
                    quest.full_name(),
                    message.category(),
                    message.ordinal(),
                    message.initiator()
                );
                transitions.push(QuestTransition {
                    quest: quest.name().to_string(),
                    from,
                    to: QuestState::Offered,
                    message: Some(message.ordinal()),
                });
            }
        }

        transitions
    }

    /// Look a quest up by internal name or by `name@owner`
    pub fn fetch(&self, name: &str) -> Option<&Quest> {
        if let Some(quest) = self.quests.get(name) {
            return Some(quest);
        }

        let (bare, owner) = name.split_once('@')?;
        self.quests
            .get(bare)
            .filter(|q| q.definition.owner.as_deref() == Some(owner))
    }

    fn fetch_mut(&mut self, name: &str) -> Option<&mut Quest> {
        let key = self.fetch(name)?.name().to_string();
        self.quests.get_mut(&key)
    }

    /// Host-visible id of a quest; the first resolution sticks for the
    /// lifetime of the manager.
    ///
    /// Allocated ids skip every id claimed by a fixed rule or handed out
    /// before, so two quests never share a host id.
    pub fn resolve_game_quest_id(&self, name: &str) -> Option<i64> {
        let quest = self.fetch(name)?;
        if let Some(id) = self.game_ids.get(quest.name()) {
            return Some(*id);
        }

        let id = match quest.definition.external_id {
            ExternalIdRule::Fixed(id) => id,
            ExternalIdRule::Allocated => loop {
                let candidate = self.next_game_id.fetch_add(1, Ordering::Relaxed);
                if !self.is_id_claimed(candidate) {
                    break candidate;
                }
            },
        };

        Some(*self.game_ids.entry(quest.name().to_string()).or_insert(id))
    }

    fn is_id_claimed(&self, id: i64) -> bool {
        self.fixed_id_owner(id).is_some() || self.game_ids.iter().any(|entry| *entry.value() == id)
    }

    /// Quest whose definition pins `id` as its host id
    fn fixed_id_owner(&self, id: i64) -> Option<&str> {
        self.quests
            .values()
            .find(|q| q.definition.external_id == ExternalIdRule::Fixed(id))
            .map(Quest::name)
    }

    pub fn accept(&mut self, name: &str) -> Result<QuestTransition> {
        self.transition(name, QuestState::Accepted)
    }

    pub fn complete(&mut self, name: &str) -> Result<QuestTransition> {
        self.transition(name, QuestState::Completed)
    }

    pub fn fail(&mut self, name: &str) -> Result<QuestTransition> {
        self.transition(name, QuestState::Failed)
    }

    fn transition(&mut self, name: &str, to: QuestState) -> Result<QuestTransition> {
        let quest = self
            .fetch_mut(name)
            .ok_or_else(|| EngineError::UnknownQuest(name.to_string()))?;

        let from = quest
            .advance(to, None)
            .ok_or_else(|| EngineError::InvalidTransition {
                quest: quest.full_name(),
                from: quest.state(),
                to,
            })?;

        info!("Quest '{}' {} -> {}", quest.full_name(), from, to);
        Ok(QuestTransition {
            quest: quest.name().to_string(),
            from,
            to,
            message: None,
        })
    }

    pub fn state(&self, name: &str) -> Option<QuestState> {
        self.fetch(name).map(Quest::state)
    }

    /// Offered or Accepted
    pub fn is_active(&self, name: &str) -> bool {
        self.state(name).map_or(false, |s| s.is_active())
    }

    /// Quest is in the player's log
    pub fn has_quest(&self, name: &str) -> bool {
        self.state(name) == Some(QuestState::Accepted)
    }

    /// Completed or failed: never offered or matched again
    pub fn is_inert(&self, name: &str) -> bool {
        self.state(name).map_or(false, |s| s.is_terminal())
    }

    /// Known and not finished. Offers for anything else never match.
    pub fn is_offerable(&self, name: &str) -> bool {
        self.state(name).is_some_and(|s| !s.is_terminal())
    }

    pub fn all(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}
