//! Quest Offer Manager
//!
//! Holds offers in registration order and answers which of them match a
//! context right now. Registration order is the only priority: callers
//! that need one offer take the first match.

use std::path::Path;

use tracing::{info, warn};

use super::definition::{Offer, RawOfferFile};
use crate::condition::HookCategory;
use crate::error::{EngineError, Result};
use crate::loader;
use crate::quest::QuestManager;

pub struct QuestOfferManager {
    offers: Vec<Offer>,
}

impl QuestOfferManager {
    pub fn new() -> Self {
        Self { offers: Vec::new() }
    }

    /// Append an offer; it ranks after every offer already registered
    pub fn add_offer(&mut self, offer: Offer) {
        self.offers.push(offer);
    }

    pub fn clear(&mut self) {
        self.offers.clear();
    }

    /// Load every offers file under `<data_dir>/offers`.
    ///
    /// Files are visited in path order so registration order is stable
    /// across runs. Broken files are logged and skipped.
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<usize> {
        let offers_dir = data_dir.join("offers");
        let paths = loader::collect_toml_files(&offers_dir)?;
        let before = self.offers.len();

        for path in paths {
            if let Err(e) = self.load_offer_file(&path) {
                warn!("Failed to load offers {:?}: {}", path, e);
            }
        }

        let loaded = self.offers.len() - before;
        info!("Loaded {} quest offers", loaded);
        Ok(loaded)
    }

    fn load_offer_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let raw: RawOfferFile = toml::from_str(&content).map_err(|e| EngineError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        for (index, raw_offer) in raw.offers.iter().enumerate() {
            match Offer::from_raw(raw_offer) {
                Ok(offer) => self.add_offer(offer),
                Err(e) => warn!("Skipping offer {} in {:?}: {}", index, path, e),
            }
        }

        Ok(())
    }

    /// Offers of `category` that can be presented right now, in
    /// registration order.
    ///
    /// Excludes offers whose quest is unknown, completed or failed, secret
    /// offers unless `hint_secret` is set, and offers without prompt text.
    pub fn get_matched_offers<'a, 'q>(
        &'a self,
        category: HookCategory,
        quests: &'q QuestManager,
        hint_secret: bool,
    ) -> impl Iterator<Item = &'a Offer> {
        self.matched_entries(category, quests, hint_secret)
            .map(|(_, offer)| offer)
    }

    /// Like [`get_matched_offers`](Self::get_matched_offers), paired with
    /// each offer's registration index
    pub fn matched_entries<'a, 'q>(
        &'a self,
        category: HookCategory,
        quests: &'q QuestManager,
        hint_secret: bool,
    ) -> impl Iterator<Item = (usize, &'a Offer)> {
        self.candidates(category, quests, hint_secret)
            .filter(|(_, offer)| offer.is_presentable())
    }

    /// Whether anything in `category` is on offer for `target`.
    ///
    /// Unlike [`get_matched_offers`](Self::get_matched_offers) this also
    /// counts offers whose prompt text is still empty, and skips quests the
    /// player already carries.
    pub fn offers_something(
        &self,
        category: HookCategory,
        target: &str,
        quests: &QuestManager,
        hint_secret: bool,
    ) -> bool {
        self.candidates(category, quests, hint_secret)
            .any(|(_, offer)| offer.target == target && !quests.has_quest(&offer.quest_name))
    }

    fn candidates<'a, 'q>(
        &'a self,
        category: HookCategory,
        quests: &'q QuestManager,
        hint_secret: bool,
    ) -> impl Iterator<Item = (usize, &'a Offer)> {
        self.offers
            .iter()
            .enumerate()
            .filter(move |(_, offer)| offer.category == category)
            .filter(move |(_, offer)| quests.is_offerable(&offer.quest_name))
            .filter(move |(_, offer)| !offer.secret || hint_secret)
    }

    pub fn all(&self) -> impl Iterator<Item = &Offer> {
        self.offers.iter()
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

impl Default for QuestOfferManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::QuestDefinition;
    use tempfile::TempDir;

    fn quests(names: &[&str]) -> QuestManager {
        let mut manager = QuestManager::new(1000);
        for name in names {
            manager.add_definition(QuestDefinition::new(*name));
        }
        manager
    }

    #[test]
    fn test_first_registered_wins() {
        let quests = quests(&["First", "Second"]);
        let mut offers = QuestOfferManager::new();
        offers.add_offer(Offer::new("First", HookCategory::Npc, "Abigail", "Hello"));
        offers.add_offer(Offer::new("Second", HookCategory::Npc, "Abigail", "Hi there"));

        for _ in 0..3 {
            let first = offers
                .get_matched_offers(HookCategory::Npc, &quests, false)
                .next()
                .unwrap();
            assert_eq!(first.quest_name, "First");
        }
    }

    #[test]
    fn test_secret_offers_need_hinting() {
        let quests = quests(&["Open", "Hidden"]);
        let mut offers = QuestOfferManager::new();
        offers.add_offer(Offer::new("Hidden", HookCategory::Npc, "Abigail", "Psst").secret(true));
        offers.add_offer(Offer::new("Open", HookCategory::Npc, "Abigail", "Hello"));

        let plain: Vec<&str> = offers
            .get_matched_offers(HookCategory::Npc, &quests, false)
            .map(|o| o.quest_name.as_str())
            .collect();
        assert_eq!(plain, vec!["Open"]);

        let hinted: Vec<&str> = offers
            .get_matched_offers(HookCategory::Npc, &quests, true)
            .map(|o| o.quest_name.as_str())
            .collect();
        assert_eq!(hinted, vec!["Hidden", "Open"]);
    }

    #[test]
    fn test_empty_prompt_only_counts_for_indicator() {
        let quests = quests(&["Draft"]);
        let mut offers = QuestOfferManager::new();
        offers.add_offer(Offer::new("Draft", HookCategory::Npc, "Abigail", ""));

        assert_eq!(offers.get_matched_offers(HookCategory::Npc, &quests, false).count(), 0);
        assert!(offers.offers_something(HookCategory::Npc, "Abigail", &quests, false));
        assert!(!offers.offers_something(HookCategory::Npc, "Sebastian", &quests, false));
    }

    #[test]
    fn test_category_must_match() {
        let quests = quests(&["Q"]);
        let mut offers = QuestOfferManager::new();
        offers.add_offer(Offer::new("Q", HookCategory::Tile, "Sign 5", "Read me"));

        assert_eq!(offers.get_matched_offers(HookCategory::Npc, &quests, true).count(), 0);
        assert_eq!(offers.get_matched_offers(HookCategory::Tile, &quests, true).count(), 1);
    }

    #[test]
    fn test_finished_quests_are_not_matched() {
        let mut quests = quests(&["Done", "Lost"]);
        let msg = crate::message::Message::talk(1, "Farmer", "Abigail", "Town");
        let mut offers = QuestOfferManager::new();
        offers.add_offer(Offer::new("Done", HookCategory::Npc, "Abigail", "Hello"));
        offers.add_offer(Offer::new("Lost", HookCategory::Npc, "Abigail", "Hey"));

        quests.adjust_quest(&msg, offers.all());
        quests.accept("Done").unwrap();
        quests.complete("Done").unwrap();
        quests.fail("Lost").unwrap();

        assert_eq!(offers.get_matched_offers(HookCategory::Npc, &quests, true).count(), 0);
        assert!(!offers.offers_something(HookCategory::Npc, "Abigail", &quests, true));
    }

    #[test]
    fn test_offers_for_unknown_quests_never_match() {
        let quests = quests(&["Open"]);
        let mut offers = QuestOfferManager::new();
        offers.add_offer(Offer::new("Ghost", HookCategory::Npc, "Abigail", "Boo"));
        offers.add_offer(Offer::new("Open", HookCategory::Npc, "Abigail", "Hello"));
        offers.add_offer(Offer::new("Ghost", HookCategory::Npc, "Pierre", "Boo"));

        let names: Vec<&str> = offers
            .get_matched_offers(HookCategory::Npc, &quests, true)
            .map(|o| o.quest_name.as_str())
            .collect();
        assert_eq!(names, vec!["Open"]);
        assert!(!offers.offers_something(HookCategory::Npc, "Pierre", &quests, true));
    }

    #[test]
    fn test_matched_entries_keep_registration_index() {
        let quests = quests(&["First", "Second"]);
        let mut offers = QuestOfferManager::new();
        offers.add_offer(Offer::new("First", HookCategory::Tile, "Sign 5", "one"));
        offers.add_offer(Offer::new("Second", HookCategory::Npc, "Abigail", "two"));

        let indices: Vec<usize> = offers
            .matched_entries(HookCategory::Npc, &quests, false)
            .map(|(index, _)| index)
            .collect();
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn test_load_offers_keeps_file_order() {
        let temp_dir = TempDir::new().unwrap();
        let offers_dir = temp_dir.path().join("offers");
        std::fs::create_dir_all(&offers_dir).unwrap();

        std::fs::write(
            offers_dir.join("a.toml"),
            r#"
[[offers]]
quest = "One"
category = "NPC"
target = "Abigail"
prompt = "one"

[[offers]]
quest = "Two"
category = "Weather"
target = "Rain"
"#,
        )
        .unwrap();
        std::fs::write(
            offers_dir.join("b.toml"),
            r#"
[[offers]]
quest = "Three"
category = "Tile"
target = "Sign 5"
prompt = "three"
"#,
        )
        .unwrap();
        std::fs::write(offers_dir.join("broken.toml"), "[[offers]\nquest =").unwrap();

        let mut offers = QuestOfferManager::new();
        let loaded = offers.load_from_directory(temp_dir.path()).unwrap();

        assert_eq!(loaded, 2);
        let names: Vec<&str> = offers.all().map(|o| o.quest_name.as_str()).collect();
        assert_eq!(names, vec!["One", "Three"]);
    }
}
