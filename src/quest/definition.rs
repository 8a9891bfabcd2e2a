//! Quest Definition Structures
//!
//! These structures are deserialized from TOML quest files.

use serde::{Deserialize, Serialize};

/// A quest definition file
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestFile {
    pub quest: RawQuest,
}

/// Raw quest data as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuest {
    pub name: String,
    /// Content pack that owns the quest
    pub owner: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Fixed id in the host's quest log; allocated on first use when absent
    pub external_id: Option<i64>,
}

/// How the host-visible quest id is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalIdRule {
    Fixed(i64),
    Allocated,
}

/// A resolved quest definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestDefinition {
    /// Internal key
    pub name: String,
    pub owner: Option<String>,
    pub title: String,
    pub description: String,
    pub external_id: ExternalIdRule,
}

impl QuestDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            owner: None,
            description: String::new(),
            external_id: ExternalIdRule::Allocated,
        }
    }

    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_external_id(mut self, id: i64) -> Self {
        self.external_id = ExternalIdRule::Fixed(id);
        self
    }

    /// Create a QuestDefinition from raw TOML data
    pub fn from_raw(raw: &RawQuest) -> Result<Self, String> {
        if raw.name.is_empty() {
            return Err("Quest has no name".to_string());
        }
        if raw.name.contains('@') {
            return Err(format!(
                "Quest name '{}' must not contain '@', set `owner` instead",
                raw.name
            ));
        }

        Ok(Self {
            name: raw.name.clone(),
            owner: raw.owner.clone().filter(|o| !o.is_empty()),
            title: if raw.title.is_empty() {
                raw.name.clone()
            } else {
                raw.title.clone()
            },
            description: raw.description.clone(),
            external_id: raw
                .external_id
                .map(ExternalIdRule::Fixed)
                .unwrap_or(ExternalIdRule::Allocated),
        })
    }

    /// `name@owner`, or just the name for quests without an owner
    pub fn full_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}@{}", self.name, owner),
            None => self.name.clone(),
        }
    }
}
