//! Offer Definition Structures
//!
//! Offers are deserialized from TOML offer files. The core only filters
//! and ranks them; it never mutates one after loading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, HookCategory, Predicate};
use crate::message::Message;

/// An offers file: any number of `[[offers]]` tables
#[derive(Debug, Clone, Deserialize)]
pub struct RawOfferFile {
    #[serde(default)]
    pub offers: Vec<RawOffer>,
}

/// Raw offer as it appears in TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawOffer {
    pub quest: String,
    pub category: String,
    pub target: String,
    /// Text shown when the offer is presented; empty means not ready yet
    #[serde(default, alias = "dialogue_text")]
    pub prompt: String,
    #[serde(default)]
    pub secret: bool,
    /// Optional Lua expression gating the offer
    pub when: Option<String>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

/// A resolved quest offer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    pub quest_name: String,
    pub category: HookCategory,
    /// NPC name, touch action, or location the offer is attached to
    pub target: String,
    pub prompt: String,
    /// Secret offers never show up in passive hints
    pub secret: bool,
    pub when: Option<String>,
    pub details: BTreeMap<String, String>,
}

impl Offer {
    pub fn new(
        quest_name: impl Into<String>,
        category: HookCategory,
        target: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            quest_name: quest_name.into(),
            category,
            target: target.into(),
            prompt: prompt.into(),
            secret: false,
            when: None,
            details: BTreeMap::new(),
        }
    }

    pub fn secret(mut self, secret: bool) -> Self {
        self.secret = secret;
        self
    }

    pub fn when(mut self, expression: impl Into<String>) -> Self {
        self.when = Some(expression.into());
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Create an Offer from raw TOML data
    pub fn from_raw(raw: &RawOffer) -> Result<Self, String> {
        let category = HookCategory::from_str(&raw.category).ok_or_else(|| {
            format!(
                "Unknown offer category '{}' for quest '{}'",
                raw.category, raw.quest
            )
        })?;

        if raw.target.is_empty() {
            return Err(format!("Offer for quest '{}' has no target", raw.quest));
        }

        Ok(Self {
            quest_name: raw.quest.clone(),
            category,
            target: raw.target.clone(),
            prompt: raw.prompt.clone(),
            secret: raw.secret,
            when: raw.when.clone().filter(|w| !w.trim().is_empty()),
            details: raw.details.clone(),
        })
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }

    /// Location the interaction must happen in, if restricted
    pub fn location(&self) -> Option<&str> {
        self.detail("location")
    }

    pub fn is_presentable(&self) -> bool {
        !self.prompt.is_empty()
    }

    /// Whether this offer is attached to what the message interacted with
    pub fn is_interested_in(&self, message: &Message) -> bool {
        self.category == message.category()
            && self.target == message.target_name()
            && self.location().map_or(true, |loc| loc == message.location())
    }

    /// Id of the condition generated for the offer registered at `index`
    pub fn condition_id(&self, index: usize) -> String {
        format!("offer:{}#{}", self.quest_name, index)
    }

    /// Condition that fires when a hook observes this offer's trigger
    pub fn condition(&self, index: usize) -> Condition {
        let target = Predicate::Target {
            target: self.target.clone(),
            location: self.location().map(str::to_string),
        };
        let predicate = match &self.when {
            Some(expression) => Predicate::All(vec![target, Predicate::Script(expression.clone())]),
            None => target,
        };

        Condition::new(
            self.condition_id(index),
            self.category,
            predicate,
        )
        .for_quest(self.quest_name.clone())
    }
}
