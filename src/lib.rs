//! Quest trigger engine
//!
//! Observes host events through category hooks, matches them against
//! registered conditions and quest offers, and drives each quest through
//! its offered/accepted/finished lifecycle.

pub mod adapter;
pub mod bridge;
pub mod condition;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod message;
pub mod offer;
pub mod quest;

pub use bridge::{OrderBoard, SpecialOrder, SpecialOrderBoard};
pub use condition::{Condition, ConditionManager, Hook, HookCategory, Predicate, RawEvent};
pub use config::EngineConfig;
pub use engine::{EventOutcome, QuestEngine};
pub use error::{EngineError, Result};
pub use message::Message;
pub use offer::{Offer, QuestOfferManager};
pub use quest::{Quest, QuestDefinition, QuestManager, QuestState};
