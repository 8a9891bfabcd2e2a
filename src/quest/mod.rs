//! Quest System Module
//!
//! Quest definitions loaded from TOML, per-quest lifecycle state, and the
//! manager that reacts to normalized messages.

pub mod definition;
pub mod manager;
pub mod state;

pub use definition::{ExternalIdRule, QuestDefinition, RawQuest, RawQuestFile};
pub use manager::QuestManager;
pub use state::{Quest, QuestState, QuestTransition};
