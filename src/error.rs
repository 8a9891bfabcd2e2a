//! Engine error types.

use std::path::PathBuf;

use crate::condition::HookCategory;
use crate::quest::QuestState;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced to callers of the engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A hook was registered twice for the same category
    #[error("hook for category {0} is already registered")]
    DuplicateHook(HookCategory),

    /// A quest was asked to make a transition its state machine forbids
    #[error("quest '{quest}' cannot move from {from} to {to}")]
    InvalidTransition {
        quest: String,
        from: QuestState,
        to: QuestState,
    },

    /// A mutating call named a quest that has no definition
    #[error("unknown quest '{0}'")]
    UnknownQuest(String),

    /// A definition or config file could not be read or parsed
    #[error("failed to load {path:?}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// The Lua sandbox for script conditions could not be set up
    #[error("script engine error: {0}")]
    Script(#[from] mlua::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A condition predicate failed while being evaluated.
///
/// Never propagated past the condition manager; it is logged and the
/// condition counts as not matched.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("script error: {0}")]
    Script(#[from] mlua::Error),

    #[error("predicate error: {0}")]
    Predicate(String),

    #[error("predicate panicked: {0}")]
    Panicked(String),
}
