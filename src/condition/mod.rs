//! Condition System Module
//!
//! Hooks observe raw world events, one per category, and evaluate the
//! conditions registered for that category.

pub mod hook;
pub mod manager;
pub mod predicate;

pub use hook::{
    Hook, HookCategory, HookContext, NpcContext, Position, RawEvent, TileContext, TimeContext,
};
pub use manager::{ConditionManager, ConditionMatch};
pub use predicate::{Condition, NativePredicate, Predicate, ScriptEngine};
