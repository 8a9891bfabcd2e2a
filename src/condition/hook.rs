//! Hooks
//!
//! One hook per event category. A hook captures the fields of the latest
//! event of its category and evaluates the conditions interested in it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::predicate::{Condition, ScriptEngine};

/// Event categories the engine knows how to observe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookCategory {
    Tile,
    #[serde(rename = "NPC", alias = "Npc")]
    Npc,
    Time,
}

impl HookCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookCategory::Tile => "Tile",
            HookCategory::Npc => "NPC",
            HookCategory::Time => "Time",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tile" => Some(HookCategory::Tile),
            "npc" => Some(HookCategory::Npc),
            "time" => Some(HookCategory::Time),
            _ => None,
        }
    }
}

impl fmt::Display for HookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standing position of the player in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Player touched an action tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileContext {
    #[serde(default)]
    pub player: String,
    /// Location the tile belongs to (e.g. "Farm")
    pub location: String,
    pub position: Position,
    /// Full touch action string of the tile (e.g. "Sign 5")
    pub action: String,
}

/// Player started an interaction with an NPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcContext {
    pub player: String,
    pub npc: String,
    #[serde(default)]
    pub location: String,
}

/// World clock advanced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeContext {
    #[serde(default)]
    pub player: String,
    pub location: String,
    /// Time of day in the host's clock format (e.g. 1830)
    pub time: u32,
    pub day: u32,
}

/// Raw event as delivered by the event source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum RawEvent {
    Tile(TileContext),
    #[serde(rename = "NPC", alias = "Npc")]
    Npc(NpcContext),
    Time(TimeContext),
}

impl RawEvent {
    pub fn category(&self) -> HookCategory {
        match self {
            RawEvent::Tile(_) => HookCategory::Tile,
            RawEvent::Npc(_) => HookCategory::Npc,
            RawEvent::Time(_) => HookCategory::Time,
        }
    }
}

/// Borrowed view of whatever a hook captured last
#[derive(Debug, Clone, Copy)]
pub enum HookContext<'a> {
    Tile(&'a TileContext),
    Npc(&'a NpcContext),
    Time(&'a TimeContext),
}

impl<'a> HookContext<'a> {
    pub fn category(&self) -> HookCategory {
        match self {
            HookContext::Tile(_) => HookCategory::Tile,
            HookContext::Npc(_) => HookCategory::Npc,
            HookContext::Time(_) => HookCategory::Time,
        }
    }

    pub fn location(&self) -> &'a str {
        match self {
            HookContext::Tile(ctx) => &ctx.location,
            HookContext::Npc(ctx) => &ctx.location,
            HookContext::Time(ctx) => &ctx.location,
        }
    }

    pub fn player(&self) -> &'a str {
        match self {
            HookContext::Tile(ctx) => &ctx.player,
            HookContext::Npc(ctx) => &ctx.player,
            HookContext::Time(ctx) => &ctx.player,
        }
    }

    /// Name of the thing the event points at: touch action, NPC name, or location
    pub fn target(&self) -> &'a str {
        match self {
            HookContext::Tile(ctx) => &ctx.action,
            HookContext::Npc(ctx) => &ctx.npc,
            HookContext::Time(ctx) => &ctx.location,
        }
    }
}

/// Observer for one event category
#[derive(Debug, Clone, PartialEq)]
pub enum Hook {
    Tile(Option<TileContext>),
    Npc(Option<NpcContext>),
    Time(Option<TimeContext>),
}

impl Hook {
    pub fn tile() -> Self {
        Hook::Tile(None)
    }

    pub fn npc() -> Self {
        Hook::Npc(None)
    }

    pub fn time() -> Self {
        Hook::Time(None)
    }

    pub fn for_category(category: HookCategory) -> Self {
        match category {
            HookCategory::Tile => Self::tile(),
            HookCategory::Npc => Self::npc(),
            HookCategory::Time => Self::time(),
        }
    }

    pub fn category(&self) -> HookCategory {
        match self {
            Hook::Tile(_) => HookCategory::Tile,
            Hook::Npc(_) => HookCategory::Npc,
            Hook::Time(_) => HookCategory::Time,
        }
    }

    /// Replace the captured context with the event's fields.
    ///
    /// Returns false (and leaves the hook untouched) if the event belongs
    /// to another category.
    pub fn capture(&mut self, event: RawEvent) -> bool {
        match (self, event) {
            (Hook::Tile(slot), RawEvent::Tile(ctx)) => *slot = Some(ctx),
            (Hook::Npc(slot), RawEvent::Npc(ctx)) => *slot = Some(ctx),
            (Hook::Time(slot), RawEvent::Time(ctx)) => *slot = Some(ctx),
            (hook, event) => {
                warn!(
                    "Hook {} cannot capture {} event",
                    hook.category(),
                    event.category()
                );
                return false;
            }
        }
        true
    }

    pub fn context(&self) -> Option<HookContext<'_>> {
        match self {
            Hook::Tile(ctx) => ctx.as_ref().map(HookContext::Tile),
            Hook::Npc(ctx) => ctx.as_ref().map(HookContext::Npc),
            Hook::Time(ctx) => ctx.as_ref().map(HookContext::Time),
        }
    }

    /// Evaluate every condition against the captured context.
    ///
    /// Returns the indices of satisfied conditions in registration order.
    /// A failing predicate is logged and counts as not matched.
    pub fn observe(&self, conditions: &[Condition], scripts: &ScriptEngine) -> Vec<usize> {
        let Some(context) = self.context() else {
            return Vec::new();
        };

        let mut matched = Vec::new();
        for (index, condition) in conditions.iter().enumerate() {
            match condition.evaluate(&context, scripts) {
                Ok(true) => matched.push(index),
                Ok(false) => {}
                Err(e) => {
                    warn!(
                        "Condition '{}' failed on {} event, treating as no match: {}",
                        condition.id, context.category(), e
                    );
                }
            }
        }

        debug!(
            "{} hook observed {}/{} matching conditions",
            context.category(),
            matched.len(),
            conditions.len()
        );
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile_event(action: &str, x: f32) -> RawEvent {
        RawEvent::Tile(TileContext {
            player: String::new(),
            location: "Farm".to_string(),
            position: Position::new(x, 20.0),
            action: action.to_string(),
        })
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(HookCategory::from_str("NPC"), Some(HookCategory::Npc));
        assert_eq!(HookCategory::from_str("tile"), Some(HookCategory::Tile));
        assert_eq!(HookCategory::from_str("Time"), Some(HookCategory::Time));
        assert_eq!(HookCategory::from_str("Weather"), None);
    }

    #[test]
    fn test_capture_overwrites_previous_context() {
        let mut hook = Hook::tile();
        assert!(hook.context().is_none());

        assert!(hook.capture(tile_event("Sign 5", 10.0)));
        assert!(hook.capture(tile_event("Sign 6", 11.0)));

        match hook.context() {
            Some(HookContext::Tile(ctx)) => {
                assert_eq!(ctx.action, "Sign 6");
                assert_eq!(ctx.position, Position::new(11.0, 20.0));
            }
            other => panic!("unexpected context {:?}", other),
        }
    }

    #[test]
    fn test_capture_rejects_other_category() {
        let mut hook = Hook::npc();
        assert!(!hook.capture(tile_event("Sign 5", 10.0)));
        assert!(hook.context().is_none());
    }

    #[test]
    fn test_raw_event_json() {
        let json = r#"{"category":"Tile","location":"Farm","position":{"x":10.0,"y":20.0},"action":"Sign 5"}"#;
        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, tile_event("Sign 5", 10.0));

        let json = r#"{"category":"NPC","player":"Farmer","npc":"Abigail"}"#;
        let event: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.category(), HookCategory::Npc);
    }
}
