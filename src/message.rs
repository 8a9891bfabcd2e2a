//! Normalized Event Messages
//!
//! A message is the immutable record of one interaction ("Farmer talked to
//! Abigail", "Farmer touched Sign 5 on the Farm") built from a hook's
//! captured context and handed to the quest manager.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::condition::{HookCategory, HookContext, Position};

/// What kind of interaction a message records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Character talked to another character
    Talk,
    /// Character touched an action tile
    Touch,
    /// World clock ticked while the character was somewhere
    Tick,
}

/// What the initiator interacted with
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageTarget {
    Actor {
        name: String,
        location: String,
    },
    Tile {
        location: String,
        action: String,
        position: Position,
    },
    Clock {
        location: String,
        time: u32,
        day: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    ordinal: u64,
    timestamp: DateTime<Utc>,
    kind: MessageKind,
    initiator: String,
    target: MessageTarget,
}

impl Message {
    /// Build the message for a hook context
    pub fn from_context(ordinal: u64, context: &HookContext<'_>) -> Self {
        let (kind, target) = match context {
            HookContext::Tile(ctx) => (
                MessageKind::Touch,
                MessageTarget::Tile {
                    location: ctx.location.clone(),
                    action: ctx.action.clone(),
                    position: ctx.position,
                },
            ),
            HookContext::Npc(ctx) => (
                MessageKind::Talk,
                MessageTarget::Actor {
                    name: ctx.npc.clone(),
                    location: ctx.location.clone(),
                },
            ),
            HookContext::Time(ctx) => (
                MessageKind::Tick,
                MessageTarget::Clock {
                    location: ctx.location.clone(),
                    time: ctx.time,
                    day: ctx.day,
                },
            ),
        };

        Self {
            ordinal,
            timestamp: Utc::now(),
            kind,
            initiator: context.player().to_string(),
            target,
        }
    }

    /// Talk message: `who` talked to `npc`
    pub fn talk(ordinal: u64, who: &str, npc: &str, location: &str) -> Self {
        Self {
            ordinal,
            timestamp: Utc::now(),
            kind: MessageKind::Talk,
            initiator: who.to_string(),
            target: MessageTarget::Actor {
                name: npc.to_string(),
                location: location.to_string(),
            },
        }
    }

    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn category(&self) -> HookCategory {
        match self.kind {
            MessageKind::Talk => HookCategory::Npc,
            MessageKind::Touch => HookCategory::Tile,
            MessageKind::Tick => HookCategory::Time,
        }
    }

    pub fn initiator(&self) -> &str {
        &self.initiator
    }

    pub fn target(&self) -> &MessageTarget {
        &self.target
    }

    /// NPC name, touch action, or location, matching what offers target
    pub fn target_name(&self) -> &str {
        match &self.target {
            MessageTarget::Actor { name, .. } => name,
            MessageTarget::Tile { action, .. } => action,
            MessageTarget::Clock { location, .. } => location,
        }
    }

    pub fn location(&self) -> &str {
        match &self.target {
            MessageTarget::Actor { location, .. }
            | MessageTarget::Tile { location, .. }
            | MessageTarget::Clock { location, .. } => location,
        }
    }
}
