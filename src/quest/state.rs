//! Quest State Tracking
//!
//! Lifecycle of a single quest: Unseen → Offered → Accepted →
//! Completed/Failed. Transitions only move forward.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::definition::QuestDefinition;
use crate::message::Message;

/// Status of a quest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestState {
    /// Never presented to the player
    Unseen,
    /// Prompt presented, not accepted yet
    Offered,
    /// In the player's quest log
    Accepted,
    Completed,
    Failed,
}

impl QuestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestState::Unseen => "unseen",
            QuestState::Offered => "offered",
            QuestState::Accepted => "accepted",
            QuestState::Completed => "completed",
            QuestState::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "unseen" => Some(QuestState::Unseen),
            "offered" => Some(QuestState::Offered),
            "accepted" => Some(QuestState::Accepted),
            "completed" => Some(QuestState::Completed),
            "failed" => Some(QuestState::Failed),
            _ => None,
        }
    }

    /// Offered or Accepted
    pub fn is_active(&self) -> bool {
        matches!(self, QuestState::Offered | QuestState::Accepted)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QuestState::Completed | QuestState::Failed)
    }

    /// Whether the state machine allows moving from `self` to `to`
    pub fn can_move_to(&self, to: QuestState) -> bool {
        matches!(
            (self, to),
            (QuestState::Unseen, QuestState::Offered)
                | (QuestState::Offered, QuestState::Accepted)
                | (QuestState::Accepted, QuestState::Completed)
                | (QuestState::Offered, QuestState::Failed)
                | (QuestState::Accepted, QuestState::Failed)
        )
    }
}

impl fmt::Display for QuestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change performed by the quest manager
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestTransition {
    pub quest: String,
    pub from: QuestState,
    pub to: QuestState,
    /// Ordinal of the message that caused it, for message-driven transitions
    pub message: Option<u64>,
}

/// One quest instance
#[derive(Debug, Clone, Serialize)]
pub struct Quest {
    pub definition: Arc<QuestDefinition>,
    state: QuestState,
    /// Message that got the quest offered
    offered_by: Option<Message>,
    offered_at: Option<DateTime<Utc>>,
    accepted_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Quest {
    pub fn new(definition: Arc<QuestDefinition>) -> Self {
        Self {
            definition,
            state: QuestState::Unseen,
            offered_by: None,
            offered_at: None,
            accepted_at: None,
            finished_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn full_name(&self) -> String {
        self.definition.full_name()
    }

    pub fn state(&self) -> QuestState {
        self.state
    }

    pub fn offered_by(&self) -> Option<&Message> {
        self.offered_by.as_ref()
    }

    pub fn offered_at(&self) -> Option<DateTime<Utc>> {
        self.offered_at
    }

    pub fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Move to `to` if the state machine allows it.
    ///
    /// Returns the previous state, or `None` when the move is not allowed
    /// (the quest is left untouched).
    pub fn advance(&mut self, to: QuestState, message: Option<&Message>) -> Option<QuestState> {
        let from = self.state;
        if !from.can_move_to(to) {
            return None;
        }

        let now = Utc::now();
        match to {
            QuestState::Offered => {
                self.offered_by = message.cloned();
                self.offered_at = Some(now);
            }
            QuestState::Accepted => self.accepted_at = Some(now),
            QuestState::Completed | QuestState::Failed => self.finished_at = Some(now),
            QuestState::Unseen => {}
        }
        self.state = to;
        Some(from)
    }

    /// Swap the definition after a reload, keeping progress
    pub(crate) fn redefine(&mut self, definition: Arc<QuestDefinition>) {
        self.definition = definition;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [QuestState; 5] = [
        QuestState::Unseen,
        QuestState::Offered,
        QuestState::Accepted,
        QuestState::Completed,
        QuestState::Failed,
    ];

    #[test]
    fn test_terminal_states_are_final() {
        for from in [QuestState::Completed, QuestState::Failed] {
            for to in ALL {
                assert!(!from.can_move_to(to), "{} -> {} allowed", from, to);
            }
        }
    }

    #[test]
    fn test_no_backwards_moves() {
        for to in [QuestState::Unseen, QuestState::Offered] {
            assert!(!QuestState::Accepted.can_move_to(to));
        }
        assert!(!QuestState::Offered.can_move_to(QuestState::Offered));
        assert!(!QuestState::Unseen.can_move_to(QuestState::Accepted));
    }

    #[test]
    fn test_lifecycle() {
        let mut quest = Quest::new(Arc::new(QuestDefinition::new("FindTheWell")));
        let msg = Message::talk(4, "Farmer", "Abigail", "Town");

        assert_eq!(quest.advance(QuestState::Offered, Some(&msg)), Some(QuestState::Unseen));
        assert_eq!(quest.offered_by().map(|m| m.ordinal()), Some(4));
        assert!(quest.offered_at().is_some());

        assert_eq!(quest.advance(QuestState::Offered, None), None);
        assert_eq!(quest.advance(QuestState::Accepted, None), Some(QuestState::Offered));
        assert_eq!(quest.advance(QuestState::Completed, None), Some(QuestState::Accepted));
        assert!(quest.finished_at().is_some());
        assert_eq!(quest.advance(QuestState::Offered, Some(&msg)), None);
        assert_eq!(quest.state(), QuestState::Completed);
    }

    #[test]
    fn test_state_string_round_trip() {
        for state in ALL {
            assert_eq!(QuestState::from_str(state.as_str()), Some(state));
        }
        assert_eq!(QuestState::from_str("abandoned"), None);
    }
}
