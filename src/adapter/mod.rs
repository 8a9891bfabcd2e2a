//! Host adapters
//!
//! Entry points the host game calls at its interception points. Each one
//! turns host state into a hook event and reports whether it handled the
//! interaction.

pub mod indicator;
pub mod npc;
pub mod tile;

pub use indicator::{
    has_temporary_message_available, offers_quest, offers_special_order, should_draw_indicator, NpcView,
};
pub use npc::{before_check_action, HostNotice, NpcInteraction, NpcOutcome};
pub use tile::{after_touch_action, TouchOutcome};
