//! Quest Offers Module
//!
//! Declarative, category-scoped records describing when and how a quest
//! may be presented.

pub mod definition;
pub mod manager;

pub use definition::{Offer, RawOffer, RawOfferFile};
pub use manager::QuestOfferManager;
