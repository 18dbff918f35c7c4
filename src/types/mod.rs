//! Core domain types for the release bot.
//!
//! Identifiers shared by the webhook layer, the effects layer and the release
//! orchestration logic.

pub mod ids;

pub use ids::{DeliveryId, InvalidSha, PrNumber, RepoId, Sha};
