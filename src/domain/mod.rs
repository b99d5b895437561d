//! Domain layer types and invariants.

pub mod badge;
pub mod entities;
pub mod search;
pub mod slug;
pub mod types;
pub mod uploads;
