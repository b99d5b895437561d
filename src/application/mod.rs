//! Application services: cached read accessors and write mutators per entity.

pub mod actions;
pub mod app_data;
pub mod articles;
pub mod communities;
pub mod error;
pub mod health;
pub mod hubs;
pub mod products;
pub mod profiles;
pub mod repos;
pub mod search;
pub mod services;
pub mod talents;
pub mod users;
