//! Pemuda cache system.
//!
//! A tag-scoped read-through cache shared by every read accessor:
//!
//! - **Keys** address one memoized query: (resource, version, discriminator).
//! - **Tags** label families of keys; invalidating a tag drops them all.
//! - **Events** are published by write paths after commit and mapped to tags by
//!   the planner.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_seconds = 300
//! max_entries = 2048
//! ```

mod config;
mod events;
mod keys;
mod lock;
mod planner;
mod registry;
mod store;
mod trigger;

pub use config::CacheConfig;
pub use events::CacheEvent;
pub use keys::{CACHE_VERSION, CacheKey, CacheTag};
pub use planner::{InvalidationPlan, tags_for};
pub use registry::CacheRegistry;
pub use store::TaggedCache;
pub use trigger::CacheTrigger;
