//! Bidirectional tag registry.
//!
//! Tracks which cache keys were stored under which tags so that invalidating a
//! tag can find every affected key, and evicting a key can clean up its tags.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::keys::{CacheKey, CacheTag};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::registry";

#[derive(Default)]
struct Maps {
    tag_to_keys: HashMap<CacheTag, HashSet<CacheKey>>,
    key_to_tags: HashMap<CacheKey, HashSet<CacheTag>>,
}

impl Maps {
    fn remove_key(&mut self, key: &CacheKey) -> bool {
        let Some(tags) = self.key_to_tags.remove(key) else {
            return false;
        };
        for tag in tags {
            if let Some(keys) = self.tag_to_keys.get_mut(&tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_to_keys.remove(&tag);
                }
            }
        }
        true
    }
}

/// Tracks tag → keys and key → tags mappings under a single lock.
#[derive(Default)]
pub struct CacheRegistry {
    maps: RwLock<Maps>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` under every tag in `tags`, replacing any earlier tag set.
    pub fn register(&self, key: CacheKey, tags: HashSet<CacheTag>) {
        let mut maps = rw_write(&self.maps, SOURCE, "register");
        maps.remove_key(&key);
        for tag in &tags {
            maps.tag_to_keys
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
        maps.key_to_tags.insert(key, tags);
    }

    pub fn keys_for_tag(&self, tag: &CacheTag) -> HashSet<CacheKey> {
        rw_read(&self.maps, SOURCE, "keys_for_tag")
            .tag_to_keys
            .get(tag)
            .cloned()
            .unwrap_or_default()
    }

    pub fn tags_for_key(&self, key: &CacheKey) -> HashSet<CacheTag> {
        rw_read(&self.maps, SOURCE, "tags_for_key")
            .key_to_tags
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Forget `key` and drop it from every tag it was stored under.
    pub fn unregister(&self, key: &CacheKey) -> bool {
        rw_write(&self.maps, SOURCE, "unregister").remove_key(key)
    }

    /// Forget every key stored under `tag`, returning those keys.
    pub fn unregister_tag(&self, tag: &CacheTag) -> HashSet<CacheKey> {
        let mut maps = rw_write(&self.maps, SOURCE, "unregister_tag");
        let keys = maps.tag_to_keys.remove(tag).unwrap_or_default();
        for key in &keys {
            maps.remove_key(key);
        }
        keys
    }

    pub fn clear(&self) {
        let mut maps = rw_write(&self.maps, SOURCE, "clear");
        maps.tag_to_keys.clear();
        maps.key_to_tags.clear();
    }

    pub fn tag_count(&self) -> usize {
        rw_read(&self.maps, SOURCE, "tag_count").tag_to_keys.len()
    }

    pub fn key_count(&self) -> usize {
        rw_read(&self.maps, SOURCE, "key_count").key_to_tags.len()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn tags(items: &[CacheTag]) -> HashSet<CacheTag> {
        items.iter().cloned().collect()
    }

    #[test]
    fn register_and_lookup() {
        let registry = CacheRegistry::new();
        let id = Uuid::new_v4();
        let key = CacheKey::with("product-by-id", id);

        registry.register(
            key.clone(),
            tags(&[CacheTag::ProductById(id), CacheTag::Products]),
        );

        assert!(registry.keys_for_tag(&CacheTag::Products).contains(&key));
        assert!(
            registry
                .tags_for_key(&key)
                .contains(&CacheTag::ProductById(id))
        );
        assert_eq!(registry.tag_count(), 2);
    }

    #[test]
    fn unregister_tag_removes_keys_from_sibling_tags() {
        let registry = CacheRegistry::new();
        let key = CacheKey::new("products-published");
        registry.register(key.clone(), tags(&[CacheTag::Products, CacheTag::Talents]));

        let affected = registry.unregister_tag(&CacheTag::Products);
        assert_eq!(affected.len(), 1);
        assert!(affected.contains(&key));
        assert!(registry.keys_for_tag(&CacheTag::Talents).is_empty());
        assert_eq!(registry.key_count(), 0);
        assert_eq!(registry.tag_count(), 0);
    }

    #[test]
    fn reregistering_replaces_tag_set() {
        let registry = CacheRegistry::new();
        let key = CacheKey::new("hubs");
        registry.register(key.clone(), tags(&[CacheTag::Hubs, CacheTag::HubCategories]));
        registry.register(key.clone(), tags(&[CacheTag::Hubs]));

        assert!(registry.keys_for_tag(&CacheTag::HubCategories).is_empty());
        assert_eq!(registry.tags_for_key(&key).len(), 1);
    }

    #[test]
    fn unregister_and_clear() {
        let registry = CacheRegistry::new();
        let key = CacheKey::new("app-data");
        registry.register(key.clone(), tags(&[CacheTag::AppData]));

        assert!(registry.unregister(&key));
        assert!(!registry.unregister(&key));

        registry.register(key, tags(&[CacheTag::AppData]));
        registry.clear();
        assert_eq!(registry.key_count(), 0);
    }
}
