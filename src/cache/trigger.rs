//! Cache trigger service.
//!
//! Write paths call the trigger after their write commits. The trigger turns
//! the event into an [`InvalidationPlan`] and drops every tag in it before
//! returning, so the next read observes the committed state.

use std::sync::Arc;
use std::time::Instant;

use metrics::histogram;
use tracing::info;

use super::events::CacheEvent;
use super::planner::InvalidationPlan;
use super::store::TaggedCache;

const METRIC_INVALIDATE_MS: &str = "pemuda_cache_invalidate_ms";

#[derive(Clone)]
pub struct CacheTrigger {
    cache: Arc<TaggedCache>,
}

impl CacheTrigger {
    pub fn new(cache: Arc<TaggedCache>) -> Self {
        Self { cache }
    }

    /// Invalidate every tag affected by `event`. Returns the executed plan.
    pub fn publish(&self, event: CacheEvent) -> InvalidationPlan {
        let started_at = Instant::now();
        let plan = InvalidationPlan::from_event(&event);

        let removed: usize = plan.tags.iter().map(|tag| self.cache.invalidate(tag)).sum();

        info!(
            target = "pemuda::cache",
            event_kind = event.kind(),
            plan = %plan,
            removed,
            "cache invalidated after write"
        );
        histogram!(METRIC_INVALIDATE_MS, "event" => event.kind())
            .record(started_at.elapsed().as_secs_f64() * 1000.0);

        plan
    }

    pub fn cache(&self) -> &Arc<TaggedCache> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::cache::{CacheConfig, CacheKey, CacheTag};

    #[tokio::test]
    async fn publish_drops_entries_for_planned_tags() {
        let cache = Arc::new(TaggedCache::new(CacheConfig::default()));
        let trigger = CacheTrigger::new(cache.clone());
        let talent_id = Uuid::new_v4();

        let _: Result<u8, ()> = cache
            .fetch(
                CacheKey::with("products-by-talent", talent_id),
                vec![CacheTag::TalentProducts(talent_id)],
                || async { Ok(1) },
            )
            .await;
        let _: Result<u8, ()> = cache
            .fetch(CacheKey::new("hubs"), vec![CacheTag::Hubs], || async {
                Ok(2)
            })
            .await;
        assert_eq!(cache.len(), 2);

        let plan = trigger.publish(CacheEvent::ProductUpserted {
            product_id: Uuid::new_v4(),
            slug: "kopi".into(),
            talent_id,
            talent_slug: "budi".into(),
        });

        assert!(plan.contains(&CacheTag::TalentProducts(talent_id)));
        assert_eq!(cache.len(), 1);
    }
}
