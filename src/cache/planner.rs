//! Invalidation planning.
//!
//! [`tags_for`] is the single table mapping each kind of committed change to
//! the tags whose cached reads it can make stale. The write path never picks
//! tags itself; it publishes an event and the plan derived here is executed.

use std::collections::BTreeSet;
use std::fmt;

use super::events::CacheEvent;
use super::keys::CacheTag;

/// Tags made stale by `event`.
pub fn tags_for(event: &CacheEvent) -> Vec<CacheTag> {
    match event {
        CacheEvent::ArticleUpserted {
            article_id,
            slug,
            author_id,
            community_id,
            previous_community_id,
        } => {
            let mut tags = vec![
                CacheTag::ArticleById(*article_id),
                CacheTag::ArticleBySlug(slug.clone()),
                CacheTag::Articles,
                CacheTag::PublishedArticles,
                CacheTag::UserArticles(*author_id),
            ];
            tags.extend(
                community_id
                    .iter()
                    .chain(previous_community_id.iter())
                    .map(|id| CacheTag::CommunityArticles(*id)),
            );
            tags
        }
        CacheEvent::ArticleDeleted {
            article_id,
            slug,
            author_id,
            community_id,
        } => {
            let mut tags = vec![
                CacheTag::ArticleById(*article_id),
                CacheTag::ArticleBySlug(slug.clone()),
                CacheTag::Articles,
                CacheTag::PublishedArticles,
                CacheTag::UserArticles(*author_id),
            ];
            tags.extend(community_id.map(CacheTag::CommunityArticles));
            tags
        }
        CacheEvent::ProductUpserted {
            product_id,
            slug,
            talent_id,
            talent_slug,
        }
        | CacheEvent::ProductDeleted {
            product_id,
            slug,
            talent_id,
            talent_slug,
        } => vec![
            CacheTag::ProductBySlug(slug.clone()),
            CacheTag::ProductById(*product_id),
            CacheTag::Products,
            CacheTag::TalentById(*talent_id),
            CacheTag::TalentBySlug(talent_slug.clone()),
            CacheTag::TalentProducts(*talent_id),
        ],
        CacheEvent::TalentUpserted {
            talent_id,
            slug,
            user_id,
        } => vec![
            CacheTag::TalentById(*talent_id),
            CacheTag::TalentBySlug(slug.clone()),
            CacheTag::Talents,
            CacheTag::UserTalent(*user_id),
            CacheTag::UserById(*user_id),
            CacheTag::Users,
            CacheTag::TalentProducts(*talent_id),
            CacheTag::UserArticles(*user_id),
        ],
        CacheEvent::CommunityUpserted {
            community_id,
            slug,
            user_id,
        } => vec![
            CacheTag::CommunityById(*community_id),
            CacheTag::CommunityBySlug(slug.clone()),
            CacheTag::UserCommunity(*user_id),
            CacheTag::Communities,
            CacheTag::PublishedArticles,
            CacheTag::Articles,
            CacheTag::CommunityArticles(*community_id),
        ],
        CacheEvent::HubUpserted {
            hub_id,
            slug,
            category_id,
            previous_category_id,
        } => {
            let mut tags = vec![
                CacheTag::HubById(*hub_id),
                CacheTag::HubBySlug(slug.clone()),
                CacheTag::Hubs,
                CacheTag::HubCategoryById(*category_id),
            ];
            tags.extend(previous_category_id.map(CacheTag::HubCategoryById));
            tags
        }
        CacheEvent::HubDeleted {
            hub_id,
            slug,
            category_id,
        } => vec![
            CacheTag::HubById(*hub_id),
            CacheTag::HubBySlug(slug.clone()),
            CacheTag::Hubs,
            CacheTag::HubCategoryById(*category_id),
        ],
        CacheEvent::HubCategoryUpserted { category_id, slug } => vec![
            CacheTag::HubCategoryById(*category_id),
            CacheTag::HubCategoryBySlug(slug.clone()),
            CacheTag::HubCategories,
            CacheTag::Hubs,
        ],
        CacheEvent::HubCategoryDeleted {
            category_id,
            slug,
            hubs,
        } => {
            let mut tags = vec![
                CacheTag::HubCategoryById(*category_id),
                CacheTag::HubCategoryBySlug(slug.clone()),
                CacheTag::HubCategories,
                CacheTag::Hubs,
            ];
            for (hub_id, hub_slug) in hubs {
                tags.push(CacheTag::HubById(*hub_id));
                tags.push(CacheTag::HubBySlug(hub_slug.clone()));
            }
            tags
        }
        CacheEvent::UserUpdated { user_id } => vec![
            CacheTag::UserById(*user_id),
            CacheTag::Users,
            CacheTag::UserTalent(*user_id),
            CacheTag::UserCommunity(*user_id),
            CacheTag::UserArticles(*user_id),
            CacheTag::Articles,
            CacheTag::PublishedArticles,
        ],
        CacheEvent::AppDataUpdated => vec![CacheTag::AppData],
    }
}

/// Deduplicated set of tags to invalidate for one event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InvalidationPlan {
    pub tags: BTreeSet<CacheTag>,
}

impl InvalidationPlan {
    pub fn from_event(event: &CacheEvent) -> Self {
        Self {
            tags: tags_for(event).into_iter().collect(),
        }
    }

    pub fn contains(&self, tag: &CacheTag) -> bool {
        self.tags.contains(tag)
    }
}

impl fmt::Display for InvalidationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("InvalidationPlan [")?;
        for (index, tag) in self.tags.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tag}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn product_change_reaches_owning_talent() {
        let product_id = Uuid::new_v4();
        let talent_id = Uuid::new_v4();
        let plan = InvalidationPlan::from_event(&CacheEvent::ProductUpserted {
            product_id,
            slug: "kopi".into(),
            talent_id,
            talent_slug: "budi".into(),
        });

        for tag in [
            CacheTag::ProductBySlug("kopi".into()),
            CacheTag::ProductById(product_id),
            CacheTag::Products,
            CacheTag::TalentById(talent_id),
            CacheTag::TalentBySlug("budi".into()),
            CacheTag::TalentProducts(talent_id),
        ] {
            assert!(plan.contains(&tag), "missing {tag}");
        }
    }

    #[test]
    fn talent_change_reaches_owner_and_lists() {
        let talent_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let plan = InvalidationPlan::from_event(&CacheEvent::TalentUpserted {
            talent_id,
            slug: "budi".into(),
            user_id,
        });

        assert!(plan.contains(&CacheTag::UserById(user_id)));
        assert!(plan.contains(&CacheTag::Users));
        assert!(plan.contains(&CacheTag::TalentProducts(talent_id)));
        assert!(plan.contains(&CacheTag::UserArticles(user_id)));
        assert!(plan.contains(&CacheTag::Talents));
    }

    #[test]
    fn community_change_reaches_published_articles() {
        let community_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let plan = InvalidationPlan::from_event(&CacheEvent::CommunityUpserted {
            community_id,
            slug: "komunitas".into(),
            user_id,
        });

        assert!(plan.contains(&CacheTag::PublishedArticles));
        assert!(plan.contains(&CacheTag::UserCommunity(user_id)));
        assert!(plan.contains(&CacheTag::CommunityBySlug("komunitas".into())));
    }

    #[test]
    fn category_delete_reaches_every_child_hub() {
        let category_id = Uuid::new_v4();
        let hubs: Vec<(Uuid, String)> = (0..3)
            .map(|n| (Uuid::new_v4(), format!("hub-{n}")))
            .collect();
        let plan = InvalidationPlan::from_event(&CacheEvent::HubCategoryDeleted {
            category_id,
            slug: "inkubasi".into(),
            hubs: hubs.clone(),
        });

        assert!(plan.contains(&CacheTag::HubCategoryById(category_id)));
        assert!(plan.contains(&CacheTag::Hubs));
        for (id, slug) in hubs {
            assert!(plan.contains(&CacheTag::HubById(id)));
            assert!(plan.contains(&CacheTag::HubBySlug(slug)));
        }
    }

    #[test]
    fn article_move_reaches_both_communities() {
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();
        let plan = InvalidationPlan::from_event(&CacheEvent::ArticleUpserted {
            article_id: Uuid::new_v4(),
            slug: "a".into(),
            author_id: Uuid::new_v4(),
            community_id: Some(new),
            previous_community_id: Some(old),
        });
        assert!(plan.contains(&CacheTag::CommunityArticles(old)));
        assert!(plan.contains(&CacheTag::CommunityArticles(new)));
    }

    #[test]
    fn repeated_tags_collapse() {
        let community = Uuid::new_v4();
        let event = CacheEvent::ArticleUpserted {
            article_id: Uuid::new_v4(),
            slug: "a".into(),
            author_id: Uuid::new_v4(),
            community_id: Some(community),
            previous_community_id: Some(community),
        };
        let plan = InvalidationPlan::from_event(&event);
        assert_eq!(plan.tags.len(), tags_for(&event).len() - 1);

        let plan = InvalidationPlan::from_event(&CacheEvent::AppDataUpdated);
        assert_eq!(plan.to_string(), "InvalidationPlan [app-data]");
    }
}
