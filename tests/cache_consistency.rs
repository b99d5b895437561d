//! Read-after-write behaviour of the cached services over the in-memory backend.

use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use pemuda::application::actions::{ActionError, Actor};
use pemuda::application::articles::ArticleInput;
use pemuda::application::communities::CommunityInput;
use pemuda::application::hubs::{HubCategoryInput, HubInput};
use pemuda::application::products::ProductInput;
use pemuda::application::repos::Repositories;
use pemuda::application::services::Services;
use pemuda::application::talents::TalentInput;
use pemuda::cache::{CacheConfig, CacheTrigger, TaggedCache};
use pemuda::domain::entities::UserRecord;
use pemuda::domain::types::{ContentStatus, HubStatus, ReviewStatus, UserRole};
use pemuda::infra::memory::InMemoryRepositories;

struct Harness {
    backend: Arc<InMemoryRepositories>,
    services: Services,
    admin: Actor,
    member: Actor,
}

async fn harness() -> Harness {
    let backend = Arc::new(InMemoryRepositories::new());
    let admin = user("Admin", UserRole::Admin);
    let member = user("Sari", UserRole::Member);
    backend.insert_user(admin.clone()).await;
    backend.insert_user(member.clone()).await;

    let cache = Arc::new(TaggedCache::new(CacheConfig::default()));
    let services = Services::new(
        &Repositories::from_backend(backend.clone()),
        CacheTrigger::new(cache),
    );

    Harness {
        backend,
        services,
        admin: Actor::from_user(&admin),
        member: Actor::from_user(&member),
    }
}

fn user(name: &str, role: UserRole) -> UserRecord {
    let now = OffsetDateTime::now_utc();
    UserRecord {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        image: None,
        role,
        bio: None,
        created_at: now,
        updated_at: now,
    }
}

fn talent_input(name: &str) -> TalentInput {
    TalentInput {
        name: name.to_string(),
        profession: "Photographer".to_string(),
        industry: "Creative".to_string(),
        ..Default::default()
    }
}

fn product_input(name: &str, status: &str) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: "Hand-made in Magelang".to_string(),
        category: "Craft".to_string(),
        price: 150_000,
        status: Some(status.to_string()),
        ..Default::default()
    }
}

fn article_input(title: &str, status: &str) -> ArticleInput {
    ArticleInput {
        title: title.to_string(),
        content: "Borobudur at sunrise.".to_string(),
        status: Some(status.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn draft_product_reaches_gallery_once_published() {
    let h = harness().await;
    h.services
        .talents
        .save_talent(Some(&h.member), talent_input("Sari Studio"))
        .await
        .expect("talent");
    let product = h
        .services
        .products
        .save_product(Some(&h.member), product_input("Batik Tulis", "draft"))
        .await
        .expect("product");

    let gallery = h.services.products.published_products().await.unwrap();
    assert!(gallery.iter().all(|item| item.id != product.id));

    let reads = h.backend.reads();
    h.services.products.published_products().await.unwrap();
    assert_eq!(h.backend.reads(), reads, "second read must be memoized");

    let plan_before = h.backend.writes();
    h.services
        .products
        .set_product_status(Some(&h.admin), &product.id.to_string(), "published")
        .await
        .expect("publish");
    assert_eq!(h.backend.writes(), plan_before + 1);

    let reads = h.backend.reads();
    let gallery = h.services.products.published_products().await.unwrap();
    assert!(h.backend.reads() > reads, "gallery must be recomputed");
    assert!(gallery.iter().any(|item| item.id == product.id));
}

#[tokio::test]
async fn repeated_reads_query_storage_once_per_discriminator() {
    let h = harness().await;
    let first = h
        .services
        .articles
        .save_article(Some(&h.member), article_input("Kabut Pagi", "draft"))
        .await
        .unwrap();
    let second = h
        .services
        .articles
        .save_article(Some(&h.member), article_input("Senja Merapi", "draft"))
        .await
        .unwrap();

    let reads = h.backend.reads();
    for _ in 0..3 {
        h.services.articles.article_by_id(first.id).await.unwrap();
    }
    assert_eq!(h.backend.reads(), reads + 1);

    h.services.articles.article_by_id(second.id).await.unwrap();
    assert_eq!(h.backend.reads(), reads + 2);

    let missing = Uuid::new_v4();
    assert!(h.services.articles.article_by_id(missing).await.unwrap().is_none());
    assert!(h.services.articles.article_by_id(missing).await.unwrap().is_none());
    assert_eq!(h.backend.reads(), reads + 3);
}

#[tokio::test]
async fn invalid_status_is_rejected_without_writing() {
    let h = harness().await;
    h.services
        .talents
        .save_talent(Some(&h.member), talent_input("Sari Studio"))
        .await
        .unwrap();
    let product = h
        .services
        .products
        .save_product(Some(&h.member), product_input("Gerabah", "draft"))
        .await
        .unwrap();

    let writes = h.backend.writes();
    let err = h
        .services
        .products
        .set_product_status(Some(&h.admin), &product.id.to_string(), "archived")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_STATUS");

    let err = h
        .services
        .articles
        .save_article(Some(&h.member), article_input("Status Typo", "publish"))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::InvalidStatus(_)));
    assert_eq!(h.backend.writes(), writes);
}

#[tokio::test]
async fn id_presence_selects_update_over_create() {
    let h = harness().await;
    let created = h
        .services
        .articles
        .save_article(Some(&h.member), article_input("Pasar Rejowinangun", "draft"))
        .await
        .unwrap();

    let mut edit = article_input("Pasar Rejowinangun Baru", "draft");
    edit.id = Some(created.id.to_string());
    let updated = h
        .services
        .articles
        .save_article(Some(&h.member), edit)
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.slug, created.slug, "slug is stable across updates");
    assert_eq!(updated.title, "Pasar Rejowinangun Baru");

    let mut blank = article_input("Pasar Rejowinangun Lagi", "draft");
    blank.id = Some("   ".to_string());
    let fresh = h
        .services
        .articles
        .save_article(Some(&h.member), blank)
        .await
        .unwrap();
    assert_ne!(fresh.id, created.id);

    let all = h.services.articles.all_articles().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn same_title_same_day_is_reported_as_slug_issue() {
    let h = harness().await;
    h.services
        .articles
        .save_article(Some(&h.member), article_input("Hello World", "draft"))
        .await
        .unwrap();

    let err = h
        .services
        .articles
        .save_article(Some(&h.member), article_input("Hello World", "draft"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION");
    assert_eq!(err.issues()[0].field, "slug");
}

#[tokio::test]
async fn talent_status_change_refreshes_owner_views() {
    let h = harness().await;
    let talent = h
        .services
        .talents
        .save_talent(Some(&h.member), talent_input("Sari Studio"))
        .await
        .unwrap();
    assert_eq!(talent.status, ReviewStatus::Pending);

    let cached = h.services.talents.talent_by_user(h.member.user_id).await.unwrap();
    assert_eq!(cached.map(|t| t.status), Some(ReviewStatus::Pending));
    assert!(h.services.talents.approved_talents().await.unwrap().is_empty());
    h.services.users.all_users().await.unwrap();
    h.services.talents.talent_by_id(talent.id).await.unwrap();

    h.services
        .talents
        .set_talent_status(Some(&h.admin), &talent.id.to_string(), "approved")
        .await
        .unwrap();

    let reads = h.backend.reads();
    let by_user = h.services.talents.talent_by_user(h.member.user_id).await.unwrap();
    assert_eq!(by_user.map(|t| t.status), Some(ReviewStatus::Approved));
    let by_slug = h.services.talents.talent_by_slug(&talent.slug).await.unwrap();
    assert_eq!(by_slug.map(|t| t.status), Some(ReviewStatus::Approved));
    assert_eq!(h.services.talents.approved_talents().await.unwrap().len(), 1);
    h.services.users.all_users().await.unwrap();
    assert_eq!(h.backend.reads(), reads + 4);

    let by_id = h.services.talents.talent_by_id(talent.id).await.unwrap();
    assert_eq!(by_id.map(|t| t.status), Some(ReviewStatus::Approved));
}

#[tokio::test]
async fn product_update_refreshes_talent_product_list() {
    let h = harness().await;
    let talent = h
        .services
        .talents
        .save_talent(Some(&h.member), talent_input("Sari Studio"))
        .await
        .unwrap();
    let product = h
        .services
        .products
        .save_product(Some(&h.member), product_input("Kopi Sumbing", "draft"))
        .await
        .unwrap();
    h.services
        .products
        .set_product_status(Some(&h.admin), &product.id.to_string(), "published")
        .await
        .unwrap();

    let listed = h
        .services
        .products
        .published_products_by_talent(talent.id)
        .await
        .unwrap();
    assert_eq!(listed[0].price, 150_000);

    let mut edit = product_input("Kopi Sumbing", "published");
    edit.id = Some(product.id.to_string());
    edit.price = 175_000;
    h.services
        .products
        .save_product(Some(&h.member), edit)
        .await
        .unwrap();

    let listed = h
        .services
        .products
        .published_products_by_talent(talent.id)
        .await
        .unwrap();
    assert_eq!(listed[0].price, 175_000);
    let by_slug = h.services.products.product_by_slug(&product.slug).await.unwrap();
    assert_eq!(by_slug.map(|p| p.price), Some(175_000));
}

#[tokio::test]
async fn community_status_reaches_embedded_article_cards() {
    let h = harness().await;
    let community = h
        .services
        .communities
        .save_community(
            Some(&h.member),
            CommunityInput {
                name: "Komunitas Sepeda".to_string(),
                description: "Gowes bareng".to_string(),
                category: "Olahraga".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut input = article_input("Gowes Minggu", "draft");
    input.community_id = Some(community.id.to_string());
    let article = h
        .services
        .articles
        .save_article(Some(&h.member), input)
        .await
        .unwrap();
    h.services
        .articles
        .set_article_status(Some(&h.admin), &article.id.to_string(), "published")
        .await
        .unwrap();

    let cards = h.services.articles.published_articles().await.unwrap();
    let badge = cards[0].community.as_ref().expect("community badge");
    assert_eq!(badge.status, ReviewStatus::Pending);
    h.services.communities.community_by_id(community.id).await.unwrap();

    h.services
        .communities
        .set_community_status(Some(&h.admin), &community.id.to_string(), "approved")
        .await
        .unwrap();

    let cards = h.services.articles.published_articles().await.unwrap();
    let badge = cards[0].community.as_ref().expect("community badge");
    assert_eq!(badge.status, ReviewStatus::Approved);
    let by_id = h.services.communities.community_by_id(community.id).await.unwrap();
    assert_eq!(by_id.map(|c| c.status), Some(ReviewStatus::Approved));
    assert_eq!(
        h.services
            .articles
            .published_articles_by_community(community.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn category_delete_evicts_every_child_hub() {
    let h = harness().await;
    let category = h
        .services
        .hubs
        .save_category(
            Some(&h.admin),
            HubCategoryInput {
                name: "Pendidikan".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let mut hubs = Vec::new();
    for name in ["Kelas Coding", "Kelas Desain"] {
        let hub = h
            .services
            .hubs
            .save_hub(
                Some(&h.admin),
                HubInput {
                    name: name.to_string(),
                    description: "Program belajar".to_string(),
                    category_id: category.id.to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        hubs.push(hub);
    }

    for hub in &hubs {
        assert!(h.services.hubs.hub_by_slug(&hub.slug).await.unwrap().is_some());
        assert!(h.services.hubs.hub_by_id(hub.id).await.unwrap().is_some());
    }
    assert_eq!(h.services.hubs.hubs().await.unwrap().len(), 2);
    assert_eq!(
        h.services.hubs.hubs_in_category(category.id).await.unwrap().len(),
        2
    );
    assert!(h.services.hubs.category_by_id(category.id).await.unwrap().is_some());

    let reads = h.backend.reads();
    let writes = h.backend.writes();
    h.services
        .hubs
        .delete_category(Some(&h.admin), &category.id.to_string())
        .await
        .unwrap();
    assert_eq!(h.backend.reads(), reads, "children come back from the delete itself");
    assert_eq!(h.backend.writes(), writes + 1);

    for hub in &hubs {
        assert!(h.services.hubs.hub_by_slug(&hub.slug).await.unwrap().is_none());
        assert!(h.services.hubs.hub_by_id(hub.id).await.unwrap().is_none());
    }
    assert!(h.services.hubs.hubs().await.unwrap().is_empty());
    assert!(
        h.services
            .hubs
            .hubs_in_category(category.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(h.services.hubs.category_by_id(category.id).await.unwrap().is_none());
    assert!(h.services.hubs.categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn members_cannot_moderate() {
    let h = harness().await;
    let article = h
        .services
        .articles
        .save_article(Some(&h.member), article_input("Jalan Pagi", "draft"))
        .await
        .unwrap();

    let writes = h.backend.writes();
    let err = h
        .services
        .articles
        .set_article_status(Some(&h.member), &article.id.to_string(), "published")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNAUTHORIZED");

    let err = h
        .services
        .articles
        .save_article(None, article_input("Anonim", "draft"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNAUTHORIZED");
    assert_eq!(h.backend.writes(), writes);
}

#[tokio::test]
async fn owner_resave_cannot_lift_a_ban() {
    let h = harness().await;
    let article = h
        .services
        .articles
        .save_article(Some(&h.member), article_input("Lapak Liar", "draft"))
        .await
        .unwrap();
    let id = article.id.to_string();
    for status in ["published", "banned"] {
        h.services
            .articles
            .set_article_status(Some(&h.admin), &id, status)
            .await
            .unwrap();
    }

    let writes = h.backend.writes();
    let mut resave = article_input("Lapak Liar", "published");
    resave.id = Some(id.clone());
    let err = h
        .services
        .articles
        .save_article(Some(&h.member), resave)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNAUTHORIZED");
    assert_eq!(h.backend.writes(), writes);

    let mut edit = article_input("Lapak Liar Revisi", "draft");
    edit.id = Some(id);
    edit.status = None;
    let edited = h
        .services
        .articles
        .save_article(Some(&h.member), edit)
        .await
        .unwrap();
    assert_eq!(edited.status, ContentStatus::Banned);
    assert!(h.services.articles.published_articles().await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_without_status_keeps_existing_status() {
    let h = harness().await;
    let article = h
        .services
        .articles
        .save_article(Some(&h.member), article_input("Tidar Pagi", "draft"))
        .await
        .unwrap();
    h.services
        .articles
        .set_article_status(Some(&h.admin), &article.id.to_string(), "published")
        .await
        .unwrap();

    let mut edit = article_input("Tidar Pagi Cerah", "draft");
    edit.id = Some(article.id.to_string());
    edit.status = None;
    let edited = h
        .services
        .articles
        .save_article(Some(&h.member), edit)
        .await
        .unwrap();
    assert_eq!(edited.status, ContentStatus::Published);
    let cards = h.services.articles.published_articles().await.unwrap();
    assert_eq!(cards[0].title, "Tidar Pagi Cerah");

    let category = h
        .services
        .hubs
        .save_category(
            Some(&h.admin),
            HubCategoryInput {
                name: "Seni".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let hub = h
        .services
        .hubs
        .save_hub(
            Some(&h.admin),
            HubInput {
                name: "Galeri".to_string(),
                description: "Pameran".to_string(),
                category_id: category.id.to_string(),
                status: Some("soon".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let renamed = h
        .services
        .hubs
        .save_hub(
            Some(&h.admin),
            HubInput {
                id: Some(hub.id.to_string()),
                name: "Galeri Kota".to_string(),
                description: "Pameran".to_string(),
                category_id: category.id.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.status, HubStatus::Soon);
}

#[tokio::test]
async fn members_create_drafts_only() {
    let h = harness().await;
    let err = h
        .services
        .articles
        .save_article(Some(&h.member), article_input("Langsung Tayang", "published"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNAUTHORIZED");

    let article = h
        .services
        .articles
        .save_article(Some(&h.admin), article_input("Pengumuman", "published"))
        .await
        .unwrap();
    assert_eq!(article.status, ContentStatus::Published);
}
