//! HTTP contract tests driven through the router over the in-memory backend.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

use pemuda::application::repos::Repositories;
use pemuda::application::services::Services;
use pemuda::cache::{CacheConfig, CacheTrigger, TaggedCache};
use pemuda::domain::entities::UserRecord;
use pemuda::domain::types::UserRole;
use pemuda::infra::http::{AppState, build_router};
use pemuda::infra::memory::InMemoryRepositories;
use pemuda::infra::uploads::UploadStorage;

const MEMBER_TOKEN: &str = "member-token";
const ADMIN_TOKEN: &str = "admin-token";
const BOUNDARY: &str = "pemuda-test-boundary";

struct TestApp {
    router: Router,
    _uploads: tempfile::TempDir,
}

async fn app_with_upload_limit(max_bytes: u64) -> TestApp {
    let backend = Arc::new(InMemoryRepositories::new());
    let expires = OffsetDateTime::now_utc() + Duration::hours(1);

    let member = user("Sari", UserRole::Member);
    let admin = user("Admin", UserRole::Admin);
    backend.insert_session(MEMBER_TOKEN, member.id, expires).await;
    backend.insert_session(ADMIN_TOKEN, admin.id, expires).await;
    backend.insert_user(member).await;
    backend.insert_user(admin).await;

    let cache = Arc::new(TaggedCache::new(CacheConfig::default()));
    let services = Services::new(
        &Repositories::from_backend(backend),
        CacheTrigger::new(cache),
    );

    let dir = tempfile::tempdir().unwrap();
    let uploads = Arc::new(
        UploadStorage::new(
            dir.path().to_path_buf(),
            "http://localhost:3000",
            "/cdn",
            max_bytes,
        )
        .unwrap(),
    );

    TestApp {
        router: build_router(AppState { services, uploads }),
        _uploads: dir,
    }
}

async fn app() -> TestApp {
    app_with_upload_limit(1024).await
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

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn multipart(field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn call(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn healthz_reports_counts() {
    let app = app().await;
    let (status, body) = call(&app, get("/api/healthz", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OK");
    assert_eq!(body["count"]["users"], 2);
    assert_eq!(body["count"]["articles"], 0);
}

#[tokio::test]
async fn unknown_records_are_404() {
    let app = app().await;

    let uri = format!("/api/article/{}", Uuid::new_v4());
    let (status, body) = call(&app, get(&uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Article not found");

    let (status, _) = call(&app, get("/api/product/not-a-uuid", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_requires_session() {
    let app = app().await;

    let (status, body) = call(&app, get("/api/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = call(&app, get("/api/profile", Some("unknown-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, get("/api/profile", Some(MEMBER_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Sari");
}

#[tokio::test]
async fn community_of_current_user() {
    let app = app().await;

    let (status, _) = call(&app, get("/api/community", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, get("/api/community", Some(MEMBER_TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let payload = json!({
        "name": "Komunitas Literasi",
        "description": "Membaca bersama",
        "category": "Pendidikan"
    });
    let (status, body) = call(
        &app,
        send_json(
            Method::POST,
            "/api/dashboard/communities",
            Some(MEMBER_TOKEN),
            &payload.to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = call(&app, get("/api/community", Some(MEMBER_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Komunitas Literasi");
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn app_data_falls_back_to_empty_record() {
    let app = app().await;
    let (status, body) = call(&app, get("/api/app-data", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "");
    assert_eq!(body["data"]["whatsapp"], "");
}

#[tokio::test]
async fn upload_stores_image_and_serves_it() {
    let app = app().await;
    let (status, body) = call(&app, multipart("image", "image/png", b"\x89PNG\r\n\x1a\n")).await;

    assert_eq!(status, StatusCode::OK);
    let key = body["key"].as_str().expect("key").to_string();
    assert!(key.ends_with(".png"));
    assert_eq!(body["url"], format!("http://localhost:3000/cdn/{key}"));

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/cdn/{key}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
}

#[tokio::test]
async fn upload_rejects_bad_requests() {
    let app = app_with_upload_limit(16).await;

    let (status, _) = call(&app, multipart("file", "image/png", b"png")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "missing image field");

    let (status, _) = call(&app, multipart("image", "text/plain", b"hello")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "unsupported type");

    let (status, body) = call(&app, multipart("image", "image/jpeg", &[0u8; 64])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "File too large");
}

#[tokio::test]
async fn dashboard_mutations_return_outcomes() {
    let app = app().await;

    let (status, body) = call(
        &app,
        send_json(Method::POST, "/api/dashboard/articles", None, "{}"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({"ok": false, "error": "UNAUTHORIZED"}));

    let (status, body) = call(
        &app,
        send_json(
            Method::POST,
            "/api/dashboard/articles",
            Some(MEMBER_TOKEN),
            "{not json",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_DATA");

    let (status, body) = call(
        &app,
        send_json(
            Method::POST,
            "/api/dashboard/articles",
            Some(MEMBER_TOKEN),
            r#"{"title": "", "content": ""}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION");
    assert_eq!(body["issues"].as_array().map(Vec::len), Some(2));

    let (status, body) = call(
        &app,
        send_json(
            Method::POST,
            "/api/dashboard/articles",
            Some(MEMBER_TOKEN),
            r#"{"title": "Festival Tidar", "content": "Ramai sekali"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "draft");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        send_json(
            Method::POST,
            &format!("/api/dashboard/articles/{id}/status"),
            Some(ADMIN_TOKEN),
            r#"{"status": "live"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"ok": false, "error": "INVALID_STATUS"}));
}

#[tokio::test]
async fn published_product_appears_in_public_gallery() {
    let app = app().await;

    let talent = json!({
        "name": "Sari Studio",
        "profession": "Pengrajin",
        "industry": "Kriya"
    });
    let (status, _) = call(
        &app,
        send_json(
            Method::POST,
            "/api/dashboard/talents",
            Some(MEMBER_TOKEN),
            &talent.to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let product = json!({
        "name": "Tas Anyaman",
        "description": "Anyaman pandan",
        "category": "Kriya",
        "price": 85000,
        "status": "draft"
    });
    let (status, body) = call(
        &app,
        send_json(
            Method::POST,
            "/api/dashboard/products",
            Some(MEMBER_TOKEN),
            &product.to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = call(&app, get("/api/products", None)).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));

    let uri = format!("/api/product/{id}");
    let (status, _) = call(&app, get(&uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(&app, get(&uri, Some(MEMBER_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "draft");

    let (status, _) = call(
        &app,
        send_json(
            Method::POST,
            &format!("/api/dashboard/products/{id}/status"),
            Some(ADMIN_TOKEN),
            r#"{"status": "published"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, get("/api/products", None)).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Tas Anyaman");
    assert!(items[0]["badge_color"].as_str().unwrap().starts_with('#'));

    let (status, body) = call(&app, get(&format!("/api/product/{id}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "published");
}

#[tokio::test]
async fn dashboard_listings_are_admin_only() {
    let app = app().await;

    let (status, _) = call(&app, get("/api/dashboard/users", Some(MEMBER_TOKEN))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, get("/api/dashboard/users", Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn hub_category_page_lists_its_hubs() {
    let app = app().await;

    let (status, body) = call(
        &app,
        send_json(
            Method::POST,
            "/api/dashboard/hub-categories",
            Some(ADMIN_TOKEN),
            r#"{"name": "Pendidikan"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let category_id = body["data"]["id"].as_str().unwrap().to_string();
    let slug = body["data"]["slug"].as_str().unwrap().to_string();

    let hub = json!({
        "name": "Kelas Coding",
        "description": "Belajar pemrograman",
        "category_id": category_id,
        "status": "soon"
    });
    let (status, _) = call(
        &app,
        send_json(
            Method::POST,
            "/api/dashboard/hubs",
            Some(ADMIN_TOKEN),
            &hub.to_string(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, get(&format!("/api/hub-categories/slug/{slug}"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Pendidikan");
    assert_eq!(body["data"]["hubs"][0]["name"], "Kelas Coding");

    let (status, _) = call(&app, get("/api/hub-categories/slug/unknown", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unpublished_article_is_visible_to_author_and_admin_only() {
    let app = app().await;

    let (status, body) = call(
        &app,
        send_json(
            Method::POST,
            "/api/dashboard/articles",
            Some(MEMBER_TOKEN),
            r#"{"title": "Kirab Budaya", "content": "Persiapan kirab"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/article/{id}");

    let (status, body) = call(&app, get(&uri, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Article not found");

    let (status, body) = call(&app, get(&uri, Some(MEMBER_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Kirab Budaya");

    let (status, _) = call(&app, get(&uri, Some(ADMIN_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(
        &app,
        send_json(
            Method::POST,
            &format!("/api/dashboard/articles/{id}/status"),
            Some(ADMIN_TOKEN),
            r#"{"status": "published"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, get(&uri, None)).await;
    assert_eq!(status, StatusCode::OK);
}
