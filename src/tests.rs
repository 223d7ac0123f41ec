//! Integration tests for the blog backend.

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::{create_router, AppState};

const ADMIN_LOGIN: &str = "admin";
const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("data");

        let config = Config {
            images_dir: data_dir.join("images"),
            data_dir,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            admin_login: Some(ADMIN_LOGIN.to_string()),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
            secret: Some("s".repeat(64)),
        };

        let state = AppState::open(&config).await.expect("Failed to open state");
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/admin/auth"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    async fn token(&self) -> String {
        let resp = self.login(ADMIN_LOGIN, ADMIN_PASSWORD).await;
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn create_post(&self, token: &str, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/posts"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        body["data"].clone()
    }
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_login() {
    let fixture = TestFixture::new().await;

    let resp = fixture.login(ADMIN_LOGIN, ADMIN_PASSWORD).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(!body["data"]["token"].as_str().unwrap().is_empty());
    assert!(body["data"]["expirationDate"].is_string());

    // Wrong password
    let resp = fixture.login(ADMIN_LOGIN, "wrong").await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

    // Wrong login
    let resp = fixture.login("intruder", ADMIN_PASSWORD).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/posts"))
        .json(&json!({ "title": "T", "content": "C" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let resp = fixture
        .client
        .post(fixture.url("/api/posts"))
        .bearer_auth("not-a-token")
        .json(&json!({ "title": "T", "content": "C" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "TOKEN_INVALID");

    // Public reads stay open
    let resp = fixture
        .client
        .get(fixture.url("/api/posts"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_post_crud() {
    let fixture = TestFixture::new().await;
    let token = fixture.token().await;

    // Create
    let post = fixture
        .create_post(
            &token,
            json!({ "title": "Hello", "content": "First post", "categories": ["rust"] }),
        )
        .await;
    assert_eq!(post["id"], 0);
    assert_eq!(post["title"], "Hello");

    // Read
    let resp = fixture
        .client
        .get(fixture.url("/api/posts/0"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["content"], "First post");

    // Update
    let resp = fixture
        .client
        .put(fixture.url("/api/posts/0"))
        .bearer_auth(&token)
        .json(&json!({ "title": "Hello again" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["title"], "Hello again");
    assert_eq!(body["data"]["content"], "First post");

    // Second post gets the next id
    let second = fixture
        .create_post(&token, json!({ "title": "Two", "content": "Second" }))
        .await;
    assert_eq!(second["id"], 1);

    // Delete
    let resp = fixture
        .client
        .delete(fixture.url("/api/posts/0"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/posts/0"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_paging_and_tags() {
    let fixture = TestFixture::new().await;
    let token = fixture.token().await;

    for day in 1..=7 {
        fixture
            .create_post(
                &token,
                json!({
                    "title": format!("Post {}", day),
                    "content": "body",
                    "created": format!("2024-01-{:02}T00:00:00Z", day),
                    "categories": if day % 2 == 0 { json!(["even"]) } else { json!([]) }
                }),
            )
            .await;
    }

    let resp = fixture
        .client
        .get(fixture.url("/api/posts?page=0"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 5);
    assert_eq!(posts[0]["title"], "Post 7");
    assert_eq!(body["data"]["maxPages"], 2);

    let resp = fixture
        .client
        .get(fixture.url("/api/posts?page=1"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1]["title"], "Post 1");

    let resp = fixture
        .client
        .get(fixture.url("/api/posts?category=even"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["maxPages"], 1);

    let resp = fixture
        .client
        .get(fixture.url("/api/tags"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], json!(["even"]));
}

#[tokio::test]
async fn test_comments() {
    let fixture = TestFixture::new().await;
    let token = fixture.token().await;
    fixture
        .create_post(&token, json!({ "title": "Hello", "content": "World" }))
        .await;

    // Readers comment without a token
    let resp = fixture
        .client
        .post(fixture.url("/api/posts/0/comments"))
        .json(&json!({ "author": "Ann", "email": "ann@example.com", "content": "Nice" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["postId"], 0);

    let resp = fixture
        .client
        .get(fixture.url("/api/posts/0"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["comments"].as_array().unwrap().len(), 1);

    // Deleting needs a token, and is idempotent
    let delete_url = fixture.url(&format!("/api/posts/0/comments/{}", comment_id));
    let resp = fixture.client.delete(&delete_url).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    for _ in 0..2 {
        let resp = fixture
            .client
            .delete(&delete_url)
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let resp = fixture
        .client
        .get(fixture.url("/api/posts/0"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"]["comments"].as_array().unwrap().is_empty());

    // Comment on a missing post
    let resp = fixture
        .client
        .post(fixture.url("/api/posts/99/comments"))
        .json(&json!({ "author": "Ann", "content": "Hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_secret_rotation_invalidates_tokens() {
    let fixture = TestFixture::new().await;
    let old_token = fixture.token().await;

    // Short secret is rejected
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/secret"))
        .bearer_auth(&old_token)
        .json(&json!({ "value": "too-short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "SECRET_TOO_SHORT");
    assert_eq!(body["error"]["details"]["minLength"], 64);

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/secret"))
        .bearer_auth(&old_token)
        .json(&json!({ "value": "r".repeat(64) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .post(fixture.url("/api/posts"))
        .bearer_auth(&old_token)
        .json(&json!({ "title": "T", "content": "C" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "TOKEN_INVALID");

    // A fresh login works under the new secret
    let new_token = fixture.token().await;
    fixture
        .create_post(&new_token, json!({ "title": "T", "content": "C" }))
        .await;
}

#[tokio::test]
async fn test_change_credentials() {
    let fixture = TestFixture::new().await;
    let token = fixture.token().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/admin/credentials"))
        .bearer_auth(&token)
        .json(&json!({ "login": "editor", "password": "new password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    assert_eq!(fixture.login(ADMIN_LOGIN, ADMIN_PASSWORD).await.status(), 400);
    assert_eq!(fixture.login("editor", "new password").await.status(), 200);

    // Blank login is rejected
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/login"))
        .bearer_auth(&token)
        .json(&json!({ "value": "  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_validation_errors() {
    let fixture = TestFixture::new().await;
    let token = fixture.token().await;

    let resp = fixture
        .client
        .post(fixture.url("/api/posts"))
        .bearer_auth(&token)
        .json(&json!({ "title": "", "content": "C" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    fixture
        .create_post(&token, json!({ "title": "T", "content": "C" }))
        .await;
    let resp = fixture
        .client
        .post(fixture.url("/api/posts/0/comments"))
        .json(&json!({ "author": "", "content": "Hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_not_found_errors() {
    let fixture = TestFixture::new().await;
    let token = fixture.token().await;

    let resp = fixture
        .client
        .get(fixture.url("/api/posts/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let resp = fixture
        .client
        .put(fixture.url("/api/posts/42"))
        .bearer_auth(&token)
        .json(&json!({ "title": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .delete(fixture.url("/api/posts/42"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let resp = fixture
        .client
        .get(fixture.url(&format!("/images/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_images_and_site_settings() {
    let fixture = TestFixture::new().await;
    let token = fixture.token().await;

    // Upload
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/upload"))
        .bearer_auth(&token)
        .body(b"\x89PNG fake".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let uri = body["data"].as_str().unwrap().to_string();
    assert!(uri.contains("/images/"));

    // Serve
    let path = &uri[uri.find("/images/").unwrap()..];
    let resp = fixture.client.get(fixture.url(path)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"\x89PNG fake");

    // List
    let resp = fixture
        .client
        .get(fixture.url("/api/admin/images"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"], json!([uri]));

    // About page with an inline image
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/about"))
        .bearer_auth(&token)
        .json(&json!({ "about": "Hi, I write here.", "image": "aGVsbG8=" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = fixture
        .client
        .get(fixture.url("/api/about"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["about"], "Hi, I write here.");
    let image_id = body["data"]["imageId"].as_str().unwrap().to_string();

    let resp = fixture
        .client
        .get(fixture.url(&format!("/images/{}", image_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"hello");

    // Bad base64
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/about"))
        .bearer_auth(&token)
        .json(&json!({ "about": "x", "image": "***" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Header
    let resp = fixture
        .client
        .post(fixture.url("/api/admin/header"))
        .bearer_auth(&token)
        .body(b"banner".to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let header_id = body["data"].as_str().unwrap().to_string();

    let resp = fixture
        .client
        .get(fixture.url("/api/header"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["imageId"], header_id);

    // Delete
    let id = uri.rsplit('/').next().unwrap();
    let resp = fixture
        .client
        .delete(fixture.url(&format!("/api/admin/images/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let resp = fixture.client.get(fixture.url(path)).send().await.unwrap();
    assert_eq!(resp.status(), 404);
}
