//! Black-box tests: the real router on an ephemeral port, driven over HTTP
//! with a cookie-holding client.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use mealbridge_api::app::{build_app, AppServices};
use mealbridge_auth::TokenService;
use mealbridge_core::UserDirectory;
use mealbridge_infra::{ensure_superadmin, InMemoryAuditLog, InMemoryDirectory};
use mealbridge_notify::NoopNotifier;

const JWT_SECRET: &str = "test-secret";
const ADMIN_EMAIL: &str = "root@example.org";
const ADMIN_PASSWORD: &str = "bootstrap-pw";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryDirectory::new());
        let tokens = Arc::new(TokenService::new(JWT_SECRET).unwrap());
        let services = Arc::new(AppServices::new(
            directory.clone(),
            Arc::new(InMemoryAuditLog::new()),
            Arc::new(NoopNotifier),
            tokens,
        ));

        ensure_superadmin(directory.as_ref(), ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();

        let app = build_app(services);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn cookie_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

fn donor_payload(email: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "long-enough-pw",
        "firstName": "Dana",
        "lastName": "Prasai",
        "role": "DONOR",
        "phoneNumber": "+977-1-5555",
        "city": "Kathmandu",
    })
}

async fn register(srv: &TestServer, client: &reqwest::Client, payload: &serde_json::Value) -> reqwest::Response {
    client
        .post(srv.url("/api/auth/register"))
        .json(payload)
        .send()
        .await
        .unwrap()
}

async fn login(
    srv: &TestServer,
    client: &reqwest::Client,
    email: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(srv.url("/api/auth/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
}

/// Cookie-holding client already logged in as the bootstrap superadmin.
async fn admin_client(srv: &TestServer) -> reqwest::Client {
    let client = cookie_client();
    let res = login(srv, &client, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(res.status(), StatusCode::OK);
    client
}

async fn patch_user(
    srv: &TestServer,
    client: &reqwest::Client,
    user_id: &str,
    action: &str,
) -> reqwest::Response {
    client
        .patch(srv.url(&format!("/api/admin/users/{}", user_id)))
        .json(&json!({ "action": action }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_creates_pending_user_without_leaking_the_hash() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();

    let res = register(&srv, &client, &donor_payload("a@x.com")).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["role"], "DONOR");
    assert_eq!(body["user"]["status"], "PENDING");

    let raw = body.to_string();
    assert!(!raw.contains("password"));
    assert!(!raw.contains("$2"));
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();

    assert_eq!(
        register(&srv, &client, &donor_payload("a@x.com")).await.status(),
        StatusCode::CREATED
    );
    assert_eq!(
        register(&srv, &client, &donor_payload("a@x.com")).await.status(),
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn register_validates_input() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();

    // Missing fields.
    let res = register(&srv, &client, &json!({ "email": "a@x.com" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Unknown role.
    let mut payload = donor_payload("a@x.com");
    payload["role"] = json!("ADMIN");
    let res = register(&srv, &client, &payload).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Self-registration can never produce a SUPERADMIN.
    let mut payload = donor_payload("a@x.com");
    payload["role"] = json!("SUPERADMIN");
    let res = register(&srv, &client, &payload).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Password policy.
    let mut payload = donor_payload("a@x.com");
    payload["password"] = json!("short");
    let res = register(&srv, &client, &payload).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_requires_a_session() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/api/auth/me")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sets_cookie_and_me_reflects_it() {
    let srv = TestServer::spawn().await;
    let client = admin_client(&srv).await;

    let res = client.get(srv.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert_eq!(body["user"]["role"], "SUPERADMIN");
    assert_eq!(body["user"]["status"], "APPROVED");
}

#[tokio::test]
async fn login_rejects_bad_credentials_with_one_message() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();

    let wrong_password = login(&srv, &client, ADMIN_EMAIL, "nope-nope").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let a: serde_json::Value = wrong_password.json().await.unwrap();

    let unknown_email = login(&srv, &client, "ghost@x.com", "nope-nope").await;
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let b: serde_json::Value = unknown_email.json().await.unwrap();

    assert_eq!(a["error"], b["error"]);
}

#[tokio::test]
async fn logout_clears_the_session() {
    let srv = TestServer::spawn().await;
    let client = admin_client(&srv).await;

    let res = client
        .post(srv.url("/api/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_endpoints_split_401_and_403() {
    let srv = TestServer::spawn().await;

    // No session at all.
    let res = reqwest::get(srv.url("/api/admin/users")).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // An approved donor is authenticated but not authorized.
    let admin = admin_client(&srv).await;
    let donor = cookie_client();
    let res = register(&srv, &donor, &donor_payload("d@x.com")).await;
    let donor_id = res.json::<serde_json::Value>().await.unwrap()["user"]["id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(
        patch_user(&srv, &admin, &donor_id, "approve").await.status(),
        StatusCode::OK
    );

    let res = login(&srv, &donor, "d@x.com", "long-enough-pw").await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = donor.get(srv.url("/api/admin/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_lists_users_newest_first_without_hashes() {
    let srv = TestServer::spawn().await;
    let client = cookie_client();
    register(&srv, &client, &donor_payload("first@x.com")).await;
    register(&srv, &client, &donor_payload("second@x.com")).await;

    let admin = admin_client(&srv).await;
    let res = admin.get(srv.url("/api/admin/users")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 3); // two donors + bootstrap admin
    assert_eq!(users[0]["email"], "second@x.com");
    assert_eq!(users[1]["email"], "first@x.com");
    assert!(!body.to_string().contains("$2"));
}

#[tokio::test]
async fn admin_user_detail_and_errors() {
    let srv = TestServer::spawn().await;
    let admin = admin_client(&srv).await;

    let client = cookie_client();
    let res = register(&srv, &client, &donor_payload("d@x.com")).await;
    let donor_id = res.json::<serde_json::Value>().await.unwrap()["user"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = admin
        .get(srv.url(&format!("/api/admin/users/{}", donor_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["phoneNumber"], "+977-1-5555");
    assert_eq!(body["user"]["city"], "Kathmandu");
    assert!(body["user"]["approvedAt"].is_null());

    // Unknown id → 404; malformed id → 400.
    let res = admin
        .get(srv.url(&format!(
            "/api/admin/users/{}",
            uuid::Uuid::now_v7()
        )))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = admin
        .get(srv.url("/api/admin/users/not-a-uuid"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lifecycle_end_to_end() {
    let srv = TestServer::spawn().await;
    let admin = admin_client(&srv).await;

    // Register a donor.
    let donor = cookie_client();
    let res = register(&srv, &donor, &donor_payload("a@x.com")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let donor_id = res.json::<serde_json::Value>().await.unwrap()["user"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Approve and log the donor in.
    let res = patch_user(&srv, &admin, &donor_id, "approve").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["status"], "APPROVED");

    let res = login(&srv, &donor, "a@x.com", "long-enough-pw").await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = donor.get(srv.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["role"], "DONOR");
    assert_eq!(body["user"]["status"], "APPROVED");

    // Approving again fails the precondition.
    let res = patch_user(&srv, &admin, &donor_id, "approve").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Block: the still-valid cookie no longer authenticates.
    let res = patch_user(&srv, &admin, &donor_id, "block").await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = donor.get(srv.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // A blocked account cannot log in again either.
    let res = login(&srv, &donor, "a@x.com", "long-enough-pw").await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Enable: the original cookie works again (same token, live re-check).
    let res = patch_user(&srv, &admin, &donor_id, "enable").await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = donor.get(srv.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn patch_rejects_bad_actions_and_protected_targets() {
    let srv = TestServer::spawn().await;
    let admin = admin_client(&srv).await;

    let client = cookie_client();
    let res = register(&srv, &client, &donor_payload("d@x.com")).await;
    let donor_id = res.json::<serde_json::Value>().await.unwrap()["user"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Unknown action and missing action.
    let res = patch_user(&srv, &admin, &donor_id, "promote").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let res = admin
        .patch(srv.url(&format!("/api/admin/users/{}", donor_id)))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Precondition failures: block/enable a PENDING user.
    for action in ["block", "enable"] {
        let res = patch_user(&srv, &admin, &donor_id, action).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "action {action}");
    }

    // The SUPERADMIN account is categorically protected.
    let res = admin.get(srv.url("/api/admin/users")).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let admin_id = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["role"] == "SUPERADMIN")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    for action in ["approve", "reject", "block", "enable"] {
        let res = patch_user(&srv, &admin, &admin_id, action).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "action {action}");
    }

    // Unknown target.
    let res = patch_user(&srv, &admin, &uuid::Uuid::now_v7().to_string(), "approve").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expired_or_forged_tokens_are_unauthenticated() {
    use jsonwebtoken::{Algorithm, EncodingKey, Header};

    let srv = TestServer::spawn().await;

    // A structurally correct token, expired an hour ago, signed with the real
    // secret.
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": uuid::Uuid::now_v7().to_string(),
        "email": "ghost@x.com",
        "role": "DONOR",
        "status": "APPROVED",
        "iat": now - 7200,
        "exp": now - 3600,
    });
    let expired = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let client = reqwest::Client::new();
    let res = client
        .get(srv.url("/api/auth/me"))
        .header("cookie", format!("auth-token={expired}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Garbage cookie.
    let res = client
        .get(srv.url("/api/auth/me"))
        .header("cookie", "auth-token=not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
