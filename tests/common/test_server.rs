use std::path::Path;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};
use storerate::auth::{Claims, PasswordService, RawPassword, TOKEN_TTL, TokenService};
use storerate::server::{AppState, create_router};
use storerate::store::{Database, SqliteStore};
use storerate::types::{NewUser, Role};
use tempfile::TempDir;
use tokio::task::JoinHandle;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "correct horse battery";

const TEST_SECRET: &[u8] = b"integration-test-secret";

/// Serves the full router on an ephemeral port, backed by a database file in
/// a temp directory. The first admin account is seeded directly.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<SqliteStore>,
    server_task: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join("storerate.db")).expect("open db");
        store.initialize().expect("create schema");
        let store = Arc::new(store);

        let tokens = TokenService::new(TEST_SECRET, TOKEN_TTL).expect("token service");
        let state = Arc::new(AppState::new(store.clone(), tokens));
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let server_task = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        let server = Self {
            temp_dir,
            base_url: format!("http://127.0.0.1:{port}"),
            client: reqwest::Client::new(),
            store,
            server_task,
        };
        server.seed_account("Admin", ADMIN_EMAIL, Role::Admin);
        server
    }

    /// Decodes a token with the secret the server signs with.
    pub fn decode_token(&self, token: &str) -> Claims {
        TokenService::new(TEST_SECRET, TOKEN_TTL)
            .expect("token service")
            .verify(token)
            .expect("valid token")
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Inserts an account without going through the API.
    pub fn seed_account(&self, name: &str, email: &str, role: Role) -> i64 {
        let password_hash = PasswordService::new()
            .hash(&RawPassword::new(PASSWORD))
            .expect("hash password");
        self.store
            .create_user(&NewUser {
                name: name.to_string(),
                email: email.to_string(),
                address: None,
                password_hash,
                role,
            })
            .expect("seed account")
    }

    pub async fn login(&self, email: &str) -> String {
        let resp = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({"email": email, "password": PASSWORD}))
            .send()
            .await
            .expect("login request");
        assert_eq!(resp.status(), StatusCode::OK, "login failed for {email}");

        let body: Value = resp.json().await.expect("parse login response");
        body["token"].as_str().expect("token").to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL).await
    }

    /// Seeds an account with the given role and returns its id and token.
    pub async fn account(&self, name: &str, email: &str, role: Role) -> (i64, String) {
        let id = self.seed_account(name, email, role);
        let token = self.login(email).await;
        (id, token)
    }

    pub async fn create_store(&self, admin_token: &str, name: &str, owner_id: Option<i64>) -> i64 {
        let resp = self
            .client
            .post(self.url("/admin/stores"))
            .bearer_auth(admin_token)
            .json(&json!({
                "name": name,
                "email": format!("{}@stores.example.com", name.to_lowercase().replace(' ', "-")),
                "address": "1 Market Street",
                "owner_id": owner_id,
            }))
            .send()
            .await
            .expect("create store request");
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = resp.json().await.expect("parse store response");
        body["id"].as_i64().expect("store id")
    }

    pub async fn rate(&self, token: &str, store_id: i64, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/stores/{store_id}/rate")))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("rate request")
    }

    pub async fn get_json(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.expect("get request");
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server_task.abort();
    }
}
