//! Integration tests for Souq.
//!
//! These tests talk HTTP to a running API and are `#[ignore]`d by default.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and create an admin
//! cargo run -p souq-cli -- migrate
//! SOUQ_ADMIN_PASSWORD=... cargo run -p souq-cli -- admin create -e admin@souq.test -n Admin
//!
//! # Start the API, then
//! SOUQ_BASE_URL=http://localhost:3000 \
//! SOUQ_ADMIN_EMAIL=admin@souq.test SOUQ_ADMIN_PASSWORD=... \
//!     cargo test -p souq-integration-tests -- --ignored --test-threads=1
//! ```
//!
//! Login is rate limited per client IP, so every request carries a random
//! `X-Forwarded-For` address.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};

/// Shared HTTP client and target server.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a context from `SOUQ_BASE_URL` (default `http://localhost:3000`).
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("SOUQ_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_owned())
            .trim_end_matches('/')
            .to_owned();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A request from a fresh client address.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let octets = uuid::Uuid::new_v4().into_bytes();
        let ip = format!("10.{}.{}.{}", octets[0], octets[1], octets[2]);
        self.client
            .request(method, self.url(path))
            .header("x-forwarded-for", ip)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(reqwest::Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(reqwest::Method::POST, path)
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.request(reqwest::Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(reqwest::Method::DELETE, path)
    }

    /// Log in with `SOUQ_ADMIN_EMAIL` / `SOUQ_ADMIN_PASSWORD`.
    ///
    /// # Panics
    ///
    /// Panics if the variables are missing or login fails.
    pub async fn admin_token(&self) -> String {
        let email = std::env::var("SOUQ_ADMIN_EMAIL").expect("SOUQ_ADMIN_EMAIL must be set");
        let password =
            std::env::var("SOUQ_ADMIN_PASSWORD").expect("SOUQ_ADMIN_PASSWORD must be set");
        self.login(&email, &password).await
    }

    /// Log in and return the access token.
    ///
    /// # Panics
    ///
    /// Panics if login fails.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        assert_eq!(response.status(), StatusCode::OK, "login failed for {email}");
        let body = json_body(response).await;
        body["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_owned()
    }

    /// Register a customer with a unique email and return `(email, token)`.
    ///
    /// # Panics
    ///
    /// Panics if registration fails.
    pub async fn register_customer(&self) -> (String, String) {
        let email = unique_email();
        let response = self
            .post("/auth/register")
            .json(&json!({ "email": email, "password": "correct horse", "name": "Test Customer" }))
            .send()
            .await
            .expect("register request failed");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        let token = body["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_owned();
        (email, token)
    }

    /// `POST` a JSON body as admin and return the created record.
    ///
    /// # Panics
    ///
    /// Panics unless the server answers 201.
    pub async fn create(&self, token: &str, path: &str, body: &Value) -> Value {
        let response = self
            .post(path)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("create request failed");
        assert_eq!(response.status(), StatusCode::CREATED, "POST {path}");
        json_body(response).await
    }
}

/// A name no other test run has used.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", uuid::Uuid::new_v4().simple())
}

#[must_use]
pub fn unique_email() -> String {
    format!("customer-{}@souq.test", uuid::Uuid::new_v4().simple())
}

/// Read a JSON body.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn json_body(response: Response) -> Value {
    response.json().await.expect("response body is not JSON")
}

/// The `id` field of a record.
///
/// # Panics
///
/// Panics if the record has no numeric id.
#[must_use]
pub fn id_of(record: &Value) -> i64 {
    record["id"].as_i64().expect("record has no id")
}
