//! Integration tests for Duka.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL, then apply migrations
//! cargo run -p duka-cli -- migrate
//!
//! # Start the API with the mock SMS notifier
//! DUKA_SMS_MODE=mock cargo run -p duka-api
//!
//! # Run the ignored integration tests against it
//! cargo test -p duka-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth` - Registration, login, token refresh, profile
//! - `orders` - Order placement, scoping, SMS receipt status
//! - `customers` - Customer profile CRUD and uniqueness conflicts
//!
//! Each test registers its own throwaway identity, so the suite can run
//! repeatedly against the same database without cleanup.

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("DUKA_API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Plain HTTP client for API tests.
#[must_use]
pub fn http_client() -> Client {
    Client::new()
}

/// Short unique suffix for usernames and account codes.
#[must_use]
pub fn unique_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id.chars().take(8).collect()
}

/// Unique phone number in the `+2547...` range.
#[must_use]
pub fn unique_phone() -> String {
    let digits = Uuid::new_v4().as_u128() % 100_000_000;
    format!("+2547{digits:08}")
}

/// An identity registered for the duration of one test.
#[derive(Debug)]
pub struct TestIdentity {
    pub username: String,
    pub password: String,
    pub phone: String,
    pub code: String,
    pub access: String,
    pub refresh: String,
}

/// Register a fresh identity and return its credentials and tokens.
///
/// # Panics
///
/// Panics if the registration request fails or does not return 201.
pub async fn register_identity(client: &Client) -> TestIdentity {
    let suffix = unique_suffix();
    let username = format!("it_{suffix}");
    let password = "Secur3Pass!".to_string();
    let phone = unique_phone();
    let code = suffix.to_uppercase();

    let resp = client
        .post(format!("{}/auth/register", api_base_url()))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": password,
            "password2": password,
            "phone": phone,
            "code": code,
        }))
        .send()
        .await
        .expect("Failed to register test identity");

    assert_eq!(
        resp.status().as_u16(),
        201,
        "Registration failed: {}",
        resp.text().await.unwrap_or_default()
    );

    let body: Value = resp.json().await.expect("Failed to parse register response");
    let access = body["access"].as_str().expect("missing access token").to_string();
    let refresh = body["refresh"].as_str().expect("missing refresh token").to_string();

    TestIdentity {
        username,
        password,
        phone,
        code,
        access,
        refresh,
    }
}

/// Place an order as the given identity and return the response body.
///
/// # Panics
///
/// Panics if the request fails or does not return 201.
pub async fn place_order(client: &Client, identity: &TestIdentity, item: &str, amount: &str) -> Value {
    let resp = client
        .post(format!("{}/orders", api_base_url()))
        .bearer_auth(&identity.access)
        .json(&json!({ "item": item, "amount": amount }))
        .send()
        .await
        .expect("Failed to place order");

    assert_eq!(
        resp.status().as_u16(),
        201,
        "Order placement failed: {}",
        resp.text().await.unwrap_or_default()
    );

    resp.json().await.expect("Failed to parse order response")
}
