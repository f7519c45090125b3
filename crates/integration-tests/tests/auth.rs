//! Integration tests for registration, login, and token handling.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p duka-api) with `DUKA_SMS_MODE=mock`
//!
//! Run with: cargo test -p duka-integration-tests -- --ignored

use duka_integration_tests::{
    api_base_url, http_client, register_identity, unique_phone, unique_suffix,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_returns_user_and_tokens() {
    let client = http_client();
    let base_url = api_base_url();

    let suffix = unique_suffix();
    let username = format!("it_{suffix}");

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "Secur3Pass!",
            "password2": "Secur3Pass!",
            "phone": unique_phone(),
            "code": suffix.to_uppercase(),
        }))
        .send()
        .await
        .expect("Failed to register");

    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["username"], username.as_str());
    assert!(body["user"]["id"].is_number());
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_duplicate_username_conflicts() {
    let client = http_client();
    let base_url = api_base_url();

    let first = register_identity(&client).await;

    // Same username, fresh phone and code
    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "username": first.username,
            "email": "other@example.com",
            "password": "Secur3Pass!",
            "password2": "Secur3Pass!",
            "phone": unique_phone(),
            "code": unique_suffix().to_uppercase(),
        }))
        .send()
        .await
        .expect("Failed to send duplicate registration");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_duplicate_code_conflicts() {
    let client = http_client();
    let base_url = api_base_url();

    let first = register_identity(&client).await;

    let suffix = unique_suffix();
    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "username": format!("it_{suffix}"),
            "email": format!("it_{suffix}@example.com"),
            "password": "Secur3Pass!",
            "password2": "Secur3Pass!",
            "phone": unique_phone(),
            "code": first.code,
        }))
        .send()
        .await
        .expect("Failed to send duplicate-code registration");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_concurrent_registrations_same_code_one_winner() {
    let client = http_client();
    let base_url = api_base_url();

    let code = unique_suffix().to_uppercase();
    let register = |username: String| {
        let client = client.clone();
        let base_url = base_url.clone();
        let code = code.clone();
        async move {
            client
                .post(format!("{base_url}/auth/register"))
                .json(&json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "Secur3Pass!",
                    "password2": "Secur3Pass!",
                    "phone": unique_phone(),
                    "code": code,
                }))
                .send()
                .await
                .expect("Failed to register")
                .status()
        }
    };

    let (a, b) = tokio::join!(
        register(format!("it_{}", unique_suffix())),
        register(format!("it_{}", unique_suffix())),
    );

    // Exactly one winner; the loser sees a conflict, never a 500
    let statuses = [a.as_u16(), b.as_u16()];
    assert!(statuses.contains(&201), "statuses: {statuses:?}");
    assert!(statuses.contains(&409), "statuses: {statuses:?}");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_validation_errors_are_per_field() {
    let client = http_client();
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "username": "",
            "email": "not-an-email",
            "password": "short",
            "password2": "different",
            "phone": "not a phone",
            "code": "way-too-long-code",
        }))
        .send()
        .await
        .expect("Failed to send invalid registration");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert!(body["username"].is_array());
    assert!(body["email"].is_array());
    assert!(body["password"].is_array());
    assert!(body["password2"].is_array());
    assert!(body["phone"].is_array());
    assert!(body["code"].is_array());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_rejects_numeric_password() {
    let client = http_client();
    let base_url = api_base_url();

    let suffix = unique_suffix();
    let resp = client
        .post(format!("{base_url}/auth/register"))
        .json(&json!({
            "username": format!("it_{suffix}"),
            "email": format!("it_{suffix}@example.com"),
            "password": "1234567890",
            "password2": "1234567890",
            "phone": unique_phone(),
            "code": suffix.to_uppercase(),
        }))
        .send()
        .await
        .expect("Failed to send numeric-password registration");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert!(body["password"].is_array());
}

// ============================================================================
// Login & Token Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_returns_token_pair() {
    let client = http_client();
    let base_url = api_base_url();

    let identity = register_identity(&client).await;

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({
            "username": identity.username,
            "password": identity.password,
        }))
        .send()
        .await
        .expect("Failed to log in");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_wrong_password_is_unauthorized() {
    let client = http_client();
    let base_url = api_base_url();

    let identity = register_identity(&client).await;

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .json(&json!({
            "username": identity.username,
            "password": "wrong-password",
        }))
        .send()
        .await
        .expect("Failed to send bad login");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"], "authentication required");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_refresh_mints_new_access_token() {
    let client = http_client();
    let base_url = api_base_url();

    let identity = register_identity(&client).await;

    let resp = client
        .post(format!("{base_url}/auth/token/refresh"))
        .json(&json!({ "refresh": identity.refresh }))
        .send()
        .await
        .expect("Failed to refresh token");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    let access = body["access"].as_str().expect("missing access token");

    // The minted token must be usable against a protected resource
    let resp = client
        .get(format!("{base_url}/auth/me"))
        .bearer_auth(access)
        .send()
        .await
        .expect("Failed to call /auth/me");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_refresh_rejects_access_token() {
    let client = http_client();
    let base_url = api_base_url();

    let identity = register_identity(&client).await;

    // Access tokens must not be accepted where a refresh token is expected
    let resp = client
        .post(format!("{base_url}/auth/token/refresh"))
        .json(&json!({ "refresh": identity.access }))
        .send()
        .await
        .expect("Failed to send access token as refresh");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Profile Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_me_returns_linked_customer() {
    let client = http_client();
    let base_url = api_base_url();

    let identity = register_identity(&client).await;

    let resp = client
        .get(format!("{base_url}/auth/me"))
        .bearer_auth(&identity.access)
        .send()
        .await
        .expect("Failed to call /auth/me");

    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], identity.username.as_str());
    assert_eq!(body["customer"]["phone"], identity.phone.as_str());
    assert_eq!(body["customer"]["code"], identity.code.as_str());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_protected_routes_require_bearer_token() {
    let client = http_client();
    let base_url = api_base_url();

    for path in ["/auth/me", "/orders", "/customers"] {
        let resp = client
            .get(format!("{base_url}{path}"))
            .send()
            .await
            .expect("Failed to call protected route");

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "path: {path}");
        let body: Value = resp.json().await.expect("Failed to parse response");
        assert_eq!(body["detail"], "authentication required");
    }
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_garbage_token_is_unauthorized() {
    let client = http_client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/auth/me"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .expect("Failed to call /auth/me");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
