//! Liveness and readiness probe tests.

use duka_integration_tests::{api_base_url, http_client};
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running API server"]
async fn test_health() {
    let resp = http_client()
        .get(format!("{}/health", api_base_url()))
        .send()
        .await
        .expect("Failed to call /health");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_health_ready() {
    let resp = http_client()
        .get(format!("{}/health/ready", api_base_url()))
        .send()
        .await
        .expect("Failed to call /health/ready");

    assert_eq!(resp.status(), StatusCode::OK);
}
