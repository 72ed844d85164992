use crud_backend::k8s::fake::FakeK8sClient;
use crud_config::Settings;
use crud_telemetry::init_test_tracing;
use reqwest::StatusCode;
use serde_json::json;

use crate::support::test_app::{spawn_test_app, spawn_test_app_with};

mod support;

#[tokio::test(flavor = "multi_thread")]
async fn unknown_route_returns_the_error_envelope() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app
        .get("/api/unknown")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": false,
            "status": 404,
            "log": "The requested URL /api/unknown was not found on the server.",
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn paths_outside_the_prefix_return_the_error_envelope() {
    init_test_tracing();
    // Arrange
    let mut settings = Settings::for_tests("crud-backend-tests");
    settings.prefix = "/volumes".to_string();
    let app = spawn_test_app_with(settings, FakeK8sClient::new()).await;

    // Act
    let outside = app
        .get("/healthz/liveness")
        .send()
        .await
        .expect("Failed to execute request.");
    let inside = app
        .get("/volumes/api/unknown")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    for response in [outside, inside] {
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], 404);
    }
}
