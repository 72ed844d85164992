use crud_telemetry::init_test_tracing;

use crate::support::test_app::spawn_test_app;

mod support;

#[tokio::test(flavor = "multi_thread")]
async fn liveness_returns_alive() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app
        .get("/healthz/liveness")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "alive");
}

#[tokio::test(flavor = "multi_thread")]
async fn readiness_returns_ready() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app
        .get("/healthz/readiness")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ready");
}

#[tokio::test(flavor = "multi_thread")]
async fn openapi_document_lists_shared_routes() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app
        .get("/api-docs/openapi.json")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert!(response.status().is_success());
    let document: serde_json::Value = response.json().await.unwrap();
    assert!(document["paths"]["/api/namespaces"].is_object());
    assert!(document["paths"]["/healthz/liveness"].is_object());
}
