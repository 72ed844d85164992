use crud_telemetry::init_test_tracing;

use crate::support::test_app::spawn_test_app;

mod support;

#[tokio::test(flavor = "multi_thread")]
async fn metrics_endpoint_returns_200() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app
        .get("/metrics")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert!(response.status().is_success());
}

#[tokio::test(flavor = "multi_thread")]
async fn kubernetes_calls_are_counted() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app().await;
    app.get("/api/namespaces")
        .send()
        .await
        .expect("Failed to execute request.");

    // Act
    let response = app
        .get("/metrics")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    let body = response.text().await.unwrap();
    assert!(body.contains("crud_k8s_requests_total"));
    assert!(body.contains("crud_authorization_checks_total"));
}
