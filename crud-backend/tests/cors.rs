use crud_backend::k8s::fake::FakeK8sClient;
use crud_config::{BackendMode, Settings};
use crud_telemetry::init_test_tracing;
use reqwest::Method;

use crate::support::test_app::{USER_HEADER, spawn_test_app, spawn_test_app_with};

mod support;

const FRONTEND_ORIGIN: &str = "http://localhost:4200";

#[tokio::test(flavor = "multi_thread")]
async fn preflight_is_accepted_in_development() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app
        .request(Method::OPTIONS, "/api/namespaces")
        .header("Origin", FRONTEND_ORIGIN)
        .header("Access-Control-Request-Method", "DELETE")
        .header("Access-Control-Request-Headers", format!("{USER_HEADER},content-type"))
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert!(response.status().is_success());
    let allowed_origin = response
        .headers()
        .get("access-control-allow-origin")
        .and_then(|value| value.to_str().ok());
    assert_eq!(allowed_origin, Some(FRONTEND_ORIGIN));
}

#[tokio::test(flavor = "multi_thread")]
async fn cross_origin_requests_are_allowed_in_development() {
    init_test_tracing();
    // Arrange
    let app = spawn_test_app().await;

    // Act
    let response = app
        .get("/api/namespaces")
        .header("Origin", FRONTEND_ORIGIN)
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test(flavor = "multi_thread")]
async fn production_does_not_allow_other_origins() {
    init_test_tracing();
    // Arrange
    let mut settings = Settings::for_tests("crud-backend-tests");
    settings.backend_mode = BackendMode::Production;
    let app = spawn_test_app_with(settings, FakeK8sClient::new()).await;

    // Act
    let response = app
        .request(Method::OPTIONS, "/api/namespaces")
        .header("Origin", FRONTEND_ORIGIN)
        .header("Access-Control-Request-Method", "GET")
        .send()
        .await
        .expect("Failed to execute request.");

    // Assert
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}
