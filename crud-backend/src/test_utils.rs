//! Helpers to run a web app against the in-memory cluster in tests.

use std::{io, net::TcpListener, sync::Arc};

use actix_web::web;
use crud_config::Settings;
use tokio::task::JoinHandle;
use utoipa::openapi::OpenApiBuilder;

use crate::k8s::fake::FakeK8sClient;
use crate::startup::{AppRoutes, run};

/// A running server bound to a random local port.
pub struct TestApp {
    pub address: String,
    pub k8s: Arc<FakeK8sClient>,
    server_handle: JoinHandle<io::Result<()>>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

fn no_routes(_: &mut web::ServiceConfig) {}

/// Routes of an app that only serves the shared endpoints.
pub fn shared_routes_only() -> AppRoutes {
    AppRoutes {
        configure: no_routes,
        openapi: OpenApiBuilder::new().build(),
    }
}

/// Starts the server with the given settings and routes on top of `k8s`.
pub async fn spawn_app(settings: Settings, k8s: Arc<FakeK8sClient>, routes: AppRoutes) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener
        .local_addr()
        .expect("failed to read the local address")
        .port();

    let server = run(settings, listener, k8s.clone(), routes)
        .await
        .expect("failed to start the server");
    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{port}"),
        k8s,
        server_handle,
    }
}
