#![allow(dead_code)]

use std::sync::Arc;

use crud_backend::k8s::fake::FakeK8sClient;
use crud_backend::test_utils::{TestApp, shared_routes_only, spawn_app};
use crud_config::Settings;
use reqwest::{Method, RequestBuilder};

pub const USER_HEADER: &str = "kubeflow-userid";

pub struct SharedApp {
    pub app: TestApp,
    pub api_client: reqwest::Client,
}

impl SharedApp {
    pub fn k8s(&self) -> &FakeK8sClient {
        &self.app.k8s
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.api_client.get(format!("{}{path}", self.app.address))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.api_client
            .request(method, format!("{}{path}", self.app.address))
    }

    pub fn get_as(&self, user: &str, path: &str) -> RequestBuilder {
        self.get(path).header(USER_HEADER, user)
    }
}

/// Spawns an app serving only the shared routes with authorization disabled.
pub async fn spawn_test_app() -> SharedApp {
    spawn_test_app_with(Settings::for_tests("crud-backend-tests"), FakeK8sClient::new()).await
}

pub async fn spawn_test_app_with(settings: Settings, k8s: FakeK8sClient) -> SharedApp {
    let app = spawn_app(settings, Arc::new(k8s), shared_routes_only()).await;

    SharedApp {
        app,
        api_client: reqwest::Client::new(),
    }
}

/// Settings with authorization enabled.
pub fn secured_settings() -> Settings {
    let mut settings = Settings::for_tests("crud-backend-tests");
    settings.disable_auth = false;
    settings
}
