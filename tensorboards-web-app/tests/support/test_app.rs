#![allow(dead_code)]

use std::sync::Arc;

use crud_backend::k8s::fake::FakeK8sClient;
use crud_backend::test_utils::{TestApp, spawn_app};
use crud_config::Settings;
use serde_json::Value;
use tensorboards_web_app::flavor::TensorboardsFlavor;

pub const USER_HEADER: &str = "kubeflow-userid";
pub const NAMESPACE: &str = "kubeflow-user";

pub struct TensorboardsApp {
    pub app: TestApp,
    pub api_client: reqwest::Client,
}

impl TensorboardsApp {
    pub fn k8s(&self) -> &FakeK8sClient {
        &self.app.k8s
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.app.address)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.api_client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn read_all_tensorboards(&self) -> reqwest::Response {
        self.get(&format!("/api/namespaces/{NAMESPACE}/tensorboards"))
            .await
    }

    pub async fn create_tensorboard(&self, form: &Value) -> reqwest::Response {
        self.api_client
            .post(self.url(&format!("/api/namespaces/{NAMESPACE}/tensorboards")))
            .json(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_tensorboard(&self, name: &str) -> reqwest::Response {
        self.api_client
            .delete(self.url(&format!(
                "/api/namespaces/{NAMESPACE}/tensorboards/{name}"
            )))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub async fn spawn_test_app() -> TensorboardsApp {
    spawn_test_app_with(Settings::for_tests("tensorboards-tests"), FakeK8sClient::new()).await
}

pub async fn spawn_test_app_with(settings: Settings, k8s: FakeK8sClient) -> TensorboardsApp {
    let app = spawn_app(settings, Arc::new(k8s), TensorboardsFlavor::Default.routes()).await;

    TensorboardsApp {
        app,
        api_client: reqwest::Client::new(),
    }
}
