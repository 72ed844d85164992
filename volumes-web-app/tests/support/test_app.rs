#![allow(dead_code)]

use std::sync::Arc;

use crud_backend::k8s::fake::FakeK8sClient;
use crud_backend::test_utils::{TestApp, spawn_app};
use crud_config::Settings;
use reqwest::RequestBuilder;
use serde_json::{Value, json};
use volumes_web_app::flavor::VolumesFlavor;

pub const USER_HEADER: &str = "kubeflow-userid";
pub const NAMESPACE: &str = "kubeflow-user";

pub struct VolumesApp {
    pub app: TestApp,
    pub api_client: reqwest::Client,
    pub user: Option<String>,
}

impl VolumesApp {
    pub fn k8s(&self) -> &FakeK8sClient {
        &self.app.k8s
    }

    fn with_user(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.user {
            Some(user) => request.header(USER_HEADER, user),
            None => request,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.app.address)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.with_user(self.api_client.get(self.url(path)))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn read_all_pvcs(&self) -> reqwest::Response {
        self.get(&format!("/api/namespaces/{NAMESPACE}/pvcs")).await
    }

    pub async fn create_pvc(&self, form: &Value, dry_run: bool) -> reqwest::Response {
        let mut url = self.url(&format!("/api/namespaces/{NAMESPACE}/pvcs"));
        if dry_run {
            url.push_str("?dry_run=true");
        }
        self.with_user(self.api_client.post(url))
            .json(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn patch_pvc(&self, name: &str, patch: &Value) -> reqwest::Response {
        self.with_user(
            self.api_client
                .patch(self.url(&format!("/api/namespaces/{NAMESPACE}/pvcs/{name}"))),
        )
        .json(patch)
        .send()
        .await
        .expect("Failed to execute request.")
    }

    pub async fn delete_pvc(&self, name: &str) -> reqwest::Response {
        self.with_user(
            self.api_client
                .delete(self.url(&format!("/api/namespaces/{NAMESPACE}/pvcs/{name}"))),
        )
        .send()
        .await
        .expect("Failed to execute request.")
    }
}

pub async fn spawn_test_app() -> VolumesApp {
    spawn_test_app_with(
        Settings::for_tests("volumes-tests"),
        FakeK8sClient::new(),
        VolumesFlavor::Default,
        None,
    )
    .await
}

pub async fn spawn_test_app_with(
    settings: Settings,
    k8s: FakeK8sClient,
    flavor: VolumesFlavor,
    user: Option<&str>,
) -> VolumesApp {
    let app = spawn_app(settings, Arc::new(k8s), flavor.routes()).await;

    VolumesApp {
        app,
        api_client: reqwest::Client::new(),
        user: user.map(str::to_string),
    }
}

pub fn secured_settings() -> Settings {
    let mut settings = Settings::for_tests("volumes-tests");
    settings.disable_auth = false;
    settings
}

pub fn pvc(name: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "PersistentVolumeClaim",
        "metadata": { "name": name, "namespace": NAMESPACE },
        "spec": {
            "accessModes": ["ReadWriteOnce"],
            "resources": { "requests": { "storage": "1Gi" } },
        },
        "status": { "phase": "Bound" },
    })
}

pub fn pod(name: &str, claim: &str, labels: Value) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": NAMESPACE, "labels": labels },
        "spec": {
            "volumes": [
                { "name": "data", "persistentVolumeClaim": { "claimName": claim } },
            ],
        },
    })
}

pub fn viewer(name: &str) -> Value {
    json!({
        "apiVersion": "kubeflow.org/v1alpha1",
        "kind": "PVCViewer",
        "metadata": { "name": name, "namespace": NAMESPACE },
        "spec": { "pvc": name },
    })
}

pub fn form(name: &str) -> Value {
    json!({
        "name": name,
        "size": "5Gi",
        "mode": "ReadWriteOnce",
        "class": "standard",
    })
}
