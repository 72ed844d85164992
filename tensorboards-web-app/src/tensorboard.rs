use crud_backend::resources::TENSORBOARDS;
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

/// Form submitted by the UI to create a Tensorboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewTensorboardForm {
    #[schema(example = "training-logs", required = true)]
    pub name: String,
    /// Location of the logs, e.g. `pvc://<claim>/<path>` or `gs://<bucket>/<path>`.
    #[schema(example = "pvc://workspace/logs", required = true)]
    pub logspath: String,
}

impl NewTensorboardForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("the tensorboard name must not be empty".to_string());
        }
        if self.logspath.trim().is_empty() {
            return Err("the logs path must not be empty".to_string());
        }

        Ok(())
    }

    pub fn to_tensorboard(&self) -> Result<DynamicObject, serde_json::Error> {
        serde_json::from_value(json!({
            "apiVersion": TENSORBOARDS.api_version(),
            "kind": TENSORBOARDS.kind,
            "metadata": { "name": self.name },
            "spec": { "logspath": self.logspath },
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TensorboardState {
    Ready,
    Waiting,
}

/// Row of the tensorboards table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TensorboardSummary {
    #[schema(example = "training-logs")]
    pub name: String,
    #[schema(example = "kubeflow-user")]
    pub namespace: String,
    #[schema(example = "pvc://workspace/logs")]
    pub logspath: String,
    pub creation_timestamp: Option<String>,
    pub status: TensorboardState,
}

/// Summarizes a Tensorboard. It is ready once its server has a ready replica.
pub fn summarize(tensorboard: &DynamicObject) -> TensorboardSummary {
    let ready_replicas = tensorboard
        .data
        .pointer("/status/readyReplicas")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    TensorboardSummary {
        name: tensorboard.metadata.name.clone().unwrap_or_default(),
        namespace: tensorboard.metadata.namespace.clone().unwrap_or_default(),
        logspath: tensorboard
            .data
            .pointer("/spec/logspath")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        creation_timestamp: tensorboard
            .metadata
            .creation_timestamp
            .as_ref()
            .map(|time| time.0.to_rfc3339()),
        status: if ready_replicas >= 1 {
            TensorboardState::Ready
        } else {
            TensorboardState::Waiting
        },
    }
}

/// Configuration a user can attach to pods, as shown in the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PodDefaultSummary {
    /// Label selecting the PodDefault.
    #[schema(example = "access-ml-pipeline")]
    pub label: String,
    #[schema(example = "Allow access to Kubeflow Pipelines")]
    pub desc: String,
}

/// Summarizes a PodDefault: its first selector label and its description,
/// which falls back to its name. Returns `None` without a selector label.
pub fn summarize_pod_default(pod_default: &DynamicObject) -> Option<PodDefaultSummary> {
    let label = pod_default
        .data
        .pointer("/spec/selector/matchLabels")
        .and_then(Value::as_object)
        .and_then(|labels| labels.keys().next().cloned())?;

    let desc = pod_default
        .data
        .pointer("/spec/desc")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| pod_default.metadata.name.clone())
        .unwrap_or_default();

    Some(PodDefaultSummary { label, desc })
}
