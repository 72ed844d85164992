//! Conversions between PVC objects and what the Volumes UI sends and shows.

use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

/// Label set by the PVC viewer controller on the pods it runs.
pub const VIEWER_POD_LABEL: (&str, &str) = ("app.kubernetes.io/name", "pvcviewer");

/// Storage class value the UI sends when the cluster default should be used.
const DEFAULT_CLASS_PLACEHOLDER: &str = "{none}";

const ACCESS_MODES: [&str; 4] = [
    "ReadWriteOnce",
    "ReadOnlyMany",
    "ReadWriteMany",
    "ReadWriteOncePod",
];

/// Form submitted by the UI to create a volume.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewPvcForm {
    #[schema(example = "workspace-data", required = true)]
    pub name: String,
    #[schema(example = "10Gi", required = true)]
    pub size: String,
    #[schema(example = "ReadWriteOnce", required = true)]
    pub mode: String,
    /// Storage class, the cluster default when absent.
    #[schema(example = "standard")]
    pub class: Option<String>,
    /// Volume snapshot to restore the volume from.
    #[schema(example = "workspace-data-snapshot")]
    pub snapshot: Option<String>,
}

impl NewPvcForm {
    /// Checks the fields the API server would otherwise reject with a less
    /// helpful message.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("the volume name must not be empty".to_string());
        }
        if self.size.trim().is_empty() {
            return Err("the volume size must not be empty".to_string());
        }
        if !ACCESS_MODES.contains(&self.mode.as_str()) {
            return Err(format!(
                "unknown access mode '{}', choose one of: {}",
                self.mode,
                ACCESS_MODES.join(", ")
            ));
        }

        Ok(())
    }

    /// Builds the PVC object described by the form.
    pub fn to_pvc(&self) -> Result<DynamicObject, serde_json::Error> {
        let mut spec = json!({
            "accessModes": [self.mode],
            "resources": { "requests": { "storage": self.size } },
        });

        if let Some(class) = self
            .class
            .as_deref()
            .filter(|class| !class.is_empty() && *class != DEFAULT_CLASS_PLACEHOLDER)
        {
            spec["storageClassName"] = json!(class);
        }

        if let Some(snapshot) = self.snapshot.as_deref().filter(|s| !s.is_empty()) {
            spec["dataSource"] = json!({
                "apiGroup": "snapshot.storage.k8s.io",
                "kind": "VolumeSnapshot",
                "name": snapshot,
            });
        }

        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "PersistentVolumeClaim",
            "metadata": { "name": self.name },
            "spec": spec,
        }))
    }
}

/// State of the viewer attached to a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewerState {
    Uninitialized,
    Waiting,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ViewerStatus {
    pub status: ViewerState,
    pub url: Option<String>,
}

/// Row of the volumes table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PvcSummary {
    #[schema(example = "workspace-data")]
    pub name: String,
    #[schema(example = "kubeflow-user")]
    pub namespace: String,
    #[schema(example = "Bound")]
    pub status: String,
    #[schema(example = "2024-01-31T10:00:00Z")]
    pub creation_timestamp: Option<String>,
    #[schema(example = "10Gi")]
    pub capacity: Option<String>,
    #[schema(example = json!(["ReadWriteOnce"]))]
    pub modes: Vec<String>,
    #[schema(example = "standard")]
    pub class: Option<String>,
    /// Names of the pods mounting the volume, viewer pods included.
    #[schema(example = json!(["notebook-0"]))]
    pub pods: Vec<String>,
    pub viewer: ViewerStatus,
}

fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).map(str::to_string)
}

/// Returns whether `pod` mounts the claim named `pvc_name`.
pub fn mounts_pvc(pod: &DynamicObject, pvc_name: &str) -> bool {
    pod.data
        .pointer("/spec/volumes")
        .and_then(Value::as_array)
        .is_some_and(|volumes| {
            volumes.iter().any(|volume| {
                volume.pointer("/persistentVolumeClaim/claimName").and_then(Value::as_str)
                    == Some(pvc_name)
            })
        })
}

/// Returns whether `pod` was started by the PVC viewer controller.
pub fn is_viewer_pod(pod: &DynamicObject) -> bool {
    let (key, value) = VIEWER_POD_LABEL;
    pod.metadata
        .labels
        .as_ref()
        .and_then(|labels| labels.get(key))
        .is_some_and(|label| label == value)
}

/// Returns the pods mounting the claim named `pvc_name`, in the given order.
pub fn pods_mounting<'a>(pvc_name: &str, pods: &'a [DynamicObject]) -> Vec<&'a DynamicObject> {
    pods.iter().filter(|pod| mounts_pvc(pod, pvc_name)).collect()
}

fn viewer_status(viewer: Option<&DynamicObject>) -> ViewerStatus {
    let Some(viewer) = viewer else {
        return ViewerStatus {
            status: ViewerState::Uninitialized,
            url: None,
        };
    };

    let ready = viewer
        .data
        .pointer("/status/ready")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    ViewerStatus {
        status: if ready {
            ViewerState::Ready
        } else {
            ViewerState::Waiting
        },
        url: string_at(&viewer.data, "/status/url"),
    }
}

/// Summarizes a PVC for the volumes table.
///
/// `pods` and `viewers` are all the pods and PVC viewers of the namespace.
/// The viewer of a volume carries the volume's name.
pub fn summarize(pvc: &DynamicObject, pods: &[DynamicObject], viewers: &[DynamicObject]) -> PvcSummary {
    let name = pvc.metadata.name.clone().unwrap_or_default();
    let viewer = viewers
        .iter()
        .find(|viewer| viewer.metadata.name.as_deref() == Some(name.as_str()));

    let modes = pvc
        .data
        .pointer("/spec/accessModes")
        .and_then(Value::as_array)
        .map(|modes| {
            modes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let capacity = string_at(&pvc.data, "/status/capacity/storage")
        .or_else(|| string_at(&pvc.data, "/spec/resources/requests/storage"));

    PvcSummary {
        pods: pods_mounting(&name, pods)
            .into_iter()
            .filter_map(|pod| pod.metadata.name.clone())
            .collect(),
        namespace: pvc.metadata.namespace.clone().unwrap_or_default(),
        status: string_at(&pvc.data, "/status/phase").unwrap_or_else(|| "Pending".to_string()),
        creation_timestamp: pvc
            .metadata
            .creation_timestamp
            .as_ref()
            .map(|time| time.0.to_rfc3339()),
        capacity,
        modes,
        class: string_at(&pvc.data, "/spec/storageClassName"),
        viewer: viewer_status(viewer),
        name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(value: Value) -> DynamicObject {
        serde_json::from_value(value).unwrap()
    }

    fn form() -> NewPvcForm {
        NewPvcForm {
            name: "data".to_string(),
            size: "5Gi".to_string(),
            mode: "ReadWriteOnce".to_string(),
            class: None,
            snapshot: None,
        }
    }

    fn pod(name: &str, claim: &str, viewer: bool) -> DynamicObject {
        let labels = if viewer {
            json!({"app.kubernetes.io/name": "pvcviewer"})
        } else {
            json!({})
        };
        object(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": { "name": name, "namespace": "ns", "labels": labels },
            "spec": {
                "volumes": [
                    { "name": "cache", "emptyDir": {} },
                    { "name": "data", "persistentVolumeClaim": { "claimName": claim } },
                ],
            },
        }))
    }

    #[test]
    fn form_builds_a_claim_with_the_default_class() {
        let pvc = form().to_pvc().unwrap();

        assert_eq!(pvc.metadata.name.as_deref(), Some("data"));
        assert_eq!(pvc.types.as_ref().unwrap().kind, "PersistentVolumeClaim");
        assert_eq!(pvc.data["spec"]["accessModes"], json!(["ReadWriteOnce"]));
        assert_eq!(pvc.data["spec"]["resources"]["requests"]["storage"], "5Gi");
        assert!(pvc.data["spec"].get("storageClassName").is_none());
        assert!(pvc.data["spec"].get("dataSource").is_none());
    }

    #[test]
    fn form_sets_class_and_snapshot() {
        let mut form = form();
        form.class = Some("fast".to_string());
        form.snapshot = Some("data-snap".to_string());

        let pvc = form.to_pvc().unwrap();

        assert_eq!(pvc.data["spec"]["storageClassName"], "fast");
        assert_eq!(pvc.data["spec"]["dataSource"]["kind"], "VolumeSnapshot");
        assert_eq!(pvc.data["spec"]["dataSource"]["name"], "data-snap");
    }

    #[test]
    fn placeholder_class_means_cluster_default() {
        let mut form = form();
        form.class = Some("{none}".to_string());

        let pvc = form.to_pvc().unwrap();

        assert!(pvc.data["spec"].get("storageClassName").is_none());
    }

    #[test]
    fn invalid_forms_are_rejected() {
        let mut bad_mode = form();
        bad_mode.mode = "ReadWriteSometimes".to_string();
        let mut no_size = form();
        no_size.size = String::new();

        assert!(form().validate().is_ok());
        assert!(bad_mode.validate().unwrap_err().contains("ReadWriteSometimes"));
        assert!(no_size.validate().is_err());
    }

    #[test]
    fn only_pods_mounting_the_claim_are_listed() {
        let pods = [pod("a", "data", false), pod("b", "other", false), pod("c", "data", true)];

        let names: Vec<_> = pods_mounting("data", &pods)
            .into_iter()
            .filter_map(|pod| pod.metadata.name.as_deref())
            .collect();

        assert_eq!(names, ["a", "c"]);
        assert!(is_viewer_pod(&pods[2]));
        assert!(!is_viewer_pod(&pods[0]));
    }

    #[test]
    fn summary_reports_status_capacity_and_viewer() {
        let pvc = object(json!({
            "apiVersion": "v1",
            "kind": "PersistentVolumeClaim",
            "metadata": {
                "name": "data",
                "namespace": "ns",
                "creationTimestamp": "2024-01-31T10:00:00Z",
            },
            "spec": {
                "accessModes": ["ReadWriteOnce"],
                "storageClassName": "standard",
                "resources": { "requests": { "storage": "5Gi" } },
            },
            "status": { "phase": "Bound", "capacity": { "storage": "8Gi" } },
        }));
        let viewer = object(json!({
            "apiVersion": "kubeflow.org/v1alpha1",
            "kind": "PVCViewer",
            "metadata": { "name": "data", "namespace": "ns" },
            "status": { "ready": true, "url": "/pvcviewers/ns/data/" },
        }));

        let summary = summarize(&pvc, &[pod("nb-0", "data", false)], &[viewer]);

        assert_eq!(summary.name, "data");
        assert_eq!(summary.status, "Bound");
        assert_eq!(summary.capacity.as_deref(), Some("8Gi"));
        assert_eq!(summary.class.as_deref(), Some("standard"));
        assert_eq!(summary.modes, ["ReadWriteOnce"]);
        assert_eq!(summary.pods, ["nb-0"]);
        assert_eq!(summary.creation_timestamp.as_deref(), Some("2024-01-31T10:00:00+00:00"));
        assert_eq!(summary.viewer.status, ViewerState::Ready);
        assert_eq!(summary.viewer.url.as_deref(), Some("/pvcviewers/ns/data/"));
    }

    #[test]
    fn summary_without_viewer_is_uninitialized() {
        let pvc = object(json!({
            "apiVersion": "v1",
            "kind": "PersistentVolumeClaim",
            "metadata": { "name": "data", "namespace": "ns" },
            "spec": { "resources": { "requests": { "storage": "5Gi" } } },
        }));

        let summary = summarize(&pvc, &[], &[]);

        assert_eq!(summary.status, "Pending");
        assert_eq!(summary.capacity.as_deref(), Some("5Gi"));
        assert_eq!(summary.viewer.status, ViewerState::Uninitialized);
        assert!(summary.pods.is_empty());
    }
}
