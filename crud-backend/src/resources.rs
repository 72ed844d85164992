//! Static descriptions of the Kubernetes resource types the web apps operate on.

use kube::api::ApiResource;
use kube::core::GroupVersionKind;

/// Describes one resource type: the tuple used for both access reviews and
/// API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceDescriptor {
    /// API group, empty for the core group.
    pub group: &'static str,
    pub version: &'static str,
    /// Plural resource name as used in URLs and access reviews.
    pub plural: &'static str,
    pub kind: &'static str,
    /// Whether objects of this type live in a namespace.
    pub namespaced: bool,
}

impl ResourceDescriptor {
    /// Returns the `apiVersion` string, `version` alone for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_string()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Returns the kind of the list wrapping objects of this type.
    pub fn list_kind(&self) -> String {
        format!("{}List", self.kind)
    }

    /// Builds the [`ApiResource`] needed to address this type dynamically.
    pub fn api_resource(&self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(self.group, self.version, self.kind);
        ApiResource::from_gvk_with_plural(&gvk, self.plural)
    }
}

pub const PERSISTENT_VOLUME_CLAIMS: ResourceDescriptor = ResourceDescriptor {
    group: "",
    version: "v1",
    plural: "persistentvolumeclaims",
    kind: "PersistentVolumeClaim",
    namespaced: true,
};

pub const PODS: ResourceDescriptor = ResourceDescriptor {
    group: "",
    version: "v1",
    plural: "pods",
    kind: "Pod",
    namespaced: true,
};

pub const EVENTS: ResourceDescriptor = ResourceDescriptor {
    group: "",
    version: "v1",
    plural: "events",
    kind: "Event",
    namespaced: true,
};

pub const NAMESPACES: ResourceDescriptor = ResourceDescriptor {
    group: "",
    version: "v1",
    plural: "namespaces",
    kind: "Namespace",
    namespaced: false,
};

pub const STORAGE_CLASSES: ResourceDescriptor = ResourceDescriptor {
    group: "storage.k8s.io",
    version: "v1",
    plural: "storageclasses",
    kind: "StorageClass",
    namespaced: false,
};

pub const TENSORBOARDS: ResourceDescriptor = ResourceDescriptor {
    group: "tensorboard.kubeflow.org",
    version: "v1alpha1",
    plural: "tensorboards",
    kind: "Tensorboard",
    namespaced: true,
};

pub const POD_DEFAULTS: ResourceDescriptor = ResourceDescriptor {
    group: "kubeflow.org",
    version: "v1alpha1",
    plural: "poddefaults",
    kind: "PodDefault",
    namespaced: true,
};

pub const PVC_VIEWERS: ResourceDescriptor = ResourceDescriptor {
    group: "kubeflow.org",
    version: "v1alpha1",
    plural: "pvcviewers",
    kind: "PVCViewer",
    namespaced: true,
};
