use async_trait::async_trait;
use k8s_openapi::api::authorization::v1::SubjectAccessReview;
use kube::api::DynamicObject;
use serde::Serialize;
use thiserror::Error;

use crate::resources::ResourceDescriptor;

/// Errors emitted by the Kubernetes integration.
///
/// Answers of the API server that the operation layer treats specially
/// (missing objects and conflicts) get their own variants, everything else is
/// kept with its original status code or source error.
#[derive(Debug, Error)]
pub enum K8sError {
    /// The addressed object does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The object already exists or was modified concurrently.
    #[error("{0}")]
    Conflict(String),

    /// The API server rejected the request with another status.
    #[error("the kubernetes api answered with status {code}: {message}")]
    Api { code: u16, message: String },

    /// A serialization or deserialization error while building or parsing
    /// Kubernetes resources.
    #[error("an error occurred in serde when dealing with K8s: {0}")]
    Serde(#[from] serde_json::Error),

    /// Any other error returned by the [`kube`] client.
    #[error("an error occurred with kube when dealing with K8s: {0}")]
    Kube(kube::Error),
}

impl From<kube::Error> for K8sError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => match response.code {
                404 => K8sError::NotFound(response.message),
                409 => K8sError::Conflict(response.message),
                code => K8sError::Api {
                    code,
                    message: response.message,
                },
            },
            err => K8sError::Kube(err),
        }
    }
}

/// Field selector restricting a list call.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub field_selector: Option<String>,
}

impl ListOptions {
    pub fn fields(mut self, selector: impl Into<String>) -> Self {
        self.field_selector = Some(selector.into());
        self
    }
}

/// Result of a delete call.
///
/// Objects with finalizers are returned while their deletion is pending,
/// otherwise the API server answers with a status object.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Deletion {
    Pending(DynamicObject),
    Finished(serde_json::Value),
}

/// Client interface describing the Kubernetes operations used by the web apps.
///
/// Objects are handled as [`DynamicObject`]s addressed by a
/// [`ResourceDescriptor`], so core and custom resources share the same calls.
/// Implementations perform no authorization of their own, callers are expected
/// to go through [`crate::ops::ResourceOps`].
#[async_trait]
pub trait K8sClient: Send + Sync {
    /// Lists objects of a type, in a namespace or cluster-wide when `namespace`
    /// is `None`. Items are returned in the order the API server sent them.
    async fn list(
        &self,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        options: &ListOptions,
    ) -> Result<Vec<DynamicObject>, K8sError>;

    /// Retrieves a single namespaced object.
    async fn get(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, K8sError>;

    /// Creates an object. With `dry_run` the request is sent with
    /// `dryRun=All` and nothing is persisted.
    async fn create(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        object: &DynamicObject,
        dry_run: bool,
    ) -> Result<DynamicObject, K8sError>;

    /// Deletes a namespaced object.
    async fn delete(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        name: &str,
    ) -> Result<Deletion, K8sError>;

    /// Applies a JSON merge patch to a namespaced object.
    async fn patch(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<DynamicObject, K8sError>;

    /// Submits an access review and returns it with its status filled in.
    async fn create_subject_access_review(
        &self,
        review: &SubjectAccessReview,
    ) -> Result<SubjectAccessReview, K8sError>;
}
