//! Authorization-gated operations on Kubernetes resources.
//!
//! [`ResourceOps`] is the only way route handlers reach the cluster. Every
//! operation first asks the [`Authorizer`] whether the caller may perform it,
//! then forwards the call to the [`K8sClient`] and returns its result
//! unmodified. Composite operations may opt out of the check for secondary
//! calls with [`GuardedResource::without_auth`].

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use kube::api::DynamicObject;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

use crate::authn::Caller;
use crate::authz::{AccessRequest, Authorizer, AuthzError};
use crate::k8s::{Deletion, K8sClient, K8sError, ListOptions};
use crate::metrics::record_k8s_request;
use crate::resources::ResourceDescriptor;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Upstream(K8sError),
}

impl From<K8sError> for OperationError {
    fn from(err: K8sError) -> Self {
        match err {
            K8sError::NotFound(message) => OperationError::NotFound(message),
            K8sError::Conflict(message) => OperationError::Conflict(message),
            err => OperationError::Upstream(err),
        }
    }
}

impl From<AuthzError> for OperationError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthorized(message) => OperationError::Unauthorized(message),
        }
    }
}

/// Result of a list operation: the items in the order the API server
/// returned them, with the kind of the list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResourceEnvelope {
    #[schema(example = "PersistentVolumeClaimList")]
    pub kind: String,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<DynamicObject>,
}

/// Entry point of the operation layer, shared by every request.
#[derive(Clone)]
pub struct ResourceOps {
    client: Arc<dyn K8sClient>,
    authorizer: Authorizer,
}

impl ResourceOps {
    pub fn new(client: Arc<dyn K8sClient>, disable_auth: bool) -> ResourceOps {
        let authorizer = Authorizer::new(client.clone(), disable_auth);

        ResourceOps { client, authorizer }
    }

    /// Returns the operations on one resource type, performed on behalf of
    /// `caller`.
    pub fn resource<'a>(
        &'a self,
        descriptor: &'static ResourceDescriptor,
        caller: &'a Caller,
    ) -> GuardedResource<'a> {
        GuardedResource {
            ops: self,
            descriptor,
            caller,
            auth: true,
        }
    }
}

pub struct GuardedResource<'a> {
    ops: &'a ResourceOps,
    descriptor: &'static ResourceDescriptor,
    caller: &'a Caller,
    auth: bool,
}

impl GuardedResource<'_> {
    /// Skips the authorization check. Only for secondary calls of composite
    /// operations whose primary call was already authorized.
    pub fn without_auth(mut self) -> Self {
        self.auth = false;
        self
    }

    /// Authorizes `verb` and only then builds and awaits the adapter call.
    async fn guarded<T, F, Fut>(
        &self,
        verb: &'static str,
        namespace: Option<&str>,
        call: F,
    ) -> Result<T, OperationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, K8sError>>,
    {
        if self.auth {
            let request =
                AccessRequest::new(verb, self.descriptor, namespace, self.caller.identity());
            self.ops.authorizer.ensure_authorized(&request).await?;
        }

        let resource = self.descriptor.plural;
        let start = Instant::now();
        let result = call().await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(K8sError::NotFound(_)) => "not_found",
            Err(K8sError::Conflict(_)) => "conflict",
            Err(_) => "error",
        };
        record_k8s_request(verb, resource, outcome, start.elapsed());
        debug!(verb, resource, namespace, outcome, "kubernetes call completed");

        result.map_err(OperationError::from)
    }

    fn envelope(&self, items: Vec<DynamicObject>) -> ResourceEnvelope {
        ResourceEnvelope {
            kind: self.descriptor.list_kind(),
            items,
        }
    }

    pub async fn list(&self, namespace: &str) -> Result<ResourceEnvelope, OperationError> {
        self.list_with(namespace, &ListOptions::default()).await
    }

    pub async fn list_with(
        &self,
        namespace: &str,
        options: &ListOptions,
    ) -> Result<ResourceEnvelope, OperationError> {
        let items = self
            .guarded("list", Some(namespace), || {
                self.ops.client.list(self.descriptor, Some(namespace), options)
            })
            .await?;

        Ok(self.envelope(items))
    }

    /// Lists a cluster-scoped resource type.
    pub async fn list_cluster(&self) -> Result<ResourceEnvelope, OperationError> {
        let options = ListOptions::default();
        let items = self
            .guarded("list", None, || {
                self.ops.client.list(self.descriptor, None, &options)
            })
            .await?;

        Ok(self.envelope(items))
    }

    pub async fn get(&self, namespace: &str, name: &str) -> Result<DynamicObject, OperationError> {
        self.guarded("get", Some(namespace), || {
            self.ops.client.get(self.descriptor, namespace, name)
        })
        .await
    }

    pub async fn create(
        &self,
        namespace: &str,
        object: &DynamicObject,
        dry_run: bool,
    ) -> Result<DynamicObject, OperationError> {
        self.guarded("create", Some(namespace), || {
            self.ops
                .client
                .create(self.descriptor, namespace, object, dry_run)
        })
        .await
    }

    pub async fn delete(&self, namespace: &str, name: &str) -> Result<Deletion, OperationError> {
        self.guarded("delete", Some(namespace), || {
            self.ops.client.delete(self.descriptor, namespace, name)
        })
        .await
    }

    pub async fn patch(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<DynamicObject, OperationError> {
        self.guarded("patch", Some(namespace), || {
            self.ops.client.patch(self.descriptor, namespace, name, patch)
        })
        .await
    }
}
