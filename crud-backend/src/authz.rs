//! Authorization of a caller against the cluster's RBAC rules.
//!
//! Each check submits a `SubjectAccessReview` to the API server and only
//! proceeds when the review comes back allowed. Nothing is cached.

use std::sync::Arc;

use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SubjectAccessReview, SubjectAccessReviewSpec,
};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::authn::Identity;
use crate::k8s::K8sClient;
use crate::metrics::record_authorization;
use crate::resources::ResourceDescriptor;

const NO_CREDENTIALS: &str = "No user credentials were found";

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("{0}")]
    Unauthorized(String),
}

/// The question asked to the API server: may `subject` perform `verb` on
/// `resource` (optionally in `namespace`)?
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub verb: &'static str,
    pub group: &'static str,
    pub version: &'static str,
    pub resource: &'static str,
    pub namespace: Option<&'a str>,
    pub subject: Option<&'a Identity>,
}

impl<'a> AccessRequest<'a> {
    pub fn new(
        verb: &'static str,
        descriptor: &ResourceDescriptor,
        namespace: Option<&'a str>,
        subject: Option<&'a Identity>,
    ) -> AccessRequest<'a> {
        AccessRequest {
            verb,
            group: descriptor.group,
            version: descriptor.version,
            resource: descriptor.plural,
            // Cluster-scoped resources are reviewed without a namespace.
            namespace: namespace.filter(|_| descriptor.namespaced),
            subject,
        }
    }

    fn to_review(self, user: &Identity) -> SubjectAccessReview {
        SubjectAccessReview {
            spec: SubjectAccessReviewSpec {
                user: Some(user.to_string()),
                resource_attributes: Some(ResourceAttributes {
                    group: Some(self.group.to_string()),
                    namespace: self.namespace.map(str::to_string),
                    resource: Some(self.resource.to_string()),
                    verb: Some(self.verb.to_string()),
                    version: Some(self.version.to_string()),
                    ..ResourceAttributes::default()
                }),
                ..SubjectAccessReviewSpec::default()
            },
            ..SubjectAccessReview::default()
        }
    }

    fn denial_message(&self, user: &Identity) -> String {
        let target = if self.group.is_empty() {
            format!("{}/{}", self.version, self.resource)
        } else {
            format!("{}/{}/{}", self.group, self.version, self.resource)
        };

        let mut message = format!("User '{user}' is not authorized to {} {target}", self.verb);
        if let Some(namespace) = self.namespace {
            message.push_str(&format!(" in namespace '{namespace}'"));
        }

        message
    }
}

/// Decides whether a caller may perform an operation.
#[derive(Clone)]
pub struct Authorizer {
    client: Arc<dyn K8sClient>,
    disable_auth: bool,
}

impl Authorizer {
    pub fn new(client: Arc<dyn K8sClient>, disable_auth: bool) -> Authorizer {
        Authorizer {
            client,
            disable_auth,
        }
    }

    /// Returns `Ok` when the request is allowed.
    ///
    /// A failing access review is logged and counts as a denial.
    pub async fn ensure_authorized(&self, request: &AccessRequest<'_>) -> Result<(), AuthzError> {
        if self.disable_auth {
            record_authorization("bypassed");
            return Ok(());
        }

        let Some(user) = request.subject else {
            record_authorization("denied");
            return Err(AuthzError::Unauthorized(NO_CREDENTIALS.to_string()));
        };

        let review = request.to_review(user);
        let allowed = match self.client.create_subject_access_review(&review).await {
            Ok(review) => review.status.is_some_and(|status| status.allowed),
            Err(err) => {
                error!(error = %err, user = %user, "failed to create a subject access review");
                false
            }
        };

        if !allowed {
            record_authorization("denied");
            let message = request.denial_message(user);
            info!("{message}");
            return Err(AuthzError::Unauthorized(message));
        }

        debug!(
            user = %user,
            verb = request.verb,
            resource = request.resource,
            namespace = request.namespace,
            "request authorized"
        );
        record_authorization("allowed");

        Ok(())
    }
}
