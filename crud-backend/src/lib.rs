//! Shared backend of the Kubeflow CRUD web apps.
//!
//! Turns HTTP requests into Kubernetes API calls on behalf of the calling
//! user. Every call is authorized with a `SubjectAccessReview` before it
//! reaches the cluster. The individual web apps add their own routes on top
//! of the shared ones (probes, metrics, namespaces, storage classes) through
//! [`startup::AppRoutes`].

pub mod authn;
pub mod authz;
pub mod k8s;
pub mod metrics;
pub mod ops;
pub mod resources;
pub mod routes;
pub mod startup;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
