//! Kubernetes integration shared by the web apps.
//!
//! Route handlers never talk to this module directly: every call goes through
//! [`crate::ops::ResourceOps`], which authorizes the caller first. Consumers
//! depend on the [`K8sClient`] trait, [`http::HttpK8sClient`] is the
//! implementation backed by the [`kube`] crate and the ambient cluster
//! configuration (in-cluster or local `~/.kube/config`).
//!
//! With the `test-utils` feature, [`fake::FakeK8sClient`] provides an
//! in-memory cluster that records every call it receives.

mod base;
#[cfg(any(test, feature = "test-utils"))]
pub mod fake;
pub mod http;

pub use base::*;
