//! In-memory [`K8sClient`] used by tests.
//!
//! Objects are kept in insertion order, every adapter call is recorded, and
//! access reviews are answered from a configurable [`AccessPolicy`].

use std::sync::Mutex;

use async_trait::async_trait;
use k8s_openapi::api::authorization::v1::{SubjectAccessReview, SubjectAccessReviewStatus};
use kube::api::DynamicObject;
use kube::core::TypeMeta;
use serde_json::{Value, json};

use crate::k8s::{Deletion, K8sClient, K8sError, ListOptions};
use crate::resources::ResourceDescriptor;

/// How the fake answers access reviews.
#[derive(Debug, Clone)]
pub enum AccessPolicy {
    AllowAll,
    DenyAll,
    /// Only the listed users are allowed, for every verb and resource.
    AllowUsers(Vec<String>),
    /// Access reviews fail as if the API server was unreachable.
    Unavailable,
}

/// One call that reached the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub verb: &'static str,
    pub resource: &'static str,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub dry_run: bool,
}

struct StoredObject {
    resource: &'static str,
    namespace: Option<String>,
    object: DynamicObject,
}

struct State {
    objects: Vec<StoredObject>,
    calls: Vec<RecordedCall>,
    reviews: Vec<SubjectAccessReview>,
    policy: AccessPolicy,
}

pub struct FakeK8sClient {
    state: Mutex<State>,
}

impl Default for FakeK8sClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeK8sClient {
    /// Creates an empty cluster which allows every access review.
    pub fn new() -> FakeK8sClient {
        FakeK8sClient {
            state: Mutex::new(State {
                objects: vec![],
                calls: vec![],
                reviews: vec![],
                policy: AccessPolicy::AllowAll,
            }),
        }
    }

    pub fn with_policy(self, policy: AccessPolicy) -> FakeK8sClient {
        self.set_policy(policy);
        self
    }

    pub fn set_policy(&self, policy: AccessPolicy) {
        self.state().policy = policy;
    }

    /// Seeds an object without recording a call.
    ///
    /// The namespace is taken from the object's metadata.
    pub fn insert(&self, resource: &ResourceDescriptor, object: Value) {
        let object: DynamicObject =
            serde_json::from_value(object).expect("seeded object is not a valid kubernetes object");
        let namespace = object.metadata.namespace.clone();
        self.state().objects.push(StoredObject {
            resource: resource.plural,
            namespace,
            object,
        });
    }

    /// Returns the stored objects of a type, optionally restricted to a namespace.
    pub fn objects(&self, resource: &ResourceDescriptor, namespace: Option<&str>) -> Vec<DynamicObject> {
        self.state()
            .objects
            .iter()
            .filter(|stored| matches_scope(stored, resource, namespace))
            .map(|stored| stored.object.clone())
            .collect()
    }

    /// Returns the adapter calls made so far, access reviews excluded.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Returns the access reviews submitted so far.
    pub fn access_reviews(&self) -> Vec<SubjectAccessReview> {
        self.state().reviews.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(
        state: &mut State,
        verb: &'static str,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        name: Option<&str>,
        dry_run: bool,
    ) {
        state.calls.push(RecordedCall {
            verb,
            resource: resource.plural,
            namespace: namespace.map(str::to_string),
            name: name.map(str::to_string),
            dry_run,
        });
    }
}

fn matches_scope(stored: &StoredObject, resource: &ResourceDescriptor, namespace: Option<&str>) -> bool {
    stored.resource == resource.plural
        && namespace.is_none_or(|namespace| stored.namespace.as_deref() == Some(namespace))
}

fn find_index(
    state: &State,
    resource: &ResourceDescriptor,
    namespace: &str,
    name: &str,
) -> Option<usize> {
    state.objects.iter().position(|stored| {
        matches_scope(stored, resource, Some(namespace))
            && stored.object.metadata.name.as_deref() == Some(name)
    })
}

fn not_found(resource: &ResourceDescriptor, name: &str) -> K8sError {
    K8sError::NotFound(format!("{} \"{name}\" not found", resource.plural))
}

fn matches_fields(object: &DynamicObject, selector: &str) -> bool {
    let Ok(object) = serde_json::to_value(object) else {
        return false;
    };
    selector
        .split(',')
        .filter(|term| !term.is_empty())
        .all(|term| {
            let Some((path, expected)) = term.split_once('=') else {
                return false;
            };
            path.split('.')
                .try_fold(&object, |value, segment| value.get(segment))
                .and_then(Value::as_str)
                == Some(expected)
        })
}

#[async_trait]
impl K8sClient for FakeK8sClient {
    async fn list(
        &self,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        options: &ListOptions,
    ) -> Result<Vec<DynamicObject>, K8sError> {
        let mut state = self.state();
        Self::record(&mut state, "list", resource, namespace, None, false);

        let items = state
            .objects
            .iter()
            .filter(|stored| matches_scope(stored, resource, namespace))
            .map(|stored| &stored.object)
            .filter(|object| {
                options
                    .field_selector
                    .as_deref()
                    .is_none_or(|selector| matches_fields(object, selector))
            })
            .cloned()
            .collect();

        Ok(items)
    }

    async fn get(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, K8sError> {
        let mut state = self.state();
        Self::record(&mut state, "get", resource, Some(namespace), Some(name), false);

        let index = find_index(&state, resource, namespace, name).ok_or_else(|| not_found(resource, name))?;

        Ok(state.objects[index].object.clone())
    }

    async fn create(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        object: &DynamicObject,
        dry_run: bool,
    ) -> Result<DynamicObject, K8sError> {
        let mut state = self.state();
        let name = object.metadata.name.clone().unwrap_or_default();
        Self::record(&mut state, "create", resource, Some(namespace), Some(&name), dry_run);

        if find_index(&state, resource, namespace, &name).is_some() {
            return Err(K8sError::Conflict(format!(
                "{} \"{name}\" already exists",
                resource.plural
            )));
        }

        let mut object = object.clone();
        object.metadata.namespace = Some(namespace.to_string());
        object.types.get_or_insert_with(|| TypeMeta {
            api_version: resource.api_version(),
            kind: resource.kind.to_string(),
        });

        if !dry_run {
            state.objects.push(StoredObject {
                resource: resource.plural,
                namespace: Some(namespace.to_string()),
                object: object.clone(),
            });
        }

        Ok(object)
    }

    async fn delete(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        name: &str,
    ) -> Result<Deletion, K8sError> {
        let mut state = self.state();
        Self::record(&mut state, "delete", resource, Some(namespace), Some(name), false);

        let index = find_index(&state, resource, namespace, name).ok_or_else(|| not_found(resource, name))?;
        state.objects.remove(index);

        Ok(Deletion::Finished(json!({
            "kind": "Status",
            "apiVersion": "v1",
            "status": "Success",
            "details": { "name": name, "kind": resource.plural },
        })))
    }

    async fn patch(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        name: &str,
        patch: &Value,
    ) -> Result<DynamicObject, K8sError> {
        let mut state = self.state();
        Self::record(&mut state, "patch", resource, Some(namespace), Some(name), false);

        let index = find_index(&state, resource, namespace, name).ok_or_else(|| not_found(resource, name))?;

        let mut value = serde_json::to_value(&state.objects[index].object)?;
        json_patch::merge(&mut value, patch);
        let patched: DynamicObject = serde_json::from_value(value)?;
        state.objects[index].object = patched.clone();

        Ok(patched)
    }

    async fn create_subject_access_review(
        &self,
        review: &SubjectAccessReview,
    ) -> Result<SubjectAccessReview, K8sError> {
        let mut state = self.state();
        state.reviews.push(review.clone());

        let allowed = match &state.policy {
            AccessPolicy::AllowAll => true,
            AccessPolicy::DenyAll => false,
            AccessPolicy::AllowUsers(users) => review
                .spec
                .user
                .as_ref()
                .is_some_and(|user| users.contains(user)),
            AccessPolicy::Unavailable => {
                return Err(K8sError::Api {
                    code: 503,
                    message: "the server is currently unable to handle the request".to_string(),
                });
            }
        };

        let mut review = review.clone();
        review.status = Some(SubjectAccessReviewStatus {
            allowed,
            reason: (!allowed).then(|| "denied by the fake access policy".to_string()),
            ..SubjectAccessReviewStatus::default()
        });

        Ok(review)
    }
}
