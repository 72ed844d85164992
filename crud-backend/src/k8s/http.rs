use async_trait::async_trait;
use either::Either;
use k8s_openapi::api::authorization::v1::SubjectAccessReview;
use kube::Client;
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, Patch, PatchParams, PostParams};
use kube::core::TypeMeta;
use tracing::debug;

use crate::k8s::{Deletion, K8sClient, K8sError, ListOptions};
use crate::resources::ResourceDescriptor;

/// [`K8sClient`] talking to the API server with the [`kube`] crate.
#[derive(Clone)]
pub struct HttpK8sClient {
    client: Client,
}

impl HttpK8sClient {
    /// Creates a client from the ambient configuration: the in-cluster service
    /// account when running in a pod, `~/.kube/config` otherwise.
    pub async fn new() -> Result<HttpK8sClient, K8sError> {
        let client = Client::try_default().await?;

        Ok(HttpK8sClient { client })
    }

    fn api(&self, resource: &ResourceDescriptor, namespace: Option<&str>) -> Api<DynamicObject> {
        let api_resource = resource.api_resource();
        match namespace.filter(|_| resource.namespaced) {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &api_resource),
            None => Api::all_with(self.client.clone(), &api_resource),
        }
    }
}

#[async_trait]
impl K8sClient for HttpK8sClient {
    async fn list(
        &self,
        resource: &ResourceDescriptor,
        namespace: Option<&str>,
        options: &ListOptions,
    ) -> Result<Vec<DynamicObject>, K8sError> {
        let mut params = ListParams::default();
        if let Some(fields) = &options.field_selector {
            params = params.fields(fields);
        }

        debug!(resource = resource.plural, namespace, "listing objects");
        let list = self.api(resource, namespace).list(&params).await?;

        Ok(list.items)
    }

    async fn get(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        name: &str,
    ) -> Result<DynamicObject, K8sError> {
        debug!(resource = resource.plural, namespace, name, "getting object");
        let object = self.api(resource, Some(namespace)).get(name).await?;

        Ok(object)
    }

    async fn create(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        object: &DynamicObject,
        dry_run: bool,
    ) -> Result<DynamicObject, K8sError> {
        // The API server refuses objects without apiVersion and kind.
        let mut object = object.clone();
        if object.types.is_none() {
            object.types = Some(TypeMeta {
                api_version: resource.api_version(),
                kind: resource.kind.to_string(),
            });
        }

        let params = PostParams {
            dry_run,
            ..PostParams::default()
        };

        debug!(resource = resource.plural, namespace, dry_run, "creating object");
        let created = self
            .api(resource, Some(namespace))
            .create(&params, &object)
            .await?;

        Ok(created)
    }

    async fn delete(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        name: &str,
    ) -> Result<Deletion, K8sError> {
        debug!(resource = resource.plural, namespace, name, "deleting object");
        let deletion = self
            .api(resource, Some(namespace))
            .delete(name, &DeleteParams::default())
            .await?;

        match deletion {
            Either::Left(object) => Ok(Deletion::Pending(object)),
            Either::Right(status) => Ok(Deletion::Finished(serde_json::to_value(status)?)),
        }
    }

    async fn patch(
        &self,
        resource: &ResourceDescriptor,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> Result<DynamicObject, K8sError> {
        debug!(resource = resource.plural, namespace, name, "patching object");
        let patched = self
            .api(resource, Some(namespace))
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await?;

        Ok(patched)
    }

    async fn create_subject_access_review(
        &self,
        review: &SubjectAccessReview,
    ) -> Result<SubjectAccessReview, K8sError> {
        let reviews: Api<SubjectAccessReview> = Api::all(self.client.clone());
        let review = reviews.create(&PostParams::default(), review).await?;

        Ok(review)
    }
}
