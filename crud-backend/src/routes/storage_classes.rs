use actix_web::{
    Responder, get,
    web::{Data, Json},
};
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::authn::Caller;
use crate::ops::ResourceOps;
use crate::resources::STORAGE_CLASSES;
use crate::routes::{ApiError, ErrorMessage, Succeeded, object_names};

const DEFAULT_CLASS_ANNOTATIONS: [&str; 2] = [
    "storageclass.kubernetes.io/is-default-class",
    "storageclass.beta.kubernetes.io/is-default-class",
];

/// Returns whether a storage class is annotated as the cluster default.
pub fn is_default_class(class: &DynamicObject) -> bool {
    let Some(annotations) = &class.metadata.annotations else {
        return false;
    };

    DEFAULT_CLASS_ANNOTATIONS
        .iter()
        .any(|key| annotations.get(*key).map(String::as_str) == Some("true"))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadStorageClassesResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    #[schema(example = json!(["standard", "fast"]))]
    pub storage_classes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadDefaultStorageClassResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    /// Empty when no class is marked as default.
    #[schema(example = "standard")]
    pub default_storage_class: String,
}

#[utoipa::path(
    summary = "List storage classes",
    responses(
        (status = 200, description = "Storage class names", body = ReadStorageClassesResponse),
        (status = 403, description = "The caller may not list storage classes", body = ErrorMessage),
    ),
    tag = "Storage classes"
)]
#[get("/api/storageclasses")]
pub async fn read_all_storage_classes(
    ops: Data<ResourceOps>,
    caller: Caller,
) -> Result<impl Responder, ApiError> {
    let classes = ops.resource(&STORAGE_CLASSES, &caller).list_cluster().await?;

    let response = ReadStorageClassesResponse {
        result: Succeeded::default(),
        storage_classes: object_names(&classes.items),
    };

    Ok(Json(response))
}

#[utoipa::path(
    summary = "Get the default storage class",
    description = "Returns the first storage class annotated as the cluster default, or an empty string.",
    responses(
        (status = 200, description = "Default storage class name", body = ReadDefaultStorageClassResponse),
        (status = 403, description = "The caller may not list storage classes", body = ErrorMessage),
    ),
    tag = "Storage classes"
)]
#[get("/api/storageclasses/default")]
pub async fn read_default_storage_class(
    ops: Data<ResourceOps>,
    caller: Caller,
) -> Result<impl Responder, ApiError> {
    let classes = ops.resource(&STORAGE_CLASSES, &caller).list_cluster().await?;

    let default_storage_class = classes
        .items
        .iter()
        .find(|class| is_default_class(class))
        .and_then(|class| class.metadata.name.clone())
        .unwrap_or_default();

    let response = ReadDefaultStorageClassResponse {
        result: Succeeded::default(),
        default_storage_class,
    };

    Ok(Json(response))
}
