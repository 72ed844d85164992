use actix_web::{
    Responder, get,
    web::{Data, Json},
};
use crud_backend::{
    authn::Caller,
    ops::ResourceOps,
    resources::STORAGE_CLASSES,
    routes::{ApiError, ErrorMessage, Succeeded, storage_classes::ReadStorageClassesResponse},
};
use serde_json::Value;

/// Provisioner of the storage classes backed by Rok.
pub const ROK_PROVISIONER: &str = "rok.arrikto.com";

#[utoipa::path(
    summary = "List Rok storage classes",
    description = "Returns the names of the storage classes provisioned by Rok.",
    responses(
        (status = 200, description = "Rok storage class names", body = ReadStorageClassesResponse),
        (status = 403, description = "The caller may not list storage classes", body = ErrorMessage),
    ),
    tag = "Rok"
)]
#[get("/api/rok/storageclasses")]
pub async fn read_rok_storage_classes(
    ops: Data<ResourceOps>,
    caller: Caller,
) -> Result<impl Responder, ApiError> {
    let classes = ops.resource(&STORAGE_CLASSES, &caller).list_cluster().await?;

    let storage_classes = classes
        .items
        .iter()
        .filter(|class| class.data.get("provisioner").and_then(Value::as_str) == Some(ROK_PROVISIONER))
        .filter_map(|class| class.metadata.name.clone())
        .collect();

    Ok(Json(ReadStorageClassesResponse {
        result: Succeeded::default(),
        storage_classes,
    }))
}
