use actix_web::{
    Responder, get,
    web::{Data, Json},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::authn::Caller;
use crate::ops::ResourceOps;
use crate::resources::NAMESPACES;
use crate::routes::{ApiError, ErrorMessage, Succeeded, object_names};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadNamespacesResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    #[schema(example = json!(["kubeflow", "kubeflow-user"]))]
    pub namespaces: Vec<String>,
}

#[utoipa::path(
    summary = "List namespaces",
    description = "Returns the names of the namespaces the caller may list.",
    responses(
        (status = 200, description = "Namespace names", body = ReadNamespacesResponse),
        (status = 401, description = "No user in the request", body = ErrorMessage),
        (status = 403, description = "The caller may not list namespaces", body = ErrorMessage),
    ),
    tag = "Namespaces"
)]
#[get("/api/namespaces")]
pub async fn read_all_namespaces(
    ops: Data<ResourceOps>,
    caller: Caller,
) -> Result<impl Responder, ApiError> {
    let namespaces = ops.resource(&NAMESPACES, &caller).list_cluster().await?;

    let response = ReadNamespacesResponse {
        result: Succeeded::default(),
        namespaces: object_names(&namespaces.items),
    };

    Ok(Json(response))
}
