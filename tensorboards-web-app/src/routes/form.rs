//! Data the creation form needs besides the tensorboards themselves.

use actix_web::{
    Responder, get,
    web::{Data, Json, Path},
};
use crud_backend::{
    authn::Caller,
    ops::ResourceOps,
    resources::{PERSISTENT_VOLUME_CLAIMS, POD_DEFAULTS},
    routes::{ApiError, ErrorMessage, Succeeded, object_names},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::tensorboard::{PodDefaultSummary, summarize_pod_default};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadPvcNamesResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    #[schema(example = json!(["workspace"]))]
    pub pvcs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadPodDefaultsResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    pub poddefaults: Vec<PodDefaultSummary>,
}

#[utoipa::path(
    summary = "List volume names",
    description = "Returns the names of the PVCs the logs can be read from.",
    params(
        ("namespace" = String, Path, description = "Namespace of the volumes"),
    ),
    responses(
        (status = 200, description = "PVC names", body = ReadPvcNamesResponse),
        (status = 403, description = "The caller may not list volumes", body = ErrorMessage),
    ),
    tag = "Tensorboards"
)]
#[get("/api/namespaces/{namespace}/pvcs")]
pub async fn read_pvc_names(
    ops: Data<ResourceOps>,
    caller: Caller,
    namespace: Path<String>,
) -> Result<impl Responder, ApiError> {
    let pvcs = ops
        .resource(&PERSISTENT_VOLUME_CLAIMS, &caller)
        .list(&namespace)
        .await?;

    Ok(Json(ReadPvcNamesResponse {
        result: Succeeded::default(),
        pvcs: object_names(&pvcs.items),
    }))
}

#[utoipa::path(
    summary = "List pod defaults",
    params(
        ("namespace" = String, Path, description = "Namespace of the pod defaults"),
    ),
    responses(
        (status = 200, description = "Pod defaults with their selector label", body = ReadPodDefaultsResponse),
        (status = 403, description = "The caller may not list pod defaults", body = ErrorMessage),
    ),
    tag = "Tensorboards"
)]
#[get("/api/namespaces/{namespace}/poddefaults")]
pub async fn read_pod_defaults(
    ops: Data<ResourceOps>,
    caller: Caller,
    namespace: Path<String>,
) -> Result<impl Responder, ApiError> {
    let pod_defaults = ops
        .resource(&POD_DEFAULTS, &caller)
        .list(&namespace)
        .await?;

    Ok(Json(ReadPodDefaultsResponse {
        result: Succeeded::default(),
        poddefaults: pod_defaults
            .items
            .iter()
            .filter_map(summarize_pod_default)
            .collect(),
    }))
}
