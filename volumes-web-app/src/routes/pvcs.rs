use actix_web::{
    Responder, delete, get, patch, post,
    web::{Data, Json, Path, Query},
};
use crud_backend::{
    authn::Caller,
    k8s::ListOptions,
    ops::{OperationError, ResourceOps},
    resources::{EVENTS, PERSISTENT_VOLUME_CLAIMS, PODS, PVC_VIEWERS},
    routes::{ApiError, ErrorMessage, Succeeded},
};
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::pvc::{NewPvcForm, PvcSummary, is_viewer_pod, pods_mounting, summarize};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadPvcsResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    pub pvcs: Vec<PvcSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PvcResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    #[schema(value_type = Object)]
    pub pvc: DynamicObject,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadPvcPodsResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    #[schema(value_type = Vec<Object>)]
    pub pods: Vec<DynamicObject>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadPvcEventsResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    #[schema(value_type = Vec<Object>)]
    pub events: Vec<DynamicObject>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletePvcResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    #[schema(example = "PVC workspace-data successfully deleted.")]
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CreatePvcQuery {
    /// Validate the volume without creating it.
    #[serde(default)]
    pub dry_run: bool,
}

#[utoipa::path(
    summary = "List volumes",
    description = "Returns a summary of every PVC of the namespace, with the pods mounting it and its viewer.",
    params(
        ("namespace" = String, Path, description = "Namespace of the volumes"),
    ),
    responses(
        (status = 200, description = "Volumes of the namespace", body = ReadPvcsResponse),
        (status = 403, description = "The caller may not list volumes, pods or viewers", body = ErrorMessage),
    ),
    tag = "Volumes"
)]
#[get("/api/namespaces/{namespace}/pvcs")]
pub async fn read_all_pvcs(
    ops: Data<ResourceOps>,
    caller: Caller,
    namespace: Path<String>,
) -> Result<impl Responder, ApiError> {
    let namespace = namespace.into_inner();

    let pvcs = ops
        .resource(&PERSISTENT_VOLUME_CLAIMS, &caller)
        .list(&namespace)
        .await?;
    let pods = ops.resource(&PODS, &caller).list(&namespace).await?;
    let viewers = ops.resource(&PVC_VIEWERS, &caller).list(&namespace).await?;

    let pvcs = pvcs
        .items
        .iter()
        .map(|pvc| summarize(pvc, &pods.items, &viewers.items))
        .collect();

    Ok(Json(ReadPvcsResponse {
        result: Succeeded::default(),
        pvcs,
    }))
}

#[utoipa::path(
    summary = "Get a volume",
    params(
        ("namespace" = String, Path, description = "Namespace of the volume"),
        ("name" = String, Path, description = "Name of the volume"),
    ),
    responses(
        (status = 200, description = "The PVC object", body = PvcResponse),
        (status = 403, description = "The caller may not read volumes", body = ErrorMessage),
        (status = 404, description = "Volume not found", body = ErrorMessage),
    ),
    tag = "Volumes"
)]
#[get("/api/namespaces/{namespace}/pvcs/{name}")]
pub async fn read_pvc(
    ops: Data<ResourceOps>,
    caller: Caller,
    path: Path<(String, String)>,
) -> Result<impl Responder, ApiError> {
    let (namespace, name) = path.into_inner();

    let pvc = ops
        .resource(&PERSISTENT_VOLUME_CLAIMS, &caller)
        .get(&namespace, &name)
        .await?;

    Ok(Json(PvcResponse {
        result: Succeeded::default(),
        pvc,
    }))
}

#[utoipa::path(
    summary = "List the pods mounting a volume",
    params(
        ("namespace" = String, Path, description = "Namespace of the volume"),
        ("name" = String, Path, description = "Name of the volume"),
    ),
    responses(
        (status = 200, description = "Pods mounting the volume", body = ReadPvcPodsResponse),
        (status = 403, description = "The caller may not list pods", body = ErrorMessage),
    ),
    tag = "Volumes"
)]
#[get("/api/namespaces/{namespace}/pvcs/{name}/pods")]
pub async fn read_pvc_pods(
    ops: Data<ResourceOps>,
    caller: Caller,
    path: Path<(String, String)>,
) -> Result<impl Responder, ApiError> {
    let (namespace, name) = path.into_inner();

    let pods = ops.resource(&PODS, &caller).list(&namespace).await?;
    let pods = pods_mounting(&name, &pods.items)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(ReadPvcPodsResponse {
        result: Succeeded::default(),
        pods,
    }))
}

#[utoipa::path(
    summary = "List the events of a volume",
    params(
        ("namespace" = String, Path, description = "Namespace of the volume"),
        ("name" = String, Path, description = "Name of the volume"),
    ),
    responses(
        (status = 200, description = "Events involving the volume", body = ReadPvcEventsResponse),
        (status = 403, description = "The caller may not list events", body = ErrorMessage),
    ),
    tag = "Volumes"
)]
#[get("/api/namespaces/{namespace}/pvcs/{name}/events")]
pub async fn read_pvc_events(
    ops: Data<ResourceOps>,
    caller: Caller,
    path: Path<(String, String)>,
) -> Result<impl Responder, ApiError> {
    let (namespace, name) = path.into_inner();

    let options = ListOptions::default().fields(format!(
        "involvedObject.kind={},involvedObject.name={name}",
        PERSISTENT_VOLUME_CLAIMS.kind
    ));
    let events = ops
        .resource(&EVENTS, &caller)
        .list_with(&namespace, &options)
        .await?;

    Ok(Json(ReadPvcEventsResponse {
        result: Succeeded::default(),
        events: events.items,
    }))
}

#[utoipa::path(
    summary = "Create a volume",
    request_body = NewPvcForm,
    params(
        ("namespace" = String, Path, description = "Namespace of the volume"),
        CreatePvcQuery,
    ),
    responses(
        (status = 200, description = "The created PVC object", body = PvcResponse),
        (status = 400, description = "Invalid volume form", body = ErrorMessage),
        (status = 403, description = "The caller may not create volumes", body = ErrorMessage),
        (status = 409, description = "A volume with this name already exists", body = ErrorMessage),
    ),
    tag = "Volumes"
)]
#[post("/api/namespaces/{namespace}/pvcs")]
pub async fn create_pvc(
    ops: Data<ResourceOps>,
    caller: Caller,
    namespace: Path<String>,
    query: Query<CreatePvcQuery>,
    form: Json<NewPvcForm>,
) -> Result<impl Responder, ApiError> {
    let namespace = namespace.into_inner();
    let form = form.into_inner();

    form.validate().map_err(ApiError::BadRequest)?;
    let pvc = form
        .to_pvc()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let pvc = ops
        .resource(&PERSISTENT_VOLUME_CLAIMS, &caller)
        .create(&namespace, &pvc, query.dry_run)
        .await?;

    if !query.dry_run {
        info!(%namespace, name = %form.name, "created volume");
    }

    Ok(Json(PvcResponse {
        result: Succeeded::default(),
        pvc,
    }))
}

#[utoipa::path(
    summary = "Patch a volume",
    description = "Applies a JSON merge patch to the PVC.",
    request_body(content = Object, description = "JSON merge patch"),
    params(
        ("namespace" = String, Path, description = "Namespace of the volume"),
        ("name" = String, Path, description = "Name of the volume"),
    ),
    responses(
        (status = 200, description = "The patched PVC object", body = PvcResponse),
        (status = 400, description = "The patch is not a JSON object", body = ErrorMessage),
        (status = 403, description = "The caller may not patch volumes", body = ErrorMessage),
        (status = 404, description = "Volume not found", body = ErrorMessage),
    ),
    tag = "Volumes"
)]
#[patch("/api/namespaces/{namespace}/pvcs/{name}")]
pub async fn patch_pvc(
    ops: Data<ResourceOps>,
    caller: Caller,
    path: Path<(String, String)>,
    patch: Json<serde_json::Value>,
) -> Result<impl Responder, ApiError> {
    let (namespace, name) = path.into_inner();
    let patch = patch.into_inner();

    if !patch.is_object() {
        return Err(ApiError::BadRequest(
            "the patch must be a JSON object".to_string(),
        ));
    }

    let pvc = ops
        .resource(&PERSISTENT_VOLUME_CLAIMS, &caller)
        .patch(&namespace, &name, &patch)
        .await?;

    Ok(Json(PvcResponse {
        result: Succeeded::default(),
        pvc,
    }))
}

#[utoipa::path(
    summary = "Delete a volume",
    description = "Deletes the PVC and its viewer. Refused while a pod other than the viewer mounts the volume.",
    params(
        ("namespace" = String, Path, description = "Namespace of the volume"),
        ("name" = String, Path, description = "Name of the volume"),
    ),
    responses(
        (status = 200, description = "Volume deleted", body = DeletePvcResponse),
        (status = 403, description = "The caller may not delete volumes", body = ErrorMessage),
        (status = 404, description = "Volume not found", body = ErrorMessage),
        (status = 409, description = "The volume is in use", body = ErrorMessage),
    ),
    tag = "Volumes"
)]
#[delete("/api/namespaces/{namespace}/pvcs/{name}")]
pub async fn delete_pvc(
    ops: Data<ResourceOps>,
    caller: Caller,
    path: Path<(String, String)>,
) -> Result<impl Responder, ApiError> {
    let (namespace, name) = path.into_inner();

    let pods = ops.resource(&PODS, &caller).list(&namespace).await?;
    let users: Vec<_> = pods_mounting(&name, &pods.items)
        .into_iter()
        .filter(|pod| !is_viewer_pod(pod))
        .filter_map(|pod| pod.metadata.name.as_deref())
        .collect();
    if !users.is_empty() {
        return Err(ApiError::Conflict(format!(
            "Cannot delete PVC '{name}' because it is being used by pods: {}",
            users.join(", ")
        )));
    }

    ops.resource(&PERSISTENT_VOLUME_CLAIMS, &caller)
        .delete(&namespace, &name)
        .await?;

    // The viewer shares the volume's name and is removed with it.
    match ops
        .resource(&PVC_VIEWERS, &caller)
        .without_auth()
        .delete(&namespace, &name)
        .await
    {
        Ok(_) | Err(OperationError::NotFound(_)) => {}
        Err(err) => return Err(err.into()),
    }

    info!(%namespace, %name, "deleted volume");

    Ok(Json(DeletePvcResponse {
        result: Succeeded::default(),
        message: format!("PVC {name} successfully deleted."),
    }))
}
