use actix_web::{
    Responder, delete, get, post,
    web::{Data, Json, Path},
};
use crud_backend::{
    authn::Caller,
    ops::ResourceOps,
    resources::TENSORBOARDS,
    routes::{ApiError, ErrorMessage, Succeeded},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::tensorboard::{NewTensorboardForm, TensorboardSummary, summarize};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadTensorboardsResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    pub tensorboards: Vec<TensorboardSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TensorboardMessageResponse {
    #[serde(flatten)]
    pub result: Succeeded,
    #[schema(example = "Tensorboard training-logs successfully created.")]
    pub message: String,
}

#[utoipa::path(
    summary = "List tensorboards",
    params(
        ("namespace" = String, Path, description = "Namespace of the tensorboards"),
    ),
    responses(
        (status = 200, description = "Tensorboards of the namespace", body = ReadTensorboardsResponse),
        (status = 403, description = "The caller may not list tensorboards", body = ErrorMessage),
    ),
    tag = "Tensorboards"
)]
#[get("/api/namespaces/{namespace}/tensorboards")]
pub async fn read_all_tensorboards(
    ops: Data<ResourceOps>,
    caller: Caller,
    namespace: Path<String>,
) -> Result<impl Responder, ApiError> {
    let tensorboards = ops
        .resource(&TENSORBOARDS, &caller)
        .list(&namespace)
        .await?;

    Ok(Json(ReadTensorboardsResponse {
        result: Succeeded::default(),
        tensorboards: tensorboards.items.iter().map(summarize).collect(),
    }))
}

#[utoipa::path(
    summary = "Create a tensorboard",
    request_body = NewTensorboardForm,
    params(
        ("namespace" = String, Path, description = "Namespace of the tensorboard"),
    ),
    responses(
        (status = 200, description = "Tensorboard created", body = TensorboardMessageResponse),
        (status = 400, description = "Invalid tensorboard form", body = ErrorMessage),
        (status = 403, description = "The caller may not create tensorboards", body = ErrorMessage),
        (status = 409, description = "A tensorboard with this name already exists", body = ErrorMessage),
    ),
    tag = "Tensorboards"
)]
#[post("/api/namespaces/{namespace}/tensorboards")]
pub async fn create_tensorboard(
    ops: Data<ResourceOps>,
    caller: Caller,
    namespace: Path<String>,
    form: Json<NewTensorboardForm>,
) -> Result<impl Responder, ApiError> {
    let namespace = namespace.into_inner();
    let form = form.into_inner();

    form.validate().map_err(ApiError::BadRequest)?;
    let tensorboard = form
        .to_tensorboard()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    ops.resource(&TENSORBOARDS, &caller)
        .create(&namespace, &tensorboard, false)
        .await?;

    info!(%namespace, name = %form.name, "created tensorboard");

    Ok(Json(TensorboardMessageResponse {
        result: Succeeded::default(),
        message: format!("Tensorboard {} successfully created.", form.name),
    }))
}

#[utoipa::path(
    summary = "Delete a tensorboard",
    params(
        ("namespace" = String, Path, description = "Namespace of the tensorboard"),
        ("name" = String, Path, description = "Name of the tensorboard"),
    ),
    responses(
        (status = 200, description = "Tensorboard deleted", body = TensorboardMessageResponse),
        (status = 403, description = "The caller may not delete tensorboards", body = ErrorMessage),
        (status = 404, description = "Tensorboard not found", body = ErrorMessage),
    ),
    tag = "Tensorboards"
)]
#[delete("/api/namespaces/{namespace}/tensorboards/{name}")]
pub async fn delete_tensorboard(
    ops: Data<ResourceOps>,
    caller: Caller,
    path: Path<(String, String)>,
) -> Result<impl Responder, ApiError> {
    let (namespace, name) = path.into_inner();

    ops.resource(&TENSORBOARDS, &caller)
        .delete(&namespace, &name)
        .await?;

    info!(%namespace, %name, "deleted tensorboard");

    Ok(Json(TensorboardMessageResponse {
        result: Succeeded::default(),
        message: format!("Tensorboard {name} successfully deleted."),
    }))
}
