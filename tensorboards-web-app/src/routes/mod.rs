use actix_web::web;
use utoipa::OpenApi;

pub mod form;
pub mod tensorboards;

/// Registers the routes of the default flavor.
pub fn configure_default(cfg: &mut web::ServiceConfig) {
    cfg.service(tensorboards::read_all_tensorboards)
        .service(tensorboards::create_tensorboard)
        .service(tensorboards::delete_tensorboard)
        .service(form::read_pvc_names)
        .service(form::read_pod_defaults);
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::tensorboards::read_all_tensorboards,
        crate::routes::tensorboards::create_tensorboard,
        crate::routes::tensorboards::delete_tensorboard,
        crate::routes::form::read_pvc_names,
        crate::routes::form::read_pod_defaults,
    ),
    components(schemas(
        crate::tensorboard::NewTensorboardForm,
        crate::tensorboard::TensorboardSummary,
        crate::tensorboard::TensorboardState,
        crate::tensorboard::PodDefaultSummary,
        crate::routes::tensorboards::ReadTensorboardsResponse,
        crate::routes::tensorboards::TensorboardMessageResponse,
        crate::routes::form::ReadPvcNamesResponse,
        crate::routes::form::ReadPodDefaultsResponse,
    ))
)]
pub struct TensorboardsApiDoc;
