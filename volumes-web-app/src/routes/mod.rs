use actix_web::web;
use utoipa::OpenApi;

pub mod pvcs;
pub mod rok;

/// Registers the routes of the default flavor.
pub fn configure_default(cfg: &mut web::ServiceConfig) {
    cfg.service(pvcs::read_all_pvcs)
        .service(pvcs::read_pvc)
        .service(pvcs::read_pvc_pods)
        .service(pvcs::read_pvc_events)
        .service(pvcs::create_pvc)
        .service(pvcs::patch_pvc)
        .service(pvcs::delete_pvc);
}

/// Registers the routes of the Rok flavor: the default ones plus the Rok
/// storage classes.
pub fn configure_rok(cfg: &mut web::ServiceConfig) {
    configure_default(cfg);
    cfg.service(rok::read_rok_storage_classes);
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::pvcs::read_all_pvcs,
        crate::routes::pvcs::read_pvc,
        crate::routes::pvcs::read_pvc_pods,
        crate::routes::pvcs::read_pvc_events,
        crate::routes::pvcs::create_pvc,
        crate::routes::pvcs::patch_pvc,
        crate::routes::pvcs::delete_pvc,
    ),
    components(schemas(
        crate::pvc::NewPvcForm,
        crate::pvc::PvcSummary,
        crate::pvc::ViewerStatus,
        crate::pvc::ViewerState,
        crate::routes::pvcs::ReadPvcsResponse,
        crate::routes::pvcs::PvcResponse,
        crate::routes::pvcs::ReadPvcPodsResponse,
        crate::routes::pvcs::ReadPvcEventsResponse,
        crate::routes::pvcs::DeletePvcResponse,
    ))
)]
pub struct VolumesApiDoc;

#[derive(OpenApi)]
#[openapi(paths(crate::routes::rok::read_rok_storage_classes))]
pub struct RokApiDoc;
