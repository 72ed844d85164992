use actix_web::{HttpResponse, Responder, get};

#[utoipa::path(
    summary = "Liveness probe",
    description = "Returns 'alive' while the process is able to serve requests.",
    responses(
        (status = 200, description = "The backend is alive.", body = String),
    ),
    tag = "Health",
)]
#[get("/healthz/liveness")]
pub async fn liveness() -> impl Responder {
    HttpResponse::Ok().body("alive")
}

#[utoipa::path(
    summary = "Readiness probe",
    description = "Returns 'ready' once the backend accepts traffic.",
    responses(
        (status = 200, description = "The backend is ready.", body = String),
    ),
    tag = "Health",
)]
#[get("/healthz/readiness")]
pub async fn readiness() -> impl Responder {
    HttpResponse::Ok().body("ready")
}
