use actix_web::{
    HttpRequest, HttpResponse, ResponseError,
    http::{StatusCode, header::ContentType},
};
use kube::api::DynamicObject;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use utoipa::{OpenApi, ToSchema};

use crate::k8s::K8sError;
use crate::ops::OperationError;

pub mod api_docs;
pub mod health_check;
pub mod metrics;
pub mod namespaces;
pub mod storage_classes;

/// Body of every failed request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorMessage {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = 403)]
    pub status: u16,
    #[schema(example = "User 'alice' is not authorized to list v1/persistentvolumeclaims in namespace 'kubeflow'")]
    pub log: String,
}

/// Common fields of every successful response, flattened into the response
/// body next to the payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Succeeded {
    #[schema(example = true)]
    pub success: bool,
    #[schema(example = 200)]
    pub status: u16,
}

impl Default for Succeeded {
    fn default() -> Self {
        Succeeded {
            success: true,
            status: StatusCode::OK.as_u16(),
        }
    }
}

/// Builds the JSON error envelope with the given status.
pub fn error_envelope(status: StatusCode, log: String) -> HttpResponse {
    let error_message = ErrorMessage {
        success: false,
        status: status.as_u16(),
        log,
    };
    let body = serde_json::to_string(&error_message).expect("failed to serialize error message");
    HttpResponse::build(status)
        .insert_header(ContentType::json())
        .body(body)
}

/// Answers requests matching no route with the error envelope.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    error_envelope(
        StatusCode::NOT_FOUND,
        format!("The requested URL {} was not found on the server.", req.path()),
    )
}

/// Error returned by the route handlers of every web app.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Operation(OperationError::Unauthorized(_)) => StatusCode::FORBIDDEN,
            ApiError::Operation(OperationError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Operation(OperationError::Conflict(_)) | ApiError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            ApiError::Operation(OperationError::Upstream(K8sError::Api { .. })) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Operation(OperationError::Upstream(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        error_envelope(status, self.to_string())
    }
}

/// Returns the names of the given objects, skipping unnamed ones.
pub fn object_names(items: &[DynamicObject]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item.metadata.name.clone())
        .collect()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health_check::liveness,
        crate::routes::health_check::readiness,
        crate::routes::metrics::metrics,
        crate::routes::namespaces::read_all_namespaces,
        crate::routes::storage_classes::read_all_storage_classes,
        crate::routes::storage_classes::read_default_storage_class,
    ),
    components(schemas(
        ErrorMessage,
        Succeeded,
        crate::ops::ResourceEnvelope,
        crate::routes::namespaces::ReadNamespacesResponse,
        crate::routes::storage_classes::ReadStorageClassesResponse,
        crate::routes::storage_classes::ReadDefaultStorageClassResponse,
    ))
)]
pub struct CommonApiDoc;

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn unauthorized_maps_to_forbidden_envelope() {
        let (status, body) = body_of(ApiError::Operation(OperationError::Unauthorized(
            "nope".to_string(),
        )))
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body,
            serde_json::json!({"success": false, "status": 403, "log": "nope"})
        );
    }

    #[actix_web::test]
    async fn upstream_api_errors_are_bad_gateway() {
        let err = ApiError::Operation(OperationError::Upstream(K8sError::Api {
            code: 422,
            message: "invalid quantity".to_string(),
        }));

        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["status"], 502);
    }

    #[test]
    fn error_classes_map_to_statuses() {
        let cases = [
            (ApiError::Operation(OperationError::NotFound(String::new())), 404),
            (ApiError::Operation(OperationError::Conflict(String::new())), 409),
            (ApiError::Conflict(String::new()), 409),
            (ApiError::BadRequest(String::new()), 400),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status);
        }
    }
}
