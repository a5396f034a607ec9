use asset_catalog_core::CatalogError;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;

/// Error returned by every handler. Serializes as
/// `{"error": "<message>", "code": "<code>"}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({
            "error": self.message,
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}

pub fn internal_error(e: impl std::fmt::Display) -> ApiError {
    error!("Internal error: {}", e);
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "Internal server error",
    )
}

pub fn not_found(msg: &str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", msg)
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::ItemNotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "item_not_found", message)
            }
            CatalogError::VersionNotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "version_not_found", message)
            }
            CatalogError::Io { context, source } => {
                error!("{}: {}", context, source);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", context)
            }
        }
    }
}
