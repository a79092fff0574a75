use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Converts an unhandled AppError into a plain-text HTTP response.
///
/// Handlers fall back to redirects or re-rendered forms for store failures,
/// so this is mostly reached when a page itself cannot be rendered.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }

        (status, self.to_string()).into_response()
    }
}
