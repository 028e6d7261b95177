use crate::model::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kindling_core::AggregateError;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Engine failure wrapped for rendering at the HTTP boundary.
#[derive(Debug)]
pub struct AppError(pub AggregateError);

impl From<AggregateError> for AppError {
    fn from(error: AggregateError) -> Self {
        Self(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self.0 {
            AggregateError::InvalidCount(_) => (
                StatusCode::BAD_REQUEST,
                "parameter 'n' must be greater than 0",
                None,
            ),
            AggregateError::Upstream(source) => {
                error!(error = %source, "upstream failure while aggregating stories");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an error occurred while retrieving stories",
                    Some(source.to_string()),
                )
            }
            // Only reachable when the client is already gone; rendered in
            // case anything is still listening.
            AggregateError::Cancelled => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "request was cancelled",
                None,
            ),
        };

        let body = ErrorResponse {
            error: message.to_string(),
            status_code: status.as_u16(),
            details,
        };
        (status, Json(body)).into_response()
    }
}
