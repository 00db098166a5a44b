//! Turning [`FormcraftError`] into JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formcraft_core::FormcraftError;
use serde_json::json;

/// A handler error, rendered as `{"error": message}` with the matching status.
///
/// Validation failures also carry `"fields"`, the per-field messages.
#[derive(Debug)]
pub struct ApiError(pub FormcraftError);

impl From<FormcraftError> for ApiError {
    fn from(err: FormcraftError) -> Self {
        Self(err)
    }
}

/// Returns the message shown to clients, without the variant prefix.
pub fn client_message(err: &FormcraftError) -> String {
    match err {
        FormcraftError::NotFound(m)
        | FormcraftError::TransportFailed(m)
        | FormcraftError::MalformedDocument(m)
        | FormcraftError::BadRequest(m)
        | FormcraftError::Unauthorized(m) => m.clone(),
        FormcraftError::ValidationFailed(v) => v.message.clone(),
        // Internal details stay in the logs.
        FormcraftError::ConfigurationError(_)
        | FormcraftError::SerializationError(_)
        | FormcraftError::IoError(_) => "Internal server error".to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let body = match &self.0 {
            FormcraftError::ValidationFailed(v) => json!({
                "error": client_message(&self.0),
                "fields": v.field_errors,
            }),
            other => json!({ "error": client_message(other) }),
        };
        (status, Json(body)).into_response()
    }
}
