use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} not set")]
    MissingConfig(&'static str),
    #[error("Airtable responded with status {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("Airtable API error: {:?}", self);

        let (status, body) = match self {
            Error::MissingConfig(name) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": format!("{name} not set") }),
            ),
            Error::Upstream { status: 401, .. } => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Unauthorized: Invalid API key" }),
            ),
            Error::Upstream { status: 403, .. } => (
                StatusCode::FORBIDDEN,
                json!({ "error": "Forbidden: API key doesn't have permission to access this base/table" }),
            ),
            Error::Upstream { status: 404, .. } => (
                StatusCode::NOT_FOUND,
                json!({ "error": "Not Found: Base or table doesn't exist" }),
            ),
            Error::Upstream { message, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to fetch Airtable data", "details": message }),
            ),
            Error::Request(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Failed to fetch Airtable data", "details": err.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
