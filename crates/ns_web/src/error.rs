use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ns_core::Error;
use serde_json::json;

/// Turns store and scrape failures into JSON error responses.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::Validation(_) | Error::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateKey(_) => StatusCode::CONFLICT,
            Error::Http(_) | Error::Scraping(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
