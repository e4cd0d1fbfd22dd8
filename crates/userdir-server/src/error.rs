//! HTTP error responses
//!
//! Clients only ever see two error bodies. Store details are logged here and
//! never sent over the wire.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use userdir_core::UserDirError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid Request")]
    InvalidRequest,

    #[error("DB ERROR")]
    Store(#[from] UserDirError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => {
                error!("Store failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
