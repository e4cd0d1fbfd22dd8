//! User handlers

use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::warn;
use userdir_core::{User, UserRegistration};

/// `GET /allUsers`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.directory.list_users().await?;
    Ok(Json(users))
}

/// `POST /user`
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<UserRegistration>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(req) = body.map_err(|e| {
        warn!("Rejected create-user body: {}", e);
        ApiError::InvalidRequest
    })?;

    let new_user = req.into_new_user().ok_or_else(|| {
        warn!("Rejected create-user request: missing field or caller-supplied id");
        ApiError::InvalidRequest
    })?;

    let user = state.directory.create_user(new_user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
