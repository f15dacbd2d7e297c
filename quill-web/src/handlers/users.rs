//! Profile handlers

use super::ProfileResponse;
use crate::{ApiError, AppState};
use axum::{
    extract::{Path, State},
    response::Json,
};
use quill_core::UserId;

/// Public profile view: user info plus their posts
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let (user, posts) = state.platform.get_profile(id).await?;
    Ok(Json(ProfileResponse { user, posts }))
}
