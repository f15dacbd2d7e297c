//! Comment handlers

use super::CreateCommentRequest;
use crate::{auth::CurrentUser, ApiError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use quill_core::{Comment, CommentId, PostId};
use tracing::info;

/// Comment on a post as the logged-in user
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<PostId>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = state
        .platform
        .create_comment(&user, post_id, &request.text)
        .await?;

    info!("User {} commented on post {}", user.id, post_id);
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Delete a comment
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<CommentId>,
) -> Result<StatusCode, ApiError> {
    state.platform.delete_comment(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
