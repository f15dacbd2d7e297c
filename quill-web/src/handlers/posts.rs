//! Post handlers

use super::{CreatePostRequest, PostDetailResponse, UpdatePostRequest};
use crate::{auth::CurrentUser, ApiError, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use quill_core::{Post, PostDraft, PostId, PostUpdate};
use tracing::info;

/// List all posts in creation order (public)
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = state.platform.list_posts().await?;
    Ok(Json(posts))
}

/// Fetch a single post together with its comments (public)
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let (post, comments) = state.platform.get_post(id).await?;
    Ok(Json(PostDetailResponse { post, comments }))
}

/// Create a post authored by the logged-in user
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let draft = PostDraft {
        title: request.title,
        subtitle: request.subtitle,
        body: request.body,
        image_url: request.image_url,
    };

    let post = state.platform.create_post(&user, draft).await?;
    info!("User {} created post {}", user.id, post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

/// Edit a post's title, subtitle, body, and image
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<PostId>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let update = PostUpdate {
        title: request.title,
        subtitle: request.subtitle,
        body: request.body,
        image_url: request.image_url,
    };

    let post = state.platform.edit_post(&user, id, update).await?;
    Ok(Json(post))
}

/// Delete a post and its comments
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<PostId>,
) -> Result<StatusCode, ApiError> {
    state.platform.delete_post(&user, id).await?;
    info!("User {} deleted post {}", user.id, id);
    Ok(StatusCode::NO_CONTENT)
}
