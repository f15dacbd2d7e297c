//! Request handlers for posts, comments, and profiles
//!
//! Handlers stay thin: extract the acting user, hand off to the platform,
//! translate the outcome. Shared request/response DTOs live here.

pub mod comments;
pub mod health;
pub mod posts;
pub mod users;

use quill_core::{Comment, Post, UserInfo};
use serde::{Deserialize, Serialize};

/// Create-post request body
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub image_url: Option<String>,
}

/// Edit-post request body (full replacement of the editable fields)
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub image_url: Option<String>,
}

/// Create-comment request body
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

/// A post together with its comments
#[derive(Debug, Serialize)]
pub struct PostDetailResponse {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// A user's public profile: their info and their posts
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserInfo,
    pub posts: Vec<Post>,
}
