//! Route definitions for the Quill web server

use crate::{auth, handlers, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Identity lifecycle
        .route("/auth/register", post(auth::handlers::register_user))
        .route("/auth/login", post(auth::handlers::login_user))
        .route("/auth/logout", post(auth::handlers::logout_user))
        .route("/auth/me", get(auth::handlers::get_current_user))
        // Posts
        .route(
            "/posts",
            get(handlers::posts::list_posts).post(handlers::posts::create_post),
        )
        .route(
            "/posts/{id}",
            get(handlers::posts::get_post)
                .put(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        // Comments
        .route("/posts/{id}/comments", post(handlers::comments::create_comment))
        .route("/comments/{id}", delete(handlers::comments::delete_comment))
        // Profiles
        .route("/users/{id}", get(handlers::users::get_profile))
}

/// Create all routes combined
pub fn all_routes() -> Router<AppState> {
    Router::new()
        // The landing page is the post list
        .route("/", get(handlers::posts::list_posts))
        // Target of the unauthenticated redirect
        .route("/login", get(auth::handlers::login_notice))
        .nest("/api", api_routes())
}
