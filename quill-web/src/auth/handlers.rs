//! Authentication handlers for registration, login, and logout

use super::{CurrentUser, SessionToken};
use crate::{ApiError, AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use quill_core::UserInfo;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// User registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration/login response: the user plus a fresh session token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    pub session_token: String,
    pub token_type: String,
}

impl AuthResponse {
    fn new(user: UserInfo, session_token: String) -> Self {
        Self {
            user,
            session_token,
            token_type: "Bearer".to_string(),
        }
    }
}

/// User registration endpoint
///
/// Registers a new account and starts a session immediately, so a fresh
/// registration behaves like a login.
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    info!("User registration attempt: {}", request.email);

    let (user, token) = state
        .platform
        .register(&request.name, &request.email, &request.password)
        .await?;

    info!("User registered successfully: {}", user.id);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(user.to_user_info(), token)),
    ))
}

/// User login endpoint
pub async fn login_user(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!("User login attempt");

    let (user, token) = state.platform.login(&request.email, &request.password).await?;

    info!("User logged in successfully: {}", user.id);
    Ok(Json(AuthResponse::new(user.to_user_info(), token)))
}

/// Logout endpoint
///
/// Ends the presented session. Succeeds even when no session is active, so a
/// double logout or a stale token is harmless.
pub async fn logout_user(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Json<Value> {
    if let Some(token) = token {
        state.platform.logout(&token).await;
    }

    Json(json!({
        "message": "Logged out successfully"
    }))
}

/// Get current user information
pub async fn get_current_user(CurrentUser(user): CurrentUser) -> Json<UserInfo> {
    Json(user.to_user_info())
}

/// Notice served at the login redirect target
pub async fn login_notice() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "authentication_required",
            "message": "Log in via POST /api/auth/login or register via POST /api/auth/register"
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{routes, AppState, WebConfig};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn create_test_app() -> Router {
        let state = AppState::new(WebConfig::default()).await.unwrap();
        routes::all_routes().with_state(state)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_user_registration() {
        let app = create_test_app().await;

        let response = app
            .oneshot(post_json(
                "/api/auth/register",
                &json!({
                    "name": "Test User",
                    "email": "test@example.com",
                    "password": "password123"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["session_token"].as_str().unwrap().len() > 32);
        assert_eq!(body["user"]["email"], "test@example.com");
        assert!(body["user"]["password_hash"].is_null());
    }

    #[tokio::test]
    async fn test_duplicate_registration_points_at_login() {
        let app = create_test_app().await;
        let request = json!({
            "name": "Test User",
            "email": "dup@example.com",
            "password": "password123"
        });

        let first = app.clone().oneshot(post_json("/api/auth/register", &request)).await.unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app.oneshot(post_json("/api/auth/register", &request)).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);

        let bytes = second.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "duplicate_email");
    }

    #[tokio::test]
    async fn test_user_login() {
        let app = create_test_app().await;

        let register = app
            .clone()
            .oneshot(post_json(
                "/api/auth/register",
                &json!({
                    "name": "Login Test",
                    "email": "login@example.com",
                    "password": "password123"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(register.status(), StatusCode::CREATED);

        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                &json!({
                    "email": "login@example.com",
                    "password": "password123"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_login_is_uniform() {
        let app = create_test_app().await;

        app.clone()
            .oneshot(post_json(
                "/api/auth/register",
                &json!({
                    "name": "Someone",
                    "email": "someone@example.com",
                    "password": "password123"
                }),
            ))
            .await
            .unwrap();

        // Unknown email: must not crash the handler, just 401
        let unknown = app
            .clone()
            .oneshot(post_json(
                "/api/auth/login",
                &json!({"email": "nonexistent@example.com", "password": "password123"}),
            ))
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        let unknown_body: Value =
            serde_json::from_slice(&unknown.into_body().collect().await.unwrap().to_bytes()).unwrap();

        // Wrong password: byte-identical outcome
        let wrong = app
            .oneshot(post_json(
                "/api/auth/login",
                &json!({"email": "someone@example.com", "password": "wrongpassword"}),
            ))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        let wrong_body: Value =
            serde_json::from_slice(&wrong.into_body().collect().await.unwrap().to_bytes()).unwrap();

        assert_eq!(unknown_body, wrong_body);
    }

    #[tokio::test]
    async fn test_logout_ends_the_session() {
        let app = create_test_app().await;

        let register = app
            .clone()
            .oneshot(post_json(
                "/api/auth/register",
                &json!({
                    "name": "Logout Test",
                    "email": "logout@example.com",
                    "password": "password123"
                }),
            ))
            .await
            .unwrap();
        let body: Value =
            serde_json::from_slice(&register.into_body().collect().await.unwrap().to_bytes())
                .unwrap();
        let token = body["session_token"].as_str().unwrap().to_string();

        // Session is live
        let me = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/me")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(me.status(), StatusCode::OK);

        // Logout twice: both succeed
        for _ in 0..2 {
            let logout = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/auth/logout")
                        .header("authorization", format!("Bearer {}", token))
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(logout.status(), StatusCode::OK);
        }

        // The token no longer resolves
        let me_after = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/me")
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(me_after.status(), StatusCode::TEMPORARY_REDIRECT);
    }
}
