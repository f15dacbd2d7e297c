//! Authentication extractors for the HTTP layer
//!
//! A session token travels in the `Authorization: Bearer` header. The
//! extractors resolve it through the platform's session manager, so handlers
//! receive a full `User` and never touch an ambient "current user" global.

pub mod handlers;

use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use quill_core::User;
use std::convert::Infallible;
use tracing::debug;

/// Redirect issued when a restricted action is attempted without a session
#[derive(Debug)]
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::temporary("/login").into_response()
    }
}

/// Extract the raw bearer token, if the request carries one
pub struct SessionToken(pub Option<String>);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionToken(bearer_token(&parts.headers)))
    }
}

/// The authenticated user behind the request's session token
///
/// Rejects with a redirect to `/login` when no valid session is presented.
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let Some(token) = bearer_token(&parts.headers) else {
            debug!("Restricted request without a session token");
            return Err(AuthRedirect);
        };

        match app_state.platform.authenticate(&token).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                debug!("Session token did not resolve to a user");
                Err(AuthRedirect)
            }
            Err(e) => {
                e.log();
                Err(AuthRedirect)
            }
        }
    }
}

/// Extract a bearer token from request headers
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.to_string())
}
