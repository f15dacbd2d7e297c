//! Session Manager
//!
//! Process-wide map from opaque session tokens to logged-in user ids. Tokens
//! are 256 bits of OS randomness; expiry is passive (a stale token simply
//! stops resolving), with an optional sweep for long-running servers.

use super::{SessionConfig, SessionRecord};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use quill_core::UserId;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Number of random bytes in a session token (256 bits of entropy)
const TOKEN_BYTES: usize = 32;

/// Tracks active sessions for the whole process
pub struct SessionManager {
    /// Active sessions, keyed by token
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    /// Session configuration
    config: SessionConfig,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Start a session for a user and return the new token
    ///
    /// A user may hold any number of concurrent sessions; each gets its own
    /// independent token.
    pub async fn start_session(&self, user_id: UserId) -> String {
        let token = generate_token();
        let record = SessionRecord::new(user_id, self.config.ttl_hours);

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), record);

        info!("Started session for user {}", user_id);
        token
    }

    /// Resolve a token to the user id it authenticates
    ///
    /// Returns `None` for unknown, ended, or expired tokens.
    pub async fn current_user(&self, token: &str) -> Option<UserId> {
        let sessions = self.sessions.read().await;
        match sessions.get(token) {
            Some(record) if !record.is_expired() => Some(record.user_id),
            _ => None,
        }
    }

    /// End a session
    ///
    /// Idempotent: ending an unknown or already-ended token is a no-op.
    pub async fn end_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(token).is_some() {
            debug!("Ended session");
        }
    }

    /// Remove expired sessions, returning how many were dropped
    pub async fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| !record.is_expired());
        let removed = before - sessions.len();
        if removed > 0 {
            info!("Cleaned up {} expired sessions", removed);
        }
        removed
    }

    /// Number of live sessions (expired but unswept tokens included)
    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Generate an unguessable session token
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
