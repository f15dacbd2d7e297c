//! Session types

use chrono::{DateTime, Duration, Utc};
use quill_core::UserId;
use serde::{Deserialize, Serialize};

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a session token stays valid after issue
    pub ttl_hours: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { ttl_hours: 8 }
    }
}

/// A live session binding a token to a user
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// The user this session authenticates
    pub user_id: UserId,
    /// When the session was started
    pub created_at: DateTime<Utc>,
    /// When the token stops resolving
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a record for `user_id` expiring `ttl_hours` from now
    pub fn new(user_id: UserId, ttl_hours: u32) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            created_at: now,
            expires_at: now + Duration::hours(i64::from(ttl_hours)),
        }
    }

    /// Check whether the session has passively expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
