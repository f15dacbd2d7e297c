//! Core entity types
//!
//! Users, posts, and comments as they are persisted, plus the draft/update
//! forms accepted from callers. Relationships are expressed as id-based
//! foreign keys only; there are no object cycles between entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier assigned by storage at creation
pub type UserId = i64;
pub type PostId = i64;
pub type CommentId = i64;

/// A registered user
///
/// `password_hash` is an argon2 PHC string; the raw password is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Convert to public user info (no credential material)
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            is_admin: self.is_admin,
            created_at: self.created_at,
        }
    }
}

/// Public user information, safe to return to any caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A blog post
///
/// `created_date` is set at creation and never changes; everything else the
/// author typed is replaceable through an edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub image_url: Option<String>,
    pub created_date: DateTime<Utc>,
}

/// Fields accepted when creating a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub image_url: Option<String>,
}

/// Fields accepted when editing a post (full replacement, as the edit form
/// submits every field)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostUpdate {
    pub title: String,
    pub subtitle: String,
    pub body: String,
    pub image_url: Option<String>,
}

/// A comment on a post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_info_never_carries_the_password_hash() {
        let user = User {
            id: 1,
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            is_admin: false,
            created_at: Utc::now(),
        };

        let info = user.to_user_info();
        let json = serde_json::to_value(&info).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
