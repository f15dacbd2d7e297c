//! Quill Applications - The blogging platform behind the HTTP surface
//!
//! This crate owns everything between the request handlers and the database:
//!
//! - Credential hashing and verification for login/registration
//! - The SQLite entity repository for users, posts, and comments
//! - Session tracking from opaque tokens to logged-in users
//! - The authorization policy gating every mutation
//!
//! ## Architecture
//!
//! The layering keeps a clear separation between:
//! - **Core** (quill-core): entity types and the error taxonomy
//! - **Applications** (this crate): the decision logic every route follows
//! - **Presentation** (quill-web): HTTP translation only

pub mod auth;
pub mod repository;
pub mod session;

pub use auth::{hash_password, verify_password, AccessPolicy, Action, Decision, PolicyMode};
pub use repository::SqliteStore;
pub use session::{SessionConfig, SessionManager};

use quill_core::{
    not_found_error, validation_error, Comment, CommentId, ErrorContext, Post, PostDraft, PostId,
    PostUpdate, QuillError, QuillResult, User, UserId, UserInfo,
};
use tracing::{debug, info};

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

/// Platform configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// SQLite database URL
    pub database_url: String,
    /// Authorization mode for edit/delete actions
    pub policy_mode: PolicyMode,
    /// Session configuration
    pub session: SessionConfig,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            policy_mode: PolicyMode::OwnerOnly,
            session: SessionConfig::default(),
        }
    }
}

impl PlatformConfig {
    /// Hardened configuration: ownership checks on edit/delete (the default)
    pub fn hardened() -> Self {
        Self::default()
    }

    /// Legacy configuration: any authenticated user may mutate any post or
    /// comment
    pub fn legacy() -> Self {
        Self {
            policy_mode: PolicyMode::Legacy,
            ..Self::default()
        }
    }

    /// Set the database URL
    pub fn with_database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.database_url = database_url.into();
        self
    }
}

/// Main platform service
///
/// Every operation takes the acting identity explicitly; there is no ambient
/// "current user". Handlers resolve a session token to a `User` first (via
/// [`BlogPlatform::authenticate`]) and pass it down.
pub struct BlogPlatform {
    store: SqliteStore,
    sessions: SessionManager,
    policy: AccessPolicy,
}

impl BlogPlatform {
    /// Create a platform instance: connect to storage and prepare the schema
    pub async fn new(config: PlatformConfig) -> QuillResult<Self> {
        let store = SqliteStore::new(&config.database_url).await?;
        let sessions = SessionManager::new(config.session.clone());
        let policy = AccessPolicy::new(config.policy_mode);

        info!("Platform ready (policy mode: {})", config.policy_mode);
        Ok(Self {
            store,
            sessions,
            policy,
        })
    }

    /// Translate a policy decision into the error taxonomy
    fn enforce(&self, action: Action, actor: Option<&User>, owner: Option<UserId>) -> QuillResult<()> {
        match self.policy.decide(action, actor, owner) {
            Decision::Granted => Ok(()),
            Decision::MustAuthenticate => Err(QuillError::AuthenticationRequired {
                message: format!("{} requires a logged-in user", action),
                context: ErrorContext::new("platform").with_operation(&action.to_string()),
            }),
            Decision::Forbidden => Err(QuillError::Forbidden {
                message: format!("not allowed to {} on this resource", action),
                context: ErrorContext::new("platform").with_operation(&action.to_string()),
            }),
        }
    }

    /// Uniform login failure: never reveals whether the email exists
    fn invalid_credentials() -> QuillError {
        QuillError::AuthenticationRequired {
            message: "invalid email or password".to_string(),
            context: ErrorContext::new("platform").with_operation("login"),
        }
    }

    // ========================================
    // Identity lifecycle
    // ========================================

    /// Register a new user and log them in immediately
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> QuillResult<(User, String)> {
        if name.trim().is_empty() {
            return Err(validation_error!("name is required", "name", "platform"));
        }
        if email.trim().is_empty() {
            return Err(validation_error!("email is required", "email", "platform"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(validation_error!(
                format!("password must be at least {} characters", MIN_PASSWORD_LEN),
                "password",
                "platform"
            ));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .store
            .create_user(name, email, &password_hash, false)
            .await?;

        let token = self.sessions.start_session(user.id).await;
        info!("Registered user {} and started a session", user.id);
        Ok((user, token))
    }

    /// Log a user in with email and password
    ///
    /// A missing user and a wrong password produce the same outcome, so the
    /// response cannot be used to enumerate registered emails.
    pub async fn login(&self, email: &str, password: &str) -> QuillResult<(User, String)> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(validation_error!(
                "email and password are required",
                "credentials",
                "platform"
            ));
        }

        let Some(user) = self.store.find_user_by_email(email).await? else {
            debug!("Login failed: unknown email");
            return Err(Self::invalid_credentials());
        };

        if !verify_password(password, &user.password_hash) {
            debug!("Login failed: password mismatch for user {}", user.id);
            return Err(Self::invalid_credentials());
        }

        let token = self.sessions.start_session(user.id).await;
        info!("User {} logged in", user.id);
        Ok((user, token))
    }

    /// End the session behind a token; a no-op when none is active
    pub async fn logout(&self, token: &str) {
        self.sessions.end_session(token).await;
    }

    /// Resolve a session token to its user
    ///
    /// `None` for unknown/expired tokens, and for tokens whose user record
    /// has vanished underneath the session.
    pub async fn authenticate(&self, token: &str) -> QuillResult<Option<User>> {
        match self.sessions.current_user(token).await {
            Some(user_id) => self.store.find_user_by_id(user_id).await,
            None => Ok(None),
        }
    }

    // ========================================
    // Posts
    // ========================================

    /// List every post in creation order (public)
    pub async fn list_posts(&self) -> QuillResult<Vec<Post>> {
        self.enforce(Action::ListPosts, None, None)?;
        self.store.list_posts().await
    }

    /// Fetch a post and its comments (public)
    pub async fn get_post(&self, id: PostId) -> QuillResult<(Post, Vec<Comment>)> {
        self.enforce(Action::ViewPost, None, None)?;

        let post = self
            .store
            .find_post(id)
            .await?
            .ok_or_else(|| not_found_error!(format!("post {}", id), "platform"))?;
        let comments = self.store.list_comments_for_post(id).await?;
        Ok((post, comments))
    }

    /// Create a post authored by `actor`
    pub async fn create_post(&self, actor: &User, draft: PostDraft) -> QuillResult<Post> {
        self.enforce(Action::CreatePost, Some(actor), None)?;
        validate_post_fields(&draft.title, &draft.subtitle, &draft.body)?;

        self.store.create_post(actor.id, &draft).await
    }

    /// Edit an existing post
    ///
    /// In `OwnerOnly` mode only the author (or an admin) may edit.
    pub async fn edit_post(&self, actor: &User, id: PostId, update: PostUpdate) -> QuillResult<Post> {
        let post = self
            .store
            .find_post(id)
            .await?
            .ok_or_else(|| not_found_error!(format!("post {}", id), "platform"))?;

        self.enforce(Action::EditPost, Some(actor), Some(post.author_id))?;
        validate_post_fields(&update.title, &update.subtitle, &update.body)?;

        self.store.update_post(id, &update).await
    }

    /// Delete a post and its comments
    pub async fn delete_post(&self, actor: &User, id: PostId) -> QuillResult<()> {
        let post = self
            .store
            .find_post(id)
            .await?
            .ok_or_else(|| not_found_error!(format!("post {}", id), "platform"))?;

        self.enforce(Action::DeletePost, Some(actor), Some(post.author_id))?;
        self.store.delete_post(id).await
    }

    // ========================================
    // Comments
    // ========================================

    /// Comment on a post
    pub async fn create_comment(
        &self,
        actor: &User,
        post_id: PostId,
        text: &str,
    ) -> QuillResult<Comment> {
        self.enforce(Action::CreateComment, Some(actor), None)?;

        if self.store.find_post(post_id).await?.is_none() {
            return Err(not_found_error!(format!("post {}", post_id), "platform"));
        }

        self.store.create_comment(post_id, actor.id, text).await
    }

    /// Delete a comment
    pub async fn delete_comment(&self, actor: &User, id: CommentId) -> QuillResult<()> {
        let comment = self
            .store
            .find_comment(id)
            .await?
            .ok_or_else(|| not_found_error!(format!("comment {}", id), "platform"))?;

        self.enforce(Action::DeleteComment, Some(actor), Some(comment.author_id))?;
        self.store.delete_comment(id).await
    }

    // ========================================
    // Profiles and maintenance
    // ========================================

    /// Public profile: user info plus the posts they authored
    pub async fn get_profile(&self, user_id: UserId) -> QuillResult<(UserInfo, Vec<Post>)> {
        self.enforce(Action::ViewProfile, None, None)?;

        let user = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| not_found_error!(format!("user {}", user_id), "platform"))?;
        let posts = self.store.list_posts_by_author(user_id).await?;
        Ok((user.to_user_info(), posts))
    }

    /// Sweep expired sessions; returns how many were removed
    pub async fn cleanup_sessions(&self) -> usize {
        self.sessions.cleanup_expired().await
    }

    /// Access the underlying store (for tests)
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }
}

fn validate_post_fields(title: &str, subtitle: &str, body: &str) -> QuillResult<()> {
    if title.trim().is_empty() {
        return Err(validation_error!("title is required", "title", "platform"));
    }
    if subtitle.trim().is_empty() {
        return Err(validation_error!(
            "subtitle is required",
            "subtitle",
            "platform"
        ));
    }
    if body.trim().is_empty() {
        return Err(validation_error!("body is required", "body", "platform"));
    }
    Ok(())
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use super::{
        AccessPolicy, Action, BlogPlatform, Decision, PlatformConfig, PolicyMode, SessionConfig,
        SessionManager, SqliteStore,
    };
}
