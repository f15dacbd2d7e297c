//! SQLite-backed entity store
//!
//! All mutating operations are atomic: single inserts rely on statement
//! atomicity, multi-statement mutations (cascading post deletion) run inside
//! an explicit transaction. Unique and foreign-key constraints exist in the
//! schema as a backstop behind the typed pre-checks, so a failed operation
//! never leaves a partial record.

use chrono::{DateTime, Utc};
use quill_core::{
    duplicate_error, integrity_error, not_found_error, Comment, CommentId, ErrorContext, Post,
    PostDraft, PostId, PostUpdate, QuillError, QuillResult, User, UserId,
};
use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// How long a single connection waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
/// How long a request waits for a pooled connection before the operation is
/// reported as retryable
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Database user record
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    is_admin: bool,
    created_at: String, // ISO 8601 string
}

impl UserRow {
    fn into_user(self) -> QuillResult<User> {
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_admin: self.is_admin,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Database post record
#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    author_id: i64,
    title: String,
    subtitle: String,
    body: String,
    image_url: Option<String>,
    created_date: String, // ISO 8601 string
}

impl PostRow {
    fn into_post(self) -> QuillResult<Post> {
        Ok(Post {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            subtitle: self.subtitle,
            body: self.body,
            image_url: self.image_url,
            created_date: parse_timestamp(&self.created_date)?,
        })
    }
}

/// Database comment record
#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    text: String,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            post_id: self.post_id,
            author_id: self.author_id,
            text: self.text,
        }
    }
}

fn parse_timestamp(raw: &str) -> QuillResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| QuillError::Storage {
            message: format!("invalid timestamp in storage: {}", e),
            source: None,
            context: ErrorContext::new("repository").with_metadata("raw", raw),
        })
}

/// Map an sqlx error to the Quill taxonomy
///
/// Unique violations become `Duplicate`, foreign-key violations `Integrity`,
/// pool exhaustion the retryable `Unavailable`; everything else is an opaque
/// `Storage` error.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> QuillError {
    let context = ErrorContext::new("repository").with_operation(operation);
    match err {
        sqlx::Error::PoolTimedOut => QuillError::Unavailable {
            message: "timed out waiting for a database connection".to_string(),
            retry_after_ms: Some(500),
            context,
        },
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation => {
                let message = db.message().to_string();
                let field = if message.contains("users.email") {
                    "email"
                } else if message.contains("posts.title") {
                    "title"
                } else {
                    "value"
                };
                QuillError::Duplicate {
                    message,
                    field: field.to_string(),
                    context,
                }
            }
            ErrorKind::ForeignKeyViolation => QuillError::Integrity {
                message: db.message().to_string(),
                context,
            },
            _ => QuillError::Storage {
                message: db.message().to_string(),
                source: None,
                context,
            },
        },
        other => QuillError::Storage {
            message: format!("database operation failed: {}", other),
            source: Some(Box::new(other)),
            context,
        },
    }
}

/// SQLite-backed repository for users, posts, and comments
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to the database and create the schema
    pub async fn new(database_url: &str) -> QuillResult<Self> {
        info!("Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| QuillError::Config {
                message: format!("invalid database url: {}", e),
                source: None,
                context: ErrorContext::new("repository").with_operation("connect"),
            })?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        // An in-memory database exists per connection; cap the pool at one so
        // every handle sees the same tables.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| {
                error!("Database connection failed: {}", e);
                map_sqlx_error("connect", e)
            })?;

        let store = Self { pool };
        store.create_tables().await?;

        info!("Database schema ready");
        Ok(store)
    }

    /// Create database tables
    async fn create_tables(&self) -> QuillResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                is_admin BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_tables", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL REFERENCES users(id),
                title TEXT NOT NULL UNIQUE,
                subtitle TEXT NOT NULL,
                body TEXT NOT NULL,
                image_url TEXT,
                created_date TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_tables", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL REFERENCES posts(id),
                author_id INTEGER NOT NULL REFERENCES users(id),
                text TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_tables", e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_tables", e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_tables", e))?;

        Ok(())
    }

    // ========================================
    // Users
    // ========================================

    /// Create a new user
    ///
    /// Fails with `Duplicate` when the email is already registered.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> QuillResult<User> {
        if self.find_user_by_email(email).await?.is_some() {
            debug!("Registration rejected, email already exists: {}", email);
            return Err(duplicate_error!(
                "email is already registered",
                "email",
                "repository"
            ));
        }

        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (name, email, password_hash, is_admin, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(is_admin)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;

        let user = User {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
            created_at,
        };

        info!("Created user {} ({})", user.id, user.email);
        Ok(user)
    }

    /// Get user by email
    pub async fn find_user_by_email(&self, email: &str) -> QuillResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.map(UserRow::into_user).transpose()
    }

    /// Get user by ID
    pub async fn find_user_by_id(&self, id: UserId) -> QuillResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user_by_id", e))?;

        row.map(UserRow::into_user).transpose()
    }

    // ========================================
    // Posts
    // ========================================

    /// Create a new post
    ///
    /// Fails with `Duplicate` when the title is taken and `Integrity` when
    /// the author does not exist; neither failure inserts a row.
    pub async fn create_post(&self, author_id: UserId, draft: &PostDraft) -> QuillResult<Post> {
        if self.find_user_by_id(author_id).await?.is_none() {
            return Err(integrity_error!(
                format!("unknown author: {}", author_id),
                "repository"
            ));
        }

        if self.title_exists(&draft.title).await? {
            debug!("Post rejected, title already exists: {}", draft.title);
            return Err(duplicate_error!(
                "a post with this title already exists",
                "title",
                "repository"
            ));
        }

        let created_date = Utc::now();
        let result = sqlx::query(
            "INSERT INTO posts (author_id, title, subtitle, body, image_url, created_date) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(author_id)
        .bind(&draft.title)
        .bind(&draft.subtitle)
        .bind(&draft.body)
        .bind(&draft.image_url)
        .bind(created_date.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_post", e))?;

        let post = Post {
            id: result.last_insert_rowid(),
            author_id,
            title: draft.title.clone(),
            subtitle: draft.subtitle.clone(),
            body: draft.body.clone(),
            image_url: draft.image_url.clone(),
            created_date,
        };

        info!("Created post {} by user {}", post.id, author_id);
        Ok(post)
    }

    /// Check if a post title is already taken
    async fn title_exists(&self, title: &str) -> QuillResult<bool> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM posts WHERE title = ?")
            .bind(title)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("title_exists", e))?;

        Ok(row.0 > 0)
    }

    /// Get post by ID
    pub async fn find_post(&self, id: PostId) -> QuillResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_post", e))?;

        row.map(PostRow::into_post).transpose()
    }

    /// List all posts in creation order
    pub async fn list_posts(&self) -> QuillResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>("SELECT * FROM posts ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_posts", e))?;

        rows.into_iter().map(PostRow::into_post).collect()
    }

    /// List a user's posts in creation order
    pub async fn list_posts_by_author(&self, author_id: UserId) -> QuillResult<Vec<Post>> {
        let rows =
            sqlx::query_as::<_, PostRow>("SELECT * FROM posts WHERE author_id = ? ORDER BY id ASC")
                .bind(author_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("list_posts_by_author", e))?;

        rows.into_iter().map(PostRow::into_post).collect()
    }

    /// Update a post's editable fields
    ///
    /// `author_id` and `created_date` are immutable.
    pub async fn update_post(&self, id: PostId, update: &PostUpdate) -> QuillResult<Post> {
        let result = sqlx::query(
            "UPDATE posts SET title = ?, subtitle = ?, body = ?, image_url = ? WHERE id = ?",
        )
        .bind(&update.title)
        .bind(&update.subtitle)
        .bind(&update.body)
        .bind(&update.image_url)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_post", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error!(format!("post {}", id), "repository"));
        }

        debug!("Updated post {}", id);
        self.find_post(id)
            .await?
            .ok_or_else(|| not_found_error!(format!("post {}", id), "repository"))
    }

    /// Delete a post and all of its comments
    ///
    /// The cascade is an explicit transactional step: either the post and
    /// every dependent comment disappear together, or nothing changes.
    pub async fn delete_post(&self, id: PostId) -> QuillResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;

        sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;

        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls back the comment deletion
            return Err(not_found_error!(format!("post {}", id), "repository"));
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("delete_post", e))?;

        info!("Deleted post {} and its comments", id);
        Ok(())
    }

    // ========================================
    // Comments
    // ========================================

    /// Create a comment on a post
    ///
    /// Fails with `Integrity` when the post or the author does not exist;
    /// no row is inserted on failure.
    pub async fn create_comment(
        &self,
        post_id: PostId,
        author_id: UserId,
        text: &str,
    ) -> QuillResult<Comment> {
        if self.find_post(post_id).await?.is_none() {
            return Err(integrity_error!(
                format!("unknown post: {}", post_id),
                "repository"
            ));
        }

        if self.find_user_by_id(author_id).await?.is_none() {
            return Err(integrity_error!(
                format!("unknown author: {}", author_id),
                "repository"
            ));
        }

        let result = sqlx::query("INSERT INTO comments (post_id, author_id, text) VALUES (?, ?, ?)")
            .bind(post_id)
            .bind(author_id)
            .bind(text)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create_comment", e))?;

        let comment = Comment {
            id: result.last_insert_rowid(),
            post_id,
            author_id,
            text: text.to_string(),
        };

        debug!("Created comment {} on post {}", comment.id, post_id);
        Ok(comment)
    }

    /// Get comment by ID
    pub async fn find_comment(&self, id: CommentId) -> QuillResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_comment", e))?;

        Ok(row.map(CommentRow::into_comment))
    }

    /// List comments for a post in creation order
    pub async fn list_comments_for_post(&self, post_id: PostId) -> QuillResult<Vec<Comment>> {
        let rows =
            sqlx::query_as::<_, CommentRow>("SELECT * FROM comments WHERE post_id = ? ORDER BY id ASC")
                .bind(post_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("list_comments_for_post", e))?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    /// Delete a comment
    pub async fn delete_comment(&self, id: CommentId) -> QuillResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_comment", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found_error!(format!("comment {}", id), "repository"));
        }

        debug!("Deleted comment {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteStore {
        SqliteStore::new("sqlite::memory:").await.unwrap()
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            subtitle: "a subtitle".to_string(),
            body: "body text".to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_fails_the_second_registration() {
        let store = memory_store().await;
        store.create_user("A", "a@x.com", "hash-a", false).await.unwrap();

        let err = store
            .create_user("Other Name", "a@x.com", "different-hash", false)
            .await
            .unwrap_err();
        assert!(matches!(err, QuillError::Duplicate { ref field, .. } if field == "email"));
    }

    #[tokio::test]
    async fn duplicate_title_fails_across_authors() {
        let store = memory_store().await;
        let a = store.create_user("A", "a@x.com", "h", false).await.unwrap();
        let b = store.create_user("B", "b@x.com", "h", false).await.unwrap();

        store.create_post(a.id, &draft("Dup")).await.unwrap();
        let err = store.create_post(b.id, &draft("Dup")).await.unwrap_err();
        assert!(matches!(err, QuillError::Duplicate { ref field, .. } if field == "title"));
    }

    #[tokio::test]
    async fn create_post_with_unknown_author_inserts_nothing() {
        let store = memory_store().await;

        let err = store.create_post(999, &draft("Orphan")).await.unwrap_err();
        assert!(matches!(err, QuillError::Integrity { .. }));
        assert!(store.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_comment_on_unknown_post_inserts_nothing() {
        let store = memory_store().await;
        let a = store.create_user("A", "a@x.com", "h", false).await.unwrap();

        let err = store.create_comment(999, a.id, "hello").await.unwrap_err();
        assert!(matches!(err, QuillError::Integrity { .. }));
    }

    #[tokio::test]
    async fn delete_post_cascades_to_comments() {
        let store = memory_store().await;
        let a = store.create_user("A", "a@x.com", "h", false).await.unwrap();
        let post = store.create_post(a.id, &draft("Hello")).await.unwrap();
        let c1 = store.create_comment(post.id, a.id, "first").await.unwrap();
        let c2 = store.create_comment(post.id, a.id, "second").await.unwrap();

        store.delete_post(post.id).await.unwrap();

        assert!(store.find_post(post.id).await.unwrap().is_none());
        assert!(store.find_comment(c1.id).await.unwrap().is_none());
        assert!(store.find_comment(c2.id).await.unwrap().is_none());

        // A second delete reports NotFound
        let err = store.delete_post(post.id).await.unwrap_err();
        assert!(matches!(err, QuillError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_post_keeps_author_and_creation_date() {
        let store = memory_store().await;
        let a = store.create_user("A", "a@x.com", "h", false).await.unwrap();
        let post = store.create_post(a.id, &draft("Before")).await.unwrap();

        let updated = store
            .update_post(
                post.id,
                &PostUpdate {
                    title: "After".to_string(),
                    subtitle: "new subtitle".to_string(),
                    body: "new body".to_string(),
                    image_url: Some("https://example.com/cat.png".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "After");
        assert_eq!(updated.author_id, a.id);
        assert_eq!(updated.created_date, post.created_date);
    }

    #[tokio::test]
    async fn update_missing_post_reports_not_found() {
        let store = memory_store().await;

        let err = store
            .update_post(
                42,
                &PostUpdate {
                    title: "x".to_string(),
                    subtitle: "y".to_string(),
                    body: "z".to_string(),
                    image_url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, QuillError::NotFound { .. }));
    }

    #[tokio::test]
    async fn posts_list_in_creation_order() {
        let store = memory_store().await;
        let a = store.create_user("A", "a@x.com", "h", false).await.unwrap();
        store.create_post(a.id, &draft("first")).await.unwrap();
        store.create_post(a.id, &draft("second")).await.unwrap();
        store.create_post(a.id, &draft("third")).await.unwrap();

        let titles: Vec<String> = store
            .list_posts()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }
}
