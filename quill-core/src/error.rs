//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type QuillResult<T> = Result<T, QuillError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the Quill system
///
/// The variants mirror the failure modes a request can hit on its way through
/// the handler/session/repository flow: user-correctable input, unique
/// constraint conflicts, missing entities, missing or insufficient identity,
/// referential violations, and storage trouble (permanent or transient).
#[derive(Error, Debug)]
pub enum QuillError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Duplicate {field}: {message}")]
    Duplicate {
        message: String,
        field: String,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Authentication required: {message}")]
    AuthenticationRequired {
        message: String,
        context: ErrorContext,
    },

    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
        context: ErrorContext,
    },

    #[error("Integrity error: {message}")]
    Integrity {
        message: String,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Storage unavailable: {message}")]
    Unavailable {
        message: String,
        retry_after_ms: Option<u64>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QuillError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            QuillError::Validation { context, .. } => Some(context),
            QuillError::Duplicate { context, .. } => Some(context),
            QuillError::NotFound { context, .. } => Some(context),
            QuillError::AuthenticationRequired { context, .. } => Some(context),
            QuillError::Forbidden { context, .. } => Some(context),
            QuillError::Integrity { context, .. } => Some(context),
            QuillError::Storage { context, .. } => Some(context),
            QuillError::Unavailable { context, .. } => Some(context),
            QuillError::Config { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Check if error is recoverable by retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QuillError::Unavailable { .. })
    }

    /// Get retry delay in milliseconds for recoverable errors
    pub fn retry_delay_ms(&self) -> Option<u64> {
        match self {
            QuillError::Unavailable { retry_after_ms, .. } => retry_after_ms.or(Some(1000)),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            QuillError::Storage { .. } | QuillError::Config { .. } => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Internal error occurred"
                );
            }
            QuillError::Unavailable { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Storage unavailable (may be recoverable)"
                );
            }
            _ => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Request failed"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        QuillError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! duplicate_error {
    ($msg:expr, $field:expr, $component:expr) => {
        QuillError::Duplicate {
            message: $msg.to_string(),
            field: $field.to_string(),
            context: ErrorContext::new($component)
                .with_suggestion("Pick a value that is not already taken"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        QuillError::NotFound {
            resource: $resource.to_string(),
            context: ErrorContext::new($component)
                .with_suggestion("Verify the identifier")
                .with_suggestion("Check if the resource still exists"),
        }
    };
}

#[macro_export]
macro_rules! integrity_error {
    ($msg:expr, $component:expr) => {
        QuillError::Integrity {
            message: $msg.to_string(),
            context: ErrorContext::new($component)
                .with_suggestion("Ensure referenced records exist before inserting"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_the_only_recoverable_variant() {
        let unavailable = QuillError::Unavailable {
            message: "pool exhausted".to_string(),
            retry_after_ms: Some(250),
            context: ErrorContext::new("repository"),
        };
        assert!(unavailable.is_recoverable());
        assert_eq!(unavailable.retry_delay_ms(), Some(250));

        let not_found = not_found_error!("post 42", "repository");
        assert!(!not_found.is_recoverable());
        assert_eq!(not_found.retry_delay_ms(), None);
    }

    #[test]
    fn context_carries_component_and_metadata() {
        let err = QuillError::Duplicate {
            message: "email already registered".to_string(),
            field: "email".to_string(),
            context: ErrorContext::new("repository")
                .with_operation("create_user")
                .with_metadata("email", "a@x.com"),
        };

        let context = err.context().expect("domain errors carry context");
        assert_eq!(context.component, "repository");
        assert_eq!(context.operation.as_deref(), Some("create_user"));
        assert_eq!(context.metadata.get("email").map(String::as_str), Some("a@x.com"));
    }
}
