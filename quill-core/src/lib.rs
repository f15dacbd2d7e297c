//! Quill Core - Shared data structures and error handling
//!
//! This module defines the entity types, the unified error taxonomy, and the
//! logging bootstrap used by every other Quill crate.

pub mod error;
pub mod logging;
pub mod types;

pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tokio;
pub use tracing;
