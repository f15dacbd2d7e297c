//! Health check handler

use axum::response::Json;
use serde_json::{json, Value};

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "quill-web",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
