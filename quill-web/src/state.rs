//! Application state shared across handlers

use crate::{WebConfig, WebError, WebResult};
use quill_applications::{BlogPlatform, PlatformConfig, PolicyMode, SessionConfig};
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// The blogging platform service
    pub platform: Arc<BlogPlatform>,
}

impl AppState {
    /// Create a new application state
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let policy_mode = match config.policy_mode.as_deref() {
            Some(raw) => raw.parse::<PolicyMode>().map_err(WebError::Config)?,
            None => PolicyMode::OwnerOnly,
        };

        let platform_config = PlatformConfig {
            database_url: config
                .database_url
                .clone()
                .unwrap_or_else(|| "sqlite::memory:".to_string()),
            policy_mode,
            session: SessionConfig {
                ttl_hours: config
                    .session_ttl_hours
                    .unwrap_or_else(|| SessionConfig::default().ttl_hours),
            },
        };

        let platform = BlogPlatform::new(platform_config)
            .await
            .map_err(|e| WebError::Config(format!("Failed to initialize platform: {}", e)))?;

        info!("Application state initialized successfully");
        Ok(Self {
            config,
            platform: Arc::new(platform),
        })
    }
}
