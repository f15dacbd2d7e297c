//! Quill web server
//!
//! Binds the router to a TCP listener and runs the hourly session sweep.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Quill web server
pub struct QuillServer {
    config: WebConfig,
    state: AppState,
}

impl QuillServer {
    /// Create a new server
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting Quill Web Server");
        info!("📍 Server address: http://{}", address);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        // Sweep expired sessions every hour; expiry itself is passive, so
        // this only bounds the map's memory.
        let cleanup_state = self.state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600));
            loop {
                interval.tick().await;
                cleanup_state.platform.cleanup_sessions().await;
            }
        });

        if let Err(e) = serve(listener, app).await {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for QuillServer
pub struct QuillServerBuilder {
    config: WebConfig,
}

impl QuillServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = Some(database_url.into());
        self
    }

    /// Set the authorization mode ("owner_only" or "legacy")
    pub fn policy_mode<S: Into<String>>(mut self, policy_mode: S) -> Self {
        self.config.policy_mode = Some(policy_mode.into());
        self
    }

    /// Set the session lifetime in hours
    pub fn session_ttl_hours(mut self, ttl_hours: u32) -> Self {
        self.config.session_ttl_hours = Some(ttl_hours);
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<QuillServer> {
        QuillServer::new(self.config).await
    }
}

impl Default for QuillServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to start a server with environment configuration
pub async fn start_server() -> WebResult<()> {
    let config = WebConfig::from_env();
    let server = QuillServer::new(config).await?;
    server.start().await
}
