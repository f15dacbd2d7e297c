//! Quill Web Server
//!
//! A JSON HTTP interface for the Quill blogging platform.

use clap::Parser;
use quill_core::{init_logging, LogFormat, LoggingConfig};
use quill_web::server::QuillServerBuilder;
use quill_web::WebConfig;

/// Quill Web Server - a multi-user blogging backend
#[derive(Parser)]
#[command(name = "quill-web")]
#[command(about = "A web interface for Quill")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Database URL (defaults to in-memory SQLite)
    #[arg(long)]
    database_url: Option<String>,

    /// Authorization mode: owner_only (default) or legacy
    #[arg(long)]
    policy_mode: Option<String>,

    /// Session lifetime in hours
    #[arg(long)]
    session_ttl_hours: Option<u32>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Set up logging first
    let logging = LoggingConfig {
        level: args.log_level.clone(),
        format: if args.dev {
            LogFormat::Pretty
        } else {
            LogFormat::Compact
        },
        ..LoggingConfig::default()
    };
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    // Environment configuration, overridden by command line arguments
    let mut config = WebConfig::from_env();
    config.host = args.host;
    config.port = args.port;
    config.dev_mode = args.dev;
    if args.database_url.is_some() {
        config.database_url = args.database_url;
    }
    if args.policy_mode.is_some() {
        config.policy_mode = args.policy_mode;
    }
    if args.session_ttl_hours.is_some() {
        config.session_ttl_hours = args.session_ttl_hours;
    }

    println!("🚀 Starting Quill Web Server");
    println!("📍 Server: http://{}:{}", config.host, config.port);
    match &config.database_url {
        Some(url) => println!("🗄️  Database: {}", url),
        None => println!("🗄️  Database: sqlite::memory: (state is lost on restart)"),
    }

    let server = match QuillServerBuilder::new()
        .host(config.host.clone())
        .port(config.port)
        .dev_mode(config.dev_mode)
        .database_url(
            config
                .database_url
                .clone()
                .unwrap_or_else(|| "sqlite::memory:".to_string()),
        )
        .policy_mode(config.policy_mode.clone().unwrap_or_else(|| "owner_only".to_string()))
        .session_ttl_hours(config.session_ttl_hours.unwrap_or(8))
        .build()
        .await
    {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed to start: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        // Test default values
        let args = Args::parse_from(["quill-web"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 8080);
        assert!(!args.dev);
        assert!(args.policy_mode.is_none());

        // Test custom values
        let args = Args::parse_from([
            "quill-web",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--dev",
            "--policy-mode",
            "legacy",
        ]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 3000);
        assert!(args.dev);
        assert_eq!(args.policy_mode.as_deref(), Some("legacy"));
    }
}
