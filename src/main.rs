//! Git Workbench - file browser and git client backend
//!
//! # Usage
//! ```bash
//! git-workbench                          # Serve the API on 127.0.0.1:3001
//! git-workbench --static-dir web/dist -o # Also serve the frontend and open it
//! git-workbench --cors-origin http://localhost:3000
//! ```

use std::path::PathBuf;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_workbench::config::{DEFAULT_HOST, DEFAULT_PORT};
use git_workbench::routes::{self, AppState};
use git_workbench::ServerConfig;

/// Git Workbench - browse directories and drive git from your browser
#[derive(Parser)]
#[command(name = "git-workbench")]
#[command(about = "Backend for a browser-based git client", long_about = None)]
struct Cli {
    /// Interface to bind
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port to run the server on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory with the built frontend, served for non-API paths
    #[arg(long, value_name = "DIR")]
    static_dir: Option<PathBuf>,

    /// Allowed CORS origin (repeatable); any origin when omitted
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    cors_origins: Vec<String>,

    /// Open browser automatically after starting
    #[arg(short, long)]
    open: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        ServerConfig {
            host: cli.host,
            port: cli.port,
            static_dir: cli.static_dir,
            cors_origins: cli.cors_origins,
            open: cli.open,
            log_level: cli.log_level,
        }
    }
}

fn cors_layer(config: &ServerConfig) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {}", o)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

fn build_app(config: &ServerConfig) -> anyhow::Result<Router> {
    let mut app = routes::create_router(AppState::default());

    if let Some(dir) = &config.static_dir {
        if !dir.join("index.html").is_file() {
            anyhow::bail!("{} does not contain index.html", dir.display());
        }
        // SPA routing: unknown paths get index.html
        let assets = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        app = app.fallback_service(assets);
    }

    Ok(app
        .layer(cors_layer(config)?)
        .layer(TraceLayer::new_for_http()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from(Cli::parse());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app = match build_app(&config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("✗ Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("✗ Failed to bind to {}: {}", addr, e);
            eprintln!("  Try a different port with --port <PORT>");
            std::process::exit(1);
        }
    };

    let url = config.url();
    println!();
    println!("  ┌─────────────────────────────────────────────┐");
    println!("  │                Git Workbench                │");
    println!("  └─────────────────────────────────────────────┘");
    println!();
    println!("  API:      {}/api/v1", url);
    match &config.static_dir {
        Some(dir) => println!("  Frontend: {} ({})", url, dir.display()),
        None => println!("  Frontend: not served (use --static-dir)"),
    }
    println!();
    println!("  Press Ctrl+C to stop");
    println!();
    tracing::info!("Listening on {}", addr);

    if config.open {
        if let Err(e) = open::that(&url) {
            eprintln!("  Warning: Could not open browser: {}", e);
        }
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        println!("\n  Shutting down...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
