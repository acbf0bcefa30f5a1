//! worldtour-web - Tour catalog web service
//!
//! Serves the tour catalog UI and JSON API backed by a SQLite database
//! that is created and migrated automatically on startup.

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};
use worldtour_common::config::{resolve_port, RootFolderInitializer, RootFolderResolver, TomlConfig};
use worldtour_common::db::init::init_database;
use worldtour_web::{build_router, AppState};

/// Command-line arguments for worldtour-web
#[derive(Parser, Debug)]
#[command(name = "worldtour-web")]
#[command(about = "Tour catalog web service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "WORLDTOUR_PORT")]
    port: Option<u16>,

    /// Root folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting worldtour web service v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let toml_config = TomlConfig::load();

    // Root folder: CLI -> env -> TOML -> platform default
    let resolver = RootFolderResolver::new(args.root_folder.clone(), toml_config.clone());
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    // Create application state and router
    let state = AppState::new(pool);
    let app = build_router(state);

    let port = resolve_port(args.port, &toml_config);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("worldtour-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
