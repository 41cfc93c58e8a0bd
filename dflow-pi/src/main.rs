//! dflow-pi - Package Intake Microservice
//!
//! Receives package ids over HTTP, validates the staged package, drives
//! the external DSpace importer against it, and relocates the package to
//! its terminal root while recording the audit trail.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dflow_pi::config::IntakeConfig;
use dflow_pi::AppState;

/// Command-line arguments for dflow-pi
#[derive(Parser, Debug)]
#[command(name = "dflow-pi")]
#[command(about = "Package intake microservice for dflow")]
#[command(version)]
struct Args {
    /// Address to bind the listener to
    #[arg(long, default_value = "0.0.0.0", env = "DFLOW_PI_BIND")]
    bind: std::net::IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "5735", env = "DFLOW_PI_PORT")]
    port: u16,

    /// Data root holding staging/, success/, failure/ and logs/
    #[arg(short, long, env = "DFLOW_DATA_ROOT")]
    data_root: Option<PathBuf>,

    /// DSpace command-line binary used to run the import
    #[arg(long, default_value = "/dspace/bin/dspace", env = "DFLOW_DSPACE_BIN")]
    dspace_bin: PathBuf,

    /// E-person (acting principal) the import runs as
    #[arg(long, env = "DFLOW_EPERSON")]
    eperson: String,

    /// Base for composed result URLs
    #[arg(long, default_value = "https://hdl.handle.net/", env = "DFLOW_URL_BASE")]
    url_base: String,

    /// Handle prefix valid collection handles must carry
    #[arg(long, env = "DFLOW_HANDLE_PREFIX")]
    handle_prefix: String,

    /// Literal marker opening the mapfile result line
    #[arg(long, default_value = "files ", env = "DFLOW_MAPFILE_MARKER")]
    mapfile_marker: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dflow_pi=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting dflow-pi (Package Intake) microservice");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve data root with the CLI > ENV > TOML > default chain
    let cli_root = args.data_root.as_ref().map(|p| p.to_string_lossy().into_owned());
    let data_root = dflow_common::config::resolve_data_root(cli_root.as_deref(), "DFLOW_DATA_ROOT")
        .context("Failed to resolve data root")?;
    info!("Data root: {}", data_root.display());

    let config = Arc::new(IntakeConfig {
        data_root,
        dspace_bin: args.dspace_bin,
        eperson: args.eperson,
        url_base: args.url_base,
        handle_prefix: args.handle_prefix,
        mapfile_marker: args.mapfile_marker,
    });

    config
        .ensure_tree()
        .context("Failed to initialize data root tree")?;
    info!("Importer binary: {}", config.dspace_bin.display());

    let state = AppState::new(config);
    let app = dflow_pi::build_router(state);

    let listener = tokio::net::TcpListener::bind((args.bind, args.port)).await?;
    info!("Listening on http://{}:{}", args.bind, args.port);
    info!("Health check: http://{}:{}/health", args.bind, args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
