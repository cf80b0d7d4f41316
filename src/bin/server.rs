//! Catalog HTTP Server
//!
//! Serves the item catalog and its images over HTTP

use anyhow::{anyhow, Context};
use catalog_store::http;
use catalog_store::{CatalogBuilder, Config};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "catalog-server")]
#[command(about = "HTTP server for the item catalog and its images")]
struct Args {
    /// Path to a TOML config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port number
    #[arg(short = 'P', long, env = "PORT")]
    port: Option<u16>,

    /// JSON catalog file
    #[arg(long)]
    catalog_path: Option<PathBuf>,

    /// Directory holding image blobs
    #[arg(long)]
    image_dir: Option<PathBuf>,

    /// Origin allowed by CORS
    #[arg(long, env = "FRONT_URL")]
    front_url: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Load the config file (if any) and apply CLI overrides
    fn into_config(self) -> anyhow::Result<(Config, bool)> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = self.catalog_path {
            config.catalog_path = path;
        }
        if let Some(dir) = self.image_dir {
            config.image_dir = dir;
        }
        if let Some(url) = self.front_url {
            config.front_url = url;
        }

        Ok((config, self.log_json))
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, shutting down...");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, log_json) = Args::parse().into_config()?;
    init_tracing(log_json);

    info!("Starting catalog server");
    info!(
        catalog = %config.catalog_path.display(),
        images = %config.image_dir.display(),
        "Storage layout"
    );

    let catalog = CatalogBuilder::from_config(&config)
        .build()
        .context("failed to open catalog storage")?;
    let app = http::router(Arc::new(catalog), &config.front_url)
        .map_err(|e| anyhow!("failed to build router: {:?}", e))?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    let listener = TcpListener::bind(addr).await?;
    info!("http server started on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
