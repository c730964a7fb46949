use crate::{cli::telemetry, navigation::BasePath, proxy::ProxyTable, webui};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub backend: String,
    pub dist: PathBuf,
    pub base: String,
}

/// Execute the serve action.
/// # Errors
/// Returns an error if the backend URL is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    if !args.dist.join("index.html").is_file() {
        warn!(
            "{} has no index.html, build the web UI first",
            args.dist.display()
        );
    }

    let proxy = ProxyTable::wasatext(&args.backend)
        .with_context(|| format!("invalid backend URL: {}", args.backend))?;

    let config = webui::Config {
        port: args.port,
        dist: args.dist,
        base: BasePath::new(&args.base),
        proxy,
    };

    let result = webui::new(config).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    info!(
        port = args.port,
        backend = %args.backend,
        dist = %args.dist.display(),
        base = %args.base,
        "Starting development server"
    );
}
