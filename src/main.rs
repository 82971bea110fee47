//! BlueQuery - a natural-language query backend for ARGO ocean float data.

use std::sync::Arc;

use bluequery::cli::Cli;
use bluequery::config::Config;
use bluequery::error::Result;
use bluequery::logging;
use bluequery::server::{self, AppState};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; settings may come from the environment
    dotenvy::dotenv().ok();

    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let mut config = Config::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    info!("Database: {}", config.db_path.display());
    if !config.db_path.exists() {
        warn!("Database file not found; /query will fail until it exists");
    }

    let state = Arc::new(AppState::new(config)?);
    info!(
        "LLM provider: {} (model {})",
        state.provider_name(),
        state.model_name()
    );

    server::serve(state, cli.bind).await
}
