pub mod archetype;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod openai;
pub mod profiler;
pub mod prompts;
pub mod server;
pub mod traits;

use config::{Config, LOG_RETENTION_DAYS};
use db::Store;
use openai::OpenAIClient;
use server::AppState;
use std::error::Error;
use std::sync::Arc;

// ============ App Initialization ============

/// Set up logging, keeping console output if the log directory is unusable.
pub fn init_logging(config: &Config) {
    let log_dir = config.log_dir();

    if let Err(e) = logging::init_logging(&log_dir) {
        eprintln!("Failed to initialize logging in {}: {}", log_dir.display(), e);
        return;
    }

    // Clean up old log files (keep last 7 days)
    match logging::cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS) {
        Ok(0) => {}
        Ok(n) => logging::log_session(None, &format!("Removed {} old log files", n)),
        Err(e) => logging::log_error(None, &format!("Log cleanup failed: {}", e)),
    }
}

/// Validate the config, open the session store and serve the HTTP API.
pub async fn run(config: Config) -> Result<(), Box<dyn Error + Send + Sync>> {
    config.validate()?;

    let store = Store::open(&config.db_path())?;
    logging::log_session(None, &format!("Session store at {}", config.db_path().display()));

    let backend = Arc::new(OpenAIClient::new(&config)?);
    logging::log_narrative(None, &format!("Using model {} at {}", config.model, config.api_base));

    let state = AppState::new(config, backend, store);
    server::serve(state).await?;

    Ok(())
}

/// Ask the upstream API whether the configured key works.
pub async fn check_api_key(config: &Config) -> Result<bool, Box<dyn Error + Send + Sync>> {
    config.validate()?;
    let client = OpenAIClient::new(config)?;
    Ok(client.validate_api_key().await?)
}
