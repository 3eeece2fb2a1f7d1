//! Runtime configuration.
//!
//! Built once at startup from CLI flags and environment variables and then
//! passed explicitly to the server and the completion client.

use crate::error::ConfigError;
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_NARRATIVE_TEMPERATURE: f32 = 0.85;
pub const DEFAULT_PROFILER_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_PROFILER_WINDOW: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const LOG_RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, default_value = "")]
    pub api_key: String,

    /// Base URL of the chat-completions API
    #[arg(long, env = "PROMPTQUEST_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Model used for both the narrative and the profiler call
    #[arg(long, env = "PROMPTQUEST_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature for the narrative call
    #[arg(long, env = "PROMPTQUEST_NARRATIVE_TEMPERATURE", default_value_t = DEFAULT_NARRATIVE_TEMPERATURE)]
    pub narrative_temperature: f32,

    /// Sampling temperature for the trait estimation call
    #[arg(long, env = "PROMPTQUEST_PROFILER_TEMPERATURE", default_value_t = DEFAULT_PROFILER_TEMPERATURE)]
    pub profiler_temperature: f32,

    /// Number of most recent user messages the profiler sees
    #[arg(long, env = "PROMPTQUEST_PROFILER_WINDOW", default_value_t = DEFAULT_PROFILER_WINDOW)]
    pub profiler_window: usize,

    /// Upstream request timeout in seconds
    #[arg(long = "timeout", env = "PROMPTQUEST_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Address the HTTP server binds to
    #[arg(long, env = "PROMPTQUEST_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// SQLite session database (default: ~/.promptquest/promptquest.db)
    #[arg(long = "db", env = "PROMPTQUEST_DB")]
    pub db_path: Option<PathBuf>,

    /// Log directory (default: ~/.promptquest/logs)
    #[arg(long, env = "PROMPTQUEST_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            narrative_temperature: DEFAULT_NARRATIVE_TEMPERATURE,
            profiler_temperature: DEFAULT_PROFILER_TEMPERATURE,
            profiler_window: DEFAULT_PROFILER_WINDOW,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            db_path: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Check values that clap cannot express as types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        check_temperature("narrative temperature", self.narrative_temperature)?;
        check_temperature("profiler temperature", self.profiler_temperature)?;
        if self.profiler_window == 0 {
            return Err(ConfigError::EmptyProfilerWindow);
        }
        Ok(())
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| data_dir().join("promptquest.db"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| data_dir().join("logs"))
    }
}

fn check_temperature(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=2.0).contains(&value) {
        return Err(ConfigError::TemperatureOutOfRange {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".promptquest")
}
