//! Structured logging module for PromptQuest
//!
//! Writes logs to the configured log directory with categories:
//! - SESSION: Session lifecycle and persistence
//! - NARRATIVE: Oracle (primary) completions
//! - PROFILER: Trait estimation calls and raw replies
//! - ARCHETYPE: Classification outcomes
//! - ERROR: Errors and failed upstream calls

use chrono::{Local, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use once_cell::sync::Lazy;

/// Log categories for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Session,   // Session lifecycle (create, turn, delete)
    Narrative, // Primary completion calls
    Profiler,  // Trait estimation
    Archetype, // Classification results
    Error,     // Errors and failures
}

impl LogCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Session => "SESSION",
            LogCategory::Narrative => "NARRATIVE",
            LogCategory::Profiler => "PROFILER",
            LogCategory::Archetype => "ARCHETYPE",
            LogCategory::Error => "ERROR",
        }
    }
}

/// Log directory, set once by `init_logging`. Console-only until then.
static LOG_DIR: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

/// Get today's log file path inside `dir`
fn log_file_path(dir: &Path) -> PathBuf {
    let today = Local::now().format("%Y-%m-%d").to_string();
    dir.join(format!("promptquest-{}.log", today))
}

/// Initialize the logging system - creates log directory if needed
pub fn init_logging(log_dir: &Path) -> std::io::Result<()> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)?;
    }

    if let Ok(mut dir) = LOG_DIR.lock() {
        *dir = Some(log_dir.to_path_buf());
    }

    log(LogCategory::Session, None, "PromptQuest logging initialized");

    Ok(())
}

/// Render a single log line (without trailing newline handling by caller)
pub fn format_line(category: LogCategory, session_id: Option<&str>, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let session_context = session_id
        .map(|id| {
            let short: String = id.chars().take(8).collect();
            format!("session={} | ", short)
        })
        .unwrap_or_default();

    format!(
        "[{}] [{}] {}{}\n",
        timestamp,
        category.as_str(),
        session_context,
        message
    )
}

/// Log a message with category and optional session context
pub fn log(category: LogCategory, session_id: Option<&str>, message: &str) {
    let log_line = format_line(category, session_id, message);

    // Always print to console
    print!("{}", log_line);

    let dir = LOG_DIR.lock().ok().and_then(|d| d.clone());
    let Some(dir) = dir else {
        return;
    };

    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path(&dir))
    {
        let _ = file.write_all(log_line.as_bytes());
    }
}

/// Log a session lifecycle event
pub fn log_session(session_id: Option<&str>, message: &str) {
    log(LogCategory::Session, session_id, message);
}

/// Log a narrative completion event
pub fn log_narrative(session_id: Option<&str>, message: &str) {
    log(LogCategory::Narrative, session_id, message);
}

/// Log a trait estimation event
pub fn log_profiler(session_id: Option<&str>, message: &str) {
    log(LogCategory::Profiler, session_id, message);
}

/// Log a classification outcome
pub fn log_archetype(session_id: Option<&str>, message: &str) {
    log(LogCategory::Archetype, session_id, message);
}

/// Log an error
pub fn log_error(session_id: Option<&str>, message: &str) {
    log(LogCategory::Error, session_id, message);
}

/// Clean up old log files (keep last `keep_days` days)
pub fn cleanup_old_logs(log_dir: &Path, keep_days: i64) -> std::io::Result<usize> {
    let mut deleted = 0;

    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - chrono::Duration::days(keep_days);

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_log = path.extension().map(|ext| ext == "log").unwrap_or(false);
        if !is_log {
            continue;
        }

        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            let modified_time: chrono::DateTime<Utc> = modified.into();
            if modified_time < cutoff && fs::remove_file(&path).is_ok() {
                deleted += 1;
            }
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_truncates_session_id() {
        let line = format_line(
            LogCategory::Profiler,
            Some("0f8fad5b-d9cb-469f-a165-70867728950e"),
            "raw reply",
        );

        assert!(line.contains("[PROFILER] session=0f8fad5b | raw reply"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_format_line_without_session() {
        let line = format_line(LogCategory::Error, None, "boom");
        assert!(line.contains("[ERROR] boom"));
        assert!(!line.contains("session="));
    }

    #[test]
    fn test_cleanup_keeps_fresh_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("promptquest-2026-01-01.log"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        // Both files were just written, nothing is old enough
        assert_eq!(cleanup_old_logs(dir.path(), 7).unwrap(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(cleanup_old_logs(&missing, 7).unwrap(), 0);
    }
}
