//! Tracing setup
//!
//! Filter comes from `MFLIX_LOG` (default `warn`). CLI runs log to stderr;
//! the TUI owns the terminal, so it logs to `<cache_dir>/mflix/mflix.log`.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "MFLIX_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "warn".into())
}

/// Log file used in TUI mode
pub fn log_file_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("mflix").join("mflix.log"))
}

/// Log to stderr
pub fn init_stderr() {
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Log to the cache-dir log file. Logging is silently off when the file
/// cannot be opened.
pub fn init_file() {
    let Some(path) = log_file_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init();
}
