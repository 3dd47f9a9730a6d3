//! # Observability
//!
//! Centralized logging initialization for the Proact sync core.
//!
//! ## Design Philosophy
//!
//! Components are **log producers**, not log consumers or streamers. They
//! call [`init`] once at startup and use standard `tracing` macros
//! throughout their code. They have zero knowledge of:
//!
//! - Where logs go (file, stderr)
//! - Who consumes logs (tooling, dashboards, aggregators)
//!
//! All components write structured JSONL to a single central file:
//! `~/.proact/logs/dev.jsonl`
//!
//! This enables:
//! - `tail -f ~/.proact/logs/dev.jsonl` for raw streaming
//! - `tail -f ~/.proact/logs/dev.jsonl | jq` for pretty JSON
//!
//! ## Usage
//!
//! ```rust,ignore
//! fn main() {
//!     observability::init("sync-core");
//!
//!     tracing::info!("session started");
//! }
//! ```

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Once;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: Once = Once::new();

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the component (e.g., "sync-core", "gateway").
    /// Included in every log line for filtering.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by the `RUST_LOG` environment variable.
    pub default_level: String,

    /// Optional custom log file path.
    /// Defaults to `~/.proact/logs/dev.jsonl`.
    pub log_path: Option<PathBuf>,

    /// Also emit human-readable logs to stderr for immediate feedback.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Returns the default central log file path.
///
/// Falls back to a relative path when the home directory cannot be resolved.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".proact")
        .join("logs")
        .join("dev.jsonl")
}

/// Initialize logging with the default configuration for a service.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with explicit configuration.
///
/// Safe to call more than once; only the first call installs the global
/// subscriber. Installation failure (another subscriber already set by the
/// embedding process) is not an error.
pub fn init_with_config(config: LogConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.default_level.clone()));

        let path = config.log_path.clone().unwrap_or_else(default_log_path);
        let file = open_log_file(&path);

        let json_layer = file.map(|file| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_writer(Arc::new(file))
        });

        let stderr_layer = config.also_stderr.then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::new(config.default_level.clone()))
        });

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(json_layer)
            .with(stderr_layer)
            .try_init();

        tracing::debug!(service = %config.service_name, "logging initialized");
    });
}

/// Opens the central log file for appending, creating parent directories.
///
/// Returns None when the file cannot be opened; logging then degrades to
/// the stderr layer (if enabled) rather than failing startup.
fn open_log_file(path: &std::path::Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            eprintln!("observability: cannot create log dir {}", parent.display());
            return None;
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("observability: cannot open {}: {}", path.display(), err);
            None
        }
    }
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
