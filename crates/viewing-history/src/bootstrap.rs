use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use viewing_data::reader::EXPORT_FILE_NAME;

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `DEBUG`/`INFO`/`WARNING`/`ERROR` level name to an `EnvFilter` directive.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr so that `--format json` on stdout stays parseable.
/// Falls back to `"info"` if the level string is not recognised.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Export discovery ───────────────────────────────────────────────────────────

/// Locate an export when none was given on the command line or in the config.
///
/// Checks, in order:
/// 1. `./ViewingActivity.csv`
/// 2. `./netflix-report/`
/// 3. `~/Downloads/netflix-report/`
/// 4. `~/Downloads/ViewingActivity.csv`
pub fn discover_export_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok();
    let home = dirs::home_dir();
    discover_export_in(cwd.as_deref(), home.as_deref())
}

fn discover_export_in(cwd: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(cwd) = cwd {
        candidates.push(cwd.join(EXPORT_FILE_NAME));
        candidates.push(cwd.join("netflix-report"));
    }
    if let Some(home) = home {
        let downloads = home.join("Downloads");
        candidates.push(downloads.join("netflix-report"));
        candidates.push(downloads.join(EXPORT_FILE_NAME));
    }
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
