//! Logging Infrastructure
//!
//! - Console output, JSON in production and pretty otherwise
//! - Daily rotating application logs under `app/`, deleted after 14 days
//! - Daily rotating activity logs under `audit/`, never deleted
//!
//! `RUST_LOG` overrides the configured level.

use crate::activity::AUDIT_TARGET;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Days application logs are kept
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

const APP_PREFIX: &str = "app";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn console_layer(level: &str, json_format: bool) -> BoxedLayer {
    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter(level))
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter(level))
            .boxed()
    }
}

fn file_layer(
    level: &str,
    json_format: bool,
    appender: RollingFileAppender,
    audit: bool,
) -> BoxedLayer {
    let by_target = filter_fn(move |meta| (meta.target() == AUDIT_TARGET) == audit);
    let writer = std::sync::Mutex::new(appender);
    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .with_filter(by_target)
            .with_filter(env_filter(level))
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(by_target)
            .with_filter(env_filter(level))
            .boxed()
    }
}

/// Initialize the logging system
///
/// # Examples
/// ```no_run
/// # use konveksi_server::utils::logger::init_logger_with_file;
/// # async fn run() -> anyhow::Result<()> {
/// // Development setup (console only)
/// init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + files)
/// init_logger_with_file("info", true, Some(std::path::Path::new("./work_dir/logs")))?;
/// # Ok(())
/// # }
/// ```
///
/// File logging spawns the cleanup task, so it must run inside a tokio runtime.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let mut layers: Vec<BoxedLayer> = vec![console_layer(level, json_format)];

    if let Some(log_dir) = log_dir {
        let app_log_dir = log_dir.join("app");
        let audit_log_dir = log_dir.join("audit");
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&audit_log_dir)?;

        let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, APP_PREFIX);
        let audit_log = RollingFileAppender::new(Rotation::DAILY, audit_log_dir, "audit");
        layers.push(file_layer(level, json_format, app_log, false));
        layers.push(file_layer(level, json_format, audit_log, true));

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry().with(layers).try_init()?;
    Ok(())
}

/// Console-only logging
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Delete application logs older than [`APP_LOG_RETENTION_DAYS`]
///
/// Returns the number of files removed.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    remove_app_logs_before(&log_dir.join("app"), cutoff)
}

/// Rolling files are named `app.YYYY-MM-DD`
fn remove_app_logs_before(app_log_dir: &Path, cutoff: NaiveDate) -> anyhow::Result<usize> {
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let date = name
            .strip_prefix(APP_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        if let Some(date) = date
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Runs every hour
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
        sleep(Duration::from_secs(3600)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_keeps_recent_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["app.2026-01-01", "app.2026-02-20", "notes.txt", "audit.2020-01-01"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        let cutoff = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert_eq!(remove_app_logs_before(dir.path(), cutoff).unwrap(), 1);

        assert!(!dir.path().join("app.2026-01-01").exists());
        assert!(dir.path().join("app.2026-02-20").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("audit.2020-01-01").exists());
    }

    #[test]
    fn test_missing_dir_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(&dir.path().join("nope")).unwrap(), 0);
    }
}
