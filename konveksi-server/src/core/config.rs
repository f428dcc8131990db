use crate::persistence::SyncSettings;
use crate::score::ScoreRules;
use chrono::NaiveTime;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./work_dir | snapshot cache and logs |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development, staging or production |
/// | LOG_LEVEL | info | default filter when `RUST_LOG` is unset |
/// | LOG_JSON | true in production | JSON console output |
/// | REMOTE_STORE_URL | unset | remote store base URL; in-process store when unset |
/// | REMOTE_TIMEOUT_MS | 10000 | remote request timeout |
/// | SYNC_DEBOUNCE_MS | 500 | quiet period before a sync |
/// | SYNC_MAX_RETRIES | 3 | push attempts per sync |
/// | SYNC_RETRY_DELAY_MS | 1000 | first backoff delay |
/// | ACTIVITY_LOG_CAPACITY | 500 | activity entries kept |
/// | WORK_START | 08:00 | start of the working day |
/// | LATE_GRACE_MINUTES | 5 | minutes after `WORK_START` still on time |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | grace period for background tasks |
///
/// ```ignore
/// WORK_DIR=/data/konveksi HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub remote_store_url: Option<String>,
    pub remote_timeout_ms: u64,
    pub sync_debounce_ms: u64,
    pub sync_max_retries: u32,
    pub sync_retry_delay_ms: u64,
    pub activity_log_capacity: usize,
    pub work_start: NaiveTime,
    pub late_grace_minutes: i64,
    pub shutdown_timeout_ms: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";
        let default_rules = ScoreRules::default();

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./work_dir".into()),
            http_port: env_or("HTTP_PORT", 3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", is_production),
            environment,
            remote_store_url: std::env::var("REMOTE_STORE_URL")
                .ok()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            remote_timeout_ms: env_or("REMOTE_TIMEOUT_MS", 10_000),
            sync_debounce_ms: env_or("SYNC_DEBOUNCE_MS", 500),
            sync_max_retries: env_or("SYNC_MAX_RETRIES", 3),
            sync_retry_delay_ms: env_or("SYNC_RETRY_DELAY_MS", 1000),
            activity_log_capacity: env_or("ACTIVITY_LOG_CAPACITY", 500),
            work_start: std::env::var("WORK_START")
                .ok()
                .and_then(|v| NaiveTime::parse_from_str(v.trim(), "%H:%M").ok())
                .unwrap_or(default_rules.work_start),
            late_grace_minutes: env_or("LATE_GRACE_MINUTES", default_rules.grace_minutes),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10_000),
        }
    }

    /// Override the work dir and port, keeping everything else from the environment
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn cache_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("snapshot.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn score_rules(&self) -> ScoreRules {
        ScoreRules {
            work_start: self.work_start,
            grace_minutes: self.late_grace_minutes,
            ..ScoreRules::default()
        }
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            debounce: Duration::from_millis(self.sync_debounce_ms),
            max_retries: self.sync_max_retries,
            retry_delay: Duration::from_millis(self.sync_retry_delay_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_settings() {
        let mut config = Config::with_overrides("/tmp/konveksi", 8080);
        config.work_start = NaiveTime::from_hms_opt(7, 30, 0).unwrap();
        config.late_grace_minutes = 10;
        config.sync_debounce_ms = 250;

        let rules = config.score_rules();
        assert_eq!(rules.work_start, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(rules.grace_minutes, 10);
        assert_eq!(rules.base, ScoreRules::default().base);

        assert_eq!(config.sync_settings().debounce, Duration::from_millis(250));
        assert_eq!(
            config.cache_path(),
            PathBuf::from("/tmp/konveksi/snapshot.redb")
        );
        assert_eq!(config.http_port, 8080);
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("KONVEKSI_TEST_UNSET_VARIABLE", 42u32), 42);
    }
}
