use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Installs console + daily rolling file output.
/// The returned guard must live as long as the process or buffered lines are lost.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&config.directory)?;

    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .with(fmt::layer().with_target(false).compact())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

/// Path of the file the daily appender is writing today (`<prefix>.YYYY-MM-DD`)
pub fn current_log_file(config: &LoggingConfig) -> PathBuf {
    log_file_for(Path::new(&config.directory), &config.file_prefix, chrono::Utc::now().date_naive())
}

pub fn log_file_for(directory: &Path, prefix: &str, date: chrono::NaiveDate) -> PathBuf {
    directory.join(format!("{}.{}", prefix, date.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn log_file_uses_rolling_suffix() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let path = log_file_for(Path::new("/var/log/juntas"), "juntas-api.log", date);
        assert_eq!(path, PathBuf::from("/var/log/juntas/juntas-api.log.2026-03-07"));
    }

    #[test]
    fn init_creates_log_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("logs");
        let config = LoggingConfig {
            directory: dir.to_string_lossy().into_owned(),
            file_prefix: "test.log".to_string(),
            filter: "warn".to_string(),
        };

        // A global subscriber may already be installed by another test; the
        // directory is created before that matters.
        let _ = init_logging(&config);
        assert!(dir.exists());
    }
}
