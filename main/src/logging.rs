use std::fs::OpenOptions;
use std::path::Path;

use common::error::AppError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sets up tracing with two outputs: a compact console layer and an
/// append-only plain-text file layer, so each run extends the same log file.
pub fn init_logging(log_path: &Path) -> Result<(), AppError> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(log_path)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().compact())
        .with(fmt::layer().with_writer(file).with_ansi(false))
        .try_init()
        .ok();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_creates_the_log_file() {
        let dir = tempdir().expect("failed to create temp dir");
        let log_path = dir.path().join("run.log");

        init_logging(&log_path).expect("logging init should succeed");
        assert!(log_path.exists());

        // A second init must not fail even though the global subscriber is
        // already installed.
        init_logging(&log_path).expect("re-init should be a no-op");
    }

    #[test]
    fn init_fails_when_the_directory_is_missing() {
        let result = init_logging(Path::new("/nonexistent-dir/run.log"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
