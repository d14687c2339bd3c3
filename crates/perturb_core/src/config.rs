//! Run configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::RunError;

/// Pool size used when the host does not report its parallelism
const FALLBACK_WORKERS: usize = 4;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Worker pool size. `None` uses the host's available parallelism.
    pub workers: Option<usize>,
    pub display: DisplayConfig,
}

impl RunConfig {
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Number of workers to start
    pub fn effective_workers(&self) -> Result<usize, RunError> {
        match self.workers {
            Some(0) => Err(RunError::Config(
                "workers must be at least 1".to_string(),
            )),
            Some(n) => Ok(n),
            None => Ok(std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(FALLBACK_WORKERS)),
        }
    }
}

/// Virtual display used when a model suppresses graphics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// X display name, e.g. `:99`
    pub server: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// How long the server must stay up before the session counts as started
    pub startup_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            server: ":99".to_string(),
            width: 1024,
            height: 768,
            depth: 24,
            startup_ms: 250,
        }
    }
}

impl DisplayConfig {
    /// Screen geometry in Xvfb's `WxHxD` notation
    #[must_use]
    pub fn geometry(&self) -> String {
        format!("{}x{}x{}", self.width, self.height, self.depth)
    }

    #[must_use]
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_workers_rejected() {
        let config = RunConfig::default().with_workers(0);
        assert!(matches!(
            config.effective_workers(),
            Err(RunError::Config(_))
        ));
    }

    #[test]
    fn test_default_workers_positive() {
        assert!(RunConfig::default().effective_workers().unwrap() >= 1);
        assert_eq!(
            RunConfig::default().with_workers(3).effective_workers().unwrap(),
            3
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{"display":{"server":":42"}}"#).unwrap();
        assert_eq!(config.workers, None);
        assert_eq!(config.display.server, ":42");
        assert_eq!(config.display.geometry(), "1024x768x24");
        assert_eq!(config.display.startup_timeout(), Duration::from_millis(250));
    }
}
