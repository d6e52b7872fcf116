//! The sandbox facade used by tool dispatchers.

use std::sync::Arc;

use crate::error::{Result, SandboxError, ValidationOutcome};
use crate::sandbox::config::SandboxConfig;
use crate::sandbox::formula;
use crate::sandbox::path::{self, ValidatedPath};

/// Path and formula guard bound to one frozen configuration.
///
/// Cloning is cheap and every clone shares the same configuration, so a
/// single `Sandbox` can serve any number of concurrent operations.
#[derive(Debug, Clone)]
pub struct Sandbox {
    config: Arc<SandboxConfig>,
}

impl Sandbox {
    /// Create a sandbox from a configuration.
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Create a sandbox configured from the process environment.
    pub fn from_env() -> Result<Self> {
        SandboxConfig::from_env().map(Self::new)
    }

    /// The configuration this sandbox enforces.
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    /// Validate a path before any filesystem access.
    ///
    /// # Arguments
    /// * `path` - The path as supplied by the caller
    /// * `must_exist` - Require the file to exist (reads) or only its parent
    ///   directory (writes that may create it)
    pub fn validate_path(&self, path: &str, must_exist: bool) -> ValidationOutcome<ValidatedPath> {
        path::validate_path(path, must_exist, &self.config)
    }

    /// Validate a path on the blocking thread pool.
    ///
    /// Same checks as [`Sandbox::validate_path`]; the filesystem metadata
    /// reads run off the async executor.
    pub async fn validate_path_async(&self, path: &str, must_exist: bool) -> Result<ValidatedPath> {
        let config = Arc::clone(&self.config);
        let path = path.to_string();

        let handle = tokio::task::spawn_blocking(move || {
            path::validate_path(&path, must_exist, &config)
        });

        match handle.await {
            Ok(outcome) => outcome.map_err(SandboxError::from),
            Err(e) => Err(SandboxError::TaskFailed(format!("task panicked: {}", e))),
        }
    }

    /// Validate a formula before it is stored in a cell.
    pub fn validate_formula(&self, text: &str) -> ValidationOutcome<()> {
        formula::validate_formula(text, self.config.forbidden_functions())
    }

    /// Human-readable summary of the sandbox state.
    pub fn describe(&self) -> String {
        self.config.describe()
    }

    /// Emit the startup summary as `info` events.
    pub fn log_startup_info(&self) {
        tracing::info!("{}", "=".repeat(50));
        tracing::info!("xlsx sandbox v{}", env!("CARGO_PKG_VERSION"));
        for line in self.describe().lines() {
            tracing::info!("{}", line);
        }
        if !self.config.is_enforced() {
            tracing::warn!("path sandboxing is disabled; any .xlsx file on this machine can be accessed");
        }
        tracing::info!("{}", "=".repeat(50));
    }
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new(SandboxConfig::default())
    }
}
