//! Sandbox configuration with builder pattern.

use std::env::VarError;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::error::{Result, SandboxError};
use crate::sandbox::formula::ForbiddenFunction;
use crate::sandbox::limits::{format_size, FileSizeLimit};
use crate::sandbox::roots::{parse_allowed_paths, resolve_roots};

/// Comma-separated list of allowed root directories.
pub const ALLOWED_PATHS_ENV: &str = "ALLOWED_PATHS";
/// Maximum file size in megabytes.
pub const MAX_FILE_SIZE_MB_ENV: &str = "MAX_FILE_SIZE_MB";
/// Opt-in to deny everything when `ALLOWED_PATHS` is empty.
pub const REQUIRE_ALLOWED_PATHS_ENV: &str = "SANDBOX_REQUIRE_ALLOWED_PATHS";
/// Debug mode toggle.
pub const DEBUG_ENV: &str = "MCP_DEBUG";

/// What to do when no allowed paths were configured at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnconfiguredPolicy {
    /// Skip containment; every location is allowed.
    #[default]
    Permissive,
    /// Enforce containment with no roots; every path is rejected.
    Deny,
}

/// Frozen sandbox state shared by every validation.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    allowed_roots: Vec<PathBuf>,
    enforced: bool,
    size_limit: FileSizeLimit,
    forbidden_functions: Vec<ForbiddenFunction>,
    debug: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            allowed_roots: Vec::new(),
            enforced: false,
            size_limit: FileSizeLimit::default(),
            forbidden_functions: ForbiddenFunction::ALL.to_vec(),
            debug: false,
        }
    }
}

impl SandboxConfig {
    /// Create a new builder for SandboxConfig.
    pub fn builder() -> SandboxConfigBuilder {
        SandboxConfigBuilder::default()
    }

    /// Resolve a raw `ALLOWED_PATHS` value with every other setting at its
    /// default.
    pub fn resolve(raw_allowed_paths: &str) -> Self {
        Self::builder().allowed_paths(raw_allowed_paths).build()
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(|key| std::env::var(key))
    }

    /// Load configuration with a custom env var lookup (for testing).
    pub fn from_env_with<F>(env_fn: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let mut builder = Self::builder();

        if let Some(raw) = env_value(&env_fn, ALLOWED_PATHS_ENV)? {
            builder = builder.allowed_paths(&raw);
        }

        if let Some(raw) = env_value(&env_fn, MAX_FILE_SIZE_MB_ENV)? {
            let megabytes: u64 = raw.trim().parse().map_err(|_| {
                SandboxError::Config(format!(
                    "{} must be a non-negative integer, got '{}'",
                    MAX_FILE_SIZE_MB_ENV, raw
                ))
            })?;
            let limit = FileSizeLimit::from_megabytes(megabytes).ok_or_else(|| {
                SandboxError::Config(format!("{} is too large: {}", MAX_FILE_SIZE_MB_ENV, megabytes))
            })?;
            builder = builder.max_file_size(limit.max_bytes());
        }

        if env_flag(&env_fn, REQUIRE_ALLOWED_PATHS_ENV)? {
            builder = builder.unconfigured_policy(UnconfiguredPolicy::Deny);
        }

        builder = builder.debug(env_flag(&env_fn, DEBUG_ENV)?);

        Ok(builder.build())
    }

    /// Canonical directories under which files may be touched.
    pub fn allowed_roots(&self) -> &[PathBuf] {
        &self.allowed_roots
    }

    /// Whether the containment check is active.
    pub fn is_enforced(&self) -> bool {
        self.enforced
    }

    /// Maximum accepted file size in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.size_limit.max_bytes()
    }

    pub(crate) fn size_limit(&self) -> FileSizeLimit {
        self.size_limit
    }

    /// Formula functions that are always rejected.
    pub fn forbidden_functions(&self) -> &[ForbiddenFunction] {
        &self.forbidden_functions
    }

    /// Whether rejection messages may include canonical paths.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Human-readable summary for startup diagnostics.
    pub fn describe(&self) -> String {
        let mut out = String::new();

        let mode = match (self.enforced, self.allowed_roots.len()) {
            (false, _) => "permissive (no allowed paths configured, every location is allowed)"
                .to_string(),
            (true, 0) => "enforced with no valid allowed paths (every path is rejected)".to_string(),
            (true, n) => format!("enforced ({} allowed root{})", n, if n == 1 { "" } else { "s" }),
        };
        let _ = writeln!(out, "Sandbox: {}", mode);

        if self.allowed_roots.is_empty() {
            let _ = writeln!(out, "Allowed paths: none (set {})", ALLOWED_PATHS_ENV);
        } else {
            let roots: Vec<String> = self
                .allowed_roots
                .iter()
                .map(|root| root.display().to_string())
                .collect();
            let _ = writeln!(out, "Allowed paths: {}", roots.join(", "));
        }

        let _ = writeln!(out, "Max file size: {}", format_size(self.max_file_size()));

        let blocked: Vec<&str> = self.forbidden_functions.iter().map(|f| f.name()).collect();
        let _ = writeln!(out, "Blocked functions: {}", blocked.join(", "));
        let _ = write!(out, "Debug mode: {}", self.debug);

        out
    }
}

/// Unset is `None`; a value that is not valid UTF-8 is a config error.
fn env_value<F>(env_fn: &F, key: &str) -> Result<Option<String>>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    match env_fn(key) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(SandboxError::Config(format!(
            "{} is not valid UTF-8",
            key
        ))),
    }
}

fn env_flag<F>(env_fn: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> std::result::Result<String, VarError>,
{
    Ok(env_value(env_fn, key)?
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false))
}

/// Builder for creating SandboxConfig instances.
#[derive(Debug, Clone, Default)]
pub struct SandboxConfigBuilder {
    allowed_paths: Vec<PathBuf>,
    max_file_size: Option<u64>,
    forbidden_functions: Option<Vec<ForbiddenFunction>>,
    unconfigured_policy: Option<UnconfiguredPolicy>,
    debug: Option<bool>,
}

impl SandboxConfigBuilder {
    /// Add every entry of a comma-separated allow-list.
    pub fn allowed_paths(mut self, raw: &str) -> Self {
        self.allowed_paths.extend(parse_allowed_paths(raw));
        self
    }

    /// Add a single allowed root directory.
    pub fn allowed_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.allowed_paths.push(path.into());
        self
    }

    /// Set the maximum file size in bytes.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    /// Replace the formula deny-list.
    pub fn forbidden_functions(mut self, functions: impl IntoIterator<Item = ForbiddenFunction>) -> Self {
        self.forbidden_functions = Some(functions.into_iter().collect());
        self
    }

    /// Choose the behavior when no allowed paths are configured.
    pub fn unconfigured_policy(mut self, policy: UnconfiguredPolicy) -> Self {
        self.unconfigured_policy = Some(policy);
        self
    }

    /// Enable debug mode.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }

    /// Resolve the allowed roots and build the SandboxConfig.
    pub fn build(self) -> SandboxConfig {
        let default = SandboxConfig::default();
        let allowed_roots = resolve_roots(&self.allowed_paths);

        let enforced = if self.allowed_paths.is_empty() {
            match self.unconfigured_policy.unwrap_or_default() {
                UnconfiguredPolicy::Permissive => {
                    tracing::warn!(
                        "no allowed paths configured; sandbox is permissive and every location is allowed (set {})",
                        ALLOWED_PATHS_ENV
                    );
                    false
                }
                UnconfiguredPolicy::Deny => {
                    tracing::warn!(
                        "no allowed paths configured; every path will be rejected (set {})",
                        ALLOWED_PATHS_ENV
                    );
                    true
                }
            }
        } else {
            if allowed_roots.is_empty() {
                tracing::error!(
                    configured = self.allowed_paths.len(),
                    "none of the configured allowed paths could be resolved; every path will be rejected"
                );
            }
            true
        };

        SandboxConfig {
            allowed_roots,
            enforced,
            size_limit: self
                .max_file_size
                .map(FileSizeLimit::new)
                .unwrap_or(default.size_limit),
            forbidden_functions: self
                .forbidden_functions
                .unwrap_or(default.forbidden_functions),
            debug: self.debug.unwrap_or(default.debug),
        }
    }
}
