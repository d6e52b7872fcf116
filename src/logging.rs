//! Default `tracing` subscriber for hosts embedding the sandbox.
//!
//! Output goes to stderr so it never mixes with a tool protocol on stdout.

use tracing_subscriber::EnvFilter;

use crate::error::{Result, SandboxError};

/// Fallback log level when `RUST_LOG` is unset.
pub const LOG_LEVEL_ENV: &str = "MCP_LOG_LEVEL";

/// Install a formatting subscriber.
///
/// `RUST_LOG` wins when set; otherwise `MCP_LOG_LEVEL` picks the level,
/// defaulting to `info`. Fails if a global subscriber is already installed.
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(level_directive(std::env::var(LOG_LEVEL_ENV).ok().as_deref()))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| SandboxError::Config(format!("failed to install logger: {}", e)))
}

/// Map a level name to a filter directive; unknown names fall back to `info`.
fn level_directive(level: Option<&str>) -> &'static str {
    match level.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("warn") | Some("warning") => "warn",
        Some("error") | Some("critical") => "error",
        _ => "info",
    }
}
