//! # xlsx sandbox
//!
//! The security boundary for tools that let an automated agent read and
//! modify spreadsheet files on the local filesystem.
//!
//! Every file-touching operation validates its path first, and every
//! formula-writing operation validates its formula first. The sandbox
//! enforces:
//!
//! - **Directory confinement**: paths must resolve inside one of the
//!   configured `ALLOWED_PATHS` roots
//! - **Traversal rejection**: literal `..` segments are refused before any
//!   resolution happens
//! - **Spreadsheet only**: the resolved path must end in `.xlsx`
//! - **Symlink escapes**: links whose target leaves the allowed roots are
//!   refused, including dangling links
//! - **Size ceiling**: existing files above `MAX_FILE_SIZE_MB` are refused
//! - **Formula deny-list**: `CALL`, `REGISTER`, `EXEC`, `WEBSERVICE`,
//!   `FILTERXML` and `RTD` invocations are refused
//!
//! ## Example
//!
//! ```rust,no_run
//! use xlsx_sandbox::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let sandbox = Sandbox::new(SandboxConfig::resolve("/data/sheets"));
//!     sandbox.log_startup_info();
//!
//!     let path = sandbox.validate_path("/data/sheets/report.xlsx", false)?;
//!     println!("ok: {}", path);
//!
//!     let rejection = sandbox
//!         .validate_path("/data/sheets/../secrets/report.xlsx", false)
//!         .unwrap_err();
//!     assert_eq!(rejection.kind(), RejectionKind::TraversalAttempt);
//!
//!     sandbox.validate_formula("=SUM(A1:A10)")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! `SandboxConfig::from_env` reads `ALLOWED_PATHS`, `MAX_FILE_SIZE_MB`,
//! `SANDBOX_REQUIRE_ALLOWED_PATHS` and `MCP_DEBUG`. With no allowed paths
//! the sandbox is permissive unless `SANDBOX_REQUIRE_ALLOWED_PATHS` is set;
//! allowed paths that are all invalid make it reject everything.

pub mod error;
pub mod logging;
pub mod prelude;
pub mod sandbox;
pub mod sheet;

// Re-export main types at crate root for convenience
pub use error::{Rejection, RejectionKind, Result, SandboxError, ValidationOutcome};
pub use sandbox::config::{SandboxConfig, SandboxConfigBuilder, UnconfiguredPolicy};
pub use sandbox::formula::{validate_formula, ForbiddenFunction};
pub use sandbox::guard::Sandbox;
pub use sandbox::limits::FileSizeLimit;
pub use sandbox::path::{validate_path, ValidatedPath};
