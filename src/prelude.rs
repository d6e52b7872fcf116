//! Prelude module for convenient imports.

pub use crate::error::{Rejection, RejectionKind, Result, SandboxError, ValidationOutcome};
pub use crate::sandbox::{
    config::{SandboxConfig, UnconfiguredPolicy},
    formula::ForbiddenFunction,
    guard::Sandbox,
    path::ValidatedPath,
};
