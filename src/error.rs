//! Error types for the spreadsheet sandbox.

use std::fmt;

use thiserror::Error;

/// The category of a validation rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// Empty or blank input, a formula without a leading `=`, or a path the
    /// OS refused to resolve.
    MalformedInput,
    /// A literal `..` segment in the raw path.
    TraversalAttempt,
    /// The canonical path does not end in `.xlsx`.
    UnsupportedExtension,
    /// The path (or a symlink's target) is not under any allowed root.
    OutsideSandbox,
    /// The directory that would contain the file does not exist.
    MissingParentDirectory,
    /// The file was required to exist and does not.
    NotFound,
    /// The file is larger than the configured ceiling.
    TooLarge,
    /// The formula calls a deny-listed function.
    ForbiddenFunction,
}

impl RejectionKind {
    /// Short, stable identifier suitable for log fields and tool responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::MalformedInput => "malformed_input",
            RejectionKind::TraversalAttempt => "traversal_attempt",
            RejectionKind::UnsupportedExtension => "unsupported_extension",
            RejectionKind::OutsideSandbox => "outside_sandbox",
            RejectionKind::MissingParentDirectory => "missing_parent_directory",
            RejectionKind::NotFound => "not_found",
            RejectionKind::TooLarge => "too_large",
            RejectionKind::ForbiddenFunction => "forbidden_function",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed refusal returned by the path, formula and sheet validators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Rejection {
    kind: RejectionKind,
    message: String,
}

impl Rejection {
    /// Create a rejection of the given kind.
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a [`RejectionKind::MalformedInput`] rejection.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(RejectionKind::MalformedInput, message)
    }

    /// The rejection category.
    pub fn kind(&self) -> RejectionKind {
        self.kind
    }

    /// The human-readable reason.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this rejection was caused by hostile-looking input rather
    /// than a missing file or a typo.
    pub fn is_security_violation(&self) -> bool {
        matches!(
            self.kind,
            RejectionKind::TraversalAttempt
                | RejectionKind::UnsupportedExtension
                | RejectionKind::OutsideSandbox
                | RejectionKind::ForbiddenFunction
        )
    }

    /// Check if this rejection means the target file does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind == RejectionKind::NotFound
    }
}

/// Result of a single validation: the accepted value or a [`Rejection`].
pub type ValidationOutcome<T> = std::result::Result<T, Rejection>;

/// Errors raised while configuring or driving the sandbox.
#[derive(Error, Debug)]
pub enum SandboxError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A validation rejected its input.
    #[error("rejected ({}): {}", .0.kind, .0.message)]
    Rejected(#[from] Rejection),

    /// A blocking validation task failed to complete.
    #[error("validation task failed: {0}")]
    TaskFailed(String),
}

impl SandboxError {
    /// The wrapped rejection, if this error is one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            SandboxError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Check if this error represents a configuration problem.
    pub fn is_config(&self) -> bool {
        matches!(self, SandboxError::Config(_))
    }
}

/// Result type alias for sandbox operations.
pub type Result<T> = std::result::Result<T, SandboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display_is_message() {
        let rejection = Rejection::new(RejectionKind::TooLarge, "file too large");
        assert_eq!(rejection.to_string(), "file too large");
        assert_eq!(rejection.kind(), RejectionKind::TooLarge);
    }

    #[test]
    fn test_security_classification() {
        assert!(Rejection::new(RejectionKind::TraversalAttempt, "x").is_security_violation());
        assert!(Rejection::new(RejectionKind::OutsideSandbox, "x").is_security_violation());
        assert!(Rejection::new(RejectionKind::ForbiddenFunction, "x").is_security_violation());
        assert!(!Rejection::new(RejectionKind::NotFound, "x").is_security_violation());
        assert!(!Rejection::malformed("x").is_security_violation());

        assert!(Rejection::new(RejectionKind::NotFound, "x").is_not_found());
        assert!(!Rejection::new(RejectionKind::TooLarge, "x").is_not_found());
    }

    #[test]
    fn test_error_helpers() {
        let err = SandboxError::from(Rejection::new(RejectionKind::OutsideSandbox, "denied"));
        assert_eq!(
            err.rejection().map(Rejection::kind),
            Some(RejectionKind::OutsideSandbox)
        );
        assert_eq!(err.to_string(), "rejected (outside_sandbox): denied");
        assert!(!err.is_config());

        let config = SandboxError::Config("bad value".to_string());
        assert!(config.is_config());
        assert!(config.rejection().is_none());
    }
}
