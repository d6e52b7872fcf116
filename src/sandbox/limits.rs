//! File size limiting for spreadsheet inputs.

use crate::error::{Rejection, RejectionKind, ValidationOutcome};

/// Bytes per megabyte, as used by `MAX_FILE_SIZE_MB`.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Default ceiling in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 100;

/// Size ceiling applied to existing files before anything reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSizeLimit {
    /// Maximum file size in bytes (inclusive).
    max_bytes: u64,
}

impl FileSizeLimit {
    /// Create a limit of `max_bytes` bytes.
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Create a limit from a megabyte count, or `None` if it overflows.
    pub fn from_megabytes(megabytes: u64) -> Option<Self> {
        megabytes.checked_mul(BYTES_PER_MB).map(Self::new)
    }

    /// Get the configured maximum in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check a file length against the ceiling. A file of exactly
    /// `max_bytes` passes.
    pub fn check(&self, len: u64) -> ValidationOutcome<()> {
        if len > self.max_bytes {
            return Err(Rejection::new(
                RejectionKind::TooLarge,
                format!(
                    "file is too large: {} exceeds the {} limit",
                    format_size(len),
                    format_size(self.max_bytes)
                ),
            ));
        }
        Ok(())
    }
}

impl Default for FileSizeLimit {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_MB * BYTES_PER_MB)
    }
}

/// Render a byte count for messages: whole megabytes when exact, bytes otherwise.
pub(crate) fn format_size(bytes: u64) -> String {
    if bytes >= BYTES_PER_MB && bytes % BYTES_PER_MB == 0 {
        format!("{}MB", bytes / BYTES_PER_MB)
    } else {
        format!("{} bytes", bytes)
    }
}
