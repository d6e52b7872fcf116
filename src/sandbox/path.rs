//! Path validation for spreadsheet files.
//!
//! Every path an operation wants to touch goes through [`validate_path`]
//! first. The checks run in a fixed order and stop at the first failure:
//!
//! 1. Non-empty input
//! 2. No literal `..` segment (either separator)
//! 3. Canonicalization, following symlinks (dangling ones included)
//! 4. `.xlsx` extension
//! 5. Containment in an allowed root (when enforced)
//! 6. Parent directory exists
//! 7. Target exists (when required)
//! 8. Size ceiling (existing regular files)
//! 9. Symlink targets stay inside the allowed roots
//!
//! Syntactic checks come before anything touches the filesystem. A passing
//! path is only valid at the moment of the check; the file can change before
//! the caller opens it.

use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Rejection, RejectionKind, ValidationOutcome};
use crate::sandbox::config::{SandboxConfig, ALLOWED_PATHS_ENV};
use crate::sandbox::roots::is_within_roots;

/// The only spreadsheet extension the sandbox accepts.
pub const SPREADSHEET_EXTENSION: &str = "xlsx";

/// Symlink hops followed before giving up on a link chain.
const MAX_SYMLINK_HOPS: usize = 40;

/// A canonical path that passed every active check.
///
/// Only [`validate_path`] creates these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedPath {
    path: PathBuf,
}

impl ValidatedPath {
    /// The canonical absolute path.
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Consume the wrapper, returning the canonical path.
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for ValidatedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ValidatedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Validate `raw` against `config`.
///
/// With `must_exist` the file has to be present and within the size limit;
/// without it only the parent directory has to exist, so the path may name a
/// file about to be created.
pub fn validate_path(
    raw: &str,
    must_exist: bool,
    config: &SandboxConfig,
) -> ValidationOutcome<ValidatedPath> {
    let check = PathCheck { raw, config };

    if raw.trim().is_empty() {
        return Err(check.reject(RejectionKind::MalformedInput, "path cannot be empty", None));
    }

    if has_traversal_segment(raw) {
        return Err(check.reject(RejectionKind::TraversalAttempt, "path traversal detected", None));
    }

    let canonical = canonicalize_lenient(Path::new(raw)).map_err(|err| {
        tracing::debug!(path = raw, error = %err, "path could not be resolved");
        check.reject(RejectionKind::MalformedInput, "invalid path", None)
    })?;

    if !has_spreadsheet_extension(&canonical) {
        let ext = canonical
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| "none".to_string());
        let reason = format!(
            "unsupported extension '{}', only .{} files are allowed",
            ext, SPREADSHEET_EXTENSION
        );
        return Err(check.reject(RejectionKind::UnsupportedExtension, &reason, Some(&canonical)));
    }

    if config.is_enforced() && !is_within_roots(&canonical, config.allowed_roots()) {
        let reason = format!(
            "path is outside the allowed directories (check {})",
            ALLOWED_PATHS_ENV
        );
        return Err(check.reject(RejectionKind::OutsideSandbox, &reason, Some(&canonical)));
    }

    if !canonical.parent().is_some_and(Path::is_dir) {
        return Err(check.reject(
            RejectionKind::MissingParentDirectory,
            "parent directory does not exist",
            Some(&canonical),
        ));
    }

    if must_exist {
        if !canonical.exists() {
            return Err(check.reject(RejectionKind::NotFound, "file not found", Some(&canonical)));
        }

        let metadata = std::fs::metadata(&canonical).map_err(|err| {
            tracing::debug!(path = %canonical.display(), error = %err, "cannot read metadata");
            check.reject(RejectionKind::NotFound, "file metadata unavailable", Some(&canonical))
        })?;
        if metadata.is_file() {
            config
                .size_limit()
                .check(metadata.len())
                .map_err(|rejection| check.reject(rejection.kind(), rejection.message(), Some(&canonical)))?;
        }
    }

    if config.is_enforced() {
        for candidate in [Path::new(raw), canonical.as_path()] {
            if !is_symlink(candidate) {
                continue;
            }
            let escapes = match canonicalize_lenient(candidate) {
                Ok(target) => {
                    let escapes = !is_within_roots(&target, config.allowed_roots());
                    if escapes {
                        tracing::warn!(
                            path = raw,
                            target = %target.display(),
                            "symbolic link points outside the allowed directories"
                        );
                    }
                    escapes
                }
                Err(err) => {
                    tracing::warn!(path = raw, error = %err, "symbolic link could not be resolved");
                    true
                }
            };
            if escapes {
                return Err(check.reject(
                    RejectionKind::OutsideSandbox,
                    "symbolic link points outside the allowed directories",
                    None,
                ));
            }
        }
    }

    Ok(ValidatedPath { path: canonical })
}

/// Rejection builder that logs and redacts consistently.
struct PathCheck<'a> {
    raw: &'a str,
    config: &'a SandboxConfig,
}

impl PathCheck<'_> {
    fn reject(&self, kind: RejectionKind, reason: &str, canonical: Option<&Path>) -> Rejection {
        let resolved = canonical.map(|p| p.display().to_string());
        let rejection = Rejection::new(kind, format!("{}: {}", reason, self.raw));

        if rejection.is_security_violation() {
            tracing::warn!(kind = %kind, path = self.raw, resolved = ?resolved, "{}", reason);
        } else {
            tracing::debug!(kind = %kind, path = self.raw, resolved = ?resolved, "{}", reason);
        }

        match resolved {
            Some(resolved) if self.config.is_debug() => Rejection::new(
                kind,
                format!("{} (resolved to {})", rejection.message(), resolved),
            ),
            _ => rejection,
        }
    }
}

/// Detect a `..` segment under either separator convention.
///
/// Trailing whitespace is ignored and runs of three or more dots also count,
/// since some platforms trim those when resolving names.
fn has_traversal_segment(raw: &str) -> bool {
    raw.split(|c: char| c == '/' || c == '\\').any(|segment| {
        let segment = segment.trim_end();
        segment.len() >= 2 && segment.chars().all(|c| c == '.')
    })
}

fn has_spreadsheet_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SPREADSHEET_EXTENSION))
}

fn is_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Canonicalize a path whose trailing components may not exist yet.
///
/// The deepest existing ancestor is canonicalized (following symlinks) and
/// the missing components are appended. A dangling symlink anywhere along the
/// way is followed to the path it names, so the result never ends in a link.
pub(crate) fn canonicalize_lenient(path: &Path) -> io::Result<PathBuf> {
    let mut current = absolutize(path)?;
    for _ in 0..MAX_SYMLINK_HOPS {
        match resolve_existing_prefix(&current)? {
            Resolved::Done(resolved) => return Ok(resolved),
            Resolved::DanglingLink(next) => current = next,
        }
    }

    Err(io::Error::new(
        io::ErrorKind::Other,
        "too many levels of symbolic links",
    ))
}

enum Resolved {
    Done(PathBuf),
    /// A dangling link was found; holds its target joined with the rest of the path.
    DanglingLink(PathBuf),
}

fn resolve_existing_prefix(absolute: &Path) -> io::Result<Resolved> {
    let mut existing = absolute;
    let mut missing: Vec<&OsStr> = Vec::new();

    loop {
        match std::fs::canonicalize(existing) {
            Ok(mut resolved) => {
                resolved.extend(missing.iter().rev().copied());
                return Ok(Resolved::Done(resolved));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if let Ok(target) = std::fs::read_link(existing) {
                    let mut next = match existing.parent() {
                        Some(parent) => parent.join(target),
                        None => target,
                    };
                    next.extend(missing.iter().rev().copied());
                    return Ok(Resolved::DanglingLink(next));
                }
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(err);
                };
                missing.push(name);
                existing = parent;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn enforced(root: &Path) -> SandboxConfig {
        SandboxConfig::builder().allowed_root(root).build()
    }

    fn path_str(path: &Path) -> String {
        path.display().to_string()
    }

    #[test]
    fn test_traversal_segments() {
        assert!(has_traversal_segment("../a.xlsx"));
        assert!(has_traversal_segment("a/../b.xlsx"));
        assert!(has_traversal_segment("a\\..\\b.xlsx"));
        assert!(has_traversal_segment("a/.. /b.xlsx"));
        assert!(has_traversal_segment("a/.../b.xlsx"));
        assert!(has_traversal_segment(".."));
        assert!(!has_traversal_segment("report..xlsx"));
        assert!(!has_traversal_segment("./a/.hidden/b.xlsx"));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(has_spreadsheet_extension(Path::new("/a/b.xlsx")));
        assert!(has_spreadsheet_extension(Path::new("/a/b.XLSX")));
        assert!(!has_spreadsheet_extension(Path::new("/a/b.xls")));
        assert!(!has_spreadsheet_extension(Path::new("/a/b.xlsx.csv")));
        assert!(!has_spreadsheet_extension(Path::new("/a/.xlsx")));
    }

    #[test]
    fn test_canonicalize_lenient_appends_missing_components() {
        let dir = TempDir::new().unwrap();
        let canonical_dir = dir.path().canonicalize().unwrap();

        let resolved = canonicalize_lenient(&dir.path().join("new").join("book.xlsx")).unwrap();
        assert_eq!(resolved, canonical_dir.join("new").join("book.xlsx"));

        let resolved = canonicalize_lenient(&dir.path().join(".").join("book.xlsx")).unwrap();
        assert_eq!(resolved, canonical_dir.join("book.xlsx"));
    }

    #[cfg(unix)]
    #[test]
    fn test_canonicalize_lenient_follows_dangling_links() {
        let dir = TempDir::new().unwrap();
        let canonical_dir = dir.path().canonicalize().unwrap();

        std::os::unix::fs::symlink(dir.path().join("payload.sh"), dir.path().join("book.xlsx"))
            .unwrap();
        let resolved = canonicalize_lenient(&dir.path().join("book.xlsx")).unwrap();
        assert_eq!(resolved, canonical_dir.join("payload.sh"));

        std::os::unix::fs::symlink("missing", dir.path().join("linked")).unwrap();
        let resolved = canonicalize_lenient(&dir.path().join("linked").join("new.xlsx")).unwrap();
        assert_eq!(resolved, canonical_dir.join("missing").join("new.xlsx"));

        std::os::unix::fs::symlink("loop-b", dir.path().join("loop-a")).unwrap();
        std::os::unix::fs::symlink("loop-a", dir.path().join("loop-b")).unwrap();
        assert!(canonicalize_lenient(&dir.path().join("loop-a")).is_err());
    }

    #[test]
    fn test_rejects_blank() {
        let config = SandboxConfig::default();
        for raw in ["", "   ", "\t\n"] {
            let rejection = validate_path(raw, false, &config).unwrap_err();
            assert_eq!(rejection.kind(), RejectionKind::MalformedInput);
        }
    }

    #[test]
    fn test_accepts_new_file_inside_root() {
        let dir = TempDir::new().unwrap();
        let config = enforced(dir.path());
        let target = dir.path().join("report.xlsx");

        let validated = validate_path(&path_str(&target), false, &config).unwrap();
        assert_eq!(
            validated.as_path(),
            dir.path().canonicalize().unwrap().join("report.xlsx")
        );
    }

    #[test]
    fn test_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let config = enforced(dir.path());
        let target = dir.path().join("nested").join("report.xlsx");

        let rejection = validate_path(&path_str(&target), false, &config).unwrap_err();
        assert_eq!(rejection.kind(), RejectionKind::MissingParentDirectory);
    }

    #[test]
    fn test_not_found_is_distinct() {
        let dir = TempDir::new().unwrap();
        let config = enforced(dir.path());
        let target = dir.path().join("absent.xlsx");

        let rejection = validate_path(&path_str(&target), true, &config).unwrap_err();
        assert_eq!(rejection.kind(), RejectionKind::NotFound);
        assert!(rejection.is_not_found());
        assert!(!rejection.is_security_violation());
    }

    #[test]
    fn test_messages_hide_canonical_path_unless_debug() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let target = other.path().join("report.xlsx");
        let canonical = other.path().canonicalize().unwrap().join("report.xlsx");
        let canonical = path_str(&canonical);

        let quiet = enforced(dir.path());
        let rejection = validate_path(&path_str(&target), false, &quiet).unwrap_err();
        assert_eq!(rejection.kind(), RejectionKind::OutsideSandbox);
        assert!(!rejection.message().contains("resolved to"));

        let verbose = SandboxConfig::builder()
            .allowed_root(dir.path())
            .debug(true)
            .build();
        let rejection = validate_path(&path_str(&target), false, &verbose).unwrap_err();
        assert!(rejection.message().contains(&canonical));
    }

    #[test]
    fn test_directory_named_like_a_workbook_skips_size_check() {
        let dir = TempDir::new().unwrap();
        let fake = dir.path().join("folder.xlsx");
        std::fs::create_dir(&fake).unwrap();
        let config = SandboxConfig::builder()
            .allowed_root(dir.path())
            .max_file_size(0)
            .build();

        assert!(validate_path(&path_str(&fake), true, &config).is_ok());
    }
}
