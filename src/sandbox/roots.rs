//! Allow-list resolution and containment.

use std::path::{Path, PathBuf};

/// Separator between entries in `ALLOWED_PATHS`.
pub const ALLOWED_PATHS_SEPARATOR: char = ',';

/// Split a raw allow-list value into trimmed, non-empty entries.
pub fn parse_allowed_paths(raw: &str) -> Vec<PathBuf> {
    raw.split(ALLOWED_PATHS_SEPARATOR)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Canonicalize configured entries into allowed roots.
///
/// Entries that do not exist or are not directories are dropped with a
/// warning. Duplicates (after canonicalization) are kept once, in the order
/// first seen.
pub fn resolve_roots<P: AsRef<Path>>(entries: &[P]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::with_capacity(entries.len());

    for entry in entries {
        let entry = entry.as_ref();
        let canonical = match std::fs::canonicalize(entry) {
            Ok(canonical) => canonical,
            Err(err) => {
                tracing::warn!(
                    path = %entry.display(),
                    error = %err,
                    "ignoring allowed path that cannot be resolved"
                );
                continue;
            }
        };

        if !canonical.is_dir() {
            tracing::warn!(
                path = %entry.display(),
                "ignoring allowed path that is not a directory"
            );
            continue;
        }

        if !roots.contains(&canonical) {
            roots.push(canonical);
        }
    }

    roots
}

/// Check that `path` equals or descends from one of `roots`.
///
/// Containment is component-wise, so `/data/foo` is not inside `/data/fo`.
/// Both sides are expected to be canonical.
pub fn is_within_roots(path: &Path, roots: &[PathBuf]) -> bool {
    roots.iter().any(|root| path.starts_with(root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_trims_and_drops_empty_entries() {
        let entries = parse_allowed_paths(" /data/a , ,/data/b,, ");
        assert_eq!(entries, vec![PathBuf::from("/data/a"), PathBuf::from("/data/b")]);
        assert!(parse_allowed_paths("").is_empty());
        assert!(parse_allowed_paths(" , ").is_empty());
    }

    #[test]
    fn test_resolve_drops_missing_and_non_directories() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("book.xlsx");
        std::fs::write(&file, b"x").unwrap();

        let roots = resolve_roots(&[
            dir.path().to_path_buf(),
            dir.path().join("missing"),
            file,
        ]);
        assert_eq!(roots, vec![dir.path().canonicalize().unwrap()]);
    }

    #[test]
    fn test_resolve_collapses_duplicates() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();

        let roots = resolve_roots(&[dir.path().to_path_buf(), sub.join("."), sub.clone()]);
        assert_eq!(
            roots,
            vec![dir.path().canonicalize().unwrap(), sub.canonicalize().unwrap()]
        );
    }

    #[test]
    fn test_containment_is_component_wise() {
        let roots = vec![PathBuf::from("/data/fo")];
        assert!(is_within_roots(Path::new("/data/fo"), &roots));
        assert!(is_within_roots(Path::new("/data/fo/book.xlsx"), &roots));
        assert!(!is_within_roots(Path::new("/data/foo/book.xlsx"), &roots));
        assert!(!is_within_roots(Path::new("/data"), &roots));
        assert!(!is_within_roots(Path::new("/data/fo/book.xlsx"), &[]));
    }
}
