//! Filename sanitization and containment-checked path resolution.

use crate::traits::{StorageError, StorageResult};
use std::path::{Component, Path, PathBuf};

const MAX_FILENAME_LENGTH: usize = 255;

/// Reduce a client-supplied name to a safe, flat file name.
///
/// Path separators and whitespace runs become `_`, anything outside
/// `[A-Za-z0-9._-]` is dropped and leading/trailing dots and underscores are
/// trimmed. The extension is kept when the name has to be shortened. The result
/// may be empty; callers decide whether that is an error.
pub fn secure_filename(filename: &str) -> String {
    let flattened: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let trimmed = kept.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() <= MAX_FILENAME_LENGTH {
        return trimmed.to_string();
    }

    // ASCII only at this point, so byte slicing is char-safe.
    match trimmed.rsplit_once('.') {
        Some((stem, ext)) if ext.len() < MAX_FILENAME_LENGTH - 1 => {
            let stem_len = MAX_FILENAME_LENGTH - ext.len() - 1;
            format!("{}.{}", &stem[..stem_len.min(stem.len())], ext)
        }
        _ => trimmed[..MAX_FILENAME_LENGTH].to_string(),
    }
}

/// Maps logical file names to paths inside a single storage root.
///
/// Resolution is pure path arithmetic: nothing is read from or written to disk.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: normalize(&root.into()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `filename` to a path under the storage root.
    ///
    /// Fails with [`StorageError::InvalidPath`] for empty names, absolute paths,
    /// `..` components, names that sanitize to nothing, and anything whose
    /// normalized form is not under the normalized root.
    pub fn resolve(&self, filename: &str) -> StorageResult<PathBuf> {
        if filename.trim().is_empty() {
            return Err(StorageError::InvalidPath(
                "File name must not be empty".to_string(),
            ));
        }

        if filename.starts_with('/') || filename.starts_with('\\') {
            return Err(StorageError::InvalidPath(format!(
                "Absolute paths are not allowed: {}",
                filename
            )));
        }

        if filename.split(['/', '\\']).any(|part| part == "..") {
            return Err(StorageError::InvalidPath(format!(
                "File name contains path traversal: {}",
                filename
            )));
        }

        let safe_name = secure_filename(filename);
        if safe_name.is_empty() {
            return Err(StorageError::InvalidPath(format!(
                "File name has no usable characters: {}",
                filename
            )));
        }

        let candidate = normalize(&self.root.join(&safe_name));
        if candidate == self.root || !candidate.starts_with(&self.root) {
            tracing::warn!(
                filename = %filename,
                candidate = %candidate.display(),
                root = %self.root.display(),
                "Rejected path outside storage root"
            );
            return Err(StorageError::InvalidPath(format!(
                "File name resolves outside storage directory: {}",
                filename
            )));
        }

        Ok(candidate)
    }
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename_keeps_plain_names() {
        assert_eq!(secure_filename("report.docx"), "report.docx");
        assert_eq!(secure_filename("Q3-summary_v2.docx"), "Q3-summary_v2.docx");
    }

    #[test]
    fn test_secure_filename_flattens_directories_and_spaces() {
        assert_eq!(secure_filename("My Report.docx"), "My_Report.docx");
        assert_eq!(secure_filename("a/b\\c.docx"), "a_b_c.docx");
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
    }

    #[test]
    fn test_secure_filename_strips_unsafe_characters() {
        assert_eq!(secure_filename("in<voice>?.docx"), "invoice.docx");
        assert_eq!(secure_filename(".hidden"), "hidden");
        assert_eq!(secure_filename("___"), "");
        assert_eq!(secure_filename("\u{00e9}\u{00e9}"), "");
    }

    #[test]
    fn test_secure_filename_truncates_but_keeps_extension() {
        let long = format!("{}.docx", "a".repeat(400));
        let safe = secure_filename(&long);
        assert_eq!(safe.len(), MAX_FILENAME_LENGTH);
        assert!(safe.ends_with(".docx"));
    }

    #[test]
    fn test_resolve_ordinary_name_stays_under_root() {
        let resolver = PathResolver::new("/srv/uploads");
        let path = resolver.resolve("report.docx").unwrap();
        assert_eq!(path, PathBuf::from("/srv/uploads/report.docx"));
        assert!(path.starts_with(resolver.root()));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let resolver = PathResolver::new("/srv/uploads");
        for name in ["../secret.docx", "../../etc/passwd", "a/../../b", "..\\..\\win.ini", ".."] {
            let result = resolver.resolve(name);
            assert!(
                matches!(result, Err(StorageError::InvalidPath(_))),
                "expected InvalidPath for {name:?}"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_empty_and_absolute() {
        let resolver = PathResolver::new("/srv/uploads");
        assert!(matches!(
            resolver.resolve(""),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            resolver.resolve("   "),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            resolver.resolve("/etc/passwd"),
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            resolver.resolve("..."),
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_resolve_is_stable_for_generated_names() {
        let resolver = PathResolver::new("static/uploads");
        let name = "processed_5f0c2a9e-8d1b-4c3e-9f7a-2b6d4e8c1a0f_report.docx";
        let path = resolver.resolve(name).unwrap();
        assert_eq!(path, PathBuf::from("static/uploads").join(name));
    }

    #[test]
    fn test_normalize_folds_parent_components() {
        assert_eq!(
            normalize(Path::new("/srv/./uploads/../uploads/x")),
            PathBuf::from("/srv/uploads/x")
        );
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
    }
}
