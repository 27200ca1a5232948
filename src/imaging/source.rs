//! Source asset resolution.
//!
//! # Responsibilities
//! - Map a derivative request path (`/a/b.jpg.webp`) to its source file
//! - Stat the source and classify failures
//! - Answer conditional-GET freshness questions
//!
//! # Design Decisions
//! - Resolved per request, never cached (freshness matters for 304s)
//! - Modification times are truncated to whole seconds, the HTTP-date precision
//! - Permission errors are 403; every other stat failure is 404

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::http::response::DeliveryError;

/// Suffix that marks a derivative image request.
pub const DERIVATIVE_SUFFIX: &str = ".webp";

/// Map a request path onto a file under `root`.
///
/// Returns `None` when the path is not a derivative request, names nothing
/// once the suffix is stripped, or tries to leave the docroot.
pub fn locate(root: &Path, request_path: &str) -> Option<PathBuf> {
    let stripped = request_path.strip_suffix(DERIVATIVE_SUFFIX)?;
    let relative = stripped.trim_start_matches('/');
    if relative.is_empty() || relative.split('/').any(|segment| segment == "..") {
        return None;
    }
    Some(root.join(relative))
}

/// A source file that exists and is readable enough to stat.
#[derive(Debug, Clone)]
pub struct SourceAsset {
    path: PathBuf,
    modified: SystemTime,
}

impl SourceAsset {
    /// Stat `path` without blocking the runtime.
    pub async fn stat(path: PathBuf) -> Result<Self, DeliveryError> {
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => return Err(classify_stat_error(path, &e)),
        };

        if !metadata.is_file() {
            return Err(DeliveryError::NotFound);
        }

        let modified = metadata.modified().map_err(|_| DeliveryError::NotFound)?;
        Ok(Self::new(path, modified))
    }

    pub fn new(path: PathBuf, modified: SystemTime) -> Self {
        Self {
            path,
            modified: truncate_to_seconds(modified),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time, truncated to whole seconds.
    pub fn last_modified(&self) -> SystemTime {
        self.modified
    }

    /// True if the source has not changed after `since`.
    pub fn not_modified_since(&self, since: SystemTime) -> bool {
        self.modified <= since
    }
}

/// Permission errors are 403; anything else reads as a missing source.
fn classify_stat_error(path: PathBuf, error: &std::io::Error) -> DeliveryError {
    if error.kind() == ErrorKind::PermissionDenied {
        return DeliveryError::Forbidden(path);
    }
    tracing::debug!(path = %path.display(), error = %error, "Source stat failed");
    DeliveryError::NotFound
}

fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    UNIX_EPOCH + Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_strips_suffix() {
        let root = Path::new("/srv/site");
        assert_eq!(
            locate(root, "/img/a.jpg.webp"),
            Some(PathBuf::from("/srv/site/img/a.jpg"))
        );
        assert_eq!(locate(root, "/img/a.jpg"), None);
        assert_eq!(locate(root, "/img/a.webp.png"), None);
    }

    #[test]
    fn test_locate_rejects_empty_and_traversal() {
        let root = Path::new("/srv/site");
        assert_eq!(locate(root, "/.webp"), None);
        assert_eq!(locate(root, "/../etc/passwd.webp"), None);
        assert_eq!(locate(root, "/a/../../b.png.webp"), None);
        assert_eq!(
            locate(root, "/a/..b.png.webp"),
            Some(PathBuf::from("/srv/site/a/..b.png"))
        );
    }

    #[test]
    fn test_modified_time_is_truncated() {
        let mtime = UNIX_EPOCH + Duration::from_millis(1_700_000_000_750);
        let asset = SourceAsset::new(PathBuf::from("/x"), mtime);
        assert_eq!(asset.last_modified(), UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        assert!(asset.not_modified_since(UNIX_EPOCH + Duration::from_secs(1_700_000_000)));
        assert!(!asset.not_modified_since(UNIX_EPOCH + Duration::from_secs(1_699_999_999)));
    }

    #[test]
    fn test_stat_error_classification() {
        let path = PathBuf::from("/srv/site/locked.jpg");

        let denied = std::io::Error::from(ErrorKind::PermissionDenied);
        let err = classify_stat_error(path.clone(), &denied);
        assert!(matches!(&err, DeliveryError::Forbidden(p) if *p == path));
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);

        for kind in [ErrorKind::NotFound, ErrorKind::Other, ErrorKind::InvalidInput] {
            let err = classify_stat_error(path.clone(), &std::io::Error::from(kind));
            assert!(matches!(err, DeliveryError::NotFound), "{kind:?}");
            assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_stat_classifies_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SourceAsset::stat(dir.path().join("nope.png")).await;
        assert!(matches!(missing, Err(DeliveryError::NotFound)));

        let directory = SourceAsset::stat(dir.path().to_path_buf()).await;
        assert!(matches!(directory, Err(DeliveryError::NotFound)));

        let file = dir.path().join("a.png");
        std::fs::write(&file, b"not really a png").unwrap();
        let asset = SourceAsset::stat(file.clone()).await.unwrap();
        assert_eq!(asset.path(), file.as_path());
    }
}
