//! Best-effort re-owning of the workspace to the invoking user.
//!
//! When the materializer runs from an installer hook it usually runs as root,
//! so freshly copied files would otherwise stay root-owned inside the user's
//! documents folder. The owner of the home directory is taken as the user.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Summary of an ownership pass.
/// 擁有者調整流程的摘要。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnershipReport {
    pub changed: usize,
    pub failed: Vec<PathBuf>,
    pub skipped_reason: Option<String>,
}

impl OwnershipReport {
    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            skipped_reason: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// Re-owns every entry under `root` to the owner of `home`.
/// 將 `root` 底下所有項目的擁有者調整為 `home` 的擁有者。
#[cfg(unix)]
pub fn normalize_ownership(root: &Path, home: &Path) -> OwnershipReport {
    use std::os::unix::fs::{lchown, MetadataExt};
    use walkdir::WalkDir;

    let owner = match std::fs::metadata(home) {
        Ok(meta) => (meta.uid(), meta.gid()),
        Err(err) => {
            tracing::warn!(home = %home.display(), "cannot determine workspace owner: {err}");
            return OwnershipReport::skipped(format!("home metadata unavailable: {err}"));
        }
    };

    let mut report = OwnershipReport::default();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("ownership walk error: {err}");
                if let Some(path) = err.path() {
                    report.failed.push(path.to_path_buf());
                }
                continue;
            }
        };
        let Ok(meta) = entry.metadata() else {
            report.failed.push(entry.path().to_path_buf());
            continue;
        };
        if (meta.uid(), meta.gid()) == owner {
            continue;
        }
        match lchown(entry.path(), Some(owner.0), Some(owner.1)) {
            Ok(()) => report.changed += 1,
            Err(err) => {
                tracing::warn!(path = %entry.path().display(), "chown failed: {err}");
                report.failed.push(entry.path().to_path_buf());
            }
        }
    }
    report
}

#[cfg(not(unix))]
pub fn normalize_ownership(_root: &Path, _home: &Path) -> OwnershipReport {
    OwnershipReport::skipped("ownership normalization is only performed on unix")
}
