//! Gap-filling tree copy.
//!
//! 僅補齊缺漏項目的資料夾樹複製。

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

/// Failure to copy a single entry from the bundle into the workspace.
/// 將單一項目從打包內容複製至工作區失敗。
#[derive(Debug, Error)]
#[error("failed to copy from {from} to {to}")]
pub struct CopyError {
    pub from: PathBuf,
    pub to: PathBuf,
    #[source]
    pub source: io::Error,
}

impl CopyError {
    pub fn new(from: impl Into<PathBuf>, to: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            source,
        }
    }
}

/// A per-entry failure recorded while merging; the merge carries on.
/// 合併過程中記錄的單一項目失敗（合併會繼續進行）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyFailure {
    pub from: PathBuf,
    pub to: PathBuf,
    pub reason: String,
}

impl From<CopyError> for CopyFailure {
    fn from(err: CopyError) -> Self {
        Self {
            reason: err.source.to_string(),
            from: err.from,
            to: err.to,
        }
    }
}

/// Counters describing what a merge did.
/// 描述一次合併結果的計數。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub files_copied: usize,
    pub dirs_created: usize,
    pub skipped_existing: usize,
    pub failures: Vec<CopyFailure>,
}

impl MergeStats {
    /// True when the merge wrote nothing to disk.
    pub fn is_noop(&self) -> bool {
        self.files_copied == 0 && self.dirs_created == 0
    }
}

/// Anything at `path`, including a dangling symlink, counts as present.
pub(crate) fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Copies every entry of `src` that is missing under `dst`.
/// 將 `src` 中 `dst` 尚未具備的項目複製過去，不覆寫既有內容。
///
/// Existing destination entries are never touched. Only the creation of
/// `dst` itself is fatal; later failures are collected in
/// [`MergeStats::failures`].
pub fn merge_missing_tree(src: &Path, dst: &Path) -> Result<MergeStats, CopyError> {
    let mut stats = MergeStats::default();
    if !dst.is_dir() {
        fs::create_dir_all(dst).map_err(|err| CopyError::new(src, dst, err))?;
        stats.dirs_created += 1;
    }

    let mut walker = WalkDir::new(src)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let from = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| src.to_path_buf());
                tracing::warn!(path = %from.display(), "unable to read bundled entry: {err}");
                stats.failures.push(CopyFailure {
                    to: target_for(src, dst, &from),
                    from,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        let target = target_for(src, dst, entry.path());

        if entry.file_type().is_dir() {
            if target.is_dir() {
                continue;
            }
            if occupied(&target) {
                // A user file shadows this directory; leave it and its subtree alone.
                stats.skipped_existing += 1;
                walker.skip_current_dir();
                continue;
            }
            match fs::create_dir_all(&target) {
                Ok(()) => stats.dirs_created += 1,
                Err(err) => {
                    let failure = CopyError::new(entry.path(), &target, err);
                    tracing::warn!("{failure}: {}", failure.source);
                    stats.failures.push(failure.into());
                    walker.skip_current_dir();
                }
            }
            continue;
        }

        if occupied(&target) {
            stats.skipped_existing += 1;
            continue;
        }
        if !entry.file_type().is_file() {
            // Sockets, FIFOs and devices cannot be copied; reading a FIFO would block.
            let failure = CopyFailure {
                from: entry.path().to_path_buf(),
                to: target,
                reason: "not a regular file".to_string(),
            };
            tracing::warn!(path = %failure.from.display(), "skipping special file");
            stats.failures.push(failure);
            continue;
        }
        match copy_file(entry.path(), &target) {
            Ok(_) => {
                tracing::debug!(to = %target.display(), "copied");
                stats.files_copied += 1;
            }
            Err(err) => {
                let failure = CopyError::new(entry.path(), &target, err);
                tracing::warn!("{failure}: {}", failure.source);
                stats.failures.push(failure.into());
            }
        }
    }
    Ok(stats)
}

/// Copies a single file unless something already exists at `dst`.
/// 若目的地不存在則複製單一檔案。回傳是否有實際複製。
pub fn copy_missing_file(src: &Path, dst: &Path) -> Result<bool, CopyError> {
    if occupied(dst) {
        return Ok(false);
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|err| CopyError::new(src, dst, err))?;
    }
    copy_file(src, dst).map_err(|err| CopyError::new(src, dst, err))?;
    Ok(true)
}

/// Copies contents and permissions, then carries the source mtime over.
/// 複製內容與權限，並保留來源檔案的修改時間。
fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;
    let modified = fs::metadata(src)?.modified()?;
    // Read-only handle: copied files may carry read-only permissions.
    if let Err(err) = File::open(dst).and_then(|file| file.set_modified(modified)) {
        tracing::debug!(path = %dst.display(), "unable to preserve mtime: {err}");
    }
    Ok(())
}

/// Lists the relative paths a merge of `src` into `dst` would create.
/// 列出合併時將會新增的相對路徑（不寫入任何檔案）。
pub fn pending_entries(src: &Path, dst: &Path) -> Vec<PathBuf> {
    let mut pending = Vec::new();
    let mut walker = WalkDir::new(src)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();
    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else { continue };
        let target = target_for(src, dst, entry.path());
        if occupied(&target) {
            if entry.file_type().is_dir() && !target.is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }
        if !entry.file_type().is_dir() && !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(src) {
            pending.push(relative.to_path_buf());
        }
    }
    pending
}

fn target_for(src: &Path, dst: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(src) {
        Ok(relative) => dst.join(relative),
        Err(_) => dst.to_path_buf(),
    }
}
