//! Bundled asset descriptions and the candidate resolver.
//!
//! 打包資產的描述與候選路徑解析。
//!
//! The same logical asset lands in different places depending on how the
//! application was bundled: beside the executable, inside a contents
//! directory, or under the `.app` bundle's `Resources`/`Frameworks`. Every
//! asset therefore carries an ordered candidate list, and the first candidate
//! that exists wins.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::layout::{WorkspaceLayout, ASSETS_DIR, EXAMPLES_DIR, PORTLIST_FILE};

/// Whether an asset is materialized as a directory tree or a single file.
/// 資產以資料夾樹或單一檔案形式複製。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Directory,
    File,
}

impl AssetKind {
    /// Returns true when `path` exists with the expected kind.
    pub fn matches(self, path: &Path) -> bool {
        match self {
            AssetKind::Directory => path.is_dir(),
            AssetKind::File => path.is_file(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Directory => "directory",
            AssetKind::File => "file",
        }
    }
}

/// A logical bundled resource and the places it may live.
/// 一個邏輯上的打包資源與其可能的實體位置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetSpec {
    pub name: String,
    pub kind: AssetKind,
    pub destination: PathBuf,
    pub candidates: Vec<PathBuf>,
}

impl AssetSpec {
    pub fn new(
        name: impl Into<String>,
        kind: AssetKind,
        destination: impl Into<PathBuf>,
        candidates: Vec<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            destination: destination.into(),
            candidates,
        }
    }

    /// First candidate that exists with this asset's kind.
    /// 第一個存在且類型相符的候選路徑。
    pub fn resolve(&self) -> Option<PathBuf> {
        resolve(&self.candidates, self.kind)
    }
}

/// Returns the first candidate that exists as `kind`, in priority order.
/// 依優先順序回傳第一個存在的候選路徑。
pub fn resolve<P: AsRef<Path>>(candidates: &[P], kind: AssetKind) -> Option<PathBuf> {
    for candidate in candidates {
        let candidate = candidate.as_ref();
        if kind.matches(candidate) {
            tracing::debug!(path = %candidate.display(), kind = kind.label(), "candidate resolved");
            return Some(candidate.to_path_buf());
        }
    }
    None
}

/// Ordered bundle roots to search for a given install root.
/// 依安裝根目錄推導出的搜尋根目錄（依優先順序）。
pub fn search_roots(install_root: &Path, extra_roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots = vec![
        install_root.to_path_buf(),
        install_root.join("_internal"),
        install_root.join("Contents").join("Resources"),
        install_root.join("Contents").join("Frameworks"),
        install_root.join("Contents").join("MacOS"),
    ];
    if let Some(parent) = install_root.parent() {
        roots.push(parent.join("Resources"));
        roots.push(parent.join("Frameworks"));
    }
    roots.extend(extra_roots.iter().cloned());
    dedup_paths(roots)
}

/// Drops repeated paths while keeping the first occurrence in place.
pub fn dedup_paths(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect()
}

fn candidates_under(roots: &[PathBuf], relative: &Path) -> Vec<PathBuf> {
    roots.iter().map(|root| root.join(relative)).collect()
}

/// The fixed asset set copied into every workspace.
/// 每個工作區都會複製的固定資產清單。
pub fn default_asset_specs(layout: &WorkspaceLayout, roots: &[PathBuf]) -> Vec<AssetSpec> {
    let assets = Path::new(ASSETS_DIR);
    let entries: [(&str, AssetKind, PathBuf, PathBuf); 5] = [
        (
            "examples",
            AssetKind::Directory,
            PathBuf::from(EXAMPLES_DIR),
            layout.examples_dir(),
        ),
        (
            "library",
            AssetKind::Directory,
            assets.join("components").join("library"),
            layout.library_dir(),
        ),
        (
            "symbols",
            AssetKind::Directory,
            assets.join("symbols"),
            layout.symbols_dir(),
        ),
        (
            "chips",
            AssetKind::Directory,
            assets.join("chips"),
            layout.chips_dir(),
        ),
        (
            "portlist",
            AssetKind::File,
            PathBuf::from(PORTLIST_FILE),
            layout.portlist_path(),
        ),
    ];
    entries
        .into_iter()
        .map(|(name, kind, relative, destination)| {
            AssetSpec::new(name, kind, destination, candidates_under(roots, &relative))
        })
        .collect()
}
