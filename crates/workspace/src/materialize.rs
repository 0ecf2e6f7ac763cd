//! First-run population of the user workspace from bundled assets.
//!
//! 首次執行時，依打包內容建立並補齊使用者工作區。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::assets::{default_asset_specs, search_roots, AssetKind, AssetSpec};
use crate::config::MaterializeConfig;
use crate::layout::WorkspaceLayout;
use crate::merge::{self, pending_entries, MergeStats};
use crate::ownership::{normalize_ownership, OwnershipReport};

/// Fatal materialization errors. Everything else lands in the report.
/// 物化流程中的致命錯誤；其餘狀況僅記錄於報告中。
#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("failed to create workspace directory {path}")]
    WorkspaceCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Runtime switches for a materialization run.
/// 物化流程的執行選項。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializeOptions {
    pub extra_search_roots: Vec<PathBuf>,
    /// Write an empty portlist when the bundle ships none.
    pub seed_empty_portlist: bool,
    pub normalize_ownership: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self::from(&MaterializeConfig::default())
    }
}

impl From<&MaterializeConfig> for MaterializeOptions {
    fn from(config: &MaterializeConfig) -> Self {
        Self {
            extra_search_roots: config.extra_search_roots.clone(),
            seed_empty_portlist: config.seed_empty_portlist,
            normalize_ownership: config.normalize_ownership,
        }
    }
}

/// What happened to one asset.
/// 單一資產的處理結果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetOutcome {
    Merged { source: PathBuf, stats: MergeStats },
    Copied { source: PathBuf },
    Seeded,
    AlreadyPresent,
    NotFound { tried: Vec<PathBuf> },
    Failed { source: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReport {
    pub name: String,
    pub kind: AssetKind,
    pub destination: PathBuf,
    pub outcome: AssetOutcome,
}

/// Result of a materialization run.
/// 一次物化流程的結果報告。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub workspace_root: PathBuf,
    pub assets: Vec<AssetReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ownership: Option<OwnershipReport>,
}

impl MaterializeReport {
    pub fn asset(&self, name: &str) -> Option<&AssetReport> {
        self.assets.iter().find(|asset| asset.name == name)
    }

    /// Total per-entry and whole-asset failures.
    pub fn failure_count(&self) -> usize {
        self.assets
            .iter()
            .map(|asset| match &asset.outcome {
                AssetOutcome::Merged { stats, .. } => stats.failures.len(),
                AssetOutcome::Failed { .. } => 1,
                _ => 0,
            })
            .sum()
    }
}

/// Dry-run view of one asset.
/// 單一資產的預演結果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAsset {
    pub name: String,
    pub kind: AssetKind,
    pub destination: PathBuf,
    pub source: Option<PathBuf>,
    pub pending: Vec<PathBuf>,
}

/// Populates the workspace under a home directory from an install root.
/// 依安裝根目錄，將打包資產複製至使用者工作區。
#[derive(Debug, Clone)]
pub struct Materializer {
    install_root: PathBuf,
    home: PathBuf,
    layout: WorkspaceLayout,
    options: MaterializeOptions,
}

impl Materializer {
    pub fn new(install_root: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            install_root: install_root.into(),
            layout: WorkspaceLayout::from_home(&home),
            home,
            options: MaterializeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: MaterializeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn search_roots(&self) -> Vec<PathBuf> {
        search_roots(&self.install_root, &self.options.extra_search_roots)
    }

    pub fn asset_specs(&self) -> Vec<AssetSpec> {
        default_asset_specs(&self.layout, &self.search_roots())
    }

    /// Runs the full materialization.
    /// 執行完整的物化流程。
    pub fn run(&self) -> Result<MaterializeReport, MaterializeError> {
        for dir in self.layout.fixed_dirs() {
            fs::create_dir_all(&dir)
                .map_err(|source| MaterializeError::WorkspaceCreation { path: dir, source })?;
        }
        info!(root = %self.layout.root().display(), "workspace ready");

        let assets = self
            .asset_specs()
            .into_iter()
            .map(|spec| {
                let outcome = match spec.kind {
                    AssetKind::Directory => self.materialize_dir(&spec),
                    AssetKind::File => self.materialize_file(&spec),
                };
                log_outcome(&spec, &outcome);
                AssetReport {
                    name: spec.name,
                    kind: spec.kind,
                    destination: spec.destination,
                    outcome,
                }
            })
            .collect();

        let ownership = self
            .options
            .normalize_ownership
            .then(|| normalize_ownership(self.layout.root(), &self.home));

        Ok(MaterializeReport {
            workspace_root: self.layout.root().to_path_buf(),
            assets,
            ownership,
        })
    }

    /// Resolves every asset and lists what a run would add, without writing.
    /// 解析所有資產並列出將新增的項目，不寫入磁碟。
    pub fn plan(&self) -> Vec<PlannedAsset> {
        self.asset_specs()
            .into_iter()
            .map(|spec| {
                let source = spec.resolve();
                let pending = match (&source, spec.kind) {
                    (Some(src), AssetKind::Directory) => pending_entries(src, &spec.destination),
                    (_, AssetKind::File)
                        if !merge::occupied(&spec.destination)
                            && (source.is_some() || self.options.seed_empty_portlist) =>
                    {
                        spec
                            .destination
                            .file_name()
                            .map(PathBuf::from)
                            .into_iter()
                            .collect()
                    }
                    _ => Vec::new(),
                };
                PlannedAsset {
                    name: spec.name,
                    kind: spec.kind,
                    destination: spec.destination,
                    source,
                    pending,
                }
            })
            .collect()
    }

    fn materialize_dir(&self, spec: &AssetSpec) -> AssetOutcome {
        let Some(source) = spec.resolve() else {
            return AssetOutcome::NotFound {
                tried: spec.candidates.clone(),
            };
        };
        match merge::merge_missing_tree(&source, &spec.destination) {
            Ok(stats) => AssetOutcome::Merged { source, stats },
            Err(err) => AssetOutcome::Failed {
                source,
                reason: err.source.to_string(),
            },
        }
    }

    fn materialize_file(&self, spec: &AssetSpec) -> AssetOutcome {
        if merge::occupied(&spec.destination) {
            return AssetOutcome::AlreadyPresent;
        }
        match spec.resolve() {
            Some(source) => match merge::copy_missing_file(&source, &spec.destination) {
                Ok(true) => AssetOutcome::Copied { source },
                Ok(false) => AssetOutcome::AlreadyPresent,
                Err(err) => AssetOutcome::Failed {
                    source,
                    reason: err.source.to_string(),
                },
            },
            None if self.options.seed_empty_portlist => {
                match fs::write(&spec.destination, b"") {
                    Ok(()) => AssetOutcome::Seeded,
                    Err(err) => AssetOutcome::Failed {
                        source: spec.destination.clone(),
                        reason: err.to_string(),
                    },
                }
            }
            None => AssetOutcome::NotFound {
                tried: spec.candidates.clone(),
            },
        }
    }
}

fn log_outcome(spec: &AssetSpec, outcome: &AssetOutcome) {
    let name = spec.name.as_str();
    match outcome {
        AssetOutcome::Merged { source, stats } => info!(
            asset = name,
            source = %source.display(),
            copied = stats.files_copied,
            skipped = stats.skipped_existing,
            failed = stats.failures.len(),
            "merged bundled directory"
        ),
        AssetOutcome::Copied { source } => {
            info!(asset = name, source = %source.display(), "copied bundled file")
        }
        AssetOutcome::Seeded => info!(asset = name, "seeded empty file"),
        AssetOutcome::AlreadyPresent => debug!(asset = name, "already present"),
        AssetOutcome::NotFound { tried } => {
            info!(asset = name, candidates = tried.len(), "not bundled; skipped")
        }
        AssetOutcome::Failed { source, reason } => warn!(
            asset = name,
            source = %source.display(),
            "materialization failed: {reason}"
        ),
    }
}

/// Materializes the default workspace under `user_home` from `install_root`.
/// 以預設選項執行物化流程。
pub fn materialize(
    install_root: impl AsRef<Path>,
    user_home: impl AsRef<Path>,
) -> Result<MaterializeReport, MaterializeError> {
    Materializer::new(install_root.as_ref(), user_home.as_ref()).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_options_match_config_defaults() {
        let options = MaterializeOptions::default();
        assert_eq!(options, MaterializeOptions::from(&MaterializeConfig::default()));
        assert!(options.normalize_ownership);
        assert!(!options.seed_empty_portlist);
    }

    #[test]
    fn plan_lists_seeded_portlist_as_pending() {
        let home = tempdir().unwrap();
        let bundle = tempdir().unwrap();
        let portlist = |seed: bool| {
            Materializer::new(bundle.path(), home.path())
                .with_options(MaterializeOptions {
                    seed_empty_portlist: seed,
                    ..MaterializeOptions::default()
                })
                .plan()
                .into_iter()
                .find(|asset| asset.name == "portlist")
                .unwrap()
        };

        let seeded = portlist(true);
        assert_eq!(seeded.source, None);
        assert_eq!(seeded.pending, vec![PathBuf::from("PL.txt")]);
        assert!(portlist(false).pending.is_empty());
    }
}
