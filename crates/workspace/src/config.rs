use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::assets::dedup_paths;

const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read materializer config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse materializer config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk tuning knobs for the materializer.
/// 物化流程的設定檔內容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub extra_search_roots: Vec<PathBuf>,
    #[serde(default)]
    pub seed_empty_portlist: bool,
    #[serde(default = "default_true")]
    pub normalize_ownership: bool,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            extra_search_roots: Vec::new(),
            seed_empty_portlist: false,
            normalize_ownership: true,
        }
    }
}

impl MaterializeConfig {
    /// Loads a config file; a missing file yields the defaults.
    /// 讀取設定檔；若檔案不存在則使用預設值。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.sanitize();
        Ok(config)
    }

    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = CONFIG_VERSION;
        }
        let roots = std::mem::take(&mut self.extra_search_roots);
        self.extra_search_roots = dedup_paths(
            roots
                .into_iter()
                .filter(|root| !root.as_os_str().to_string_lossy().trim().is_empty()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config = MaterializeConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, MaterializeConfig::default());
        assert!(config.normalize_ownership);
        assert!(!config.seed_empty_portlist);
    }

    #[test]
    fn partial_document_fills_defaults_and_drops_blank_roots() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("materialize.json");
        fs::write(
            &path,
            r#"{
                "version": 0,
                "extra_search_roots": ["/opt/nodezilla", "  ", "/opt/nodezilla", "/srv/share"],
                "seed_empty_portlist": true
            }"#,
        )
        .unwrap();

        let config = MaterializeConfig::load(&path).unwrap();
        assert_eq!(config.version, 1);
        assert!(config.seed_empty_portlist);
        assert!(config.normalize_ownership);
        assert_eq!(
            config.extra_search_roots,
            vec![PathBuf::from("/opt/nodezilla"), PathBuf::from("/srv/share")]
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("materialize.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            MaterializeConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
