use std::path::{Path, PathBuf};

use serde::Serialize;

/// Application directory name used under the user's documents folder.
/// 使用者文件資料夾下的應用程式目錄名稱。
pub const APP_NAME: &str = "NodeZilla";

/// Folder under the home directory that hosts the workspace.
pub const DOCUMENTS_DIR: &str = "Documents";

/// Portlist filename shared by bundle and workspace.
/// 打包內容與工作區共用的 Portlist 檔名。
pub const PORTLIST_FILE: &str = "PL.txt";

pub const EXAMPLES_DIR: &str = "Examples";
pub const PROJECTS_DIR: &str = "Projects";
pub const ASSETS_DIR: &str = "assets";

/// Fixed on-disk layout of the writable user workspace.
/// 可寫入的使用者工作區之固定目錄配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceLayout {
    pub root: PathBuf,
}

impl WorkspaceLayout {
    /// Builds the layout rooted at `<home>/Documents/NodeZilla`.
    /// 以 `<home>/Documents/NodeZilla` 為根目錄建立配置。
    pub fn from_home(home: impl AsRef<Path>) -> Self {
        Self {
            root: home.as_ref().join(DOCUMENTS_DIR).join(APP_NAME),
        }
    }

    /// Uses an explicit root, bypassing the documents folder convention.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn examples_dir(&self) -> PathBuf {
        self.root.join(EXAMPLES_DIR)
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join(PROJECTS_DIR)
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    pub fn library_dir(&self) -> PathBuf {
        self.assets_dir().join("components").join("library")
    }

    pub fn symbols_dir(&self) -> PathBuf {
        self.assets_dir().join("symbols")
    }

    pub fn chips_dir(&self) -> PathBuf {
        self.assets_dir().join("chips")
    }

    pub fn portlist_path(&self) -> PathBuf {
        self.root.join(PORTLIST_FILE)
    }

    /// Directories created on every run regardless of bundled content.
    /// 每次執行都會建立的固定子目錄。
    pub fn fixed_dirs(&self) -> [PathBuf; 2] {
        [self.root.clone(), self.projects_dir()]
    }
}
