//! Runtime lookup of the component portlist (`PL.txt`).
//!
//! 執行期尋找元件 Portlist（`PL.txt`）的位置。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::assets::{dedup_paths, search_roots};
use crate::layout::{WorkspaceLayout, APP_NAME, PORTLIST_FILE};

/// Environment variable that overrides the portlist location.
/// 覆寫 Portlist 位置的環境變數。
pub const PORTLIST_ENV: &str = "NODEZILLA_PL_PATH";

/// Builds the ordered candidate list for reading and writing the portlist.
/// 建立讀寫 Portlist 時的候選路徑清單。
#[derive(Debug, Clone)]
pub struct PortlistLocator {
    home: PathBuf,
    layout: WorkspaceLayout,
    override_path: Option<PathBuf>,
    cwd: Option<PathBuf>,
    install_root: Option<PathBuf>,
    executable: Option<PathBuf>,
}

impl PortlistLocator {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            layout: WorkspaceLayout::from_home(&home),
            home,
            override_path: None,
            cwd: None,
            install_root: None,
            executable: None,
        }
    }

    /// Picks up the override variable, working directory and executable path.
    /// 由環境讀取覆寫變數、工作目錄與執行檔路徑。
    pub fn from_env(home: impl Into<PathBuf>) -> Self {
        let locator = Self::new(home)
            .with_override(std::env::var(PORTLIST_ENV).ok())
            .with_executable(std::env::current_exe().ok());
        match std::env::current_dir() {
            Ok(cwd) => locator.with_cwd(cwd),
            Err(_) => locator,
        }
    }

    /// Blank values are ignored; a leading `~` expands to the home directory.
    ///
    /// Only `~` and `~/...` are expanded. `~user` forms are taken literally,
    /// since another user's home cannot be looked up without a passwd query.
    pub fn with_override(mut self, value: Option<String>) -> Self {
        self.override_path = value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| expand_home(value, &self.home));
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = Some(root.into());
        self
    }

    pub fn with_executable(mut self, exe: Option<PathBuf>) -> Self {
        self.executable = exe;
        self
    }

    /// Candidate read locations in priority order, without duplicates.
    /// 依優先順序排列且不重複的讀取候選路徑。
    pub fn read_candidates(&self) -> Vec<PathBuf> {
        let mut out = vec![self.layout.portlist_path()];
        out.extend(self.override_path.clone());
        if let Some(cwd) = &self.cwd {
            out.push(cwd.join(PORTLIST_FILE));
        }
        if let Some(root) = &self.install_root {
            out.extend(
                search_roots(root, &[])
                    .into_iter()
                    .map(|dir| dir.join(PORTLIST_FILE)),
            );
        }
        if let Some(exe_dir) = self.executable.as_deref().and_then(Path::parent) {
            out.push(exe_dir.join(PORTLIST_FILE));
            if let Some(contents) = exe_dir.parent() {
                out.push(contents.join("Resources").join(PORTLIST_FILE));
                if let Some(outer) = contents.parent() {
                    out.push(outer.join(PORTLIST_FILE));
                }
            }
        }
        out.push(
            self.home
                .join("Library")
                .join("Application Support")
                .join(APP_NAME)
                .join(PORTLIST_FILE),
        );
        dedup_paths(out)
    }

    /// First readable portlist, if any.
    /// 第一個可讀取的 Portlist。
    pub fn resolve_for_read(&self) -> Option<PathBuf> {
        self.read_candidates()
            .into_iter()
            .find(|candidate| candidate.is_file())
    }

    /// Location to save the portlist to; its parent directory is created.
    /// 儲存 Portlist 的位置，並建立其上層目錄。
    pub fn resolve_for_write(&self) -> io::Result<PathBuf> {
        let target = self
            .override_path
            .clone()
            .unwrap_or_else(|| self.layout.portlist_path());
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(target)
    }
}

fn expand_home(value: &str, home: &Path) -> PathBuf {
    if value == "~" {
        return home.to_path_buf();
    }
    match value
        .strip_prefix("~/")
        .or_else(|| value.strip_prefix("~\\"))
    {
        Some(rest) => home.join(rest),
        None => PathBuf::from(value),
    }
}
