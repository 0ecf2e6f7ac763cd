//! Writable user workspace for NodeZilla, populated from bundled assets.
//!
//! 將打包的唯讀資產補齊至使用者可寫入的 NodeZilla 工作區。

pub mod assets;
pub mod config;
pub mod layout;
pub mod materialize;
pub mod merge;
pub mod ownership;
pub mod portlist;

pub use assets::{default_asset_specs, resolve, search_roots, AssetKind, AssetSpec};
pub use config::{ConfigError, MaterializeConfig};
pub use layout::{WorkspaceLayout, APP_NAME, PORTLIST_FILE};
pub use materialize::{
    materialize, AssetOutcome, AssetReport, MaterializeError, MaterializeOptions,
    MaterializeReport, Materializer, PlannedAsset,
};
pub use merge::{
    copy_missing_file, merge_missing_tree, pending_entries, CopyError, CopyFailure, MergeStats,
};
pub use ownership::{normalize_ownership, OwnershipReport};
pub use portlist::{PortlistLocator, PORTLIST_ENV};
