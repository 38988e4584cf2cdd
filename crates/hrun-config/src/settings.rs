//! Validated settings

use crate::schema::{RawBuild, RawConfig, RawInventoryConfig, RawLaunchConfig};
use hrun_api::LaunchSettings;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default install directory prefix
pub const DEFAULT_DIR_PREFIX: &str = "hfs";

/// Default name of the symlink pointing at the selected build
pub const DEFAULT_SYMLINK_NAME: &str = "hfs";

/// Validated settings ready for use by the inventory and supervisor
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub inventory: InventorySettings,
    pub launch: LaunchSettings,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            inventory: InventorySettings::from_raw(raw.inventory, raw.builds, raw.env),
            launch: convert_launch(raw.launch),
        }
    }
}

/// Where builds live and how they are primed
#[derive(Debug, Clone)]
pub struct InventorySettings {
    pub builds_root: Option<PathBuf>,
    pub dir_prefix: String,
    pub default_version: Option<String>,
    pub symlink_name: String,
    pub installer: Vec<String>,
    pub builds: Vec<BuildEntry>,
    pub extra_env: BTreeMap<String, String>,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            builds_root: None,
            dir_prefix: DEFAULT_DIR_PREFIX.into(),
            default_version: None,
            symlink_name: DEFAULT_SYMLINK_NAME.into(),
            installer: Vec::new(),
            builds: Vec::new(),
            extra_env: BTreeMap::new(),
        }
    }
}

impl InventorySettings {
    fn from_raw(
        raw: RawInventoryConfig,
        builds: Vec<RawBuild>,
        extra_env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            builds_root: raw.builds_root,
            dir_prefix: raw.dir_prefix.unwrap_or_else(|| DEFAULT_DIR_PREFIX.into()),
            default_version: raw.default_version,
            symlink_name: raw
                .symlink_name
                .unwrap_or_else(|| DEFAULT_SYMLINK_NAME.into()),
            installer: raw.installer,
            builds: builds.into_iter().map(BuildEntry::from_raw).collect(),
            extra_env,
        }
    }
}

/// Explicitly configured build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEntry {
    pub version: String,
    pub path: PathBuf,
    pub plugin_dir: Option<PathBuf>,
}

impl BuildEntry {
    fn from_raw(raw: RawBuild) -> Self {
        Self {
            version: raw.version,
            path: raw.path,
            plugin_dir: raw.plugin_dir,
        }
    }
}

fn convert_launch(raw: RawLaunchConfig) -> LaunchSettings {
    let defaults = LaunchSettings::default();
    LaunchSettings {
        linker: raw.linker.unwrap_or(defaults.linker),
        install_root_var: raw.install_root_var.unwrap_or(defaults.install_root_var),
        allocator_stub_dir: raw.allocator_stub_dir.unwrap_or(defaults.allocator_stub_dir),
        ..defaults
    }
}
