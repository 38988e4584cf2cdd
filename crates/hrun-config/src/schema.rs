//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Where builds live and which one is the default
    #[serde(default)]
    pub inventory: RawInventoryConfig,

    /// Builds outside the builds root
    #[serde(default)]
    pub builds: Vec<RawBuild>,

    /// Launch environment settings
    #[serde(default)]
    pub launch: RawLaunchConfig,

    /// Extra variables primed for every build
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// Inventory settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawInventoryConfig {
    /// Directory scanned for `<dir_prefix><version>` install directories
    pub builds_root: Option<PathBuf>,

    /// Install directory name prefix (default: "hfs")
    pub dir_prefix: Option<String>,

    /// Version used for the `default` specifier
    pub default_version: Option<String>,

    /// Name of the symlink created inside the builds root (default: "hfs")
    pub symlink_name: Option<String>,

    /// Installer command; the version and builds root are appended
    #[serde(default)]
    pub installer: Vec<String>,
}

/// Explicitly listed build
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawBuild {
    pub version: String,

    /// Install root
    pub path: PathBuf,

    /// Plugin directory for build tooling (default: `<path>/toolkit/cmake` if present)
    pub plugin_dir: Option<PathBuf>,
}

/// Launch settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawLaunchConfig {
    /// Dynamic linker (default: /lib64/ld-linux-x86-64.so.2)
    pub linker: Option<PathBuf>,

    /// Install root variable (default: HFS)
    pub install_root_var: Option<String>,

    /// Stub allocator directory, relative to the install root
    /// (default: dsolib/empty_jemalloc)
    pub allocator_stub_dir: Option<PathBuf>,
}
