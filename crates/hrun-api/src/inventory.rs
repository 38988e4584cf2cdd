//! Build inventory interface

use hrun_util::Result;
use std::path::PathBuf;

use crate::{Version, VersionList};

/// Source of installed builds
///
/// The supervisor only borrows versions from the inventory for the duration
/// of one invocation. How builds get onto disk is up to the implementation.
pub trait BuildInventory {
    /// Installed versions, sorted ascending
    fn versions(&self) -> Result<VersionList>;

    /// The configured default version, if one is configured and installed
    fn default_version(&self) -> Result<Option<Version>>;

    /// Version string of the configured default, installed or not
    fn configured_default(&self) -> Option<String>;

    /// Install the build named by `version`
    fn install(&self, version: &str) -> Result<()>;

    /// Remove an installed build
    fn uninstall(&self, version: &Version) -> Result<()>;

    /// Point the inventory's well-known symlink at `version`, returning the
    /// link path
    fn link(&self, version: &Version) -> Result<PathBuf>;
}
