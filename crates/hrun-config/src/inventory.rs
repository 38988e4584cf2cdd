//! Build inventory backed by a directory of installed builds

use crate::settings::InventorySettings;
use crate::validation::check_version;
use hrun_api::{BuildInventory, Version, VersionList, VersionNumber};
use hrun_util::{HrunError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Inventory that scans `builds_root` for `<dir_prefix><version>`
/// directories and adds the explicitly configured builds
pub struct DirectoryInventory {
    settings: InventorySettings,
    /// Inherited `PATH`, extended with each build's `bin` directory
    search_path: Option<String>,
}

impl DirectoryInventory {
    pub fn new(settings: InventorySettings) -> Self {
        Self::with_search_path(settings, std::env::var("PATH").ok())
    }

    pub fn with_search_path(settings: InventorySettings, search_path: Option<String>) -> Self {
        Self {
            settings,
            search_path,
        }
    }

    pub fn settings(&self) -> &InventorySettings {
        &self.settings
    }

    fn scan_root(&self, found: &mut BTreeMap<String, Version>) -> Result<()> {
        let Some(root) = &self.settings.builds_root else {
            return Ok(());
        };

        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(root = %root.display(), "Builds root does not exist");
                return Ok(());
            }
            Err(e) => {
                return Err(HrunError::inventory(format!(
                    "cannot read {}: {}",
                    root.display(),
                    e
                )));
            }
        };

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name == self.settings.symlink_name {
                continue;
            }
            let Some(version) = name.strip_prefix(self.settings.dir_prefix.as_str()) else {
                continue;
            };
            if check_version(version).is_err() || !entry.path().is_dir() {
                continue;
            }

            debug!(version, path = %entry.path().display(), "Found build");
            found.insert(version.to_string(), self.prime(version, entry.path(), None));
        }

        Ok(())
    }

    /// Build a version with the variables its install step establishes
    fn prime(&self, display: &str, path: PathBuf, plugin_dir: Option<PathBuf>) -> Version {
        let number = VersionNumber::parse(display);
        let bin = path.join("bin");
        let bin_str = bin.display().to_string();

        let search_path = match self.search_path.as_deref() {
            Some(existing) if !existing.is_empty() => format!("{}:{}", bin_str, existing),
            _ => bin_str.clone(),
        };

        let mut version = Version::new(number.clone(), path.clone())
            .with_env("HFS", path_str(&path))
            .with_env("H", path_str(&path))
            .with_env("HB", bin_str)
            .with_env("HDSO", path_str(&path.join("dsolib")))
            .with_env("HH", path_str(&path.join("houdini")))
            .with_env("HHC", path_str(&path.join("houdini").join("config")))
            .with_env("HT", path_str(&path.join("toolkit")))
            .with_env("HSB", path_str(&path.join("houdini").join("sbin")))
            .with_env("PATH", search_path);

        if let Some(major) = number.major() {
            version = version.with_env("HOUDINI_MAJOR_RELEASE", major.to_string());
        }
        if let Some(minor) = number.minor() {
            version = version.with_env("HOUDINI_MINOR_RELEASE", minor.to_string());
        }
        if let Some(build) = number.build() {
            version = version.with_env("HOUDINI_BUILD_VERSION", build.to_string());
        }

        version = version.with_environment(self.settings.extra_env.clone());

        let plugin_dir = plugin_dir.or_else(|| {
            let dir = path.join("toolkit").join("cmake");
            dir.is_dir().then_some(dir)
        });
        if let Some(dir) = plugin_dir {
            version = version.with_plugin_dir(dir);
        }

        let is_default = self.settings.default_version.as_deref() == Some(display);
        version.with_default(is_default)
    }

    fn builds_root(&self) -> Result<&Path> {
        self.settings
            .builds_root
            .as_deref()
            .ok_or_else(|| HrunError::config("builds_root is not configured"))
    }
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

impl BuildInventory for DirectoryInventory {
    fn versions(&self) -> Result<VersionList> {
        let mut found = BTreeMap::new();
        self.scan_root(&mut found)?;

        // Explicit builds take precedence over scanned ones
        for build in &self.settings.builds {
            found.insert(
                build.version.clone(),
                self.prime(&build.version, build.path.clone(), build.plugin_dir.clone()),
            );
        }

        Ok(VersionList::new(found.into_values().collect()))
    }

    fn default_version(&self) -> Result<Option<Version>> {
        let Some(default) = &self.settings.default_version else {
            return Ok(None);
        };

        match self.versions()?.find(default) {
            Some(version) => Ok(Some(version.clone())),
            None => Err(HrunError::resolution(format!(
                "default version {} is not installed",
                default
            ))),
        }
    }

    fn configured_default(&self) -> Option<String> {
        self.settings.default_version.clone()
    }

    fn install(&self, version: &str) -> Result<()> {
        let Some((program, args)) = self.settings.installer.split_first() else {
            return Err(HrunError::inventory("no installer configured"));
        };
        let root = self.builds_root()?;

        info!(version, installer = %program, "Running installer");
        let status = Command::new(program)
            .args(args)
            .arg(version)
            .arg(root)
            .status()
            .map_err(|e| HrunError::inventory(format!("failed to run {}: {}", program, e)))?;

        if !status.success() {
            return Err(HrunError::inventory(format!(
                "installer for {} failed: {}",
                version, status
            )));
        }
        Ok(())
    }

    fn uninstall(&self, version: &Version) -> Result<()> {
        let path = version.install_path();
        if path.parent().is_none() || !path.is_dir() {
            return Err(HrunError::inventory(format!(
                "{} is not an install directory",
                path.display()
            )));
        }

        fs::remove_dir_all(path).map_err(|e| {
            HrunError::inventory(format!("cannot remove {}: {}", path.display(), e))
        })?;

        info!(version = %version, path = %path.display(), "Build removed");
        Ok(())
    }

    fn link(&self, version: &Version) -> Result<PathBuf> {
        let link = self.builds_root()?.join(&self.settings.symlink_name);

        match fs::symlink_metadata(&link) {
            Ok(meta) if meta.file_type().is_symlink() => {
                fs::remove_file(&link).map_err(|e| {
                    HrunError::inventory(format!("cannot replace {}: {}", link.display(), e))
                })?;
            }
            Ok(_) => {
                return Err(HrunError::inventory(format!(
                    "{} exists and is not a symlink",
                    link.display()
                )));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(HrunError::inventory(format!(
                    "cannot inspect {}: {}",
                    link.display(),
                    e
                )));
            }
        }

        std::os::unix::fs::symlink(version.install_path(), &link).map_err(|e| {
            HrunError::inventory(format!("cannot create {}: {}", link.display(), e))
        })?;

        info!(link = %link.display(), version = %version, "Symlink updated");
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildEntry;
    use tempfile::TempDir;

    fn builds_dir(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            fs::create_dir_all(dir.path().join(name).join("bin")).unwrap();
        }
        dir
    }

    fn inventory(dir: &TempDir, default: Option<&str>) -> DirectoryInventory {
        let settings = InventorySettings {
            builds_root: Some(dir.path().to_path_buf()),
            default_version: default.map(String::from),
            ..Default::default()
        };
        DirectoryInventory::with_search_path(settings, Some("/usr/bin:/bin".into()))
    }

    #[test]
    fn scans_prefixed_directories() {
        let dir = builds_dir(&["hfs18.0.532", "hfs17.5.460", "notes", "hfsbeta"]);
        fs::write(dir.path().join("hfs19.0.1"), "not a directory").unwrap();

        let versions = inventory(&dir, None).versions().unwrap();
        let displays: Vec<&str> = versions.iter().map(Version::display).collect();
        assert_eq!(displays, vec!["17.5.460", "18.0.532"]);
    }

    #[test]
    fn primes_build_environment() {
        let dir = builds_dir(&["hfs18.0.532"]);
        let versions = inventory(&dir, None).versions().unwrap();
        let v = versions.latest().unwrap();
        let root = dir.path().join("hfs18.0.532");

        assert_eq!(v.install_path(), root);
        assert_eq!(v.environment()["HFS"], root.display().to_string());
        assert_eq!(v.environment()["HOUDINI_MAJOR_RELEASE"], "18");
        assert_eq!(v.environment()["HOUDINI_BUILD_VERSION"], "532");
        assert_eq!(
            v.environment()["PATH"],
            format!("{}:/usr/bin:/bin", root.join("bin").display())
        );
        assert!(v.plugin_dir().is_none());
    }

    #[test]
    fn detects_plugin_dir() {
        let dir = builds_dir(&["hfs18.0.532"]);
        let cmake = dir.path().join("hfs18.0.532/toolkit/cmake");
        fs::create_dir_all(&cmake).unwrap();

        let versions = inventory(&dir, None).versions().unwrap();
        assert_eq!(versions.latest().unwrap().plugin_dir(), Some(cmake.as_path()));
    }

    #[test]
    fn skips_symlink_and_missing_root() {
        let dir = builds_dir(&["hfs18.0.532"]);
        let inv = inventory(&dir, None);
        let version = inv.versions().unwrap().latest().unwrap().clone();
        inv.link(&version).unwrap();

        // The "hfs" link itself is not a build
        assert_eq!(inv.versions().unwrap().len(), 1);

        let missing = DirectoryInventory::new(InventorySettings {
            builds_root: Some(dir.path().join("nope")),
            ..Default::default()
        });
        assert!(missing.versions().unwrap().is_empty());
    }

    #[test]
    fn explicit_builds_are_included() {
        let dir = builds_dir(&["hfs18.0.532"]);
        let elsewhere = TempDir::new().unwrap();
        let mut settings = inventory(&dir, None).settings().clone();
        settings.builds.push(BuildEntry {
            version: "19.0.383".into(),
            path: elsewhere.path().to_path_buf(),
            plugin_dir: Some(elsewhere.path().join("cmake")),
        });

        let versions = DirectoryInventory::with_search_path(settings, None)
            .versions()
            .unwrap();
        let latest = versions.latest().unwrap();
        assert_eq!(latest.display(), "19.0.383");
        assert_eq!(latest.install_path(), elsewhere.path());
        assert_eq!(latest.environment()["PATH"], elsewhere.path().join("bin").display().to_string());
    }

    #[test]
    fn default_version_is_flagged() {
        let dir = builds_dir(&["hfs17.5", "hfs18.0"]);
        let inv = inventory(&dir, Some("17.5"));

        let default = inv.default_version().unwrap().unwrap();
        assert_eq!(default.display(), "17.5");
        assert!(default.is_default());
        assert!(!inv.versions().unwrap().find("18.0").unwrap().is_default());
    }

    #[test]
    fn missing_default_is_reported() {
        let dir = builds_dir(&["hfs18.0"]);
        assert!(inventory(&dir, None).default_version().unwrap().is_none());
        assert!(matches!(
            inventory(&dir, Some("17.5")).default_version(),
            Err(HrunError::ResolutionError(_))
        ));
    }

    #[test]
    fn configured_default_need_not_be_installed() {
        let dir = builds_dir(&["hfs18.0"]);
        assert_eq!(inventory(&dir, Some("17.5")).configured_default().as_deref(), Some("17.5"));
        assert_eq!(inventory(&dir, None).configured_default(), None);
    }

    #[test]
    fn link_replaces_existing_symlink() {
        let dir = builds_dir(&["hfs17.5", "hfs18.0"]);
        let inv = inventory(&dir, None);
        let versions = inv.versions().unwrap();

        let link = inv.link(versions.find("17.5").unwrap()).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), dir.path().join("hfs17.5"));

        inv.link(versions.find("18.0").unwrap()).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), dir.path().join("hfs18.0"));
    }

    #[test]
    fn link_refuses_to_replace_directory() {
        let dir = builds_dir(&["hfs18.0", "hfs"]);
        let inv = inventory(&dir, None);
        let version = inv.versions().unwrap().find("18.0").unwrap().clone();

        assert!(matches!(inv.link(&version), Err(HrunError::InventoryError(_))));
    }

    #[test]
    fn uninstall_removes_build() {
        let dir = builds_dir(&["hfs17.5", "hfs18.0"]);
        let inv = inventory(&dir, None);
        let version = inv.versions().unwrap().find("17.5").unwrap().clone();

        inv.uninstall(&version).unwrap();

        assert!(!dir.path().join("hfs17.5").exists());
        assert_eq!(inv.versions().unwrap().len(), 1);
    }

    #[test]
    fn install_requires_installer() {
        let dir = builds_dir(&[]);
        assert!(matches!(
            inventory(&dir, None).install("18.0.532"),
            Err(HrunError::InventoryError(_))
        ));
    }

    #[test]
    fn install_runs_installer_with_version_and_root() {
        let dir = builds_dir(&[]);
        let mut settings = inventory(&dir, None).settings().clone();
        settings.installer = vec![
            "sh".into(),
            "-c".into(),
            r#"mkdir -p "$1/hfs$0/bin""#.into(),
        ];
        let inv = DirectoryInventory::with_search_path(settings, None);

        inv.install("18.0.532").unwrap();

        assert!(inv.versions().unwrap().find("18.0.532").is_some());
    }
}
