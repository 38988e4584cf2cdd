//! Launch environment construction

use hrun_api::{LaunchSettings, LaunchSpec, Version};
use hrun_util::{HrunError, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// Builds the argument vector and environment overlay for a launch
///
/// The inherited environment is read from the snapshot given at
/// construction, never from the live process environment, so building a
/// launch has no effect on the supervisor itself.
#[derive(Debug, Clone)]
pub struct EnvironmentBuilder {
    settings: LaunchSettings,
    inherited: HashMap<String, String>,
}

impl EnvironmentBuilder {
    pub fn new(settings: LaunchSettings, inherited: HashMap<String, String>) -> Self {
        Self { settings, inherited }
    }

    /// Snapshot the current process environment. Variables that are not
    /// valid UTF-8 are skipped.
    pub fn from_process_env(settings: LaunchSettings) -> Self {
        let inherited = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::new(settings, inherited)
    }

    pub fn settings(&self) -> &LaunchSettings {
        &self.settings
    }

    pub fn build(&self, version: &Version, program: &str, bypass_allocator: bool) -> Result<LaunchSpec> {
        let mut env = version.environment().clone();
        let mut program = program.to_string();

        if let Some(tool) = self.settings.build_tools.iter().find(|t| t.alias == program) {
            debug!(alias = %tool.alias, tool = %tool.tool, "Rewriting build tool alias");
            program = tool.tool.clone();
            if let Some(dir) = version.plugin_dir() {
                env.insert(tool.plugin_var.clone(), dir.display().to_string());
            }
        }

        if !bypass_allocator {
            return Ok(LaunchSpec::new(program.clone(), vec![program], env));
        }

        let root = self
            .lookup(&env, &self.settings.install_root_var)
            .ok_or_else(|| {
                HrunError::config(format!(
                    "{} must be set to bypass the allocator",
                    self.settings.install_root_var
                ))
            })?;
        let stub_dir = Path::new(root).join(&self.settings.allocator_stub_dir);
        let stub_dir = stub_dir.display().to_string();

        let library_path = match self
            .lookup(&env, &self.settings.library_path_var)
            .filter(|existing| !existing.is_empty())
        {
            Some(existing) => format!("{}:{}", stub_dir, existing),
            None => stub_dir,
        };

        debug!(
            var = %self.settings.library_path_var,
            value = %library_path,
            "Shadowing allocator library"
        );

        env.insert(self.settings.library_path_var.clone(), library_path);
        env.insert(self.settings.allocator_check_var.clone(), "1".into());

        let binary = version
            .install_path()
            .join("bin")
            .join(format!("{}-bin", program));

        let argv = vec![
            self.settings.linker.display().to_string(),
            "--inhibit-rpath".into(),
            String::new(),
            binary.display().to_string(),
        ];

        Ok(LaunchSpec::new(program, argv, env))
    }

    /// Overlay value first, then the inherited snapshot
    fn lookup<'a>(&'a self, overlay: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
        overlay
            .get(key)
            .or_else(|| self.inherited.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version() -> Version {
        Version::new("18.0.532", "/opt/hfs18.0.532").with_env("HFS", "/opt/hfs18.0.532")
    }

    fn builder(inherited: &[(&str, &str)]) -> EnvironmentBuilder {
        EnvironmentBuilder::new(
            LaunchSettings::default(),
            inherited
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn default_launch_uses_primed_overlay() {
        let spec = builder(&[]).build(&version(), "houdini", false).unwrap();

        assert_eq!(spec.argv(), ["houdini"]);
        assert_eq!(spec.program(), "houdini");
        assert_eq!(spec.env().get("HFS").map(String::as_str), Some("/opt/hfs18.0.532"));
        assert!(!spec.env().contains_key("LD_LIBRARY_PATH"));
        assert!(!spec.env().contains_key("HOUDINI_DISABLE_JEMALLOCTEST"));
    }

    #[test]
    fn bypass_prepends_stub_to_existing_library_path() {
        let settings = LaunchSettings {
            allocator_stub_dir: "/stub".into(),
            ..Default::default()
        };
        let builder = EnvironmentBuilder::new(
            settings,
            HashMap::from([("LD_LIBRARY_PATH".to_string(), "/x".to_string())]),
        );

        let spec = builder.build(&version(), "houdini", true).unwrap();
        assert_eq!(spec.env()["LD_LIBRARY_PATH"], "/stub:/x");
    }

    #[test]
    fn bypass_without_existing_library_path_uses_stub_alone() {
        let spec = builder(&[]).build(&version(), "houdini", true).unwrap();
        assert_eq!(
            spec.env()["LD_LIBRARY_PATH"],
            "/opt/hfs18.0.532/dsolib/empty_jemalloc"
        );
    }

    #[test]
    fn bypass_invokes_binary_through_linker() {
        let spec = builder(&[]).build(&version(), "houdini", true).unwrap();

        assert_eq!(
            spec.argv(),
            [
                "/lib64/ld-linux-x86-64.so.2",
                "--inhibit-rpath",
                "",
                "/opt/hfs18.0.532/bin/houdini-bin",
            ]
        );
        assert_eq!(spec.env()["HOUDINI_DISABLE_JEMALLOCTEST"], "1");
    }

    #[test]
    fn bypass_reads_install_root_from_inherited_env() {
        let bare = Version::new("18.0.532", "/opt/hfs18.0.532");
        let spec = builder(&[("HFS", "/mnt/hfs")])
            .build(&bare, "hython", true)
            .unwrap();
        assert_eq!(spec.env()["LD_LIBRARY_PATH"], "/mnt/hfs/dsolib/empty_jemalloc");
    }

    #[test]
    fn bypass_without_install_root_is_a_configuration_error() {
        let bare = Version::new("18.0.532", "/opt/hfs18.0.532");
        let result = builder(&[]).build(&bare, "houdini", true);
        assert!(matches!(result, Err(HrunError::ConfigurationError(_))));
    }

    #[test]
    fn build_tool_alias_points_at_plugin_dir() {
        let v = version().with_plugin_dir("/opt/hfs18.0.532/toolkit/cmake");
        let spec = builder(&[]).build(&v, "hcmake", false).unwrap();

        assert_eq!(spec.program(), "cmake");
        assert_eq!(spec.argv(), ["cmake"]);
        assert_eq!(spec.env()["CMAKE_PREFIX_PATH"], "/opt/hfs18.0.532/toolkit/cmake");
    }

    #[test]
    fn build_tool_alias_without_plugin_dir() {
        let spec = builder(&[]).build(&version(), "hcmake", false).unwrap();
        assert_eq!(spec.argv(), ["cmake"]);
        assert!(!spec.env().contains_key("CMAKE_PREFIX_PATH"));
    }
}
