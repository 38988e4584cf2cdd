//! Launch plan for a single supervised run

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything the process host needs to start the child
///
/// The environment is an overlay applied on top of the supervisor's inherited
/// environment, in the child only. Built once per invocation and not modified
/// after it is handed to the spawn step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Program name the user asked for, after alias rewriting
    program: String,

    /// Full argument vector; `argv[0]` is the executable to run
    argv: Vec<String>,

    #[serde(default)]
    env: BTreeMap<String, String>,
}

impl LaunchSpec {
    pub fn new(
        program: impl Into<String>,
        argv: Vec<String>,
        env: BTreeMap<String, String>,
    ) -> Self {
        Self {
            program: program.into(),
            argv,
            env,
        }
    }

    /// Append pass-through arguments after the launch argv
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }
}

/// A program name that is rewritten to a build tool, which is then pointed
/// at the version's plugin directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildToolAlias {
    pub alias: String,
    pub tool: String,
    /// Variable that receives the version's plugin directory
    pub plugin_var: String,
}

/// Names and paths the environment builder works with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSettings {
    /// Dynamic linker used to start the real binary in allocator-bypass mode
    pub linker: PathBuf,

    /// Variable holding the install root of the selected build
    pub install_root_var: String,

    /// Stub allocator directory; relative paths are resolved against the
    /// install root
    pub allocator_stub_dir: PathBuf,

    pub library_path_var: String,

    /// Flag that disables the allocator's self-check
    pub allocator_check_var: String,

    pub build_tools: Vec<BuildToolAlias>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            linker: PathBuf::from("/lib64/ld-linux-x86-64.so.2"),
            install_root_var: "HFS".into(),
            allocator_stub_dir: PathBuf::from("dsolib/empty_jemalloc"),
            library_path_var: "LD_LIBRARY_PATH".into(),
            allocator_check_var: "HOUDINI_DISABLE_JEMALLOCTEST".into(),
            build_tools: vec![BuildToolAlias {
                alias: "hcmake".into(),
                tool: "cmake".into(),
                plugin_var: "CMAKE_PREFIX_PATH".into(),
            }],
        }
    }
}
