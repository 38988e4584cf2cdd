//! Child supervision

use hrun_api::{BuildInventory, LaunchSpec, Version};
use hrun_host_api::{ExitStatus, ProcessHost};
use hrun_util::{HrunError, Result};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::{EnvironmentBuilder, Reporter, Specifier, resolve};

/// One request to run a program from a versioned build
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    /// Version specifier; `None` lists the installed versions instead of
    /// launching
    pub specifier: Option<String>,
    pub program: String,
    /// Arguments passed through to the child verbatim
    pub args: Vec<String>,
    pub bypass_allocator: bool,
}

impl LaunchRequest {
    pub fn new(specifier: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            specifier: Some(specifier.into()),
            program: program.into(),
            args: Vec::new(),
            bypass_allocator: false,
        }
    }

    pub fn list() -> Self {
        Self {
            specifier: None,
            program: String::new(),
            args: Vec::new(),
            bypass_allocator: false,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_bypass_allocator(mut self, bypass: bool) -> Self {
        self.bypass_allocator = bypass;
        self
    }
}

/// Resolves a version, launches the program from it, and reports the
/// child's termination as its own exit status
pub struct Supervisor<'a, I, H, R> {
    inventory: &'a I,
    host: &'a H,
    reporter: &'a R,
    builder: EnvironmentBuilder,
}

impl<'a, I, H, R> Supervisor<'a, I, H, R>
where
    I: BuildInventory,
    H: ProcessHost,
    R: Reporter,
{
    pub fn new(inventory: &'a I, host: &'a H, reporter: &'a R, builder: EnvironmentBuilder) -> Self {
        Self {
            inventory,
            host,
            reporter,
            builder,
        }
    }

    /// Run `request` to completion and return the exit status for the
    /// supervisor process
    pub fn run(&self, request: &LaunchRequest) -> i32 {
        self.finish(self.try_run(request))
    }

    fn try_run(&self, request: &LaunchRequest) -> Result<i32> {
        self.host
            .arm_signal_forwarding()
            .map_err(|e| HrunError::internal(e.to_string()))?;

        let Some(specifier) = request.specifier.as_deref() else {
            self.list_versions()?;
            return Ok(0);
        };

        let (version, launch) = self.plan(
            specifier,
            &request.program,
            &request.args,
            request.bypass_allocator,
        )?;

        let mut child = self
            .host
            .spawn(&launch)
            .map_err(|e| HrunError::spawn(e.to_string()))?;

        info!(
            pid = child.pid,
            version = %version,
            program = %launch.program(),
            "Child started"
        );
        self.reporter.info(&format!(
            "Launched {} {} (pid {})",
            launch.program(),
            version,
            child.pid
        ));

        let status = self
            .host
            .wait(&mut child)
            .map_err(|e| HrunError::internal(e.to_string()))?;

        match status {
            ExitStatus::Signaled(sig) => {
                warn!(pid = child.pid, signal = sig, "Child terminated by signal");
                let message = match self.host.signal_name(sig) {
                    Some(name) => format!(
                        "{} was terminated by signal {} ({})",
                        launch.program(),
                        sig,
                        name
                    ),
                    None => format!("{} was terminated by signal {}", launch.program(), sig),
                };
                self.reporter.error(&message);
            }
            ExitStatus::Exited(code) => {
                debug!(pid = child.pid, code, "Child exited");
            }
        }

        Ok(status.exit_code())
    }

    /// Resolve `specifier` and build the launch for it without spawning
    pub fn plan(
        &self,
        specifier: &str,
        program: &str,
        args: &[String],
        bypass_allocator: bool,
    ) -> Result<(Version, LaunchSpec)> {
        let version = self.resolve(specifier)?;
        debug!(specifier, version = %version, "Version resolved");

        let launch = self
            .builder
            .build(&version, program, bypass_allocator)?
            .with_args(args.iter().cloned());

        Ok((version, launch))
    }

    /// Resolve `specifier` against the inventory
    pub fn resolve(&self, specifier: &str) -> Result<Version> {
        let specifier = Specifier::parse(specifier);
        let versions = self.inventory.versions()?;

        // Only consult the configured default when it is asked for, so a
        // stale default does not break `latest` or partial matches.
        let default = match specifier {
            Specifier::Default => self.inventory.default_version()?,
            _ => None,
        };

        resolve(&specifier, &versions, default.as_ref()).cloned()
    }

    pub fn list_versions(&self) -> Result<()> {
        let versions = self.inventory.versions()?;
        if versions.is_empty() {
            self.reporter.info("No versions installed");
            return Ok(());
        }

        let default = self.inventory.default_version().unwrap_or_else(|e| {
            warn!(error = %e, "Could not determine default version");
            None
        });

        for version in &versions {
            let marker = match &default {
                Some(d) if d.number() == version.number() => " (default)",
                _ => "",
            };
            self.reporter.info(&format!(
                "{}{}\t{}",
                version,
                marker,
                version.install_path().display()
            ));
        }
        Ok(())
    }

    /// Install the build `specifier` names
    pub fn install(&self, specifier: &str) -> i32 {
        let result = self.install_target(specifier).and_then(|version| {
            self.inventory.install(&version)?;
            self.reporter.info(&format!("Installed {}", version));
            Ok(0)
        });
        self.finish(result)
    }

    /// Version string handed to the installer. Only `default` is
    /// translated; there is no remote listing to resolve `latest` against.
    fn install_target(&self, specifier: &str) -> Result<String> {
        match Specifier::parse(specifier) {
            Specifier::Default => self
                .inventory
                .configured_default()
                .ok_or_else(|| HrunError::resolution("no default version is configured")),
            Specifier::Latest => Err(HrunError::resolution(
                "'latest' cannot be installed, name a version",
            )),
            Specifier::Partial(version) if version.is_empty() => {
                Err(HrunError::resolution("empty version specifier"))
            }
            Specifier::Partial(version) => Ok(version),
        }
    }

    /// Remove the installed build `specifier` resolves to
    pub fn uninstall(&self, specifier: &str) -> i32 {
        let result = self.resolve(specifier).and_then(|version| {
            self.inventory.uninstall(&version)?;
            self.reporter.info(&format!("Uninstalled {}", version));
            Ok(0)
        });
        self.finish(result)
    }

    /// Point the inventory's symlink at the build `specifier` resolves to
    pub fn link(&self, specifier: &str) -> i32 {
        let result = self.resolve(specifier).and_then(|version| {
            let link: PathBuf = self.inventory.link(&version)?;
            self.reporter.info(&format!(
                "{} -> {}",
                link.display(),
                version.install_path().display()
            ));
            Ok(0)
        });
        self.finish(result)
    }

    fn finish(&self, result: Result<i32>) -> i32 {
        match result {
            Ok(code) => code,
            Err(e) => {
                error!(error = %e, "Supervisor stopped");
                self.reporter.error(&e.to_string());
                e.exit_code()
            }
        }
    }
}
