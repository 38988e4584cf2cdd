//! Process management utilities

use hrun_api::LaunchSpec;
use hrun_host_api::{ExitStatus, HostError, HostResult};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, Stdio};
use tracing::debug;

/// Spawned child process
///
/// The child stays in the supervisor's process group so that a signal
/// forwarded to the group reaches it and everything it forks.
pub struct ManagedProcess {
    pub child: Child,
    pub pid: u32,
}

impl ManagedProcess {
    /// Spawn the process described by `spec` with the inherited environment
    /// plus the spec's overlay, and inherited standard streams
    pub fn spawn(spec: &LaunchSpec) -> HostResult<Self> {
        let Some((program, args)) = spec.argv().split_first() else {
            return Err(HostError::SpawnFailed("Empty argv".into()));
        };

        let mut cmd = Command::new(program);
        cmd.args(args);

        // The overlay applies to the child only
        cmd.envs(spec.env());

        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let child = cmd.spawn().map_err(|e| {
            HostError::SpawnFailed(format!("Failed to spawn {}: {}", program, e))
        })?;

        let pid = child.id();
        debug!(pid = pid, program = %program, "Process spawned");

        Ok(Self { child, pid })
    }

    /// Wait for the process to exit (blocking)
    pub fn wait(&mut self) -> HostResult<ExitStatus> {
        match self.child.wait() {
            Ok(status) => Ok(convert_status(status)),
            Err(e) => Err(HostError::WaitFailed(format!("Wait failed: {}", e))),
        }
    }
}

fn convert_status(status: std::process::ExitStatus) -> ExitStatus {
    match (status.code(), status.signal()) {
        (Some(code), _) => ExitStatus::with_code(code),
        (None, Some(sig)) => ExitStatus::signaled(sig),
        (None, None) => ExitStatus::with_code(-1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sh(script: &str) -> LaunchSpec {
        LaunchSpec::new(
            "sh",
            vec!["sh".into(), "-c".into(), script.into()],
            BTreeMap::new(),
        )
    }

    #[test]
    fn spawn_simple_process() {
        let spec = LaunchSpec::new("true", vec!["true".into()], BTreeMap::new());
        let mut proc = ManagedProcess::spawn(&spec).unwrap();

        let status = proc.wait().unwrap();
        assert!(status.is_success());
    }

    #[test]
    fn exit_code_is_reported() {
        let mut proc = ManagedProcess::spawn(&sh("exit 3")).unwrap();
        assert_eq!(proc.wait().unwrap(), ExitStatus::Exited(3));
    }

    #[test]
    fn signal_is_reported() {
        let mut proc = ManagedProcess::spawn(&sh("kill -TERM $$")).unwrap();
        assert_eq!(proc.wait().unwrap(), ExitStatus::Signaled(15));
    }

    #[test]
    fn overlay_reaches_child() {
        let env = BTreeMap::from([("HRUN_TEST_VALUE".to_string(), "42".to_string())]);
        let spec = LaunchSpec::new(
            "sh",
            vec!["sh".into(), "-c".into(), r#"test "$HRUN_TEST_VALUE" = 42"#.into()],
            env,
        );

        let mut proc = ManagedProcess::spawn(&spec).unwrap();
        assert!(proc.wait().unwrap().is_success());
        assert!(std::env::var("HRUN_TEST_VALUE").is_err());
    }

    #[test]
    fn missing_binary_fails_to_spawn() {
        let spec = LaunchSpec::new(
            "houdini",
            vec!["/nonexistent/hfs/bin/houdini-bin".into()],
            BTreeMap::new(),
        );
        assert!(matches!(
            ManagedProcess::spawn(&spec),
            Err(HostError::SpawnFailed(_))
        ));
    }

    #[test]
    fn empty_argv_fails_to_spawn() {
        let spec = LaunchSpec::new("houdini", vec![], BTreeMap::new());
        assert!(ManagedProcess::spawn(&spec).is_err());
    }
}
