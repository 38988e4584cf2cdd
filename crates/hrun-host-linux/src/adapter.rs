//! Linux process host implementation

use hrun_api::LaunchSpec;
use hrun_host_api::{ChildHandle, ExitStatus, HostError, HostResult, ProcessHost};
use nix::sys::signal::Signal;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

use crate::process::ManagedProcess;
use crate::signals::arm_forwarding;

/// Linux process host
pub struct LinuxHost {
    processes: Mutex<HashMap<u32, ManagedProcess>>,
}

impl LinuxHost {
    pub fn new() -> Self {
        Self {
            processes: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for LinuxHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessHost for LinuxHost {
    fn arm_signal_forwarding(&self) -> HostResult<()> {
        arm_forwarding()
    }

    fn spawn(&self, spec: &LaunchSpec) -> HostResult<ChildHandle> {
        let proc = ManagedProcess::spawn(spec)?;
        let pid = proc.pid;
        let program = spec.argv().first().cloned().unwrap_or_default();

        self.processes
            .lock()
            .map_err(|_| HostError::Internal("process table poisoned".into()))?
            .insert(pid, proc);

        Ok(ChildHandle::new(pid, program))
    }

    fn wait(&self, child: &mut ChildHandle) -> HostResult<ExitStatus> {
        // Take the process out of the table so the lock is not held while
        // blocking on it
        let mut proc = self
            .processes
            .lock()
            .map_err(|_| HostError::Internal("process table poisoned".into()))?
            .remove(&child.pid)
            .ok_or(HostError::UnknownChild(child.pid))?;

        let status = proc.wait()?;
        info!(pid = child.pid, status = ?status, "Process exited");

        child.set_status(status);
        Ok(status)
    }

    fn signal_name(&self, signal: i32) -> Option<&'static str> {
        Signal::try_from(signal).ok().map(Signal::as_str)
    }
}
