//! Mock host implementations for testing

use hrun_api::LaunchSpec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use crate::{ChildHandle, ExitStatus, GroupControl, HostError, HostResult, ProcessHost};

/// Action recorded by [`MockGroupControl`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupAction {
    RestoreDefaults,
    Terminate { group: i32, signal: i32 },
    Exit(i32),
}

/// Group control that records what the forwarder asked for instead of
/// touching real processes
pub struct MockGroupControl {
    group: i32,
    actions: Mutex<Vec<GroupAction>>,
}

impl MockGroupControl {
    pub fn with_group(group: i32) -> Self {
        Self {
            group,
            actions: Mutex::new(Vec::new()),
        }
    }

    pub fn actions(&self) -> Vec<GroupAction> {
        self.actions.lock().unwrap().clone()
    }

    pub fn terminate_count(&self) -> usize {
        self.count(|a| matches!(a, GroupAction::Terminate { .. }))
    }

    pub fn exit_count(&self) -> usize {
        self.count(|a| matches!(a, GroupAction::Exit(_)))
    }

    fn count(&self, pred: impl Fn(&GroupAction) -> bool) -> usize {
        self.actions.lock().unwrap().iter().filter(|a| pred(*a)).count()
    }

    fn record(&self, action: GroupAction) {
        self.actions.lock().unwrap().push(action);
    }
}

impl GroupControl for MockGroupControl {
    fn restore_default_dispositions(&self) {
        self.record(GroupAction::RestoreDefaults);
    }

    fn process_group(&self) -> i32 {
        self.group
    }

    fn terminate_group(&self, group_id: i32, signal: i32) {
        self.record(GroupAction::Terminate {
            group: group_id,
            signal,
        });
    }

    fn exit(&self, code: i32) {
        self.record(GroupAction::Exit(code));
    }
}

/// Mock process host for supervisor tests
///
/// Every spawn succeeds (unless `fail_spawn` is set) and the child "exits"
/// with `exit_status` as soon as it is waited on.
pub struct MockHost {
    next_pid: AtomicU32,
    spawned: Arc<Mutex<Vec<LaunchSpec>>>,
    running: Arc<Mutex<HashMap<u32, LaunchSpec>>>,
    armed: Arc<Mutex<u32>>,

    /// Configure spawn to fail
    pub fail_spawn: Arc<Mutex<bool>>,

    /// Status reported by `wait`
    pub exit_status: Arc<Mutex<ExitStatus>>,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(1000),
            spawned: Arc::new(Mutex::new(Vec::new())),
            running: Arc::new(Mutex::new(HashMap::new())),
            armed: Arc::new(Mutex::new(0)),
            fail_spawn: Arc::new(Mutex::new(false)),
            exit_status: Arc::new(Mutex::new(ExitStatus::success())),
        }
    }

    pub fn with_exit_status(self, status: ExitStatus) -> Self {
        *self.exit_status.lock().unwrap() = status;
        self
    }

    /// Launch specs passed to `spawn`, in order
    pub fn spawned(&self) -> Vec<LaunchSpec> {
        self.spawned.lock().unwrap().clone()
    }

    /// Number of times signal forwarding was armed
    pub fn armed_count(&self) -> u32 {
        *self.armed.lock().unwrap()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessHost for MockHost {
    fn arm_signal_forwarding(&self) -> HostResult<()> {
        *self.armed.lock().unwrap() += 1;
        Ok(())
    }

    fn spawn(&self, spec: &LaunchSpec) -> HostResult<ChildHandle> {
        if *self.fail_spawn.lock().unwrap() {
            return Err(HostError::SpawnFailed("Mock spawn failure".into()));
        }

        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.spawned.lock().unwrap().push(spec.clone());
        self.running.lock().unwrap().insert(pid, spec.clone());

        let program = spec.argv().first().cloned().unwrap_or_default();
        Ok(ChildHandle::new(pid, program))
    }

    fn wait(&self, child: &mut ChildHandle) -> HostResult<ExitStatus> {
        if self.running.lock().unwrap().remove(&child.pid).is_none() {
            return Err(HostError::UnknownChild(child.pid));
        }

        let status = *self.exit_status.lock().unwrap();
        child.set_status(status);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn mock_spawn_and_wait() {
        let host = MockHost::new().with_exit_status(ExitStatus::with_code(3));
        let spec = LaunchSpec::new("houdini", vec!["houdini".into()], BTreeMap::new());

        let mut child = host.spawn(&spec).unwrap();
        assert_eq!(child.program, "houdini");

        let status = host.wait(&mut child).unwrap();
        assert_eq!(status, ExitStatus::Exited(3));
        assert_eq!(child.status(), Some(status));

        // Already reaped
        assert!(matches!(host.wait(&mut child), Err(HostError::UnknownChild(_))));
    }

    #[test]
    fn mock_spawn_failure() {
        let host = MockHost::new();
        *host.fail_spawn.lock().unwrap() = true;

        let spec = LaunchSpec::new("houdini", vec!["houdini".into()], BTreeMap::new());
        assert!(host.spawn(&spec).is_err());
        assert!(host.spawned().is_empty());
    }
}
