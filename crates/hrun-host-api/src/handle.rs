//! Child process handle and exit status

use hrun_util::signal_exit_code;
use serde::{Deserialize, Serialize};

/// Handle to the spawned child
///
/// Owned by the supervisor for the duration of the wait. The pid is the raw
/// id observed at spawn time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildHandle {
    pub pid: u32,

    /// Executable that was started (`argv[0]`)
    pub program: String,

    status: Option<ExitStatus>,
}

impl ChildHandle {
    pub fn new(pid: u32, program: impl Into<String>) -> Self {
        Self {
            pid,
            program: program.into(),
            status: None,
        }
    }

    /// Record the termination result once the child has been reaped
    pub fn set_status(&mut self, status: ExitStatus) {
        self.status = Some(status);
    }

    pub fn status(&self) -> Option<ExitStatus> {
        self.status
    }
}

/// How the child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExitStatus {
    /// Normal exit with the given code
    Exited(i32),

    /// Killed by the given signal number
    Signaled(i32),
}

impl ExitStatus {
    pub fn success() -> Self {
        Self::Exited(0)
    }

    pub fn with_code(code: i32) -> Self {
        Self::Exited(code)
    }

    pub fn signaled(signal: i32) -> Self {
        Self::Signaled(signal)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Signaled(_) => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self {
            Self::Exited(_) => None,
            Self::Signaled(sig) => Some(*sig),
        }
    }

    /// Status the supervisor should exit with: the child's code unchanged, or
    /// `128 + N` when the child was killed by signal `N`
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exited(code) => *code,
            Self::Signaled(sig) => signal_exit_code(*sig),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status() {
        assert!(ExitStatus::success().is_success());
        assert!(!ExitStatus::with_code(1).is_success());
        assert!(!ExitStatus::signaled(9).is_success());
    }

    #[test]
    fn signaled_status_differs_from_equal_exit_code() {
        let signaled = ExitStatus::signaled(15);
        let exited = ExitStatus::with_code(15);

        assert_eq!(exited.exit_code(), 15);
        assert_eq!(signaled.exit_code(), 143);
        assert_ne!(signaled.exit_code(), exited.exit_code());
    }

    #[test]
    fn handle_records_status() {
        let mut handle = ChildHandle::new(4242, "houdini");
        assert!(handle.status().is_none());

        handle.set_status(ExitStatus::with_code(3));

        let json = serde_json::to_string(&handle).unwrap();
        let parsed: ChildHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.pid, 4242);
        assert_eq!(parsed.status(), Some(ExitStatus::Exited(3)));
    }
}
