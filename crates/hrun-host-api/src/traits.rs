//! Process host traits

use hrun_api::LaunchSpec;
use thiserror::Error;

use crate::{ChildHandle, ExitStatus, SignalSet};

/// Errors from process host operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Wait failed: {0}")]
    WaitFailed(String),

    #[error("Signal setup failed: {0}")]
    SignalSetup(String),

    #[error("Unknown child process {0}")]
    UnknownChild(u32),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Platform process host - implemented by platform-specific adapters
pub trait ProcessHost {
    /// Install termination signal forwarding for the rest of the process
    /// lifetime
    fn arm_signal_forwarding(&self) -> HostResult<()>;

    /// Start the child described by `spec` with inherited standard streams
    fn spawn(&self, spec: &LaunchSpec) -> HostResult<ChildHandle>;

    /// Block until the child terminates. There is no timeout.
    fn wait(&self, child: &mut ChildHandle) -> HostResult<ExitStatus>;

    /// Display name of `signal`, if the platform knows it
    fn signal_name(&self, signal: i32) -> Option<&'static str> {
        SignalSet::name(signal)
    }
}
