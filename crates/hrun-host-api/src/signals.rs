//! Termination signal forwarding
//!
//! The supervisor forwards a fixed set of termination signals to its whole
//! process group, so that workers the child forked are stopped along with it.
//! The forwarder is a two-state machine, ARMED -> DISARMED, and only the
//! signal that wins the transition performs the group kill.

use hrun_util::FORWARDED_SIGNAL_EXIT;
use std::sync::atomic::{AtomicU8, Ordering};

pub const SIGHUP: i32 = 1;
pub const SIGINT: i32 = 2;
pub const SIGQUIT: i32 = 3;
pub const SIGTERM: i32 = 15;

/// Signals the forwarder handles, with their display names
pub struct SignalSet;

impl SignalSet {
    pub const SIGNALS: [(i32, &'static str); 4] = [
        (SIGHUP, "SIGHUP"),
        (SIGINT, "SIGINT"),
        (SIGQUIT, "SIGQUIT"),
        (SIGTERM, "SIGTERM"),
    ];

    pub fn contains(signal: i32) -> bool {
        Self::SIGNALS.iter().any(|(sig, _)| *sig == signal)
    }

    pub fn name(signal: i32) -> Option<&'static str> {
        Self::SIGNALS
            .iter()
            .find(|(sig, _)| *sig == signal)
            .map(|(_, name)| *name)
    }

    pub fn numbers() -> impl Iterator<Item = i32> {
        Self::SIGNALS.iter().map(|(sig, _)| *sig)
    }
}

/// Process group operations driven by the forwarder
///
/// Implementations are called from inside a signal handler and must only use
/// async-signal-safe operations: no allocation, locking, or logging.
pub trait GroupControl: Send + Sync {
    /// Reset every signal in [`SignalSet`] to its default disposition
    fn restore_default_dispositions(&self);

    /// Process group id of the calling process
    fn process_group(&self) -> i32;

    /// Send `signal` to every process in `group_id`
    fn terminate_group(&self, group_id: i32, signal: i32);

    /// Terminate the calling process with `code`. The real implementation
    /// does not return.
    fn exit(&self, code: i32);
}

const ARMED: u8 = 0;
const DISARMED: u8 = 1;

/// Forwarder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwarderState {
    Armed,
    Disarmed,
}

pub struct SignalForwarder<G> {
    state: AtomicU8,
    control: G,
}

impl<G: GroupControl> SignalForwarder<G> {
    pub const fn new(control: G) -> Self {
        Self {
            state: AtomicU8::new(ARMED),
            control,
        }
    }

    pub fn state(&self) -> ForwarderState {
        match self.state.load(Ordering::Acquire) {
            ARMED => ForwarderState::Armed,
            _ => ForwarderState::Disarmed,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state() == ForwarderState::Armed
    }

    pub fn control(&self) -> &G {
        &self.control
    }

    /// Handle delivery of `signal`.
    ///
    /// Returns `true` if this call performed the group kill. Signals outside
    /// [`SignalSet`] and every signal after the first are ignored.
    pub fn on_signal(&self, signal: i32) -> bool {
        if !SignalSet::contains(signal) {
            return false;
        }

        if self
            .state
            .compare_exchange(ARMED, DISARMED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        self.control.restore_default_dispositions();
        let group = self.control.process_group();
        self.control.terminate_group(group, SIGTERM);
        self.control.exit(FORWARDED_SIGNAL_EXIT);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GroupAction, MockGroupControl};
    use std::sync::{Arc, Barrier};

    #[test]
    fn signal_names() {
        assert_eq!(SignalSet::name(SIGTERM), Some("SIGTERM"));
        assert_eq!(SignalSet::name(SIGHUP), Some("SIGHUP"));
        assert_eq!(SignalSet::name(9), None);
        assert_eq!(SignalSet::numbers().count(), 4);
    }

    #[test]
    fn first_signal_kills_group_then_exits() {
        let forwarder = SignalForwarder::new(MockGroupControl::with_group(777));
        assert!(forwarder.is_armed());

        assert!(forwarder.on_signal(SIGINT));

        assert_eq!(forwarder.state(), ForwarderState::Disarmed);
        assert_eq!(
            forwarder.control().actions(),
            vec![
                GroupAction::RestoreDefaults,
                GroupAction::Terminate { group: 777, signal: SIGTERM },
                GroupAction::Exit(FORWARDED_SIGNAL_EXIT),
            ]
        );
    }

    #[test]
    fn second_signal_is_a_no_op() {
        let forwarder = SignalForwarder::new(MockGroupControl::with_group(777));

        assert!(forwarder.on_signal(SIGHUP));
        assert!(!forwarder.on_signal(SIGTERM));

        let control = forwarder.control();
        assert_eq!(control.terminate_count(), 1);
        assert_eq!(control.exit_count(), 1);
    }

    #[test]
    fn concurrent_signals_forward_once() {
        let forwarder = Arc::new(SignalForwarder::new(MockGroupControl::with_group(42)));
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [SIGINT, SIGQUIT]
            .into_iter()
            .map(|sig| {
                let forwarder = forwarder.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    forwarder.on_signal(sig)
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(forwarder.control().terminate_count(), 1);
        assert_eq!(forwarder.control().exit_count(), 1);
    }

    #[test]
    fn unhandled_signal_leaves_forwarder_armed() {
        let forwarder = SignalForwarder::new(MockGroupControl::with_group(1));

        assert!(!forwarder.on_signal(10));
        assert!(forwarder.is_armed());
        assert!(forwarder.control().actions().is_empty());
    }
}
