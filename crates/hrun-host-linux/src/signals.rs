//! Process group signal forwarding on Linux
//!
//! Everything reachable from the signal handler is async-signal-safe: no
//! allocation, no locks, no logging.

use hrun_host_api::{GroupControl, HostError, HostResult, SignalForwarder, SignalSet};
use nix::libc;
use nix::sys::signal::{
    self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal, killpg, pthread_sigmask,
};
use nix::unistd::{Pid, getpgrp};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Group operations backed by the real process APIs
pub struct NixGroupControl;

impl GroupControl for NixGroupControl {
    fn restore_default_dispositions(&self) {
        let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
        for sig in handled_signals() {
            // SAFETY: installing the default disposition has no handler to
            // uphold invariants for
            let _ = unsafe { signal::sigaction(sig, &default) };
        }
    }

    fn process_group(&self) -> i32 {
        getpgrp().as_raw()
    }

    fn terminate_group(&self, group_id: i32, signal: i32) {
        let Ok(sig) = Signal::try_from(signal) else {
            return;
        };

        // Keep our own copy of the signal pending so the exit status is ours
        let mut own = SigSet::empty();
        own.add(sig);
        let _ = pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&own), None);

        let _ = killpg(Pid::from_raw(group_id), sig);
    }

    fn exit(&self, code: i32) {
        // SAFETY: _exit is async-signal-safe and skips atexit handlers
        unsafe { libc::_exit(code) }
    }
}

static FORWARDER: SignalForwarder<NixGroupControl> = SignalForwarder::new(NixGroupControl);
static INSTALLED: AtomicBool = AtomicBool::new(false);

extern "C" fn forward_signal(signum: libc::c_int) {
    FORWARDER.on_signal(signum);
}

fn handled_signals() -> impl Iterator<Item = Signal> {
    SignalSet::numbers().filter_map(|n| Signal::try_from(n).ok())
}

/// Install the forwarding handler for every signal in [`SignalSet`].
///
/// Installing twice is a no-op. Once a signal has been forwarded the
/// handlers are never reinstalled.
pub fn arm_forwarding() -> HostResult<()> {
    if !FORWARDER.is_armed() {
        return Err(HostError::SignalSetup(
            "a termination signal was already forwarded".into(),
        ));
    }

    // Block the whole set while the handler runs
    let mut mask = SigSet::empty();
    for sig in handled_signals() {
        mask.add(sig);
    }
    let action = SigAction::new(SigHandler::Handler(forward_signal), SaFlags::SA_RESTART, mask);

    install_handlers(&INSTALLED, |sig| {
        // SAFETY: forward_signal only touches atomics and async-signal-safe
        // calls
        unsafe { signal::sigaction(sig, &action) }.map(drop)
    })?;

    debug!(signals = ?SignalSet::SIGNALS, "Signal forwarding armed");
    Ok(())
}

/// Run `install` for every handled signal. `installed` is only set once all
/// of them succeeded, so a failed attempt is retried in full.
fn install_handlers(
    installed: &AtomicBool,
    mut install: impl FnMut(Signal) -> nix::Result<()>,
) -> HostResult<()> {
    if installed.load(Ordering::Acquire) {
        return Ok(());
    }

    for sig in handled_signals() {
        install(sig).map_err(|e| {
            HostError::SignalSetup(format!("Failed to install handler for {}: {}", sig, e))
        })?;
    }

    installed.store(true, Ordering::Release);
    Ok(())
}
