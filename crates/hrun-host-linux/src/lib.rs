//! Linux host for hrun
//!
//! Provides:
//! - Child spawning inside the supervisor's process group
//! - Blocking exit observation
//! - Termination signal forwarding to the whole process group

mod adapter;
mod process;
mod signals;

pub use adapter::*;
pub use process::*;
pub use signals::*;
