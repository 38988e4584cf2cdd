//! Shared types for hrun
//!
//! Versions and their ordering, the launch plan handed to the process host,
//! and the interface to the build inventory that owns installed versions.

mod inventory;
mod launch;
mod version;

pub use inventory::*;
pub use launch::*;
pub use version::*;
