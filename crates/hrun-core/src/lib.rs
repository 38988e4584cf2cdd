//! Core of hrun
//!
//! This crate contains:
//! - Version resolution from `latest`, `default` or a partial version string
//! - Launch environment construction, including allocator-bypass mode
//! - The supervisor that spawns the child and propagates its exit status

mod environment;
mod matcher;
mod report;
mod supervisor;

pub use environment::*;
pub use matcher::*;
pub use report::*;
pub use supervisor::*;
