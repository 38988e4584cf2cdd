//! Shared utilities for hrun
//!
//! This crate provides:
//! - The error taxonomy shared by every hrun crate
//! - Exit code conventions for the supervisor process
//! - Default paths for the configuration file

mod error;
mod exit;
mod paths;

pub use error::*;
pub use exit::*;
pub use paths::*;
