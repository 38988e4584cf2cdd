//! Host interfaces for hrun
//!
//! This crate defines the boundary between the supervisor and the platform:
//! spawning and waiting on the child, and forwarding termination signals to
//! the process group. The signal forwarding state machine lives here because
//! it is platform-agnostic; only the group operations it drives are not.

mod handle;
mod mock;
mod signals;
mod traits;

pub use handle::*;
pub use mock::*;
pub use signals::*;
pub use traits::*;
