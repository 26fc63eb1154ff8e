//! Process-level plumbing shared by every backend.
//!
//! - [`boundary`] - panic containment for OS callbacks
//! - [`thread`] - named threads and the owner-thread queue
//! - [`path`] - shell-like expansion of configured paths

pub mod boundary;
pub mod path;
pub mod thread;

pub use boundary::PanicBoundary;
pub use thread::{OwnerHandle, OwnerMessage, OwnerQueue, spawn_named_thread};
