/// Error types for the ghlaunch library.
pub mod errors;
/// Application configuration (TOML-based).
pub mod config;
/// Atomic file writes and the `~/.ghlaunch` data directory.
pub mod storage;
/// Project path resolution and uniquification.
pub mod project;
/// Cancellable countdown gate and platform input watchers.
pub mod gate;
/// Command builders for the Ghidra launcher and headless analyzer.
pub mod ghidra;

pub use errors::{LaunchError, Result};
pub use gate::{await_cancellation, InputWatcher};
pub use project::{resolve, ProjectDescriptor, PROJECT_EXTENSION};
