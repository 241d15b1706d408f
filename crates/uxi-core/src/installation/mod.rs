//! Installation pipeline
//!
//! The steps of a run, each a thin wrapper over a process or HTTP call, and the
//! [`InstallationOrchestrator`] that sequences them.

pub mod artifact;
pub mod commands;
pub mod environment;
pub mod orchestrator;
pub mod package;
pub mod runtime_manager;
pub mod shortcut;


// Re-exports for convenience
pub use artifact::{ArtifactFetcher, ReleaseAsset};
pub use commands::{CondaCommand, PipCommand};
pub use environment::EnvironmentProvisioner;
pub use orchestrator::*;
pub use package::ArtifactInstaller;
pub use runtime_manager::{RuntimeManagerInstaller, RuntimeManagerProbe};
pub use shortcut::{LaunchTarget, PlatformShortcutRegistrar, ShortcutRegistrar};
