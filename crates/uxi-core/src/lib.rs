//! Core pipeline for the one-shot AMD AI UX installer.
//!
//! The installer provisions the application in a single linear run:
//! it makes sure a conda runtime manager is present, creates an isolated
//! Python environment inside the install directory, downloads the newest
//! wheel from the release feed, installs it with pip and registers a launch
//! shortcut.
//!
//! # Architecture Overview
//!
//! - **Orchestration**: [`installation::InstallationOrchestrator`] sequences the steps
//!   and owns the failure policy
//! - **Process execution**: [`process::ProcessRunner`] runs external tools and never
//!   fails on a non-zero exit
//! - **HTTP**: [`http::HttpFetcher`] performs release-feed queries and downloads
//! - **Platform profile**: [`platform::PlatformProfile`] isolates every OS-specific path
//!   and command
//! - **Prompting**: [`prompt::ConfirmationProvider`] decouples user confirmation from
//!   the pipeline logic
//! - **Logging**: [`logging::InstallLog`] is the explicit install-log handle

pub mod config;
pub mod errors;
pub mod http;
pub mod installation;
pub mod logging;
pub mod platform;
pub mod process;
pub mod prompt;

pub use config::{ConfigLoader, InstallerConfig};
pub use errors::{FetchError, InstallationResult, InstallerError};
pub use installation::{InstallExit, InstallRequest, InstallationOrchestrator};
pub use logging::InstallLog;
pub use platform::PlatformProfile;

#[cfg(test)]
pub mod test_utils;
