//! Test doubles for the installer's collaborators

pub mod fakes;
pub mod mock_release_server;

pub use fakes::*;
pub use mock_release_server::MockReleaseServer;
