//! Configuration module for the installer
//!
//! Built-in defaults describe the AMD AI UX product. A YAML file and a small
//! set of environment variables can override them, which is mostly useful for
//! pointing the installer at a staging release feed.

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;
