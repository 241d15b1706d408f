//! Typed builders for the external tool invocations

use crate::process::CommandSpec;
use std::path::{Path, PathBuf};

/// Runtime-manager (conda) subcommands used by the installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CondaCommand {
    /// Create an environment at an explicit path
    CreateEnv { prefix: PathBuf, python_version: String },
    /// Remove the environment at an explicit path
    RemoveEnv { prefix: PathBuf },
}

impl CondaCommand {
    pub fn to_spec(&self, conda: &Path) -> CommandSpec {
        match self {
            CondaCommand::CreateEnv {
                prefix,
                python_version,
            } => CommandSpec::new(conda)
                .arg("create")
                .arg("-p")
                .arg(prefix)
                .arg(format!("python={}", python_version))
                .arg("-y"),
            CondaCommand::RemoveEnv { prefix } => CommandSpec::new(conda)
                .args(["env", "remove", "-p"])
                .arg(prefix)
                .arg("-y"),
        }
    }
}

/// `python -m pip install <artifact>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipCommand {
    pub python: PathBuf,
    pub artifact: PathBuf,
    pub verbose: bool,
}

impl PipCommand {
    pub fn install(python: &Path, artifact: &Path) -> Self {
        Self {
            python: python.to_path_buf(),
            artifact: artifact.to_path_buf(),
            verbose: true,
        }
    }

    pub fn to_spec(&self) -> CommandSpec {
        let spec = CommandSpec::new(&self.python)
            .args(["-m", "pip", "install"])
            .arg(&self.artifact);
        if self.verbose {
            spec.arg("--verbose")
        } else {
            spec
        }
    }
}
