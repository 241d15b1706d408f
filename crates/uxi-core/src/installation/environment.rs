//! Runtime environment provisioning

use crate::errors::InstallationResult;
use crate::installation::commands::CondaCommand;
use crate::logging::InstallLog;
use crate::process::ProcessRunner;
use std::path::{Path, PathBuf};

/// Creates and removes path-based conda environments
pub struct EnvironmentProvisioner<'a> {
    runner: &'a dyn ProcessRunner,
    conda: PathBuf,
}

impl<'a> EnvironmentProvisioner<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, conda: &Path) -> Self {
        Self {
            runner,
            conda: conda.to_path_buf(),
        }
    }

    /// Create a fresh environment at `env_path` pinned to `python_version`.
    /// The tool's stderr becomes the failure detail.
    pub async fn create(
        &self,
        env_path: &Path,
        python_version: &str,
        log: &InstallLog,
    ) -> InstallationResult<()> {
        log.banner("Conda Environment");
        log.info(format!(
            "Creating a Python {} environment at: {}",
            python_version,
            env_path.display()
        ));

        let command = CondaCommand::CreateEnv {
            prefix: env_path.to_path_buf(),
            python_version: python_version.to_string(),
        }
        .to_spec(&self.conda);

        let output = self.runner.run(&command).await?;
        if !output.success() {
            log.info(format!("Failed to create conda environment: {}", output.stderr.trim()));
        }
        output.into_result(&command)?;

        log.info(format!("Successfully created conda environment at: {}", env_path.display()));
        Ok(())
    }

    /// Remove the environment at `env_path`, reporting whether it succeeded.
    /// Never fails: callers use this as best-effort cleanup.
    pub async fn remove(&self, env_path: &Path, log: &InstallLog) -> bool {
        let command = CondaCommand::RemoveEnv {
            prefix: env_path.to_path_buf(),
        }
        .to_spec(&self.conda);

        match self.runner.run(&command).await {
            Ok(output) if output.success() => {
                log.info(format!("Removed conda environment at: {}", env_path.display()));
                true
            }
            Ok(output) => {
                log.warn(format!(
                    "Could not remove conda environment (exit code {}): {}",
                    output.exit_code,
                    output.stderr.trim()
                ));
                false
            }
            Err(e) => {
                log.warn(format!("Could not remove conda environment: {}", e));
                false
            }
        }
    }
}
