//! Artifact installation into the environment

use crate::errors::{InstallationResult, InstallerError};
use crate::installation::commands::PipCommand;
use crate::logging::InstallLog;
use crate::process::ProcessRunner;
use std::path::Path;

/// Installs a downloaded artifact with the environment's pip
pub struct ArtifactInstaller<'a> {
    runner: &'a dyn ProcessRunner,
}

impl<'a> ArtifactInstaller<'a> {
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        Self { runner }
    }

    /// Install `artifact` with `python -m pip`, forwarding every output line to
    /// the log while the installer runs. Succeeds iff pip exits with 0.
    pub async fn install(
        &self,
        python: &Path,
        artifact: &Path,
        log: &InstallLog,
    ) -> InstallationResult<()> {
        log.stage_banner("Wheel File Installation");
        log.info(format!("Installing wheel from: {}", artifact.display()));
        log.info("This may take a few minutes. Please wait...");

        let command = PipCommand::install(python, artifact).to_spec();
        let mut line_count = 0usize;
        let exit_code = self
            .runner
            .stream(&command, &mut |line: &str| {
                line_count += 1;
                log.info(line);
            })
            .await?;
        log::debug!("pip produced {} lines of output", line_count);

        if exit_code != 0 {
            log.error("Failed to install wheel file");
            log.info(format!("Pip installation returned error code: {}", exit_code));
            return Err(InstallerError::Subprocess {
                command: command.to_string(),
                exit_code,
                output: "see the install log for pip output".to_string(),
            });
        }

        log.info("Wheel file successfully installed");
        Ok(())
    }
}
