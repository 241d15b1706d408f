//! Runtime manager (conda) discovery and installation

use crate::config::RuntimeManagerConfig;
use crate::errors::{InstallationResult, InstallerError};
use crate::http::HttpFetcher;
use crate::logging::InstallLog;
use crate::platform::PlatformProfile;
use crate::process::ProcessRunner;
use std::path::PathBuf;

/// Finds an existing runtime manager on the PATH
pub struct RuntimeManagerProbe<'a> {
    runner: &'a dyn ProcessRunner,
    platform: &'a PlatformProfile,
    config: &'a RuntimeManagerConfig,
}

impl<'a> RuntimeManagerProbe<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        platform: &'a PlatformProfile,
        config: &'a RuntimeManagerConfig,
    ) -> Self {
        Self {
            runner,
            platform,
            config,
        }
    }

    /// Path of the manager executable, or `None` when it is not installed.
    ///
    /// A failing locate command counts as "not installed".
    pub async fn locate(&self, log: &InstallLog) -> Option<PathBuf> {
        log.info(format!("Checking if {} is installed...", self.config.executable));
        let command = self.platform.locate_command(&self.config.executable);

        let output = match self.runner.run(&command).await {
            Ok(output) => output,
            Err(e) => {
                log.info(format!("Error checking for {}: {}", self.config.executable, e));
                return None;
            }
        };

        let first_line = output
            .stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty());

        match first_line {
            Some(path) if output.success() => {
                log.info(format!("{} found at: {}", self.config.executable, path));
                Some(PathBuf::from(path))
            }
            _ => {
                log.info(format!("{} not found in PATH", self.config.executable));
                None
            }
        }
    }
}

/// Downloads and silently installs Miniconda for the current user
pub struct RuntimeManagerInstaller<'a> {
    runner: &'a dyn ProcessRunner,
    http: &'a dyn HttpFetcher,
    platform: &'a PlatformProfile,
    config: &'a RuntimeManagerConfig,
}

impl<'a> RuntimeManagerInstaller<'a> {
    pub fn new(
        runner: &'a dyn ProcessRunner,
        http: &'a dyn HttpFetcher,
        platform: &'a PlatformProfile,
        config: &'a RuntimeManagerConfig,
    ) -> Self {
        Self {
            runner,
            http,
            platform,
            config,
        }
    }

    /// Install the manager and return the path of its executable
    pub async fn install(&self, log: &InstallLog) -> InstallationResult<PathBuf> {
        log.banner("Miniconda");
        let asset = self.platform.manager_installer(self.config)?;

        std::fs::create_dir_all(&self.platform.temp_dir)?;
        let staging = tempfile::Builder::new()
            .prefix("uxi-miniconda")
            .tempdir_in(&self.platform.temp_dir)?;
        let installer_path = staging.path().join(&asset.file_name);

        log.info("Downloading Miniconda installer...");
        log.info(format!("Downloading from: {}", asset.url));
        let response = self
            .http
            .download(&asset.url, &installer_path)
            .await
            .map_err(|e| tool_missing(&self.config.executable, format!("download failed: {}", e)))?;
        if response.status != 200 {
            return Err(tool_missing(
                &self.config.executable,
                format!("installer download returned HTTP {}", response.status),
            ));
        }
        log.info(format!("Downloaded installer to: {}", installer_path.display()));

        if self.platform.needs_exec_bit() {
            make_executable(&installer_path)?;
        }

        let prefix = self.platform.manager_prefix(self.config);
        log.info(format!("Installing Miniconda to: {}", prefix.display()));
        let command = self.platform.silent_install_command(&installer_path, &prefix);
        let exit_code = self.runner.run_inherited(&command).await?;
        if exit_code != 0 {
            log.info(format!("Miniconda installation failed with code: {}", exit_code));
            return Err(tool_missing(
                &self.config.executable,
                format!("installer exited with code {}", exit_code),
            ));
        }

        let executable = self.platform.manager_executable(&prefix, self.config);
        if !executable.exists() {
            return Err(tool_missing(
                &self.config.executable,
                format!("executable not found at expected location: {}", executable.display()),
            ));
        }
        log.info("Miniconda installation completed successfully");

        log.info("Initializing conda...");
        for init in self.platform.shell_init_commands(&executable) {
            match self.runner.run(&init).await {
                Ok(output) if output.success() => {}
                Ok(output) => log.warn(format!("'{}' exited with code {}", init, output.exit_code)),
                Err(e) => log.warn(format!("'{}' failed: {}", init, e)),
            }
        }

        Ok(executable)
    }
}

fn tool_missing(tool: &str, reason: String) -> InstallerError {
    InstallerError::ToolMissing {
        tool: tool.to_string(),
        reason,
    }
}

fn make_executable(path: &std::path::Path) -> InstallationResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
