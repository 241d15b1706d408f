//! Launch shortcut registration.
//!
//! Creating the shortcut is a UI side effect with no bearing on whether the
//! product works, so the orchestrator treats any failure here as a warning.

use crate::config::ProductConfig;
use crate::errors::{InstallationResult, InstallerError};
use crate::logging::InstallLog;
use crate::platform::{OsFamily, PlatformProfile};
use crate::process::{CommandSpec, ProcessRunner};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What the shortcut should launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub install_dir: PathBuf,
    pub environment_path: PathBuf,
    pub shortcut_name: String,
    pub launch_url: String,
}

impl LaunchTarget {
    pub fn new(product: &ProductConfig, install_dir: &Path, environment_path: &Path) -> Self {
        Self {
            install_dir: install_dir.to_path_buf(),
            environment_path: environment_path.to_path_buf(),
            shortcut_name: product.shortcut_name.clone(),
            launch_url: product.launch_url.clone(),
        }
    }
}

/// Creates a user-facing launch entry point.
///
/// Returns the path of the created shortcut, or `None` when the platform has
/// no shortcut mechanism.
#[async_trait]
pub trait ShortcutRegistrar: Send + Sync {
    async fn register(
        &self,
        target: &LaunchTarget,
        log: &InstallLog,
    ) -> InstallationResult<Option<PathBuf>>;
}

/// Desktop shortcut via PowerShell on Windows; unsupported elsewhere
pub struct PlatformShortcutRegistrar {
    runner: Arc<dyn ProcessRunner>,
    platform: PlatformProfile,
}

impl PlatformShortcutRegistrar {
    pub fn new(runner: Arc<dyn ProcessRunner>, platform: PlatformProfile) -> Self {
        Self { runner, platform }
    }

    /// PowerShell script creating a `.lnk` that activates the environment and opens the UI
    pub fn powershell_script(target: &LaunchTarget, shortcut_path: &Path) -> String {
        format!(
            r#"$WshShell = New-Object -comObject WScript.Shell
$Shortcut = $WshShell.CreateShortcut("{shortcut}")
$Shortcut.TargetPath = "cmd.exe"
$Shortcut.Arguments = "/C conda activate {env} > NUL 2>&1 && start `"`" {url}"
$Shortcut.Save()
"#,
            shortcut = shortcut_path.display(),
            env = target.environment_path.display(),
            url = target.launch_url,
        )
    }

    async fn register_windows(
        &self,
        target: &LaunchTarget,
        log: &InstallLog,
    ) -> InstallationResult<Option<PathBuf>> {
        let shortcut_path = self
            .platform
            .desktop_dir
            .join(format!("{}.lnk", target.shortcut_name));

        let mut script = tempfile::Builder::new()
            .prefix("create_shortcut")
            .suffix(".ps1")
            .tempfile()?;
        script.write_all(Self::powershell_script(target, &shortcut_path).as_bytes())?;
        script.flush()?;

        let command = CommandSpec::new("powershell")
            .args(["-ExecutionPolicy", "Bypass", "-File"])
            .arg(script.path());
        let output = self.runner.run(&command).await?;

        if !output.success() {
            log.info(format!("PowerShell script failed with return code: {}", output.exit_code));
            log.info(format!("PowerShell script stdout: {}", output.stdout.trim()));
            log.info(format!("PowerShell script stderr: {}", output.stderr.trim()));
            return Err(InstallerError::Shortcut {
                reason: format!("PowerShell exited with code {}", output.exit_code),
            });
        }

        log.info(format!("Created desktop shortcut at: {}", shortcut_path.display()));
        Ok(Some(shortcut_path))
    }
}

#[async_trait]
impl ShortcutRegistrar for PlatformShortcutRegistrar {
    async fn register(
        &self,
        target: &LaunchTarget,
        log: &InstallLog,
    ) -> InstallationResult<Option<PathBuf>> {
        log.info("Creating shortcuts...");
        match self.platform.os {
            OsFamily::Windows => self.register_windows(target, log).await,
            OsFamily::MacOs | OsFamily::Linux => {
                log.info("Shortcut creation not implemented for this platform");
                Ok(None)
            }
        }
    }
}
