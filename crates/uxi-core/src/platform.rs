//! Platform profile.
//!
//! All OS-specific paths and commands live here. The profile is resolved once
//! at startup and passed to the steps, so the orchestrator itself never
//! branches on the operating system.

use crate::config::RuntimeManagerConfig;
use crate::errors::{InstallationResult, InstallerError};
use crate::process::CommandSpec;
use std::path::{Path, PathBuf};

/// Operating system families the installer knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

impl OsFamily {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOs,
            _ => OsFamily::Linux,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, OsFamily::Windows)
    }
}

/// Downloadable runtime-manager installer for this platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerInstallerAsset {
    pub url: String,
    pub file_name: String,
}

/// OS-specific facts and command shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    pub os: OsFamily,
    pub arch: String,
    pub home_dir: PathBuf,
    pub local_data_dir: PathBuf,
    pub desktop_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl PlatformProfile {
    /// Resolve the profile of the machine we are running on
    pub fn detect() -> InstallationResult<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| {
            InstallerError::environment("Could not determine the user's home directory")
        })?;
        let local_data_dir =
            dirs::data_local_dir().unwrap_or_else(|| home_dir.join(".local").join("share"));
        let desktop_dir = dirs::desktop_dir().unwrap_or_else(|| home_dir.join("Desktop"));

        Ok(Self {
            os: OsFamily::current(),
            arch: std::env::consts::ARCH.to_string(),
            home_dir,
            local_data_dir,
            desktop_dir,
            temp_dir: std::env::temp_dir(),
        })
    }

    /// Build a profile rooted at `home`, used to keep side effects in one place
    pub fn with_home(os: OsFamily, arch: &str, home: &Path) -> Self {
        let local_data_dir = match os {
            OsFamily::Windows => home.join("AppData").join("Local"),
            OsFamily::MacOs => home.join("Library").join("Application Support"),
            OsFamily::Linux => home.join(".local").join("share"),
        };
        Self {
            os,
            arch: arch.to_string(),
            home_dir: home.to_path_buf(),
            local_data_dir,
            desktop_dir: home.join("Desktop"),
            temp_dir: home.join("tmp"),
        }
    }

    /// Default install directory for a product tag
    pub fn default_install_dir(&self, product_tag: &str) -> PathBuf {
        match self.os {
            OsFamily::Windows => self.local_data_dir.join(product_tag),
            _ => self.home_dir.join(product_tag),
        }
    }

    /// Command that prints the full path of `tool` when it is on the PATH
    pub fn locate_command(&self, tool: &str) -> CommandSpec {
        match self.os {
            OsFamily::Windows => CommandSpec::new("where").arg(tool),
            _ => CommandSpec::new("which").arg(tool),
        }
    }

    /// Miniconda installer matching this OS and architecture
    pub fn manager_installer(
        &self,
        config: &RuntimeManagerConfig,
    ) -> InstallationResult<ManagerInstallerAsset> {
        let file_name = match (self.os, self.arch.as_str()) {
            (OsFamily::Windows, "x86_64") => "Miniconda3-latest-Windows-x86_64.exe",
            (OsFamily::MacOs, "aarch64") => "Miniconda3-latest-MacOSX-arm64.sh",
            (OsFamily::MacOs, "x86_64") => "Miniconda3-latest-MacOSX-x86_64.sh",
            (OsFamily::Linux, "x86_64") => "Miniconda3-latest-Linux-x86_64.sh",
            (OsFamily::Linux, "aarch64") => "Miniconda3-latest-Linux-aarch64.sh",
            (os, arch) => {
                return Err(InstallerError::PlatformNotSupported {
                    platform: format!("{:?}-{}", os, arch),
                })
            }
        };

        Ok(ManagerInstallerAsset {
            url: format!("{}/{}", config.installer_base_url.trim_end_matches('/'), file_name),
            file_name: file_name.to_string(),
        })
    }

    /// Prefix the runtime manager is installed into
    pub fn manager_prefix(&self, config: &RuntimeManagerConfig) -> PathBuf {
        self.home_dir.join(&config.install_dir_name)
    }

    /// Location of the manager executable inside an install prefix
    pub fn manager_executable(&self, prefix: &Path, config: &RuntimeManagerConfig) -> PathBuf {
        match self.os {
            OsFamily::Windows => prefix.join("Scripts").join(format!("{}.exe", config.executable)),
            _ => prefix.join("bin").join(&config.executable),
        }
    }

    /// Unattended, per-user install that leaves the system Python alone
    pub fn silent_install_command(&self, installer: &Path, prefix: &Path) -> CommandSpec {
        match self.os {
            OsFamily::Windows => CommandSpec::new(installer).args([
                "/InstallationType=JustMe".to_string(),
                "/AddToPath=1".to_string(),
                "/RegisterPython=0".to_string(),
                "/S".to_string(),
                format!("/D={}", prefix.display()),
            ]),
            _ => CommandSpec::new(installer)
                .arg("-b")
                .arg("-p")
                .arg(prefix),
        }
    }

    /// Commands registering the manager's shell integration
    pub fn shell_init_commands(&self, manager: &Path) -> Vec<CommandSpec> {
        match self.os {
            OsFamily::Windows => vec![CommandSpec::new(manager).arg("init")],
            _ => ["bash", "zsh"]
                .iter()
                .map(|shell| CommandSpec::new(manager).arg("init").arg(shell))
                .collect(),
        }
    }

    /// Python interpreter inside an environment
    pub fn python_executable(&self, env_path: &Path) -> PathBuf {
        match self.os {
            OsFamily::Windows => env_path.join("python.exe"),
            _ => env_path.join("bin").join("python"),
        }
    }

    /// Whether a downloaded installer needs the executable bit set
    pub fn needs_exec_bit(&self) -> bool {
        !self.os.is_windows()
    }
}
