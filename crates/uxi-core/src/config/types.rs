//! Configuration types for the installer

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub product: ProductConfig,
    pub feed: FeedConfig,
    pub runtime_manager: RuntimeManagerConfig,
}

/// Identity of the product being installed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductConfig {
    /// Human readable product name
    pub name: String,
    /// Filesystem-safe product tag, used for the default install dir and log file
    pub tag: String,
    /// Tag written into every install-log line
    pub log_tag: String,
    /// Directory name of the runtime environment inside the install dir
    pub env_name: String,
    /// Pinned Python version for the environment
    pub python_version: String,
    /// Command that starts the application once installed
    pub launch_command: String,
    /// URL the launch shortcut opens
    pub launch_url: String,
    /// File name (without extension) of the desktop shortcut
    pub shortcut_name: String,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            name: "AMD AI UX".to_string(),
            tag: "AMD_AI_UX".to_string(),
            log_tag: "AMD_AI_UX-Installer".to_string(),
            env_name: "amd_ai_ux_env".to_string(),
            python_version: "3.11".to_string(),
            launch_command: "open-webui".to_string(),
            launch_url: "http://localhost:8080".to_string(),
            shortcut_name: "AMD-AI-UX".to_string(),
        }
    }
}

impl ProductConfig {
    /// File name of the install log inside the install directory
    pub fn log_file_name(&self) -> String {
        format!("{}_install.log", self.tag)
    }
}

/// Release feed the artifact is fetched from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// "Latest release" metadata endpoint
    pub url: String,
    /// Suffix an asset name must end with to be selected
    pub asset_extension: String,
    /// Downloads smaller than this many bytes are rejected
    pub min_artifact_bytes: u64,
    pub api_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://api.github.com/repos/aigdat/open-webui/releases/latest".to_string(),
            asset_extension: ".whl".to_string(),
            min_artifact_bytes: 10_000,
            api_timeout_secs: 30,
            download_timeout_secs: 600,
            user_agent: "uxi-installer/0.1.0".to_string(),
        }
    }
}

/// Runtime manager (conda) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeManagerConfig {
    /// Executable name probed on the PATH
    pub executable: String,
    /// Base URL the Miniconda installers are downloaded from
    pub installer_base_url: String,
    /// Directory under the user's home the manager is installed into
    pub install_dir_name: String,
}

impl Default for RuntimeManagerConfig {
    fn default() -> Self {
        Self {
            executable: "conda".to_string(),
            installer_base_url: "https://repo.anaconda.com/miniconda".to_string(),
            install_dir_name: "miniconda3".to_string(),
        }
    }
}
