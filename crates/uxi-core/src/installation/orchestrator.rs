//! Installation orchestrator.
//!
//! Runs the pipeline exactly once, in order:
//!
//! 1. pre-flight cleanup of an existing installation
//! 2. runtime manager resolution (install Miniconda when absent)
//! 3. environment provisioning
//! 4. artifact acquisition from the release feed
//! 5. artifact installation
//! 6. shortcut registration (optional, never fatal)
//!
//! The first failing step fixes the outcome and nothing after it runs. There
//! are no retries and no rollback beyond the cleanup done in step 1.

use crate::config::InstallerConfig;
use crate::errors::{InstallationResult, InstallerError};
use crate::http::HttpFetcher;
use crate::installation::artifact::ArtifactFetcher;
use crate::installation::environment::EnvironmentProvisioner;
use crate::installation::package::ArtifactInstaller;
use crate::installation::runtime_manager::{RuntimeManagerInstaller, RuntimeManagerProbe};
use crate::installation::shortcut::{LaunchTarget, ShortcutRegistrar};
use crate::logging::InstallLog;
use crate::platform::PlatformProfile;
use crate::process::ProcessRunner;
use crate::prompt::{ConfirmationPolicy, ConfirmationProvider};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Parameters of one install run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub target_directory: PathBuf,
    pub create_shortcuts: bool,
    pub assume_yes: bool,
}

/// Pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Cleanup,
    RuntimeManager,
    Environment,
    ArtifactFetch,
    ArtifactInstall,
    Shortcuts,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::Cleanup => "pre-flight cleanup",
            Step::RuntimeManager => "runtime manager resolution",
            Step::Environment => "environment provisioning",
            Step::ArtifactFetch => "artifact acquisition",
            Step::ArtifactInstall => "artifact installation",
            Step::Shortcuts => "shortcut registration",
        };
        f.write_str(label)
    }
}

/// Where the run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pending,
    Success,
    FailedAt(Step),
}

/// Result of a single step as seen by the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub succeeded: bool,
    pub detail: String,
}

impl StepResult {
    fn from_result<T>(result: &InstallationResult<T>) -> Self {
        match result {
            Ok(_) => Self {
                succeeded: true,
                detail: String::new(),
            },
            Err(e) => Self {
                succeeded: false,
                detail: e.to_string(),
            },
        }
    }
}

/// Transient state of a run, owned by the orchestrator
#[derive(Debug, Clone)]
pub struct InstallationState {
    pub runtime_manager_path: Option<PathBuf>,
    pub environment_path: PathBuf,
    pub python_executable_path: PathBuf,
    pub artifact_path: Option<PathBuf>,
    pub outcome: Outcome,
    pub steps: Vec<(Step, StepResult)>,
}

impl InstallationState {
    fn new(environment_path: PathBuf, python_executable_path: PathBuf) -> Self {
        Self {
            runtime_manager_path: None,
            environment_path,
            python_executable_path,
            artifact_path: None,
            outcome: Outcome::Pending,
            steps: Vec::new(),
        }
    }

    /// Record a step's result. The first fatal failure fixes the outcome.
    fn record<T>(&mut self, step: Step, result: &InstallationResult<T>) {
        if self.outcome == Outcome::Pending && matches!(result, Err(e) if e.is_fatal()) {
            self.outcome = Outcome::FailedAt(step);
        }
        self.steps.push((step, StepResult::from_result(result)));
    }

    /// Whether `step` ran (successfully or not)
    pub fn attempted(&self, step: Step) -> bool {
        self.steps.iter().any(|(s, _)| *s == step)
    }
}

/// Process exit status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallExit {
    Success,
    Failure,
}

impl InstallExit {
    pub fn code(&self) -> u8 {
        match self {
            InstallExit::Success => 0,
            InstallExit::Failure => 1,
        }
    }
}

impl From<InstallExit> for std::process::ExitCode {
    fn from(exit: InstallExit) -> Self {
        std::process::ExitCode::from(exit.code())
    }
}

struct StepFailure {
    step: Step,
    error: InstallerError,
}

trait StepResultExt<T> {
    fn at(self, step: Step, state: &mut InstallationState) -> Result<T, StepFailure>;
}

impl<T> StepResultExt<T> for InstallationResult<T> {
    fn at(self, step: Step, state: &mut InstallationState) -> Result<T, StepFailure> {
        state.record(step, &self);
        self.map_err(|error| StepFailure { step, error })
    }
}

/// External collaborators the orchestrator drives
#[derive(Clone)]
pub struct Collaborators {
    pub runner: Arc<dyn ProcessRunner>,
    pub http: Arc<dyn HttpFetcher>,
    pub confirm: Arc<dyn ConfirmationProvider>,
    pub shortcuts: Arc<dyn ShortcutRegistrar>,
}

/// Empties a directory except for the named file
pub type DirectoryCleaner = fn(&Path, &str) -> std::io::Result<()>;

/// Sequences the installation steps and owns the failure policy
pub struct InstallationOrchestrator {
    config: InstallerConfig,
    platform: PlatformProfile,
    log: InstallLog,
    collaborators: Collaborators,
    clear_dir: DirectoryCleaner,
}

impl InstallationOrchestrator {
    pub fn new(
        config: InstallerConfig,
        platform: PlatformProfile,
        log: InstallLog,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            config,
            platform,
            log,
            collaborators,
            clear_dir: clear_directory,
        }
    }

    /// Replace the function that wipes an existing installation
    pub fn with_directory_cleaner(mut self, cleaner: DirectoryCleaner) -> Self {
        self.clear_dir = cleaner;
        self
    }

    /// Run the whole pipeline once and return the process exit status
    pub async fn run(&self, request: &InstallRequest) -> InstallExit {
        self.run_with_state(request).await.0
    }

    /// Like [`run`](Self::run), also returning the final state
    pub async fn run_with_state(
        &self,
        request: &InstallRequest,
    ) -> (InstallExit, InstallationState) {
        let install_dir = request.target_directory.as_path();
        let environment_path = install_dir.join(&self.config.product.env_name);
        let python = self.platform.python_executable(&environment_path);
        let mut state = InstallationState::new(environment_path, python);

        let existing = has_existing_installation(install_dir, &self.config.product.log_file_name());
        if let Err(e) = std::fs::create_dir_all(install_dir) {
            log::warn!("Could not create {}: {}", install_dir.display(), e);
        }

        self.log.info("*** INSTALLATION STARTED ***");
        self.log.info(format!(
            "Installing {} to: {}",
            self.config.product.name,
            install_dir.display()
        ));

        if let Err(failure) = self.execute(request, existing, &mut state).await {
            self.report_failure(&failure);
            return (InstallExit::Failure, state);
        }
        state.outcome = Outcome::Success;

        if request.create_shortcuts {
            let target =
                LaunchTarget::new(&self.config.product, install_dir, &state.environment_path);
            let result = self.collaborators.shortcuts.register(&target, &self.log).await;
            state.record(Step::Shortcuts, &result);
            if let Err(e) = result {
                self.log.warn(format!("Failed to create shortcuts: {}", e));
            }
        }

        self.report_success(&state);
        (InstallExit::Success, state)
    }

    async fn execute(
        &self,
        request: &InstallRequest,
        existing: bool,
        state: &mut InstallationState,
    ) -> Result<(), StepFailure> {
        self.preflight_cleanup(request, existing, &state.environment_path)
            .await
            .at(Step::Cleanup, state)?;

        let conda = self
            .resolve_runtime_manager(request)
            .await
            .at(Step::RuntimeManager, state)?;
        state.runtime_manager_path = Some(conda.clone());

        EnvironmentProvisioner::new(self.collaborators.runner.as_ref(), &conda)
            .create(&state.environment_path, &self.config.product.python_version, &self.log)
            .await
            .at(Step::Environment, state)?;

        let wheels_dir = request.target_directory.join("wheels");
        let artifact = ArtifactFetcher::new(self.collaborators.http.as_ref(), &self.config.feed)
            .fetch(&wheels_dir, &self.log)
            .await
            .at(Step::ArtifactFetch, state)?;
        state.artifact_path = Some(artifact.clone());

        ArtifactInstaller::new(self.collaborators.runner.as_ref())
            .install(&state.python_executable_path, &artifact, &self.log)
            .await
            .at(Step::ArtifactInstall, state)?;

        Ok(())
    }

    /// Wipe a previous installation so the run starts from an empty directory
    async fn preflight_cleanup(
        &self,
        request: &InstallRequest,
        existing: bool,
        env_path: &Path,
    ) -> InstallationResult<()> {
        let install_dir = request.target_directory.as_path();

        match ConfirmationPolicy::decide(request.assume_yes, existing) {
            ConfirmationPolicy::NotNeeded => {
                return std::fs::create_dir_all(install_dir).map_err(|e| {
                    InstallerError::environment(format!(
                        "Failed to create install directory {}: {}",
                        install_dir.display(),
                        e
                    ))
                });
            }
            ConfirmationPolicy::Ask => {
                self.log.info(format!(
                    "An existing installation was found at: {}",
                    install_dir.display()
                ));
                let prompt = "Would you like to remove it and continue with the installation?";
                if !self.collaborators.confirm.confirm(prompt) {
                    self.log.info("Installation cancelled by user");
                    return Err(InstallerError::UserDeclined {
                        prompt: prompt.to_string(),
                    });
                }
            }
            ConfirmationPolicy::AutoApprove => {
                self.log.info(format!(
                    "An existing installation was found at: {}",
                    install_dir.display()
                ));
                self.log.info("Automatically removing existing installation due to '--yes' flag");
            }
        }

        self.log.info("Removing existing installation...");

        // Environment removal failing is tolerated; the directory wipe below is not.
        if env_path.exists() {
            match self.probe().locate(&self.log).await {
                Some(conda) => {
                    EnvironmentProvisioner::new(self.collaborators.runner.as_ref(), &conda)
                        .remove(env_path, &self.log)
                        .await;
                }
                None => self.log.warn("Skipping conda environment removal, conda was not found"),
            }
        }

        // The install log is kept so this run's earlier lines and past runs survive the wipe
        (self.clear_dir)(install_dir, &self.config.product.log_file_name())
            .and_then(|_| std::fs::create_dir_all(install_dir))
            .map_err(|e| {
                InstallerError::environment(format!(
                    "Failed to remove existing installation: {}",
                    e
                ))
            })?;

        self.log.info("Deleted all contents of install directory");
        Ok(())
    }

    /// Locate conda, installing Miniconda (after confirmation) when it is missing
    async fn resolve_runtime_manager(
        &self,
        request: &InstallRequest,
    ) -> InstallationResult<PathBuf> {
        if let Some(conda) = self.probe().locate(&self.log).await {
            return Ok(conda);
        }

        self.log.info("Conda not installed");
        if ConfirmationPolicy::decide(request.assume_yes, true) == ConfirmationPolicy::Ask {
            let prompt = "Conda is not installed. Would you like to install Miniconda?";
            if !self.collaborators.confirm.confirm(prompt) {
                self.log.info("Installation cancelled by user");
                return Err(InstallerError::UserDeclined {
                    prompt: prompt.to_string(),
                });
            }
        }

        RuntimeManagerInstaller::new(
            self.collaborators.runner.as_ref(),
            self.collaborators.http.as_ref(),
            &self.platform,
            &self.config.runtime_manager,
        )
        .install(&self.log)
        .await
    }

    fn probe(&self) -> RuntimeManagerProbe<'_> {
        RuntimeManagerProbe::new(
            self.collaborators.runner.as_ref(),
            &self.platform,
            &self.config.runtime_manager,
        )
    }

    fn report_failure(&self, failure: &StepFailure) {
        if let InstallerError::UserDeclined { .. } = failure.error {
            return;
        }

        let product = &self.config.product.name;
        self.log.error(format!("{} failed: {}", failure.step, failure.error));
        if let Some(hint) = failure.error.remediation(product) {
            self.log.info(hint);
        }

        let summary = match failure.step {
            Step::Cleanup => "Failed to remove the existing installation.".to_string(),
            Step::RuntimeManager => {
                "Failed to install Miniconda. Installation will be aborted.".to_string()
            }
            Step::Environment => {
                "Failed to create the Python environment. Installation will be aborted.".to_string()
            }
            Step::ArtifactFetch => format!(
                "Failed to download the {} package. \
                 Please check your internet connection and try again.",
                product
            ),
            Step::ArtifactInstall => format!(
                "Failed to install the {} package. Please check the logs for details.",
                product
            ),
            Step::Shortcuts => "Failed to create shortcuts.".to_string(),
        };
        self.log.info(summary);
    }

    fn report_success(&self, state: &InstallationState) {
        let product = &self.config.product;
        self.log.info("*** INSTALLATION COMPLETED ***");
        self.log.info(format!("{} installation completed successfully!", product.name));
        self.log.info(format!("You can start {} by running:", product.name));
        self.log.info(format!("  conda activate {}", state.environment_path.display()));
        self.log.info(format!("  {}", product.launch_command));
        self.log.info("Or by using the desktop shortcut if created");
    }
}

/// Remove every entry of `dir` except the file named `keep`
pub fn clear_directory(dir: &Path, keep: &str) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy() == keep {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// True when `dir` holds anything besides the installer's own log file
fn has_existing_installation(dir: &Path, log_file_name: &str) -> bool {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .any(|entry| entry.file_name().to_string_lossy() != log_file_name),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_existing_installation_ignores_log_file() {
        let dir = tempdir().unwrap();
        assert!(!has_existing_installation(dir.path(), "P_install.log"));
        assert!(!has_existing_installation(&dir.path().join("absent"), "P_install.log"));

        std::fs::write(dir.path().join("P_install.log"), "old").unwrap();
        assert!(!has_existing_installation(dir.path(), "P_install.log"));

        std::fs::create_dir(dir.path().join("wheels")).unwrap();
        assert!(has_existing_installation(dir.path(), "P_install.log"));
    }

    #[test]
    fn test_clear_directory_keeps_only_the_log() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("P_install.log"), "earlier run\n").unwrap();
        std::fs::write(dir.path().join("stale.txt"), "old").unwrap();
        std::fs::create_dir_all(dir.path().join("env").join("bin")).unwrap();
        std::fs::write(dir.path().join("env").join("bin").join("python"), "").unwrap();

        clear_directory(dir.path(), "P_install.log").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["P_install.log".to_string()]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("P_install.log")).unwrap(),
            "earlier run\n"
        );
    }

    #[test]
    fn test_first_failure_fixes_outcome() {
        let mut state =
            InstallationState::new(PathBuf::from("/i/env"), PathBuf::from("/i/env/bin/python"));
        state.record::<()>(Step::Cleanup, &Ok(()));
        state.record::<()>(Step::Environment, &Err(InstallerError::environment("x")));
        state.record::<()>(Step::ArtifactFetch, &Err(InstallerError::environment("y")));

        assert_eq!(state.outcome, Outcome::FailedAt(Step::Environment));
        assert!(state.steps[0].1.succeeded);
        assert_eq!(state.steps[1].1.detail, "Environment error: x");
    }

    #[test]
    fn test_shortcut_failure_does_not_fix_outcome() {
        let mut state = InstallationState::new(PathBuf::from("/e"), PathBuf::from("/e/python"));
        state.outcome = Outcome::Success;
        state.record::<()>(Step::Shortcuts, &Err(InstallerError::Shortcut { reason: "r".into() }));
        assert_eq!(state.outcome, Outcome::Success);
        assert!(state.attempted(Step::Shortcuts));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(InstallExit::Success.code(), 0);
        assert_eq!(InstallExit::Failure.code(), 1);
    }
}
