use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use uxi_core::http::ReqwestFetcher;
use uxi_core::installation::{Collaborators, PlatformShortcutRegistrar};
use uxi_core::logging::init_diagnostics;
use uxi_core::process::{ProcessRunner, SystemProcessRunner};
use uxi_core::prompt::{AssumeYes, ConfirmationProvider, DialoguerConfirm};
use uxi_core::{ConfigLoader, InstallLog, InstallRequest, InstallationOrchestrator, PlatformProfile};

#[derive(Parser, Debug)]
#[clap(name = "ux-installer", author, version, about = "AMD AI UX Installer")]
struct Cli {
    #[clap(long, help = "Installation directory (defaults to a per-user location)")]
    install_dir: Option<PathBuf>,

    #[clap(long, help = "Do not create desktop shortcuts")]
    no_shortcuts: bool,

    #[clap(long, short, help = "Answer yes to every prompt")]
    yes: bool,

    #[clap(long, help = "Optional YAML configuration file")]
    config: Option<PathBuf>,

    #[clap(
        long,
        default_value = "warn",
        help = "Diagnostic log level (error, warn, info, debug, trace)"
    )]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_diagnostics(&cli.log_level);

    let config = ConfigLoader::load(cli.config.as_deref())
        .context("Failed to load installer configuration")?;
    let platform = PlatformProfile::detect()?;

    let install_dir = cli
        .install_dir
        .clone()
        .unwrap_or_else(|| platform.default_install_dir(&config.product.tag));
    let log = match std::fs::create_dir_all(&install_dir) {
        Ok(()) => InstallLog::new(
            config.product.log_tag.clone(),
            install_dir.join(config.product.log_file_name()),
        ),
        Err(e) => {
            log::warn!(
                "Cannot create {}, logging to the console only: {}",
                install_dir.display(),
                e
            );
            InstallLog::console(config.product.log_tag.clone())
        }
    };
    if let Some(path) = log.path() {
        log::debug!("Install log: {}", path.display());
    }

    let runner: Arc<dyn ProcessRunner> = Arc::new(SystemProcessRunner);
    let confirm: Arc<dyn ConfirmationProvider> = if cli.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(DialoguerConfirm)
    };
    let collaborators = Collaborators {
        runner: runner.clone(),
        http: Arc::new(ReqwestFetcher::new(&config.feed)?),
        confirm,
        shortcuts: Arc::new(PlatformShortcutRegistrar::new(runner, platform.clone())),
    };

    let request = InstallRequest {
        target_directory: install_dir,
        create_shortcuts: !cli.no_shortcuts,
        assume_yes: cli.yes,
    };

    let orchestrator = InstallationOrchestrator::new(config, platform, log, collaborators);
    Ok(orchestrator.run(&request).await.into())
}
