//! External process execution.
//!
//! Every external tool the installer drives (conda, the Miniconda installer,
//! pip, PowerShell) goes through [`ProcessRunner`]. A non-zero exit status is
//! data, not an error: only a failure to spawn is reported as `Err`.

use crate::errors::{InstallationResult, InstallerError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::fmt;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// A fully-specified command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program followed by its arguments, lossily converted for display and matching
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Convert a non-zero exit into a subprocess error carrying the captured output
    pub fn into_result(self, command: &CommandSpec) -> InstallationResult<ProcessOutput> {
        if self.success() {
            return Ok(self);
        }
        let output = if self.stderr.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            self.stderr.trim().to_string()
        };
        Err(InstallerError::Subprocess {
            command: command.to_string(),
            exit_code: self.exit_code,
            output,
        })
    }
}

/// Runs external commands
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run to completion, capturing stdout and stderr
    async fn run(&self, command: &CommandSpec) -> InstallationResult<ProcessOutput>;

    /// Run to completion, passing every non-empty output line (stdout and
    /// stderr combined) to `on_line` as soon as it is produced.
    /// Returns the exit code.
    async fn stream(
        &self,
        command: &CommandSpec,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
    ) -> InstallationResult<i32>;

    /// Run with the console inherited, for interactive-looking installers
    async fn run_inherited(&self, command: &CommandSpec) -> InstallationResult<i32>;
}

/// [`ProcessRunner`] backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

/// Hand one buffered line to `on_line`. Returns false once the stream is exhausted.
fn forward_line(
    read: std::io::Result<usize>,
    buf: &mut Vec<u8>,
    on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
) -> bool {
    match read {
        Ok(0) => false,
        Ok(_) => {
            let line = String::from_utf8_lossy(buf);
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                on_line(trimmed);
            }
            buf.clear();
            true
        }
        Err(e) => {
            log::debug!("Output stream closed with error: {}", e);
            false
        }
    }
}

fn spawn_error(command: &CommandSpec, err: std::io::Error) -> InstallerError {
    InstallerError::Subprocess {
        command: command.to_string(),
        exit_code: -1,
        output: format!("failed to start process: {}", err),
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, command: &CommandSpec) -> InstallationResult<ProcessOutput> {
        log::debug!("Running: {}", command);
        let output = command
            .to_command()
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| spawn_error(command, e))?;

        Ok(ProcessOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn stream(
        &self,
        command: &CommandSpec,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
    ) -> InstallationResult<i32> {
        log::debug!("Streaming: {}", command);
        let mut child = command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(command, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_error(command, std::io::Error::other("stdout not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| spawn_error(command, std::io::Error::other("stderr not captured")))?;

        // Lines are decoded lossily so stray non-UTF-8 bytes never stop the
        // pipes from being drained.
        let mut out_reader = BufReader::new(stdout);
        let mut err_reader = BufReader::new(stderr);
        let mut out_buf = Vec::new();
        let mut err_buf = Vec::new();
        let mut out_done = false;
        let mut err_done = false;

        while !(out_done && err_done) {
            tokio::select! {
                read = out_reader.read_until(b'\n', &mut out_buf), if !out_done => {
                    out_done = !forward_line(read, &mut out_buf, on_line);
                }
                read = err_reader.read_until(b'\n', &mut err_buf), if !err_done => {
                    err_done = !forward_line(read, &mut err_buf, on_line);
                }
            }
        }

        let status = child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }

    async fn run_inherited(&self, command: &CommandSpec) -> InstallationResult<i32> {
        log::debug!("Running with inherited console: {}", command);
        let status = command
            .to_command()
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| spawn_error(command, e))?;
        Ok(status.code().unwrap_or(-1))
    }
}
