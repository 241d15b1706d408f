// src/test_utils/fakes.rs
use crate::errors::{InstallationResult, InstallerError};
use crate::http::{DownloadResponse, HttpFetcher, TextResponse};
use crate::installation::shortcut::{LaunchTarget, ShortcutRegistrar};
use crate::logging::InstallLog;
use crate::process::{CommandSpec, ProcessOutput, ProcessRunner};
use crate::prompt::ConfirmationProvider;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

impl ProcessOutput {
    pub fn ok(stdout: &str) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: &str) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

type Hook = Box<dyn Fn(&CommandSpec) + Send + Sync>;

struct Rule {
    pattern: String,
    output: ProcessOutput,
    lines: Vec<String>,
    hook: Option<Hook>,
}

/// Scripted [`ProcessRunner`].
///
/// The first rule whose pattern is a substring of the rendered command line
/// answers. Unmatched commands exit with 127.
#[derive(Default)]
pub struct FakeProcessRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<String>>,
}

impl FakeProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, pattern: &str, output: ProcessOutput) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            output,
            lines: Vec::new(),
            hook: None,
        });
        self
    }

    /// Like [`on`](Self::on) but runs `hook` before answering
    pub fn on_with(
        mut self,
        pattern: &str,
        output: ProcessOutput,
        hook: impl Fn(&CommandSpec) + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            output,
            lines: Vec::new(),
            hook: Some(Box::new(hook)),
        });
        self
    }

    /// Streamed commands matching `pattern` emit `lines` and exit with `exit_code`
    pub fn on_stream(mut self, pattern: &str, lines: &[&str], exit_code: i32) -> Self {
        self.rules.push(Rule {
            pattern: pattern.to_string(),
            output: ProcessOutput {
                exit_code,
                ..Default::default()
            },
            lines: lines.iter().map(|l| l.to_string()).collect(),
            hook: None,
        });
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, pattern: &str) -> bool {
        self.position(pattern).is_some()
    }

    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.calls.lock().unwrap().iter().position(|c| c.contains(pattern))
    }

    fn answer(&self, command: &CommandSpec) -> (ProcessOutput, Vec<String>) {
        let rendered = command.to_string();
        self.calls.lock().unwrap().push(rendered.clone());

        match self.rules.iter().find(|r| rendered.contains(&r.pattern)) {
            Some(rule) => {
                if let Some(hook) = &rule.hook {
                    hook(command);
                }
                (rule.output.clone(), rule.lines.clone())
            }
            None => (ProcessOutput::failed(127, "command not found"), Vec::new()),
        }
    }
}

#[async_trait]
impl ProcessRunner for FakeProcessRunner {
    async fn run(&self, command: &CommandSpec) -> InstallationResult<ProcessOutput> {
        Ok(self.answer(command).0)
    }

    async fn stream(
        &self,
        command: &CommandSpec,
        on_line: &mut (dyn for<'l> FnMut(&'l str) + Send),
    ) -> InstallationResult<i32> {
        let (output, lines) = self.answer(command);
        for line in &lines {
            on_line(line);
        }
        Ok(output.exit_code)
    }

    async fn run_inherited(&self, command: &CommandSpec) -> InstallationResult<i32> {
        Ok(self.answer(command).0.exit_code)
    }
}

/// In-memory [`HttpFetcher`]
#[derive(Default)]
pub struct FakeHttpFetcher {
    pages: HashMap<String, TextResponse>,
    files: HashMap<String, (u16, Vec<u8>)>,
    requests: Mutex<Vec<String>>,
}

impl FakeHttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            TextResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn file(mut self, url: &str, status: u16, bytes: Vec<u8>) -> Self {
        self.files.insert(url.to_string(), (status, bytes));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetcher for FakeHttpFetcher {
    async fn get_text(&self, url: &str) -> InstallationResult<TextResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| InstallerError::Network {
            message: format!("connection refused: {}", url),
        })
    }

    async fn download(&self, url: &str, dest: &Path) -> InstallationResult<DownloadResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        let (status, bytes) = self.files.get(url).ok_or_else(|| InstallerError::Network {
            message: format!("connection refused: {}", url),
        })?;

        if *status != 200 {
            return Ok(DownloadResponse {
                status: *status,
                bytes_written: 0,
            });
        }
        std::fs::write(dest, bytes)?;
        Ok(DownloadResponse {
            status: *status,
            bytes_written: bytes.len() as u64,
        })
    }
}

/// [`ConfirmationProvider`] answering from a script
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ConfirmationProvider for ScriptedConfirm {
    fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}

/// [`ShortcutRegistrar`] that records calls and optionally fails
#[derive(Default)]
pub struct RecordingShortcuts {
    fail: bool,
    targets: Arc<Mutex<Vec<LaunchTarget>>>,
}

impl RecordingShortcuts {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn targets(&self) -> Vec<LaunchTarget> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShortcutRegistrar for RecordingShortcuts {
    async fn register(
        &self,
        target: &LaunchTarget,
        _log: &InstallLog,
    ) -> InstallationResult<Option<PathBuf>> {
        self.targets.lock().unwrap().push(target.clone());
        if self.fail {
            return Err(InstallerError::Shortcut {
                reason: "desktop is read-only".to_string(),
            });
        }
        Ok(Some(target.install_dir.join(format!("{}.lnk", target.shortcut_name))))
    }
}
