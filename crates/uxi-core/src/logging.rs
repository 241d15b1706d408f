//! Install log handle and diagnostic logger setup.
//!
//! The install log is the user-visible record of a run. It is an explicit
//! value created once at startup and handed to every component by reference.
//! Developer diagnostics go through the `log` facade instead and are routed
//! by `env_logger`.

use chrono::Local;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only install log, echoed to the console
#[derive(Debug, Clone)]
pub struct InstallLog {
    tag: String,
    path: Option<PathBuf>,
    echo: bool,
}

impl InstallLog {
    /// Create a log that appends to `path` and echoes to stdout
    pub fn new(tag: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            tag: tag.into(),
            path: Some(path.into()),
            echo: true,
        }
    }

    /// Create a console-only log
    pub fn console(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            path: None,
            echo: true,
        }
    }

    /// Disable the console echo, keeping only the file
    pub fn without_echo(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record one event
    pub fn info(&self, message: impl AsRef<str>) {
        self.write_line(message.as_ref());
    }

    /// Record a warning; the run continues
    pub fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::warn!("{}", message);
        self.write_line(&format!("Warning: {}", message));
    }

    /// Record an error
    pub fn error(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        log::error!("{}", message);
        self.write_line(&format!("ERROR: {}", message));
    }

    /// Log a section banner framed by dashes
    pub fn banner(&self, title: &str) {
        self.framed(title, '-', 0);
    }

    /// Log a stage banner framed by asterisks, at least 30 columns wide
    pub fn stage_banner(&self, title: &str) {
        self.framed(title, '*', 30);
    }

    fn framed(&self, title: &str, frame: char, min_width: usize) {
        let width = (title.chars().count() + 4).max(min_width);
        let rule = frame.to_string().repeat(width);
        self.write_line(&rule);
        self.write_line(&format!("{} {} {}", frame, title, frame));
        self.write_line(&rule);
    }

    /// Format a line the way it is written to the log file
    pub fn format_line(&self, message: &str) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        format!("[{}] [{}] {}", timestamp, self.tag, message)
    }

    fn write_line(&self, message: &str) {
        let line = self.format_line(message);

        if self.echo {
            println!("{}", line);
        }

        let Some(path) = &self.path else {
            return;
        };

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", line));

        if let Err(e) = result {
            eprintln!("WARNING: Failed to write to log file: {}", e);
        }
    }
}

/// Initialise the diagnostic logger used by the `log` macros
pub fn init_diagnostics(level: &str) {
    let filter = level.parse().unwrap_or(LevelFilter::Warn);
    let _ = env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .try_init();
}
