// ABOUTME: Append-only deployment log kept for reports.
// ABOUTME: Mirrors entries to tracing and to a daily log file.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Info => "INFO",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.level,
            self.message
        )
    }
}

#[derive(Debug, Default)]
pub struct DeploymentLog {
    entries: Vec<LogEntry>,
    dir: Option<PathBuf>,
}

impl DeploymentLog {
    /// Log that also appends to `{dir}/deploy_YYYYMMDD.log`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            entries: Vec::new(),
            dir: Some(dir.into()),
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        &self.entries[self.entries.len().saturating_sub(n)..]
    }

    fn push(&mut self, level: LogLevel, message: String) {
        match level {
            LogLevel::Info | LogLevel::Success => tracing::info!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }

        let entry = LogEntry {
            timestamp: Local::now(),
            level,
            message,
        };
        self.append_to_file(&entry);
        self.entries.push(entry);
    }

    fn append_to_file(&self, entry: &LogEntry) {
        let Some(dir) = &self.dir else {
            return;
        };

        let path = dir.join(format!(
            "deploy_{}.log",
            entry.timestamp.format("%Y%m%d")
        ));
        let result = std::fs::create_dir_all(dir).and_then(|_| {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            writeln!(file, "{}", entry)
        });

        if let Err(e) = result {
            tracing::debug!("could not append to {}: {}", path.display(), e);
        }
    }
}
