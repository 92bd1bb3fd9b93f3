// ABOUTME: User-facing CLI feedback in text, quiet, or JSON-lines form.
// ABOUTME: Deployment detail lives in the log and reports; this only narrates.

use serde::Serialize;
use std::time::Instant;

/// How command feedback is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Progress lines plus the final result.
    Normal,
    /// Final result only, for CI logs.
    Quiet,
    /// One JSON object per event.
    Json,
}

/// Renders command feedback according to an [`OutputMode`].
pub struct Output {
    mode: OutputMode,
    started: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            started: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Begin measuring the command; the duration is attached to the final result.
    pub fn start_timer(&mut self) {
        self.started = Some(Instant::now());
    }

    fn elapsed(&self) -> Option<f64> {
        self.started.map(|t| t.elapsed().as_secs_f64())
    }

    /// Intermediate step, shown only in normal mode.
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => println!("{}", self.event("warning", message, None::<&()>)),
        }
    }

    /// Final result of a command that worked.
    pub fn success(&self, message: &str) {
        match (self.mode, self.elapsed()) {
            (OutputMode::Normal, Some(secs)) => println!("{message} ({secs:.1}s)"),
            (OutputMode::Normal | OutputMode::Quiet, _) => println!("{message}"),
            (OutputMode::Json, _) => println!("{}", self.event("success", message, None::<&()>)),
        }
    }

    /// Final result of a command that failed. Always goes to stderr.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Json => eprintln!("{}", self.event("error", message, None::<&()>)),
            _ => eprintln!("Error: {message}"),
        }
    }

    /// Structured payload for scripts; ignored outside JSON mode.
    pub fn data<T: Serialize>(&self, event: &str, payload: &T) {
        if self.mode == OutputMode::Json {
            println!("{}", self.event(event, "", Some(payload)));
        }
    }

    fn event<T: Serialize>(&self, event: &str, message: &str, data: Option<&T>) -> String {
        let line = JsonEvent {
            event,
            message,
            duration_secs: self.elapsed(),
            data,
        };
        serde_json::to_string(&line).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct JsonEvent<'a, T: Serialize> {
    event: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
}
