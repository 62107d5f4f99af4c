// ABOUTME: Operator-facing output for the CLI in human, quiet, or JSON-lines form.
// ABOUTME: Results go to stdout; warnings and errors always go to stderr.

use console::style;
use serde::Serialize;
use std::time::Instant;

use crate::diagnostics::{Diagnostics, Warning, WarningKind};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Progress lines, summaries, and timings.
    Normal,
    /// Final result lines only, for CI logs.
    Quiet,
    /// One JSON object per line, for scripting.
    Json,
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Writes command feedback according to the selected mode.
///
/// The clock starts when the value is created; success lines in normal and
/// JSON mode carry the elapsed time.
pub struct Output {
    mode: OutputMode,
    started: Instant,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            started: Instant::now(),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Intermediate step. Normal mode only.
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Final result line.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("{message} ({:.1}s)", self.elapsed_secs()),
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => emit(
                Stream::Stdout,
                &Event {
                    event: "success",
                    message,
                    kind: None,
                    duration_secs: Some(self.elapsed_secs()),
                },
            ),
        }
    }

    /// Non-fatal condition. Shown in every mode.
    pub fn warning(&self, message: &str) {
        self.warn_as(None, message);
    }

    /// Every warning collected during the run, in order.
    pub fn diagnostics(&self, diag: &Diagnostics) {
        for warning in diag.warnings() {
            self.diagnostic(warning);
        }
    }

    pub fn diagnostic(&self, warning: &Warning) {
        self.warn_as(Some(warning.kind), &warning.message);
    }

    fn warn_as(&self, kind: Option<WarningKind>, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("{} {message}", style("Warning:").for_stderr().yellow().bold());
            }
            OutputMode::Json => emit(
                Stream::Stderr,
                &Event {
                    event: "warning",
                    message,
                    kind,
                    duration_secs: None,
                },
            ),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("{} {message}", style("Error:").for_stderr().red().bold());
            }
            OutputMode::Json => emit(
                Stream::Stderr,
                &Event {
                    event: "error",
                    message,
                    kind: None,
                    duration_secs: Some(self.elapsed_secs()),
                },
            ),
        }
    }

    /// Structured result payload. JSON mode only; the human modes print
    /// their own summaries.
    pub fn report<T: Serialize>(&self, event: &str, data: &T) {
        if self.mode == OutputMode::Json {
            emit(Stream::Stdout, &Report { event, data });
        }
    }
}

fn emit<T: Serialize>(stream: Stream, value: &T) {
    let Ok(line) = serde_json::to_string(value) else {
        return;
    };
    match stream {
        Stream::Stdout => println!("{line}"),
        Stream::Stderr => eprintln!("{line}"),
    }
}

#[derive(Serialize)]
struct Event<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<WarningKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct Report<'a, T: Serialize> {
    event: &'a str,
    data: &'a T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_event_carries_kind() {
        let line = serde_json::to_value(Event {
            event: "warning",
            message: "no distribution",
            kind: Some(WarningKind::CdnNotConfigured),
            duration_secs: None,
        })
        .unwrap();
        assert_eq!(line["kind"], "cdn_not_configured");
        assert!(line.get("duration_secs").is_none());
    }

    #[test]
    fn report_wraps_payload() {
        let line = serde_json::to_value(Report {
            event: "health",
            data: &vec![1, 2],
        })
        .unwrap();
        assert_eq!(line["event"], "health");
        assert_eq!(line["data"][1], 2);
    }
}
