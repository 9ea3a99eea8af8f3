// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (for schedulers), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::{SwitchOperation, SwitchStep};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for schedulers (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

impl OutputMode {
    pub fn from_flags(quiet: bool, json: bool) -> Self {
        if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a non-fatal warning.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {message}"),
            OutputMode::Json => emit_stderr(&JsonEvent::new("warning", message)),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    duration_secs: self.duration(),
                    ..JsonEvent::new("success", message)
                };
                emit_stdout(&event);
            }
        }
    }

    /// Report a completed switch.
    pub fn switch_done(&self, operation: &SwitchOperation) {
        let message = format!("Switched {operation}");
        if self.mode == OutputMode::Json {
            let event = JsonEvent {
                duration_secs: self.duration(),
                operation: Some(operation),
                ..JsonEvent::new("success", &message)
            };
            emit_stdout(&event);
        } else {
            self.success(&message);
        }
    }

    /// Report a failed switch: one terminal line naming the step and cause.
    pub fn switch_failed(&self, operation: &SwitchOperation, step: SwitchStep, message: &str) {
        if self.mode == OutputMode::Json {
            let event = JsonEvent {
                duration_secs: self.duration(),
                operation: Some(operation),
                step: Some(step),
                ..JsonEvent::new("error", message)
            };
            emit_stderr(&event);
        } else {
            self.error(message);
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonEvent {
                    duration_secs: self.duration(),
                    ..JsonEvent::new("error", message)
                };
                emit_stderr(&event);
            }
        }
    }
}

fn emit_stdout(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

fn emit_stderr(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        eprintln!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation: Option<&'a SwitchOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<SwitchStep>,
}

impl<'a> JsonEvent<'a> {
    fn new(event: &'a str, message: &'a str) -> Self {
        Self {
            event,
            message,
            duration_secs: None,
            operation: None,
            step: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::SwitchOutcome;
    use crate::types::Color;
    use chrono::Utc;

    #[test]
    fn json_flag_wins_over_quiet() {
        assert_eq!(OutputMode::from_flags(true, true), OutputMode::Json);
        assert_eq!(OutputMode::from_flags(true, false), OutputMode::Quiet);
        assert_eq!(OutputMode::from_flags(false, false), OutputMode::Normal);
    }

    #[test]
    fn failure_event_names_step() {
        let operation = SwitchOperation {
            from: Some(Color::Blue),
            to: Color::Green,
            started_at: Utc::now(),
            outcome: SwitchOutcome::Failed(SwitchStep::AwaitHealthy),
        };
        let event = JsonEvent {
            operation: Some(&operation),
            step: Some(SwitchStep::AwaitHealthy),
            ..JsonEvent::new("error", "green instance not healthy")
        };
        let value: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "error");
        assert_eq!(value["step"], "AWAIT_HEALTHY");
        assert_eq!(value["operation"]["to"], "green");
        assert_eq!(value["operation"]["outcome"]["status"], "failed");
        assert!(value.get("duration_secs").is_none());
    }
}
