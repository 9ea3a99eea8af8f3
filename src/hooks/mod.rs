// ABOUTME: Hooks system for switch lifecycle events.
// ABOUTME: Discovers and executes scripts at pre-switch, post-switch, and on-error points.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::deploy::SwitchStep;
use crate::exec::{CommandRunner, CommandSpec};
use crate::types::Color;

/// Hook execution points in the switch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Before any lifecycle call. Failure aborts the switch.
    PreSwitch,
    /// After a successful switch. Failure logs warning.
    PostSwitch,
    /// On switch failure. Failure logs warning.
    OnError,
}

impl HookPoint {
    /// Get the hook filename for this point.
    pub fn filename(&self) -> &'static str {
        match self {
            HookPoint::PreSwitch => "pre-switch",
            HookPoint::PostSwitch => "post-switch",
            HookPoint::OnError => "on-error",
        }
    }

    /// Whether failure at this hook point should abort the switch.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HookPoint::PreSwitch)
    }
}

/// Context passed to hooks via environment variables.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub project: String,
    pub from: Option<Color>,
    pub to: Color,
    pub failed_step: Option<SwitchStep>,
}

impl HookContext {
    /// Convert context to environment variables.
    pub fn to_env(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();
        env.insert("SWAPCAM_PROJECT".to_string(), self.project.clone());
        env.insert("SWAPCAM_TO".to_string(), self.to.to_string());
        if let Some(from) = self.from {
            env.insert("SWAPCAM_FROM".to_string(), from.to_string());
        }
        if let Some(step) = self.failed_step {
            env.insert("SWAPCAM_FAILED_STEP".to_string(), step.to_string());
        }
        env
    }
}

/// Result of running a hook.
#[derive(Debug)]
pub struct HookResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Discovers and runs hooks from a project directory.
pub struct HookRunner<R> {
    runner: R,
    hooks_dir: PathBuf,
}

impl<R: CommandRunner> HookRunner<R> {
    /// Create a hook runner looking for hooks in `<project_dir>/.swapcam/hooks`.
    pub fn new(runner: R, project_dir: &Path) -> Self {
        Self {
            runner,
            hooks_dir: project_dir.join(".swapcam").join("hooks"),
        }
    }

    /// Check if a hook exists for the given point.
    pub fn hook_exists(&self, point: HookPoint) -> bool {
        self.hook_path(point).is_file()
    }

    fn hook_path(&self, point: HookPoint) -> PathBuf {
        self.hooks_dir.join(point.filename())
    }

    /// Run a hook if it exists.
    ///
    /// Returns None if the hook doesn't exist, or Some(HookResult) if it was run.
    pub async fn run(&self, point: HookPoint, context: &HookContext) -> Option<HookResult> {
        let hook_path = self.hook_path(point);

        if !hook_path.is_file() {
            return None;
        }

        tracing::info!("Running {} hook: {}", point.filename(), hook_path.display());

        let mut spec = CommandSpec::new(hook_path.to_string_lossy());
        for (key, value) in context.to_env() {
            spec = spec.env(key, value);
        }

        match self.runner.run(&spec).await {
            Ok(output) => {
                let result = HookResult {
                    success: output.success(),
                    exit_code: output.exit_code,
                    stdout: output.stdout,
                    stderr: output.stderr,
                };

                if result.success {
                    tracing::info!("{} hook completed successfully", point.filename());
                } else {
                    tracing::warn!(
                        "{} hook failed with exit code {:?}",
                        point.filename(),
                        result.exit_code
                    );
                }

                Some(result)
            }
            Err(e) => {
                tracing::error!("Failed to execute {} hook: {}", point.filename(), e);
                Some(HookResult {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::SystemRunner;

    #[test]
    fn hook_point_filenames() {
        assert_eq!(HookPoint::PreSwitch.filename(), "pre-switch");
        assert_eq!(HookPoint::PostSwitch.filename(), "post-switch");
        assert_eq!(HookPoint::OnError.filename(), "on-error");
    }

    #[test]
    fn pre_switch_is_fatal() {
        assert!(HookPoint::PreSwitch.is_fatal());
        assert!(!HookPoint::PostSwitch.is_fatal());
        assert!(!HookPoint::OnError.is_fatal());
    }

    #[test]
    fn hook_context_to_env() {
        let context = HookContext {
            project: "camera".to_string(),
            from: Some(Color::Blue),
            to: Color::Green,
            failed_step: Some(SwitchStep::AwaitHealthy),
        };

        let env = context.to_env();
        assert_eq!(env.get("SWAPCAM_PROJECT"), Some(&"camera".to_string()));
        assert_eq!(env.get("SWAPCAM_FROM"), Some(&"blue".to_string()));
        assert_eq!(env.get("SWAPCAM_TO"), Some(&"green".to_string()));
        assert_eq!(
            env.get("SWAPCAM_FAILED_STEP"),
            Some(&"AWAIT_HEALTHY".to_string())
        );
    }

    #[test]
    fn bootstrap_context_has_no_from() {
        let context = HookContext {
            project: "camera".to_string(),
            from: None,
            to: Color::Blue,
            failed_step: None,
        };

        let env = context.to_env();
        assert!(!env.contains_key("SWAPCAM_FROM"));
        assert!(!env.contains_key("SWAPCAM_FAILED_STEP"));
    }

    #[test]
    fn hook_runner_checks_hooks_dir() {
        let runner = HookRunner::new(SystemRunner::default(), Path::new("/nonexistent"));
        assert!(!runner.hook_exists(HookPoint::PreSwitch));
    }
}
