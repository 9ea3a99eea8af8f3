// ABOUTME: Typed execution of external commands (container runtime, proxy, hooks).
// ABOUTME: The CommandRunner trait lets callers swap in a scripted runner for tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// A fully described external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Build a command from an argv list. Returns None for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Output from a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or None when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Best single-line description of why the command failed.
    pub fn detail(&self) -> String {
        let stderr = self.stderr.trim();
        let text = if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        };
        let code = match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "killed by signal".to_string(),
        };
        if text.is_empty() {
            code
        } else {
            format!("{code}: {text}")
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Runs external commands and reports their structured result.
///
/// A non-zero exit is not an error at this layer; callers decide what a
/// failing command means.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecError>;
}

/// Runs commands as child processes of the controller.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecError> {
        tracing::debug!("Running: {}", command);

        let child = Command::new(&command.program)
            .args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(result) => result.map_err(|source| ExecError::Spawn {
                program: command.program.clone(),
                source,
            })?,
            Err(_) => {
                return Err(ExecError::Timeout {
                    command: command.to_string(),
                    timeout: self.timeout,
                });
            }
        };

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.success() {
            tracing::debug!("`{}` failed: {}", command, result.detail());
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("docker").args(["compose", "up", "-d", "app_blue"]);
        assert_eq!(spec.to_string(), "docker compose up -d app_blue");
    }

    #[test]
    fn from_argv_splits_program() {
        let argv = vec!["nginx".to_string(), "-t".to_string()];
        let spec = CommandSpec::from_argv(&argv).unwrap();
        assert_eq!(spec.program, "nginx");
        assert_eq!(spec.args, vec!["-t"]);
        assert!(CommandSpec::from_argv(&[]).is_none());
    }

    #[test]
    fn detail_prefers_stderr() {
        let output = CommandOutput {
            exit_code: Some(3),
            stdout: "noise".to_string(),
            stderr: " boom \n".to_string(),
        };
        assert_eq!(output.detail(), "exit code 3: boom");
        assert_eq!(CommandOutput::failed(1, "").detail(), "exit code 1");
    }

    #[tokio::test]
    async fn system_runner_captures_output() {
        let runner = SystemRunner::default();
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err >&2; exit 4"]);
        let output = runner.run(&spec).await.unwrap();
        assert_eq!(output.exit_code, Some(4));
        assert!(output.stdout.contains("out"));
        assert!(output.stderr.contains("err"));
    }

    #[tokio::test]
    async fn system_runner_passes_env() {
        let runner = SystemRunner::default();
        let spec = CommandSpec::new("sh")
            .args(["-c", "echo $SWAPCAM_TEST_VALUE"])
            .env("SWAPCAM_TEST_VALUE", "hello");
        let output = runner.run(&spec).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn system_runner_inherits_parent_environment() {
        temp_env::with_var("SWAPCAM_INHERITED", Some("yes"), || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let spec = CommandSpec::new("sh").args(["-c", "echo $SWAPCAM_INHERITED"]);
            let output = runtime.block_on(SystemRunner::default().run(&spec)).unwrap();
            assert_eq!(output.stdout.trim(), "yes");
        });
    }

    #[tokio::test]
    async fn system_runner_times_out() {
        let runner = SystemRunner::new(Duration::from_millis(50));
        let spec = CommandSpec::new("sleep").arg("5");
        let err = runner.run(&spec).await.unwrap_err();
        assert!(matches!(err, ExecError::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let runner = SystemRunner::default();
        let spec = CommandSpec::new("swapcam-definitely-not-a-program");
        let err = runner.run(&spec).await.unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
