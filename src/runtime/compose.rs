// ABOUTME: Compose-backed lifecycle driver for the blue/green instances and the proxy.
// ABOUTME: Builds `<runtime> compose` invocations and interprets their results.

use async_trait::async_trait;
use serde::Deserialize;
use snafu::ResultExt;
use std::path::{Path, PathBuf};

use super::error::{ExecSnafu, LifecycleError};
use super::traits::{InstanceLifecycle, Reachability};
use super::types::{InstanceHealth, LifecycleOp, RuntimeType};
use crate::config::{Config, ServicesConfig};
use crate::exec::{CommandOutput, CommandRunner, CommandSpec};
use crate::types::{Color, ServiceName};

/// Drives services of one compose project through a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct Compose<R> {
    runner: R,
    runtime: RuntimeType,
    compose_file: Option<PathBuf>,
    project: Option<String>,
    services: ServicesConfig,
}

impl<R> Compose<R> {
    pub fn new(runner: R, runtime: RuntimeType, services: ServicesConfig) -> Self {
        Self {
            runner,
            runtime,
            compose_file: None,
            project: None,
            services,
        }
    }

    pub fn from_config(runner: R, config: &Config) -> Self {
        let mut compose = Self::new(runner, config.runtime, config.services.clone());
        compose.compose_file = config.compose_file_path();
        compose.project = config.project.clone();
        compose
    }

    pub fn compose_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.compose_file = Some(path.into());
        self
    }

    pub fn project(mut self, name: impl Into<String>) -> Self {
        self.project = Some(name.into());
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn services(&self) -> &ServicesConfig {
        &self.services
    }

    /// `<runtime> compose [-f file] [-p project] <args...>`
    pub fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = CommandSpec::new(self.runtime.binary()).arg("compose");
        if let Some(file) = &self.compose_file {
            spec = spec.arg("-f").arg(path_arg(file));
        }
        if let Some(project) = &self.project {
            spec = spec.arg("-p").arg(project.clone());
        }
        spec.args(args)
    }

    /// Run a command inside the proxy service without a TTY.
    pub fn exec_in_proxy<I, S>(&self, argv: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command(["exec", "-T", self.services.proxy.as_str()])
            .args(argv)
    }

    fn service(&self, color: Color) -> &str {
        self.services.for_color(color).as_str()
    }
}

impl<R: CommandRunner> Compose<R> {
    /// Make sure a named network exists, creating it if missing.
    ///
    /// Returns true when the network had to be created.
    pub async fn ensure_network(&self, name: &str) -> Result<bool, LifecycleError> {
        let op = LifecycleOp::EnsureNetwork;
        let inspect = CommandSpec::new(self.runtime.binary()).args(["network", "inspect", name]);
        let output = self.runner.run(&inspect).await.context(ExecSnafu { op })?;
        if output.success() {
            return Ok(false);
        }

        tracing::info!("Creating network {}", name);
        let create = CommandSpec::new(self.runtime.binary()).args(["network", "create", name]);
        self.run_checked(op, create).await?;
        Ok(true)
    }

    async fn run_checked(
        &self,
        op: LifecycleOp,
        spec: CommandSpec,
    ) -> Result<CommandOutput, LifecycleError> {
        let output = self.runner.run(&spec).await.context(ExecSnafu { op })?;
        if !output.success() {
            tracing::error!("{} failed: `{}`: {}", op, spec, output.detail());
            return Err(LifecycleError::CommandFailed {
                op,
                command: spec.to_string(),
                output,
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl<R: CommandRunner> InstanceLifecycle for Compose<R> {
    async fn build(&self, color: Color) -> Result<(), LifecycleError> {
        let spec = self.command(["build", self.service(color)]);
        self.run_checked(LifecycleOp::Build, spec).await.map(drop)
    }

    async fn start(&self, color: Color) -> Result<(), LifecycleError> {
        let spec = self.command(["up", "-d", self.service(color)]);
        self.run_checked(LifecycleOp::Start, spec).await.map(drop)
    }

    async fn start_proxy(&self, build: bool) -> Result<(), LifecycleError> {
        let mut args = vec!["up", "-d"];
        if build {
            args.push("--build");
        }
        args.push(self.services.proxy.as_str());
        self.run_checked(LifecycleOp::StartProxy, self.command(args))
            .await
            .map(drop)
    }

    async fn stop(&self, color: Color) -> Result<(), LifecycleError> {
        let spec = self.command(["stop", self.service(color)]);
        self.run_checked(LifecycleOp::Stop, spec).await.map(drop)
    }

    async fn remove(&self, color: Color) -> Result<(), LifecycleError> {
        let spec = self.command(["rm", "-f", self.service(color)]);
        self.run_checked(LifecycleOp::Remove, spec).await.map(drop)
    }

    async fn health_status(&self, color: Color) -> Result<InstanceHealth, LifecycleError> {
        let service = self.service(color);
        let spec = self.command(["ps", "--all", "--format", "json", service]);
        let output = self.run_checked(LifecycleOp::Status, spec).await?;
        let entries = parse_ps(&output.stdout).map_err(|e| LifecycleError::StatusParse {
            service: service.to_string(),
            reason: e.to_string(),
        })?;
        let entry = entries
            .iter()
            .find(|e| e.service.is_empty() || e.service == service);
        Ok(entry.map(PsEntry::health).unwrap_or(InstanceHealth::Unknown))
    }
}

#[async_trait]
impl<R: CommandRunner> Reachability for Compose<R> {
    async fn is_reachable(&self, name: &ServiceName) -> Result<bool, LifecycleError> {
        let spec = self.exec_in_proxy(["getent", "hosts", name.as_str()]);
        let output = self
            .runner
            .run(&spec)
            .await
            .context(ExecSnafu {
                op: LifecycleOp::Status,
            })?;
        Ok(output.success() && !output.stdout.trim().is_empty())
    }
}

/// One row of `compose ps --format json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PsEntry {
    #[serde(default)]
    service: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    health: String,
}

impl PsEntry {
    fn health(&self) -> InstanceHealth {
        match self.health.as_str() {
            "healthy" => InstanceHealth::Healthy,
            "unhealthy" => InstanceHealth::Unhealthy,
            "starting" => InstanceHealth::Starting,
            _ => match self.state.as_str() {
                "created" | "restarting" => InstanceHealth::Starting,
                "exited" | "dead" => InstanceHealth::Unhealthy,
                // Running without a healthcheck reports no health at all.
                _ => InstanceHealth::Unknown,
            },
        }
    }
}

/// Older compose releases print one JSON array, newer ones one object per line.
fn parse_ps(stdout: &str) -> Result<Vec<PsEntry>, serde_json::Error> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed);
    }
    trimmed
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str)
        .collect()
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
