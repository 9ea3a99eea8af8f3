// ABOUTME: Test support utilities.
// ABOUTME: Fake lifecycle driver, health probe, reachability, and a scripted command runner.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Once};
use std::time::Duration;
use tempfile::TempDir;

use swapcam::config::{ServicesConfig, SettleConfig};
use swapcam::deploy::{
    Orchestrator, Planned, Switch, SwitchFailure, SwitchOperation, SwitchPolicy, WaitPolicy,
};
use swapcam::exec::{CommandOutput, CommandRunner, CommandSpec, ExecError};
use swapcam::health::HealthProbe;
use swapcam::proxy::{ProxyReloader, ProxyTemplate};
use swapcam::runtime::{
    InstanceHealth, InstanceLifecycle, LifecycleError, LifecycleOp, Reachability,
};
use swapcam::state::StateStore;
use swapcam::types::{Color, ServiceName};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("swapcam=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// =============================================================================
// Lifecycle
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Build(Color),
    Start(Color),
    /// Proxy bring-up; true when it was rebuilt.
    StartProxy(bool),
    Stop(Color),
    Remove(Color),
}

/// Records lifecycle calls; optionally fails one operation with an exit code.
#[derive(Default)]
pub struct FakeLifecycle {
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<(LifecycleOp, i32)>>,
    health: Mutex<HashMap<Color, InstanceHealth>>,
}

impl FakeLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(op: LifecycleOp, exit_code: i32) -> Self {
        let fake = Self::default();
        *fake.failure.lock() = Some((op, exit_code));
        fake
    }

    pub fn set_health(&self, color: Color, health: InstanceHealth) {
        self.health.lock().insert(color, health);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, op: LifecycleOp, call: Call) -> Result<(), LifecycleError> {
        self.calls.lock().push(call);
        match *self.failure.lock() {
            Some((failing, code)) if failing == op => Err(LifecycleError::CommandFailed {
                op,
                command: format!("fake {op}"),
                output: CommandOutput::failed(code, "device busy"),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl InstanceLifecycle for FakeLifecycle {
    async fn build(&self, color: Color) -> Result<(), LifecycleError> {
        self.record(LifecycleOp::Build, Call::Build(color))
    }

    async fn start(&self, color: Color) -> Result<(), LifecycleError> {
        self.record(LifecycleOp::Start, Call::Start(color))
    }

    async fn start_proxy(&self, build: bool) -> Result<(), LifecycleError> {
        self.record(LifecycleOp::StartProxy, Call::StartProxy(build))
    }

    async fn stop(&self, color: Color) -> Result<(), LifecycleError> {
        self.record(LifecycleOp::Stop, Call::Stop(color))
    }

    async fn remove(&self, color: Color) -> Result<(), LifecycleError> {
        self.record(LifecycleOp::Remove, Call::Remove(color))
    }

    async fn health_status(&self, color: Color) -> Result<InstanceHealth, LifecycleError> {
        Ok(self
            .health
            .lock()
            .get(&color)
            .copied()
            .unwrap_or(InstanceHealth::Unknown))
    }
}

// =============================================================================
// Health and reachability
// =============================================================================

/// Replays a script of observations per color, repeating the last one.
#[derive(Default)]
pub struct FakeHealth {
    script: Mutex<HashMap<Color, VecDeque<InstanceHealth>>>,
    probes: Mutex<Vec<Color>>,
}

impl FakeHealth {
    pub fn healthy() -> Self {
        Self::with_script(&[InstanceHealth::Healthy])
    }

    pub fn never_healthy() -> Self {
        Self::with_script(&[InstanceHealth::Unhealthy])
    }

    /// The same script for both colors.
    pub fn with_script(observations: &[InstanceHealth]) -> Self {
        let fake = Self::default();
        for color in Color::ALL {
            fake.script
                .lock()
                .insert(color, observations.iter().copied().collect());
        }
        fake
    }

    pub fn probes(&self) -> Vec<Color> {
        self.probes.lock().clone()
    }
}

#[async_trait]
impl HealthProbe for FakeHealth {
    async fn probe(&self, color: Color) -> InstanceHealth {
        self.probes.lock().push(color);
        let mut script = self.script.lock();
        let queue = script.entry(color).or_default();
        if queue.len() > 1 {
            queue.pop_front().unwrap_or(InstanceHealth::Unknown)
        } else {
            queue.front().copied().unwrap_or(InstanceHealth::Unknown)
        }
    }
}

pub struct FakeReachability {
    reachable: bool,
    checked: Mutex<Vec<String>>,
}

impl FakeReachability {
    pub fn reachable() -> Self {
        Self {
            reachable: true,
            checked: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            checked: Mutex::new(Vec::new()),
        }
    }

    pub fn checked(&self) -> Vec<String> {
        self.checked.lock().clone()
    }
}

#[async_trait]
impl Reachability for FakeReachability {
    async fn is_reachable(&self, name: &ServiceName) -> Result<bool, LifecycleError> {
        self.checked.lock().push(name.to_string());
        Ok(self.reachable)
    }
}

// =============================================================================
// Command runner
// =============================================================================

#[derive(Default)]
struct Script {
    calls: Vec<CommandSpec>,
    rules: Vec<(String, CommandOutput)>,
}

/// Records every command and answers from rules matched on the command line.
/// Unmatched commands succeed with empty output.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    script: Arc<Mutex<Script>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `needle` with `output`. Later rules win.
    pub fn respond(&self, needle: &str, output: CommandOutput) -> &Self {
        self.script.lock().rules.push((needle.to_string(), output));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.script
            .lock()
            .calls
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.script.lock().calls.clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, ExecError> {
        let mut script = self.script.lock();
        script.calls.push(command.clone());
        let line = command.to_string();
        let output = script
            .rules
            .iter()
            .rev()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""));
        Ok(output)
    }
}

// =============================================================================
// Orchestrator harness
// =============================================================================

/// A project directory with a real state file and proxy config, and fake
/// runtime collaborators.
pub struct Harness {
    pub dir: TempDir,
    pub lifecycle: FakeLifecycle,
    pub health: FakeHealth,
    pub reachability: FakeReachability,
    pub proxy_runner: ScriptedRunner,
    pub services: ServicesConfig,
    pub template: ProxyTemplate,
    pub store: StateStore,
    pub policy: SwitchPolicy,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let dir = TempDir::new().unwrap();
        let services = ServicesConfig::default();
        let template = ProxyTemplate::builtin(services.clone(), 5000);
        let store = StateStore::new(dir.path().join("active_container.txt"));
        Self {
            dir,
            lifecycle: FakeLifecycle::new(),
            health: FakeHealth::healthy(),
            reachability: FakeReachability::reachable(),
            proxy_runner: ScriptedRunner::new(),
            services,
            template,
            store,
            policy: fast_policy(),
        }
    }

    pub fn proxy_config_path(&self) -> PathBuf {
        self.dir.path().join("nginx").join("nginx.conf")
    }

    pub fn reloader(&self) -> ProxyReloader<ScriptedRunner> {
        ProxyReloader::new(
            self.proxy_runner.clone(),
            self.proxy_config_path(),
            CommandSpec::new("nginx").arg("-t"),
            CommandSpec::new("nginx").args(["-s", "reload"]),
        )
    }

    /// Seed the persisted state and the matching live routing config.
    pub fn seed_active(&self, color: Color) {
        self.store.write(color).unwrap();
        let path = self.proxy_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, self.template.render(color)).unwrap();
    }

    pub fn read_proxy_config(&self) -> Option<String> {
        std::fs::read_to_string(self.proxy_config_path()).ok()
    }

    /// Plan from the persisted state and run the switch.
    pub async fn run(&self) -> Result<SwitchOperation, SwitchFailure> {
        self.execute(Switch::plan(self.store.read(), self.policy.default_color))
            .await
    }

    pub async fn execute(&self, switch: Switch<Planned>) -> Result<SwitchOperation, SwitchFailure> {
        let router = self.reloader();
        let orchestrator = Orchestrator {
            lifecycle: &self.lifecycle,
            health: &self.health,
            reachability: Some(&self.reachability),
            router: &router,
            template: &self.template,
            store: &self.store,
            services: &self.services,
            policy: self.policy.clone(),
        };
        orchestrator.execute(switch).await
    }
}

/// Millisecond waits and no settle delays.
pub fn fast_policy() -> SwitchPolicy {
    SwitchPolicy {
        default_color: Color::Blue,
        build: false,
        settle: SettleConfig::none(),
        health: WaitPolicy {
            timeout: Duration::from_millis(60),
            interval: Duration::from_millis(5),
        },
        reachability: Some(WaitPolicy {
            timeout: Duration::from_millis(60),
            interval: Duration::from_millis(5),
        }),
    }
}
