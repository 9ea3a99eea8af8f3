// ABOUTME: Switch command implementation.
// ABOUTME: Wires the compose driver, probes, and proxy reloader into the orchestrator under a lock.

use swapcam::config::{Config, HealthSource};
use swapcam::deploy::{
    Orchestrator, SwitchFailure, SwitchLock, SwitchOperation, SwitchPolicy, SwitchStep,
};
use swapcam::diagnostics::{Concern, Diagnostics};
use swapcam::error::{Error, Result};
use swapcam::exec::SystemRunner;
use swapcam::health::{ContainerProbe, HealthProbe, HttpProbe};
use swapcam::hooks::{HookContext, HookPoint, HookRunner};
use swapcam::output::Output;
use swapcam::proxy::{ProxyReloader, ProxyTemplate};
use swapcam::runtime::{Compose, Reachability};
use swapcam::state::StateStore;

/// Switch the live instance to the other color.
pub async fn switch(config: Config, force: bool, skip_hooks: bool, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let store = StateStore::new(config.state_path());
    output.progress("Acquiring switch lock...");
    let lock = SwitchLock::acquire(store.path(), force)?;

    let result = switch_locked(&config, &store, skip_hooks, &output, &mut diag).await;

    if let Err(e) = lock.release() {
        diag.note(Concern::Lock, format!("failed to release switch lock: {}", e));
    }

    diag.report(&output);

    let operation = result?;
    output.switch_done(&operation);
    Ok(())
}

/// Switch logic (runs while holding the lock).
async fn switch_locked(
    config: &Config,
    store: &StateStore,
    skip_hooks: bool,
    output: &Output,
    diag: &mut Diagnostics,
) -> Result<SwitchOperation> {
    let runner = SystemRunner::new(config.command_timeout);
    let compose = Compose::from_config(runner.clone(), config);
    let template = ProxyTemplate::from_config(config)?;
    let router = ProxyReloader::from_config(runner.clone(), config, &compose);
    let hooks = HookRunner::new(runner, &config.base_dir);

    let health: Box<dyn HealthProbe + '_> = match config.health.source {
        HealthSource::Container => Box::new(ContainerProbe::new(&compose)),
        HealthSource::Http => Box::new(HttpProbe::from_config(&config.health)?),
    };

    let orchestrator = Orchestrator {
        lifecycle: &compose,
        health: health.as_ref(),
        reachability: Some(&compose as &dyn Reachability),
        router: &router,
        template: &template,
        store,
        services: &config.services,
        policy: SwitchPolicy::from_config(config),
    };

    let planned = orchestrator.plan();
    match planned.from() {
        Some(from) => output.progress(&format!("Switching {} -> {}", from, planned.to())),
        None => output.progress(&format!(
            "No active state; bootstrapping {}",
            planned.to()
        )),
    }

    let mut context = HookContext {
        project: project_name(config),
        from: planned.from(),
        to: planned.to(),
        failed_step: None,
    };

    if !skip_hooks
        && let Some(result) = hooks.run(HookPoint::PreSwitch, &context).await
        && !result.success
    {
        if !result.stderr.is_empty() {
            output.progress(result.stderr.trim_end());
        }
        return Err(Error::Hook(format!(
            "pre-switch ({})",
            exit_label(result.exit_code)
        )));
    }

    if let Some(network) = &config.network {
        output.progress(&format!("  → Ensuring network {} exists...", network));
        compose.ensure_network(network).await?;
    }

    output.progress(&format!("  → Moving the camera to {}...", planned.to()));
    match orchestrator.execute(planned).await {
        Ok(operation) => {
            if !skip_hooks
                && let Some(result) = hooks.run(HookPoint::PostSwitch, &context).await
                && !result.success
            {
                diag.note(
                    Concern::Hook,
                    format!("post-switch hook failed ({})", exit_label(result.exit_code)),
                );
            }
            Ok(operation)
        }
        Err(failure) => {
            record_inconsistency(&failure, diag);
            context.failed_step = Some(failure.step);
            if !skip_hooks
                && let Some(result) = hooks.run(HookPoint::OnError, &context).await
                && !result.success
            {
                diag.note(
                    Concern::Hook,
                    format!("on-error hook failed ({})", exit_label(result.exit_code)),
                );
            }
            Err(Error::Switch(failure))
        }
    }
}

/// Surface the state/routing disagreement a failed routing or persist step leaves behind.
fn record_inconsistency(failure: &SwitchFailure, diag: &mut Diagnostics) {
    let to = failure.operation.to;
    let from = failure.operation.from;
    let message = match (failure.step, from) {
        (SwitchStep::UpdateRouting, Some(from)) => format!(
            "state file still names {} (stopped) but {} is running unrouted; fix routing before the next switch",
            from, to
        ),
        (SwitchStep::UpdateRouting, None) => {
            format!("{} is running but no route to it was applied", to)
        }
        (SwitchStep::Persist, _) => format!(
            "proxy routes to {to} but the state file was not updated; write '{to}' to it before the next switch"
        ),
        _ => return,
    };
    diag.note(Concern::Routing, message);
}

fn project_name(config: &Config) -> String {
    if let Some(project) = &config.project {
        return project.clone();
    }
    std::fs::canonicalize(&config.base_dir)
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default()
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}
