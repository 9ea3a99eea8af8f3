// ABOUTME: Status command implementation.
// ABOUTME: Reports the active color, each instance's health, and which color the proxy config routes to.

use serde::Serialize;
use swapcam::config::Config;
use swapcam::diagnostics::{Concern, Diagnostics};
use swapcam::error::Result;
use swapcam::exec::SystemRunner;
use swapcam::output::{Output, OutputMode};
use swapcam::proxy::ProxyTemplate;
use swapcam::runtime::{Compose, InstanceHealth, InstanceLifecycle};
use swapcam::state::StateStore;
use swapcam::types::Color;

#[derive(Serialize)]
struct StatusReport {
    active: Option<Color>,
    routed: Option<Color>,
    /// State file and proxy config disagree.
    drift: bool,
    instances: Vec<InstanceReport>,
}

#[derive(Serialize)]
struct InstanceReport {
    color: Color,
    service: String,
    health: InstanceHealth,
}

pub async fn status(config: &Config, output: &Output) -> Result<()> {
    let mut diag = Diagnostics::default();
    let store = StateStore::new(config.state_path());
    let active = store.read();

    let runner = SystemRunner::new(config.command_timeout);
    let compose = Compose::from_config(runner, config);
    let mut instances = Vec::with_capacity(Color::ALL.len());
    for color in Color::ALL {
        let health = match compose.health_status(color).await {
            Ok(health) => health,
            Err(e) => {
                tracing::warn!("Could not read {} health: {}", color, e);
                InstanceHealth::Unknown
            }
        };
        instances.push(InstanceReport {
            color,
            service: config.services.for_color(color).to_string(),
            health,
        });
    }

    let template = ProxyTemplate::from_config(config)?;
    let proxy_path = config.proxy_config_path();
    let routed = match std::fs::read_to_string(&proxy_path) {
        Ok(text) => template.routed_color(&text),
        Err(e) => {
            tracing::debug!("No routing config at {}: {}", proxy_path.display(), e);
            None
        }
    };

    if let (Some(active), Some(routed)) = (active, routed)
        && active != routed
    {
        diag.note(
            Concern::Routing,
            format!(
                "state file names {} but the proxy config routes to {}",
                active, routed
            ),
        );
    }

    let report = StatusReport {
        active,
        routed,
        drift: diag.routing_drift(),
        instances,
    };
    match output.mode() {
        OutputMode::Json => println!("{}", serde_json::to_string(&report).unwrap_or_default()),
        OutputMode::Quiet => println!("{}", label(report.active)),
        OutputMode::Normal => {
            println!("Active: {}", label(report.active));
            println!("Routed: {}", label(report.routed));
            for instance in &report.instances {
                println!(
                    "  {:<6} {:<20} {}",
                    instance.color.to_string(),
                    instance.service,
                    instance.health.to_string()
                );
            }
        }
    }

    diag.report(output);
    Ok(())
}

fn label(color: Option<Color>) -> String {
    color.map_or_else(|| "none".to_string(), |c| c.to_string())
}
