// ABOUTME: Health probe backed by the container runtime's own health status.
// ABOUTME: Runtime errors count as an `unknown` observation, never as healthy.

use async_trait::async_trait;

use super::HealthProbe;
use crate::runtime::{InstanceHealth, InstanceLifecycle};
use crate::types::Color;

pub struct ContainerProbe<'a, L: ?Sized> {
    lifecycle: &'a L,
}

impl<'a, L: InstanceLifecycle + ?Sized> ContainerProbe<'a, L> {
    pub fn new(lifecycle: &'a L) -> Self {
        Self { lifecycle }
    }
}

#[async_trait]
impl<L: InstanceLifecycle + ?Sized> HealthProbe for ContainerProbe<'_, L> {
    async fn probe(&self, color: Color) -> InstanceHealth {
        match self.lifecycle.health_status(color).await {
            Ok(health) => health,
            Err(e) => {
                tracing::warn!("Could not read {} health: {}", color, e);
                InstanceHealth::Unknown
            }
        }
    }
}
