// ABOUTME: Switch state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce the stop-before-start, health-before-route ordering.

/// Target computed from the active state.
/// Available actions: `stop_old()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Planned;

/// Old instance stopped and removed (or nothing to stop on bootstrap).
/// Available actions: `start_new()`
#[derive(Debug, Clone, Copy, Default)]
pub struct OldStopped;

/// New instance started, not yet verified.
/// Available actions: `await_healthy()`
#[derive(Debug, Clone, Copy, Default)]
pub struct NewStarted;

/// New instance reported healthy.
/// Available actions: `await_reachable()`, `skip_reachability()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Healthy;

/// Proxy can resolve the new instance.
/// Available actions: `update_routing()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Reachable;

/// Proxy reloaded and routing to the new instance.
/// Available actions: `persist()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Routed;

/// Active state committed. Terminal.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Done;
