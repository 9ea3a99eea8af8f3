// ABOUTME: Container runtime access through the compose CLI.
// ABOUTME: Exposes lifecycle/reachability traits and the Compose driver implementing them.

mod compose;
mod error;
mod traits;
mod types;

pub use compose::Compose;
pub use error::{LifecycleError, LifecycleErrorKind};
pub use traits::{InstanceLifecycle, Reachability};
pub use types::{InstanceHealth, LifecycleOp, RuntimeType};
