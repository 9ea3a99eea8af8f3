// ABOUTME: Switch orchestration using the type state pattern.
// ABOUTME: Exports state markers, the Switch struct, the orchestrator, and the switch lock.

mod error;
mod lock;
mod operation;
mod orchestrator;
mod state;
mod switch;
mod transitions;

pub use error::{SwitchError, SwitchErrorKind, SwitchFailure};
pub use lock::{LockError, LockInfo, SwitchLock};
pub use operation::{SwitchOperation, SwitchOutcome, SwitchStep};
pub use orchestrator::{Orchestrator, SwitchPolicy, WaitPolicy};
pub use state::{Done, Healthy, NewStarted, OldStopped, Planned, Reachable, Routed};
pub use switch::Switch;
