// ABOUTME: Validated domain types shared across the controller.
// ABOUTME: Color identifies an instance; ServiceName names it in the compose project.

mod color;
mod service_name;

pub use color::{Color, ParseColorError};
pub use service_name::{ServiceName, ServiceNameError};
