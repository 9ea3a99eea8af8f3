// ABOUTME: Reverse-proxy routing: config rendering and safe activation.
// ABOUTME: Only configs that pass the proxy's own validator are ever reloaded.

mod reload;
mod template;

pub use reload::{ProxyReloader, RouteApplier, RoutingError};
pub use template::{DEFAULT_TEMPLATE, ProxyTemplate, TemplateError};
