// ABOUTME: Command module aggregator for the swapcam CLI.
// ABOUTME: Re-exports switch, status, and render command handlers.

mod render;
mod status;
mod switch;

pub use render::render;
pub use status::status;
pub use switch::switch;
