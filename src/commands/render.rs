// ABOUTME: Render command implementation.
// ABOUTME: Prints the routing config a switch to the given color would apply.

use swapcam::config::Config;
use swapcam::error::Result;
use swapcam::proxy::ProxyTemplate;
use swapcam::types::Color;

pub fn render(config: &Config, color: Color) -> Result<()> {
    let template = ProxyTemplate::from_config(config)?;
    print!("{}", template.render(color));
    Ok(())
}
