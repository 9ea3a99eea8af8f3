// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments, and the global output flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use swapcam::types::Color;

#[derive(Parser)]
#[command(name = "swapcam")]
#[command(about = "Blue-green switch controller for single-camera edge deployments")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (default: discover swapcam.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print events as JSON lines
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new swapcam.yml configuration file
    Init {
        /// Color to start when no active state exists
        #[arg(long)]
        default_color: Option<Color>,

        /// Overwrite existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Switch the live instance to the other color
    Switch {
        /// Break an existing switch lock
        #[arg(short, long)]
        force: bool,

        /// Do not run pre-switch, post-switch, or on-error hooks
        #[arg(long)]
        skip_hooks: bool,
    },

    /// Show the active color, instance health, and routed color
    Status,

    /// Print the routing config for a color
    Render {
        /// Color to render the config for
        color: Color,
    },
}
