// ABOUTME: Library root for swapcam - exposes the switch controller and its collaborators.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod health;
pub mod hooks;
pub mod output;
pub mod proxy;
pub mod runtime;
pub mod state;
pub mod types;
