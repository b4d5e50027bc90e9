//! Command-line surface for the Cognita concept graph engine.
//!
//! # Key Abstractions
//!
//! - [`CognitaCli<C>`]: the application, generic over a config provider
//! - [`CliArgs`]: clap argument tree (`graph`, `config`, `version`)
//! - [`CognitaConfig`]: file + environment configuration via `confyg`

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod graph_handlers;

#[cfg(test)]
mod test_support;

pub use app::CognitaCli;
pub use cli::{BaseCommand, CliArgs, ConfigAction, GraphCommand, GraphSubcommand};
pub use config::CognitaConfig;
pub use graph_handlers::GraphSettings;
