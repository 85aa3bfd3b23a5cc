//! Timeline CLI library.
//!
//! This crate provides the command-line host for the timeline engine: config
//! loading, an in-memory event store and the subcommands.

mod cli;
pub mod commands;
mod config;
pub mod store;

pub use cli::{Cli, Commands, RangeArgs};
pub use config::{Config, ViewportConfig};
pub use store::EventStore;
