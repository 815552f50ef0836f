//! Command-line front end for the v2v translation engine.
//!
//! Loads a plan configuration and an inventory snapshot, runs the builder
//! for one VM and renders the result as YAML or JSON.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Args, Command, OutputFormat, VmArgs};
pub use config::{load_snapshot, Config};
