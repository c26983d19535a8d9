//! evalfield CLI library
//!
//! This library provides the command-line interface for compiling and
//! inspecting timeline evaluation fields.

pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use error::{CliError, CliResult};
