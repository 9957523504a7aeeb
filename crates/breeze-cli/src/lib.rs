//! The `breeze` command-line tool.
//!
//! Each command opens a session with the configured credentials, runs one
//! or two API calls and closes the session again.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{CliError, CliResult};
