//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// breeze - administer a Connect server from the shell
#[derive(Debug, Parser)]
#[command(name = "breeze")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "BREEZE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the logged-in user
    Whoami,

    /// List meetings
    Meetings {
        /// Only meetings whose name contains this text
        #[arg(long)]
        like: Option<String>,

        /// Only the meetings you host
        #[arg(long)]
        mine: bool,
    },

    /// List the contents of a folder or meeting room
    Contents {
        /// SCO id of the folder or room
        sco_id: String,
    },

    /// Show account quotas
    Quotas,

    /// List users and groups
    Principals {
        /// Only members of this group
        #[arg(long)]
        group: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Show the configuration file path
    Path,
    /// Check the configuration and the stored secrets
    Validate,
}
