//! Configuration commands.

use std::path::Path;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Show the configuration file path in use.
pub fn path(explicit: Option<&Path>) -> CliResult<()> {
    match explicit {
        Some(path) => println!("config: {}", path.display()),
        None => println!("config: {}", CliConfig::default_path().display()),
    }
    Ok(())
}

/// Check that the configuration yields usable settings.
pub fn validate(config: &CliConfig) -> CliResult<()> {
    let settings = check(config)?;
    println!("endpoint: {}", settings.service_url());
    println!("Configuration is valid.");
    Ok(())
}

fn check(config: &CliConfig) -> CliResult<breeze_api::ConnectSettings> {
    let settings = config.connect_settings()?;
    if !settings.has_credentials() {
        return Err(CliError::Config("no [credentials] section".into()));
    }
    Ok(settings)
}
