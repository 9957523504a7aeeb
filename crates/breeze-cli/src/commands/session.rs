//! Login/logout bracket around every API command.

use breeze_api::BreezeClient;
use tracing::{debug, warn};

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// Connects with the configured settings, runs `command` inside a session
/// and prints what it returns.
pub fn run(
    config: &CliConfig,
    command: impl FnOnce(&BreezeClient) -> CliResult<String>,
) -> CliResult<()> {
    let settings = config.connect_settings()?;
    if !settings.has_credentials() {
        return Err(CliError::Config(
            "no credentials; add a [credentials] section".into(),
        ));
    }
    let client = BreezeClient::new(settings)?;
    let output = with_session(&client, command)?;
    println!("{output}");
    Ok(())
}

/// Logs in, runs `command`, and logs out whether or not it succeeded.
pub fn with_session<T>(
    client: &BreezeClient,
    command: impl FnOnce(&BreezeClient) -> CliResult<T>,
) -> CliResult<T> {
    let login = client.login();
    if login.result != Some(true) {
        return Err(CliError::call("login", &login.envelope));
    }
    debug!(url = %client.settings().service_url(), "session opened");

    let result = command(client);

    let logout = client.logout();
    if !logout.is_ok() {
        warn!(status = %logout, "logout failed");
    }
    result
}
