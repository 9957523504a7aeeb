//! CLI configuration.
//!
//! Everything lives in one `config.toml`, at `~/.config/breeze/config.toml`
//! unless `--config` says otherwise:
//!
//! ```toml
//! [service]
//! url = "https://connect.example.com"
//! session_mode = "cookie"
//!
//! [credentials]
//! user = "admin@example.com"
//! password = "env::BREEZE_PASSWORD"
//! ```
//!
//! Passwords accept the references described in [`crate::secret`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use breeze_api::{ConnectSettings, Credentials, ProxySettings, SessionMode};
use breeze_core::tracing::{LogFormat, TracingConfig};
use serde::Deserialize;

use crate::error::{CliError, CliResult};
use crate::secret;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Debug logging, same as `--debug`.
    pub debug: bool,

    /// `compact` (default), `pretty` or `json`.
    pub log_format: Option<String>,

    pub service: ServiceSettings,

    pub credentials: Option<Credentials>,

    pub proxy: Option<ProxySettings>,
}

/// Where and how to reach the service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Base URL; `/api/xml` is appended when missing.
    pub url: Option<String>,

    pub session_mode: SessionMode,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    pub verify_tls: bool,

    pub user_agent: Option<String>,
}

impl CliConfig {
    /// Loads the default file, or an empty configuration if there is none.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
            path: path.display().to_string(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("breeze")
            .join("config.toml")
    }

    /// Log setup for the configured format at the given verbosity.
    pub fn tracing(&self, verbose: u8) -> CliResult<TracingConfig> {
        let mut config = TracingConfig::from_verbosity(verbose);
        if let Some(ref format) = self.log_format {
            config = config.with_format(format.parse::<LogFormat>()?);
        }
        Ok(config)
    }

    /// Builds client settings, expanding secret references.
    pub fn connect_settings(&self) -> CliResult<ConnectSettings> {
        let url = self
            .service
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| CliError::Config("no service url; set `url` under [service]".into()))?;

        let mut settings =
            ConnectSettings::new(url)?.with_session_mode(self.service.session_mode);
        if let Some(secs) = self.service.timeout {
            settings = settings.with_timeout(Duration::from_secs(secs));
        }
        if self.service.verify_tls {
            settings = settings.with_verified_tls();
        }
        if let Some(ref agent) = self.service.user_agent {
            settings = settings.with_user_agent(agent);
        }
        if let Some(ref credentials) = self.credentials {
            settings = settings.with_credentials(resolve_credentials(credentials)?);
        }
        if let Some(ref proxy) = self.proxy {
            let mut resolved = ProxySettings::new(&proxy.url);
            if let Some(ref credentials) = proxy.credentials {
                resolved = resolved.with_credentials(resolve_credentials(credentials)?);
            }
            settings = settings.with_proxy(resolved);
        }
        Ok(settings)
    }
}

fn resolve_credentials(credentials: &Credentials) -> CliResult<Credentials> {
    Ok(Credentials {
        password: secret::resolve(&credentials.password)?,
        ..credentials.clone()
    })
}
