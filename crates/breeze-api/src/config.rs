//! Client settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Path every service endpoint ends with.
pub const API_PATH: &str = "/api/xml";

/// How the session token travels after login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// As a `BREEZESESSION` cookie on every request.
    #[default]
    Cookie,
    /// As an explicit `session=<token>` query parameter.
    Parameter,
}

/// Account credentials used for login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// The user name qualified with the domain, `DOMAIN\user`, when one is set.
    pub fn qualified_user(&self) -> String {
        match self.domain.as_deref() {
            Some(domain) if !domain.is_empty() => format!("{domain}\\{}", self.user),
            _ => self.user.clone(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// An outbound HTTP proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySettings {
    pub url: String,
    #[serde(default, flatten, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
}

impl ProxySettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Settings for one client instance.
#[derive(Debug, Clone)]
pub struct ConnectSettings {
    /// The normalized endpoint, always ending in `/api/xml`.
    service_url: Url,

    /// Credentials for [`BreezeClient::login`](crate::BreezeClient::login).
    pub credentials: Option<Credentials>,

    pub proxy: Option<ProxySettings>,

    pub session_mode: SessionMode,

    /// Bound on every HTTP exchange.
    pub timeout: Duration,

    /// Whether to verify the server's TLS certificate.
    ///
    /// Off by default: many deployments run on self-signed certificates.
    /// This is a security trade-off; turn it on wherever the service
    /// presents a trusted certificate.
    pub verify_tls: bool,

    pub user_agent: String,
}

impl ConnectSettings {
    /// Default request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 1200;

    /// Creates settings for the given service URL.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is empty or cannot be parsed.
    pub fn new(service_url: impl AsRef<str>) -> ApiResult<Self> {
        let normalized = normalize_service_url(service_url.as_ref());
        if normalized == API_PATH {
            return Err(ApiError::configuration("service URL is empty"));
        }
        let service_url = Url::parse(&normalized).map_err(|err| {
            ApiError::configuration(format!("invalid service URL `{normalized}`"))
                .with_source(err)
        })?;

        Ok(Self {
            service_url,
            credentials: None,
            proxy: None,
            session_mode: SessionMode::default(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            verify_tls: false,
            user_agent: format!("breeze/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_session_mode(mut self, mode: SessionMode) -> Self {
        self.session_mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Turns on TLS certificate verification.
    pub fn with_verified_tls(mut self) -> Self {
        self.verify_tls = true;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The normalized endpoint.
    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    /// `scheme://host[:port]` of the service, used to resolve relative paths.
    pub fn origin(&self) -> String {
        let url = &self.service_url;
        let mut origin = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
        if let Some(port) = url.port() {
            origin.push_str(&format!(":{port}"));
        }
        origin
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Trims trailing `/` and `?` and makes sure the URL ends in `/api/xml`.
pub fn normalize_service_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches(['/', '?']);
    if trimmed.ends_with(API_PATH) {
        trimmed.to_string()
    } else {
        format!("{trimmed}{API_PATH}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_appends_api_path_once() {
        for raw in [
            "https://connect.example.com",
            "https://connect.example.com/",
            "https://connect.example.com/?",
            "https://connect.example.com//?/",
            "https://connect.example.com/api/xml",
            "https://connect.example.com/api/xml/",
            "https://connect.example.com/api/xml?",
        ] {
            let normalized = normalize_service_url(raw);
            assert_eq!(normalized, "https://connect.example.com/api/xml", "{raw}");
            assert_eq!(normalized.matches(API_PATH).count(), 1);
        }
    }

    #[test]
    fn settings_defaults() {
        let settings = ConnectSettings::new("https://connect.example.com/").unwrap();
        assert_eq!(
            settings.service_url().as_str(),
            "https://connect.example.com/api/xml"
        );
        assert_eq!(settings.session_mode, SessionMode::Cookie);
        assert_eq!(settings.timeout, Duration::from_secs(1200));
        assert!(!settings.verify_tls);
        assert!(!settings.has_credentials());
        assert!(settings.user_agent.starts_with("breeze/"));
    }

    #[test]
    fn settings_builder_methods() {
        let settings = ConnectSettings::new("https://connect.example.com")
            .unwrap()
            .with_credentials(Credentials::new("bob@acme.com", "football"))
            .with_session_mode(SessionMode::Parameter)
            .with_timeout(Duration::from_secs(30))
            .with_verified_tls()
            .with_proxy(ProxySettings::new("http://proxy:3128"));

        assert!(settings.has_credentials());
        assert_eq!(settings.session_mode, SessionMode::Parameter);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert!(settings.verify_tls);
        assert_eq!(settings.proxy.unwrap().url, "http://proxy:3128");
    }

    #[test]
    fn empty_or_invalid_url_is_configuration_error() {
        use crate::error::ErrorKind;
        let err = ConnectSettings::new("  ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let err = ConnectSettings::new("not a url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn origin_keeps_explicit_port() {
        let settings = ConnectSettings::new("https://connect.example.com:8443/").unwrap();
        assert_eq!(settings.origin(), "https://connect.example.com:8443");
        let settings = ConnectSettings::new("https://connect.example.com:443/").unwrap();
        assert_eq!(settings.origin(), "https://connect.example.com");
    }

    #[test]
    fn qualified_user_folds_domain() {
        let creds = Credentials::new("bob", "secret").with_domain("CORP");
        assert_eq!(creds.qualified_user(), "CORP\\bob");
        assert_eq!(Credentials::new("bob", "secret").qualified_user(), "bob");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("bob", "hunter2");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn session_mode_deserializes_lowercase() {
        let mode: SessionMode = serde_json::from_str("\"parameter\"").unwrap();
        assert_eq!(mode, SessionMode::Parameter);
    }
}
