//! HTTP transport.
//!
//! The [`Transport`] trait is the seam between the pipeline and the network.
//! [`HttpTransport`] is the blocking reqwest implementation; tests swap in a
//! scripted one.

use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, COOKIE, SET_COOKIE};
use tracing::{debug, trace, warn};

use crate::config::ConnectSettings;
use crate::error::{ApiError, ApiResult};
use crate::request::ApiRequest;
use crate::session::SessionToken;

/// A raw response from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// The XML body.
    pub body: String,
    /// A session cookie the server issued with this response.
    pub session_cookie: Option<SessionToken>,
}

impl TransportResponse {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            session_cookie: None,
        }
    }

    pub fn with_session_cookie(mut self, token: SessionToken) -> Self {
        self.session_cookie = Some(token);
        self
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations perform no retries. `session_cookie` is the token to send
/// as the `BREEZESESSION` cookie, if any.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &ApiRequest,
        session_cookie: Option<&SessionToken>,
    ) -> ApiResult<TransportResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request: &ApiRequest,
        session_cookie: Option<&SessionToken>,
    ) -> ApiResult<TransportResponse> {
        (**self).send(request, session_cookie)
    }
}

/// Blocking HTTP transport backed by reqwest.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    /// Builds the HTTP client from the settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the proxy URL is invalid or the
    /// client cannot be built.
    pub fn new(settings: &ConnectSettings) -> ApiResult<Self> {
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(!settings.verify_tls)
            .timeout(settings.timeout)
            .user_agent(&settings.user_agent);

        if let Some(ref proxy) = settings.proxy
            && !proxy.url.is_empty()
        {
            let mut http_proxy = reqwest::Proxy::all(&proxy.url).map_err(|e| {
                ApiError::configuration(format!("invalid proxy URL `{}`", proxy.url)).with_source(e)
            })?;
            if let Some(ref creds) = proxy.credentials
                && !creds.user.is_empty()
                && !creds.password.is_empty()
            {
                http_proxy = http_proxy.basic_auth(&creds.qualified_user(), &creds.password);
            }
            builder = builder.proxy(http_proxy);
        }

        let client = builder.build().map_err(|e| {
            ApiError::configuration(format!("failed to create HTTP client: {e}")).with_source(e)
        })?;

        Ok(Self {
            client,
            endpoint: settings.service_url().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: &ApiRequest,
        session_cookie: Option<&SessionToken>,
    ) -> ApiResult<TransportResponse> {
        let url = request.url(&self.endpoint);
        let mut http = self.client.get(&url).header(ACCEPT, "*/*");
        if let Some(token) = session_cookie {
            http = http.header(COOKIE, token.cookie_header());
        }

        trace!(request = %request.redacted(), cookie = session_cookie.is_some(), "sending request");

        let response = http
            .send()
            .map_err(|e| ApiError::transport(format!("request failed: {e}")).with_source(e))?;

        let status = response.status();
        trace!(status = %status, "received response");
        if !status.is_success() {
            warn!(status = %status, action = %request.action(), "unexpected HTTP status");
            return Err(ApiError::transport(format!("unexpected HTTP status {status}")));
        }

        let host = response.url().host_str().map(str::to_string);
        let session_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(SessionToken::from_set_cookie)
            .map(|token| match host {
                Some(host) if token.domain().is_none() => token.with_domain(host),
                _ => token,
            });
        if session_cookie.is_some() {
            debug!(action = %request.action(), "server issued a session cookie");
        }

        let body = response
            .text()
            .map_err(|e| ApiError::transport(format!("failed to read response: {e}")).with_source(e))?;

        Ok(TransportResponse {
            body,
            session_cookie,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, ProxySettings};
    use std::time::Duration;

    #[test]
    fn transport_creation() {
        let settings = ConnectSettings::new("https://connect.example.com/")
            .unwrap()
            .with_timeout(Duration::from_secs(5));
        let transport = HttpTransport::new(&settings).unwrap();
        assert_eq!(transport.endpoint(), "https://connect.example.com/api/xml");
    }

    #[test]
    fn transport_with_authenticated_proxy() {
        let settings = ConnectSettings::new("https://connect.example.com/")
            .unwrap()
            .with_proxy(
                ProxySettings::new("http://proxy.local:3128")
                    .with_credentials(Credentials::new("bob", "pw").with_domain("CORP")),
            );
        assert!(HttpTransport::new(&settings).is_ok());
    }

    #[test]
    fn transport_response_builder() {
        let response = TransportResponse::new("<results/>")
            .with_session_cookie(SessionToken::new("tok"));
        assert_eq!(response.body, "<results/>");
        assert_eq!(response.session_cookie.unwrap().value(), "tok");
    }
}
