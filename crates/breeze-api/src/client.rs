//! The client: session handling and the shared request pipeline.
//!
//! Every operation goes through [`BreezeClient::dispatch`], which applies the
//! session (cookie or `session` parameter), sends the request, captures an
//! issued session cookie and resolves the status envelope. The per-action
//! operations live in [`crate::actions`].
//!
//! A client holds at most one session. Concurrent logins on the same client
//! are unsupported: the last token written wins.

use tracing::{debug, info, warn};

use crate::config::{ConnectSettings, Credentials, SessionMode};
use crate::error::{ApiError, ApiResult};
use crate::marshal::{self, Record};
use crate::model::UserInfo;
use crate::request::ApiRequest;
use crate::session::{SessionSlot, SessionToken};
use crate::status::{ApiReply, PAYLOAD_ROOT, StatusEnvelope, resolve};
use crate::transport::{HttpTransport, Transport};
use crate::xml::XmlNode;

/// The result of one operation.
///
/// `result` is present only when the call succeeded and the payload could be
/// decoded. The envelope is always populated.
#[derive(Debug)]
pub struct Outcome<T> {
    pub envelope: StatusEnvelope,
    pub result: Option<T>,
    /// Set when a create was rolled back after its reply could not be decoded.
    pub compensation: Option<Compensation>,
}

impl<T> Outcome<T> {
    pub fn new(envelope: StatusEnvelope, result: Option<T>) -> Self {
        Self {
            envelope,
            result,
            compensation: None,
        }
    }

    /// An outcome that carries only a status.
    pub fn status(envelope: StatusEnvelope) -> Self {
        Self::new(envelope, None)
    }

    pub fn is_ok(&self) -> bool {
        self.envelope.is_ok()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            envelope: self.envelope,
            result: self.result.map(f),
            compensation: self.compensation,
        }
    }
}

/// A compensating delete performed after a failed create.
#[derive(Debug)]
pub struct Compensation {
    /// The id of the partially created object.
    pub sco_id: String,
    /// The status of the delete call itself.
    pub envelope: StatusEnvelope,
}

impl Compensation {
    /// A compensation error when the delete did not succeed.
    pub fn failure(&self) -> Option<ApiError> {
        if self.envelope.is_ok() {
            return None;
        }
        Some(ApiError::compensation(format!(
            "failed to delete partially created sco {}: {}",
            self.sco_id, self.envelope
        )))
    }
}

/// A client for one service endpoint.
pub struct BreezeClient {
    settings: ConnectSettings,
    transport: Box<dyn Transport>,
    session: SessionSlot,
}

impl BreezeClient {
    /// Creates a client with the HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(settings: ConnectSettings) -> ApiResult<Self> {
        let transport = HttpTransport::new(&settings)?;
        Ok(Self::with_transport(settings, transport))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(settings: ConnectSettings, transport: impl Transport + 'static) -> Self {
        Self {
            settings,
            transport: Box::new(transport),
            session: SessionSlot::new(),
        }
    }

    pub fn settings(&self) -> &ConnectSettings {
        &self.settings
    }

    /// The held session token, if logged in.
    pub fn session_token(&self) -> Option<SessionToken> {
        self.session.get()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_set()
    }

    /// Sends a request through the pipeline.
    ///
    /// Never fails: transport and parse failures come back as an envelope
    /// with code `not-set` and the error attached.
    pub fn dispatch(&self, request: ApiRequest) -> ApiReply {
        self.exchange(request).0
    }

    /// Sends a request and also returns a session cookie the server issued.
    fn exchange(&self, mut request: ApiRequest) -> (ApiReply, Option<SessionToken>) {
        let mode = self.settings.session_mode;
        let held = if request.requires_session() {
            self.session.get()
        } else {
            None
        };

        let cookie = match mode {
            SessionMode::Cookie => held.as_ref(),
            SessionMode::Parameter => {
                if let Some(ref token) = held {
                    request.prepend_param("session", token.value());
                }
                None
            }
        };

        debug!(action = %request.action(), session = held.is_some(), "dispatching");

        let response = match self.transport.send(&request, cookie) {
            Ok(response) => response,
            Err(err) => {
                warn!(action = %request.action(), error = %err, "transport failed");
                return (ApiReply::failed(err), None);
            }
        };

        let issued = response.session_cookie;
        if mode == SessionMode::Cookie
            && let Some(ref token) = issued
        {
            self.session.set(token.clone());
        }

        let mut reply = match resolve(&response.body) {
            Ok(reply) => reply,
            Err(err) => {
                warn!(action = %request.action(), error = %err, "unreadable response");
                return (ApiReply::failed(err), issued);
            }
        };

        if mode == SessionMode::Parameter {
            let stamped = issued.as_ref().or(held.as_ref()).map(|t| t.value().to_string());
            reply.envelope.set_session_token(stamped);
        }

        debug!(action = %request.action(), code = %reply.envelope.code(), "completed");
        (reply, issued)
    }

    /// Sends a request that returns only a status.
    pub(crate) fn call(&self, request: ApiRequest) -> StatusEnvelope {
        self.dispatch(request).envelope
    }

    /// Sends a request and decodes its payload with `extract`.
    ///
    /// `extract` sees the payload root (an empty one when the reply had no
    /// payload). A decode error marks the envelope `invalid`/`format`.
    pub(crate) fn fetch<T>(
        &self,
        request: ApiRequest,
        extract: impl FnOnce(&XmlNode) -> ApiResult<Option<T>>,
    ) -> Outcome<T> {
        let ApiReply {
            mut envelope,
            payload,
        } = self.dispatch(request);
        if !envelope.is_ok() {
            return Outcome::status(envelope);
        }

        let payload = payload.unwrap_or_else(|| XmlNode::new(PAYLOAD_ROOT));
        match extract(&payload) {
            Ok(result) => Outcome::new(envelope, result),
            Err(err) => {
                warn!(error = %err, "payload did not decode");
                envelope.mark_decode_failure(err);
                Outcome::status(envelope)
            }
        }
    }

    /// Sends a request and decodes every element at `path` under `root`.
    pub(crate) fn fetch_list<T: Record>(
        &self,
        request: ApiRequest,
        path: &str,
        root: &str,
    ) -> Outcome<Vec<T>> {
        self.fetch(request, |payload| {
            marshal::decode_all(payload.select(path), Some(root)).map(Some)
        })
    }

    /// Sends a request and returns the elements at `path`, undecoded.
    pub(crate) fn fetch_raw(&self, request: ApiRequest, path: &str) -> Outcome<Vec<XmlNode>> {
        self.fetch(request, |payload| {
            Ok(Some(payload.select(path).into_iter().cloned().collect()))
        })
    }

    /// Resolves a path from the service against its origin.
    pub fn resolve_full_url(&self, url_path: &str) -> String {
        format!("{}{url_path}", self.settings.origin())
    }

    /// Logs in with the configured credentials.
    pub fn login(&self) -> Outcome<bool> {
        match self.settings.credentials {
            Some(Credentials {
                ref user,
                ref password,
                ..
            }) => self.login_as(user, password),
            None => {
                self.session.clear();
                Outcome::new(StatusEnvelope::missing("login"), Some(false))
            }
        }
    }

    /// Logs in with explicit credentials.
    ///
    /// Succeeds only when the server answers `ok` and issues a session. On
    /// any other outcome the held session is cleared.
    pub fn login_as(&self, user: &str, password: &str) -> Outcome<bool> {
        if user.is_empty() {
            self.session.clear();
            return Outcome::new(StatusEnvelope::missing("login"), Some(false));
        }

        let request = ApiRequest::anonymous("login")
            .param("login", user)
            .param("password", password);
        let (reply, issued) = self.exchange(request);

        let logged_in = match issued {
            Some(token) if reply.envelope.is_ok() => {
                self.session.set(token);
                true
            }
            _ => {
                self.session.clear();
                false
            }
        };

        if logged_in {
            info!(user = %user, "logged in");
        } else {
            warn!(user = %user, status = %reply.envelope, "login failed");
        }
        Outcome::new(reply.envelope, Some(logged_in))
    }

    /// Ends the session. The held token is dropped when the server answers
    /// `ok`.
    pub fn logout(&self) -> StatusEnvelope {
        let envelope = self.call(ApiRequest::new("logout"));
        if envelope.is_ok() {
            self.session.clear();
            info!("logged out");
        }
        envelope
    }

    /// The logged-in user (`common-info`).
    pub fn user_info(&self) -> Outcome<UserInfo> {
        self.fetch(ApiRequest::new("common-info"), |payload| {
            payload
                .descendants("user")
                .first()
                .map(|node| marshal::decode(node, None))
                .transpose()
        })
    }

    /// Reports `missing` for the first required field that is absent or empty.
    pub(crate) fn require<'a>(
        fields: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
    ) -> Result<(), StatusEnvelope> {
        for (name, value) in fields {
            if value.is_none_or(str::is_empty) {
                return Err(StatusEnvelope::missing(name));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for BreezeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreezeClient")
            .field("service_url", &self.settings.service_url().as_str())
            .field("session_mode", &self.settings.session_mode)
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::status::{StatusCode, SubCode};
    use crate::testing::{ScriptedTransport, ok, scripted_client};

    #[test]
    fn login_holds_cookie_and_later_calls_carry_it() {
        let (client, transport) = scripted_client(SessionMode::Cookie);
        transport.push_with_cookie(&ok(""), "breezbreezxyz");
        transport.push(&ok(r#"<common><user user-id="42"><name>Pat</name><login>pat</login></user></common>"#));

        let login = client.login_as("pat", "secret");
        assert_eq!(login.result, Some(true));
        assert_eq!(client.session_token().unwrap().value(), "breezbreezxyz");

        let info = client.user_info();
        assert!(info.is_ok());
        let user = info.result.unwrap();
        assert_eq!(user.user_id, "42");
        assert_eq!(user.name.as_deref(), Some("Pat"));

        let cookies = transport.cookies();
        assert_eq!(cookies, [None, Some("breezbreezxyz".to_string())]);
        let requests = transport.requests();
        assert_eq!(requests[0].get("login"), Some("pat"));
        assert_eq!(requests[1].get("session"), None);
    }

    #[test]
    fn parameter_mode_prepends_session() {
        let (client, transport) = scripted_client(SessionMode::Parameter);
        transport.push_with_cookie(&ok(""), "tok123");
        transport.push(&ok(""));

        let login = client.login_as("pat", "secret");
        assert_eq!(login.result, Some(true));
        assert_eq!(login.envelope.session_token(), Some("tok123"));

        let envelope = client.call(ApiRequest::new("sco-shortcuts"));
        assert_eq!(envelope.session_token(), Some("tok123"));

        let requests = transport.requests();
        assert_eq!(requests[1].parameters()[0], ("session".into(), "tok123".into()));
        assert_eq!(transport.cookies(), [None, None]);
    }

    #[test]
    fn failed_login_clears_session() {
        let (client, transport) = scripted_client(SessionMode::Cookie);
        transport.push_with_cookie(&ok(""), "first");
        transport.push(r#"<results><status code="no-access"><invalid subcode="denied"/></status></results>"#);

        assert_eq!(client.login_as("pat", "secret").result, Some(true));
        let retry = client.login_as("pat", "wrong");
        assert_eq!(retry.result, Some(false));
        assert_eq!(retry.envelope.code(), StatusCode::NoAccess);
        assert_eq!(retry.envelope.sub_code(), SubCode::Denied);
        assert!(!client.is_logged_in());
    }

    #[test]
    fn ok_without_cookie_is_not_a_login() {
        let (client, transport) = scripted_client(SessionMode::Cookie);
        transport.push(&ok(""));
        assert_eq!(client.login_as("pat", "secret").result, Some(false));
        assert!(!client.is_logged_in());
    }

    #[test]
    fn logout_clears_session() {
        let (client, transport) = scripted_client(SessionMode::Cookie);
        transport.push_with_cookie(&ok(""), "tok");
        transport.push(&ok(""));
        transport.push(&ok(""));

        client.login_as("pat", "secret");
        assert!(client.logout().is_ok());
        assert!(!client.is_logged_in());

        client.call(ApiRequest::new("common-info"));
        assert_eq!(transport.cookies(), [None, Some("tok".to_string()), None]);
    }

    #[test]
    fn login_without_credentials_sends_nothing() {
        let (client, transport) = scripted_client(SessionMode::Cookie);
        let outcome = client.login();
        assert_eq!(outcome.result, Some(false));
        assert_eq!(outcome.envelope.sub_code(), SubCode::Missing);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn transport_failure_is_an_envelope() {
        let (client, transport) = scripted_client(SessionMode::Cookie);
        transport.push_error(ApiError::transport("connection refused"));
        let reply = client.dispatch(ApiRequest::new("common-info"));
        assert_eq!(reply.envelope.code(), StatusCode::NotSet);
        assert_eq!(reply.envelope.error().unwrap().kind(), ErrorKind::Transport);
        assert!(reply.payload.is_none());
    }

    #[test]
    fn garbage_body_is_a_parse_failure() {
        let (client, transport) = scripted_client(SessionMode::Cookie);
        transport.push("<html><body>Service unavailable</body></html>");
        let outcome = client.user_info();
        assert_eq!(outcome.envelope.code(), StatusCode::NotSet);
        assert_eq!(outcome.envelope.error().unwrap().kind(), ErrorKind::Parse);
        assert!(outcome.result.is_none());
    }

    #[test]
    fn undecodable_payload_is_invalid_format() {
        let (client, transport) = scripted_client(SessionMode::Cookie);
        transport.push(&ok(r#"<common><user user-id="1"/></common>"#));
        // The payload root itself is not a `user` element.
        let outcome: Outcome<UserInfo> = client.fetch(ApiRequest::new("common-info"), |payload| {
            marshal::decode(payload, Some("user")).map(Some)
        });
        assert_eq!(outcome.envelope.code(), StatusCode::Invalid);
        assert_eq!(outcome.envelope.sub_code(), SubCode::Format);
        assert_eq!(outcome.envelope.error().unwrap().kind(), ErrorKind::Decode);
    }

    #[test]
    fn full_url_uses_origin() {
        let settings = ConnectSettings::new("https://connect.example.com:8443/").unwrap();
        let client = BreezeClient::with_transport(settings, ScriptedTransport::new());
        assert_eq!(
            client.resolve_full_url("/kickoff/"),
            "https://connect.example.com:8443/kickoff/"
        );
    }
}
