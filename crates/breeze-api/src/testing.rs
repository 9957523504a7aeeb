//! A scripted transport for exercising the client without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::client::BreezeClient;
use crate::config::{ConnectSettings, SessionMode};
use crate::error::{ApiError, ApiResult};
use crate::request::ApiRequest;
use crate::session::SessionToken;
use crate::transport::{Transport, TransportResponse};

#[derive(Default)]
struct Script {
    responses: VecDeque<ApiResult<TransportResponse>>,
    requests: Vec<ApiRequest>,
    cookies: Vec<Option<String>>,
}

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<Script>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, body: &str) {
        self.script()
            .responses
            .push_back(Ok(TransportResponse::new(body)));
    }

    pub(crate) fn push_with_cookie(&self, body: &str, token: &str) {
        self.script().responses.push_back(Ok(
            TransportResponse::new(body).with_session_cookie(SessionToken::new(token))
        ));
    }

    pub(crate) fn push_error(&self, error: ApiError) {
        self.script().responses.push_back(Err(error));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.script().requests.clone()
    }

    /// The session cookie sent with each request, in order.
    pub(crate) fn cookies(&self) -> Vec<Option<String>> {
        self.script().cookies.clone()
    }

    pub(crate) fn actions(&self) -> Vec<String> {
        self.script()
            .requests
            .iter()
            .map(|r| r.action().to_string())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: &ApiRequest,
        session_cookie: Option<&SessionToken>,
    ) -> ApiResult<TransportResponse> {
        let mut script = self.script();
        script.requests.push(request.clone());
        script
            .cookies
            .push(session_cookie.map(|t| t.value().to_string()));
        script.responses.pop_front().unwrap_or_else(|| {
            Err(ApiError::transport(format!(
                "no scripted response for `{}`",
                request.action()
            )))
        })
    }
}

/// A response body with status `ok` followed by `payload`.
pub(crate) fn ok(payload: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="utf-8"?><results><status code="ok"/>{payload}</results>"#)
}

/// A client over a fresh scripted transport.
pub(crate) fn scripted_client(mode: SessionMode) -> (BreezeClient, Arc<ScriptedTransport>) {
    let transport = ScriptedTransport::new();
    let settings = ConnectSettings::new("https://connect.example.com")
        .unwrap()
        .with_session_mode(mode);
    let client = BreezeClient::with_transport(settings, Arc::clone(&transport));
    (client, transport)
}
