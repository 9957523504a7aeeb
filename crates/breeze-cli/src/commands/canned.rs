//! A transport that replays canned XML bodies.

use std::collections::VecDeque;
use std::sync::Mutex;

use breeze_api::{
    ApiError, ApiRequest, ApiResult, BreezeClient, ConnectSettings, Credentials, SessionToken,
    Transport, TransportResponse,
};

#[derive(Default)]
pub(crate) struct Canned {
    bodies: Mutex<VecDeque<String>>,
    actions: Mutex<Vec<String>>,
}

impl Canned {
    pub(crate) fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }
}

impl Transport for Canned {
    fn send(
        &self,
        request: &ApiRequest,
        _session_cookie: Option<&SessionToken>,
    ) -> ApiResult<TransportResponse> {
        self.actions.lock().unwrap().push(request.action().to_string());
        let body = self
            .bodies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::transport("nothing scripted"))?;
        let response = TransportResponse::new(body);
        Ok(if request.action() == "login" {
            response.with_session_cookie(SessionToken::new("cli-session"))
        } else {
            response
        })
    }
}

/// `<results>` with an ok status followed by `payload`.
pub(crate) fn ok(payload: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="utf-8"?><results><status code="ok"/>{payload}</results>"#)
}

/// A logged-out client over canned bodies, with credentials configured.
pub(crate) fn client(bodies: &[&str]) -> (BreezeClient, std::sync::Arc<Canned>) {
    let canned = std::sync::Arc::new(Canned {
        bodies: Mutex::new(bodies.iter().map(|b| b.to_string()).collect()),
        ..Canned::default()
    });
    let settings = ConnectSettings::new("https://connect.example.com")
        .unwrap()
        .with_credentials(Credentials::new("admin@example.com", "football"));
    (BreezeClient::with_transport(settings, canned.clone()), canned)
}
