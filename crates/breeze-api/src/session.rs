//! Session token handling.
//!
//! A client instance holds at most one session token. The slot is guarded by
//! a mutex, so concurrent calls never observe a torn value, but two calls that
//! both receive a fresh token race and the last write wins. Concurrent login
//! on one client instance is unsupported; callers that need it must serialize
//! their logins.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "BREEZESESSION";

/// An opaque session credential issued by the server.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
    domain: Option<String>,
}

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            domain: None,
        }
    }

    /// Sets the cookie domain the token was issued for.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Reads the session token from a `Set-Cookie` header value.
    ///
    /// Returns `None` when the header sets another cookie or an empty value.
    pub fn from_set_cookie(header: &str) -> Option<Self> {
        let mut parts = header.split(';').map(str::trim);
        let (name, value) = parts.next()?.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case(SESSION_COOKIE) {
            return None;
        }
        let value = value.trim().trim_matches('"');
        if value.is_empty() {
            return None;
        }

        let mut token = Self::new(value);
        for attr in parts {
            if let Some((key, domain)) = attr.split_once('=')
                && key.trim().eq_ignore_ascii_case("domain")
            {
                token.domain = Some(domain.trim().trim_start_matches('.').to_string());
            }
        }
        Some(token)
    }

    /// The `Cookie` header value carrying this token.
    pub fn cookie_header(&self) -> String {
        format!("{SESSION_COOKIE}={}", self.value)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"<redacted>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// The single-slot holder for a client's session token.
#[derive(Debug, Default)]
pub struct SessionSlot {
    token: Mutex<Option<SessionToken>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the held token.
    pub fn get(&self) -> Option<SessionToken> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the held token.
    pub fn set(&self, token: SessionToken) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Drops the held token.
    pub fn clear(&self) {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_set(&self) -> bool {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
