//! Request descriptors.

use std::fmt;

use breeze_core::form_urlencode;

/// Parameter names whose values are never written to logs.
const REDACTED_PARAMS: &[&str] = &["password", "password-old", "password-verify", "session"];

/// One call to the service: an action name and its ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    action: String,
    params: Vec<(String, String)>,
    requires_session: bool,
}

impl ApiRequest {
    /// Creates a request for an action that needs an established session.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: Vec::new(),
            requires_session: true,
        }
    }

    /// Creates a request for an action that runs without a session (login).
    pub fn anonymous(action: impl Into<String>) -> Self {
        Self {
            requires_session: false,
            ..Self::new(action)
        }
    }

    /// Appends a parameter. Values are encoded at send time.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Appends a parameter only when a value is present.
    pub fn param_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    /// Appends every pair in order.
    pub fn params<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Inserts a parameter ahead of all others.
    pub(crate) fn prepend_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(0, (name.into(), value.into()));
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.params
    }

    /// Returns the first value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn requires_session(&self) -> bool {
        self.requires_session
    }

    /// The form-encoded query string, `action=<name>&k=v...`.
    pub fn query_string(&self) -> String {
        let mut query = format!("action={}", form_urlencode(&self.action));
        for (name, value) in &self.params {
            query.push('&');
            query.push_str(&form_urlencode(name));
            query.push('=');
            query.push_str(&form_urlencode(value));
        }
        query
    }

    /// The full request URL for the given endpoint.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{endpoint}?{}", self.query_string())
    }

    /// A log-safe rendering with secrets masked.
    pub fn redacted(&self) -> Redacted<'_> {
        Redacted(self)
    }
}

/// Display adapter for [`ApiRequest::redacted`].
pub struct Redacted<'a>(&'a ApiRequest);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.action)?;
        for (name, value) in &self.0.params {
            if REDACTED_PARAMS.contains(&name.as_str()) {
                write!(f, " {name}=***")?;
            } else {
                write!(f, " {name}={value}")?;
            }
        }
        Ok(())
    }
}
