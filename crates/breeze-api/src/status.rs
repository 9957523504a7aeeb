//! Status resolution.
//!
//! Every response carries a `status` element:
//!
//! ```xml
//! <results>
//!   <status code="invalid">
//!     <invalid field="name" type="string" subcode="format"/>
//!   </status>
//! </results>
//! ```
//!
//! [`resolve`] reads it into a [`StatusEnvelope`] and re-roots every element
//! that follows it under a synthetic `resultroot` element, the payload.

use std::fmt;

use breeze_core::{WireEnum, wire_enum};
use tracing::{trace, warn};

use crate::error::{ApiError, ApiResult};
use crate::xml::XmlNode;

/// Name of the synthetic element wrapping the payload.
pub const PAYLOAD_ROOT: &str = "resultroot";

wire_enum! {
    /// Outcome of a call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum StatusCode {
        /// No response has been read. Pipeline failures leave the code here.
        NotSet => "not-set",
        Ok,
        Invalid,
        NoAccess => "no-access",
        NoData => "no-data",
        TooMuchData => "too-much-data",
        InternalError => "internal-error",
    }
}

wire_enum! {
    /// Detail for `invalid` and `no-access` outcomes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum SubCode {
        NotSet => "not-set",
        AccountExpired => "account-expired",
        Denied,
        NoLogin => "no-login",
        NoQuota => "no-quota",
        NotAvailable => "not-available",
        NotSecure => "not-secure",
        PendingActivation => "pending-activation",
        PendingLicense => "pending-license",
        ScoExpired => "sco-expired",
        ScoNotStarted => "sco-not-started",
        Duplicate,
        IllegalOperation => "illegal-operation",
        NoSuchItem => "no-such-item",
        Range,
        Missing,
        Format,
    }
}

/// The status of one call.
///
/// Always fully populated: when the pipeline itself fails the code stays
/// [`StatusCode::NotSet`] (or becomes `invalid`/`format` for a payload that
/// could not be decoded) and the cause is available from [`error`](Self::error).
#[derive(Debug)]
pub struct StatusEnvelope {
    code: StatusCode,
    sub_code: SubCode,
    invalid_field: Option<String>,
    exception: Option<String>,
    session_token: Option<String>,
    error: Option<ApiError>,
}

impl StatusEnvelope {
    pub fn new(code: StatusCode) -> Self {
        Self {
            code,
            sub_code: SubCode::NotSet,
            invalid_field: None,
            exception: None,
            session_token: None,
            error: None,
        }
    }

    /// An envelope for a call that failed before a status could be read.
    pub fn failed(error: ApiError) -> Self {
        Self {
            error: Some(error),
            ..Self::new(StatusCode::NotSet)
        }
    }

    /// An `invalid`/`missing` envelope for a required field that was not
    /// supplied. No request is sent for such a call.
    pub fn missing(field: &str) -> Self {
        Self {
            sub_code: SubCode::Missing,
            invalid_field: Some(field.to_string()),
            error: Some(ApiError::missing(field)),
            ..Self::new(StatusCode::Invalid)
        }
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn sub_code(&self) -> SubCode {
        self.sub_code
    }

    pub fn invalid_field(&self) -> Option<&str> {
        self.invalid_field.as_deref()
    }

    /// Server-side exception text, verbatim.
    pub fn exception(&self) -> Option<&str> {
        self.exception.as_deref()
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// The pipeline failure attached to this envelope, if any.
    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.code == StatusCode::Ok && self.error.is_none()
    }

    pub(crate) fn set_session_token(&mut self, token: Option<String>) {
        self.session_token = token;
    }

    /// Marks a payload decode failure: `invalid`/`format` plus the cause.
    pub(crate) fn mark_decode_failure(&mut self, error: ApiError) {
        self.code = StatusCode::Invalid;
        self.sub_code = SubCode::Format;
        self.error = Some(error);
    }
}

impl fmt::Display for StatusEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if self.sub_code != SubCode::NotSet {
            write!(f, " ({})", self.sub_code)?;
        }
        if let Some(ref field) = self.invalid_field {
            write!(f, " field={field}")?;
        }
        if let Some(ref error) = self.error {
            write!(f, ": {error}")?;
        }
        Ok(())
    }
}

/// A resolved response: the status and the payload that followed it.
#[derive(Debug)]
pub struct ApiReply {
    pub envelope: StatusEnvelope,
    /// Elements after `status`, wrapped in a `resultroot` element.
    pub payload: Option<XmlNode>,
}

impl ApiReply {
    /// A reply for a call that failed before a status could be read.
    pub fn failed(error: ApiError) -> Self {
        Self {
            envelope: StatusEnvelope::failed(error),
            payload: None,
        }
    }
}

/// Splits a response body into its status envelope and payload.
///
/// # Errors
///
/// Returns a parse error if the body is not XML, contains no `status`
/// element, or the status code is missing or unknown.
pub fn resolve(body: &str) -> ApiResult<ApiReply> {
    let document = XmlNode::parse(body)?;

    let (status, following) = locate_status(&document)
        .ok_or_else(|| ApiError::parse("response has no status element"))?;

    let raw_code = status
        .attribute("code")
        .ok_or_else(|| ApiError::parse("status element has no code"))?;
    let code = StatusCode::parse_wire(raw_code).map_err(|e| {
        ApiError::parse(format!("unknown status code `{raw_code}`")).with_source(e)
    })?;

    let mut envelope = StatusEnvelope::new(code);

    // `no-access` replies carry the sub-code on `status` itself.
    let invalid = status.find("invalid");
    let raw_sub_code = invalid
        .and_then(|node| node.attribute("subcode"))
        .or_else(|| status.attribute("subcode"));
    if let Some(raw) = raw_sub_code {
        envelope.sub_code = SubCode::parse_wire(raw).unwrap_or_else(|_| {
            warn!(subcode = %raw, "unknown status sub-code");
            SubCode::NotSet
        });
    }
    envelope.invalid_field = invalid
        .and_then(|node| node.attribute("field"))
        .map(str::to_string);

    if let Some(exception) = status.find("exception") {
        envelope.exception = Some(exception.text().to_string());
    }

    let payload = if following.is_empty() {
        None
    } else {
        Some(XmlNode::new(PAYLOAD_ROOT).with_children(following.iter().cloned()))
    };

    trace!(code = %envelope.code(), payload = payload.is_some(), "resolved status");

    Ok(ApiReply { envelope, payload })
}

/// Finds the first `status` element in document order and the sibling
/// elements that follow it.
fn locate_status(node: &XmlNode) -> Option<(&XmlNode, &[XmlNode])> {
    if node.name() == "status" {
        return Some((node, &[]));
    }
    for (index, child) in node.children().iter().enumerate() {
        if child.name() == "status" {
            return Some((child, &node.children()[index + 1..]));
        }
        if let Some(found) = locate_status(child) {
            return Some(found);
        }
    }
    None
}
