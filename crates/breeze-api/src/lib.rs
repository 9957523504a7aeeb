//! Client for the Breeze (Connect) XML administration API.
//!
//! Every call follows the same pipeline:
//!
//! ```text
//! operation ──▶ Field Encoder ──▶ Transport ──▶ Status Resolver ──▶ Marshaller
//!  (actions)    (record → query)   (HTTP GET,    (status + payload)  (payload →
//!                                   session)                          records)
//! ```
//!
//! - [`BreezeClient`] - session handling, dispatch and the per-action operations
//! - [`ConnectSettings`] - endpoint, credentials, proxy and session mode
//! - [`Transport`] / [`HttpTransport`] - the network seam
//! - [`StatusEnvelope`] / [`resolve`] - status and payload of a response
//! - [`marshal`] - field tables and the shared codec cache
//! - [`model`] - record shapes
//!
//! Operations never return `Err`: server-reported failures are status codes
//! and pipeline failures are attached to the envelope.
//!
//! # Example
//!
//! ```no_run
//! use breeze_api::{BreezeClient, ConnectSettings, Credentials};
//!
//! let settings = ConnectSettings::new("https://connect.example.com")?
//!     .with_credentials(Credentials::new("admin@example.com", "secret"));
//! let client = BreezeClient::new(settings)?;
//!
//! if client.login().result == Some(true) {
//!     for meeting in client.all_meetings(None).result.unwrap_or_default() {
//!         println!("{} {:?}", meeting.sco_id, meeting.name);
//!     }
//!     client.logout();
//! }
//! # Ok::<(), breeze_api::ApiError>(())
//! ```

mod actions;
pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod marshal;
pub mod model;
pub mod request;
pub mod session;
pub mod status;
#[cfg(test)]
mod testing;
pub mod transport;
pub mod xml;

pub use actions::ScoReport;
pub use client::{BreezeClient, Compensation, Outcome};
pub use config::{ConnectSettings, Credentials, ProxySettings, SessionMode, normalize_service_url};
pub use encoder::{encode_fields, encode_query};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use filter::Filter;
pub use request::ApiRequest;
pub use session::{SESSION_COOKIE, SessionToken};
pub use status::{ApiReply, StatusCode, StatusEnvelope, SubCode, resolve};
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use xml::XmlNode;
