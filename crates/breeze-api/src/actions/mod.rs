//! Per-action operations on [`BreezeClient`](crate::BreezeClient).
//!
//! Each operation checks its required identifiers before sending anything;
//! a missing one comes back as an `invalid`/`missing` envelope naming the
//! field.

mod meetings;
mod permissions;
mod principals;
mod reports;

pub use reports::ScoReport;
