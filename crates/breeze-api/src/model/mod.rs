//! Record shapes exchanged with the service.
//!
//! Each record implements [`Record`](crate::marshal::Record): a root element
//! name plus a field table mapping struct fields to attributes or child
//! elements. Derived fields (`full_url`, a meeting's `duration`) are filled
//! in by the client after decoding.

mod dates;
mod enums;
mod meeting;
mod principal;
mod report;

use chrono::TimeDelta;
use serde::Serializer;

pub use dates::ScoDates;
pub use enums::{PermissionId, PrincipalType, ScoType, SpecialPermission};
pub use meeting::{MeetingDetail, MeetingItem, MeetingUpdateItem, RecordingItem, ScoShortcut};
pub use principal::{
    Contact, PermissionInfo, Preferences, Principal, PrincipalInfo, PrincipalListItem,
    PrincipalSetup, UserInfo,
};
pub use report::{EventInfo, Quota, QuotaLimit, TransactionInfo};

/// Serializes a duration as whole minutes.
pub(crate) fn serialize_minutes<S: Serializer>(
    duration: &TimeDelta,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_minutes())
}
