//! Report records: quotas, transactions and events.

use breeze_core::{ValueError, ValueKind, WireValue};
use chrono::TimeDelta;
use serde::{Serialize, Serializer};

use super::{PermissionId, ScoDates, ScoType, serialize_minutes};
use crate::marshal::{FieldDescriptor, Record, attribute, element};

/// A quota ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaLimit {
    Unlimited,
    Limited(i64),
}

impl WireValue for QuotaLimit {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_wire(&self) -> Option<String> {
        Some(match self {
            Self::Unlimited => "unlimited".to_string(),
            Self::Limited(limit) => limit.to_string(),
        })
    }

    fn from_wire(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("unlimited") {
            return Ok(Self::Unlimited);
        }
        raw.parse()
            .map(Self::Limited)
            .map_err(|_| ValueError::new("quota limit", raw))
    }
}

impl Serialize for QuotaLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unlimited => serializer.serialize_str("unlimited"),
            Self::Limited(limit) => serializer.serialize_i64(*limit),
        }
    }
}

/// One row of `report-quotas`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Quota {
    pub acl_id: Option<i64>,
    pub quota_id: String,
    pub used: Option<i64>,
    pub limit: Option<QuotaLimit>,
    pub soft_limit: Option<QuotaLimit>,
    #[serde(flatten)]
    pub dates: ScoDates,
}

impl Record for Quota {
    const ROOT: &'static str = "quota";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        let mut fields = vec![
            attribute!(Self, acl_id),
            attribute!(Self, quota_id),
            attribute!(Self, used),
            attribute!(Self, limit),
            attribute!(Self, soft_limit),
        ];
        fields.extend(ScoDates::fields(|r: &Self| &r.dates, |r: &mut Self| &mut r.dates));
        fields
    }
}

/// One row of `report-bulk-consolidated-transactions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionInfo {
    pub transaction_id: String,
    pub sco_id: Option<String>,
    pub sco_type: Option<ScoType>,
    pub principal_id: Option<String>,
    pub score: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub login: Option<String>,
    pub user_name: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub dates: ScoDates,
}

impl Record for TransactionInfo {
    const ROOT: &'static str = "row";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        let mut fields = vec![
            attribute!(Self, transaction_id),
            attribute!(Self, sco_id),
            attribute!(Self, "type" => sco_type),
            attribute!(Self, principal_id),
            attribute!(Self, score),
            element!(Self, name),
            element!(Self, url),
            element!(Self, login),
            element!(Self, user_name),
            element!(Self, status),
        ];
        fields.extend(ScoDates::fields(|r: &Self| &r.dates, |r: &mut Self| &mut r.dates));
        fields
    }
}

/// One entry of `report-my-events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventInfo {
    pub sco_id: String,
    pub tree_id: Option<i64>,
    pub sco_type: Option<ScoType>,
    pub permission_id: Option<PermissionId>,
    pub name: Option<String>,
    pub domain_name: Option<String>,
    pub url_path: Option<String>,
    pub expired: bool,
    #[serde(serialize_with = "serialize_minutes")]
    pub duration: TimeDelta,
    #[serde(flatten)]
    pub dates: ScoDates,
}

impl Record for EventInfo {
    const ROOT: &'static str = "event";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        let mut fields = vec![
            attribute!(Self, sco_id),
            attribute!(Self, tree_id),
            attribute!(Self, "type" => sco_type),
            attribute!(Self, permission_id),
            element!(Self, name),
            element!(Self, domain_name),
            element!(Self, url_path),
            element!(Self, expired),
            element!(Self, duration),
        ];
        fields.extend(ScoDates::fields(|r: &Self| &r.dates, |r: &mut Self| &mut r.dates));
        fields
    }
}
