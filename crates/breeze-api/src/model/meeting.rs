//! Meeting and SCO records.

use chrono::TimeDelta;
use serde::Serialize;

use super::{PermissionId, ScoDates, ScoType, serialize_minutes};
use crate::marshal::{FieldDescriptor, Record, attribute, element};

/// A meeting (or other SCO) as listed by bulk and folder reports.
///
/// The root element depends on the listing: `row` for bulk reports, `sco`
/// for folder contents and `meeting` for the caller's own meetings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeetingItem {
    pub sco_id: String,
    pub folder_id: Option<String>,
    pub active_participants: Option<i32>,
    pub permission_id: Option<PermissionId>,
    pub sco_type: Option<ScoType>,
    pub icon: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub lang: Option<String>,
    pub sco_tag: Option<String>,
    pub domain_name: Option<String>,
    pub url_path: Option<String>,
    /// `url_path` resolved against the service origin.
    pub full_url: Option<String>,
    pub is_folder: bool,
    pub expired: bool,
    /// `date-end - date-begin` once resolved; zero for folders.
    #[serde(serialize_with = "serialize_minutes")]
    pub duration: TimeDelta,
    pub byte_count: Option<i64>,
    #[serde(flatten)]
    pub dates: ScoDates,
}

impl Record for MeetingItem {
    const ROOT: &'static str = "meeting";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        let mut fields = vec![
            attribute!(Self, sco_id),
            attribute!(Self, folder_id),
            attribute!(Self, active_participants),
            attribute!(Self, permission_id),
            attribute!(Self, "type" => sco_type),
            attribute!(Self, icon),
            element!(Self, name),
            element!(Self, description),
            element!(Self, lang),
            element!(Self, sco_tag),
            element!(Self, domain_name),
            element!(Self, url_path),
            element!(Self, is_folder),
            element!(Self, expired),
            element!(Self, duration),
            element!(Self, byte_count),
        ];
        fields.extend(ScoDates::fields(|r: &Self| &r.dates, |r: &mut Self| &mut r.dates));
        fields
    }
}

/// Full detail of one SCO, from `sco-info` or `sco-update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeetingDetail {
    pub sco_id: String,
    pub account_id: Option<String>,
    pub folder_id: Option<String>,
    pub lang: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url_path: Option<String>,
    pub full_url: Option<String>,
    pub passing_score: Option<i32>,
    pub duration: Option<i32>,
    pub section_count: Option<i32>,
    #[serde(flatten)]
    pub dates: ScoDates,
}

impl Record for MeetingDetail {
    const ROOT: &'static str = "sco";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        let mut fields = vec![
            attribute!(Self, sco_id),
            attribute!(Self, account_id),
            attribute!(Self, folder_id),
            attribute!(Self, lang),
            element!(Self, name),
            element!(Self, description),
            element!(Self, url_path),
            element!(Self, passing_score),
            element!(Self, duration),
            element!(Self, section_count),
        ];
        fields.extend(ScoDates::fields(|r: &Self| &r.dates, |r: &mut Self| &mut r.dates));
        fields
    }
}

/// Fields sent with `sco-update` to create or change a SCO.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeetingUpdateItem {
    /// Set to update an existing SCO.
    pub sco_id: Option<String>,
    /// Set to create a new SCO in this folder.
    pub folder_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub lang: Option<String>,
    pub sco_tag: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub url_path: Option<String>,
    pub sco_type: Option<ScoType>,
    #[serde(flatten)]
    pub dates: ScoDates,
}

impl Record for MeetingUpdateItem {
    const ROOT: &'static str = "sco";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        let mut fields = vec![
            attribute!(Self, sco_id),
            attribute!(Self, folder_id),
            element!(Self, name),
            element!(Self, description),
            element!(Self, lang),
            element!(Self, sco_tag),
            element!(Self, email),
            element!(Self, first_name),
            element!(Self, last_name),
            element!(Self, url_path),
            element!(Self, "type" => sco_type),
        ];
        fields.extend(ScoDates::fields(|r: &Self| &r.dates, |r: &mut Self| &mut r.dates));
        fields
    }
}

/// A well-known folder of the account (`sco-shortcuts`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoShortcut {
    pub tree_id: Option<i64>,
    pub sco_id: String,
    /// Shortcut kind, e.g. `meetings`, `content`, `my-meetings`.
    pub shortcut_type: Option<String>,
    pub domain_name: Option<String>,
}

impl Record for ScoShortcut {
    const ROOT: &'static str = "sco";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            attribute!(Self, tree_id),
            attribute!(Self, sco_id),
            attribute!(Self, "type" => shortcut_type),
            element!(Self, domain_name),
        ]
    }
}

/// A meeting recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordingItem {
    pub sco_id: String,
    pub name: Option<String>,
    pub url_path: Option<String>,
    pub full_url: Option<String>,
    pub is_seminar: bool,
    #[serde(flatten)]
    pub dates: ScoDates,
}

impl Record for RecordingItem {
    const ROOT: &'static str = "recording";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        let mut fields = vec![
            attribute!(Self, sco_id),
            element!(Self, name),
            element!(Self, url_path),
            element!(Self, is_seminar),
        ];
        fields.extend(ScoDates::fields(|r: &Self| &r.dates, |r: &mut Self| &mut r.dates));
        fields
    }
}
