//! Date fields shared by SCO-like records.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::marshal::{FieldDescriptor, element};

/// The `date-*` elements carried by meetings, events, quotas and reports.
///
/// Records embed this by value and splice its descriptors into their own
/// field table with [`ScoDates::fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoDates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<DateTime<Utc>>,
}

impl ScoDates {
    /// Descriptors for the date elements of a record that embeds `ScoDates`.
    pub fn fields<O: 'static>(
        get: fn(&O) -> &ScoDates,
        get_mut: fn(&mut O) -> &mut ScoDates,
    ) -> Vec<FieldDescriptor<O>> {
        [
            element!(ScoDates, "date-begin" => begin),
            element!(ScoDates, "date-end" => end),
            element!(ScoDates, "date-modified" => modified),
            element!(ScoDates, "date-created" => created),
            element!(ScoDates, "date-closed" => closed),
        ]
        .into_iter()
        .map(|field| field.embed(get, get_mut))
        .collect()
    }

    /// `end - begin`, when both are known.
    pub fn span(&self) -> Option<TimeDelta> {
        Some(self.end? - self.begin?)
    }
}
