//! Meetings, folders and other SCOs.

use tracing::{info, warn};

use crate::client::{BreezeClient, Compensation, Outcome};
use crate::encoder::encode_fields;
use crate::filter::Filter;
use crate::marshal;
use crate::model::{MeetingDetail, MeetingItem, MeetingUpdateItem, RecordingItem, ScoShortcut, ScoType};
use crate::request::ApiRequest;
use crate::status::{ApiReply, StatusCode, StatusEnvelope};
use crate::xml::XmlNode;

/// Shortcut type of the shared meetings folder.
const MEETINGS_SHORTCUT: &str = "meetings";

impl BreezeClient {
    /// Every meeting on the account, optionally filtered by name.
    pub fn all_meetings(&self, like: Option<&str>) -> Outcome<Vec<MeetingItem>> {
        let mut filter = Filter::new().equals_value("type", &ScoType::Meeting);
        if let Some(name) = like {
            filter = filter.like("name", name);
        }
        let request = ApiRequest::new("report-bulk-objects").params(filter);
        let mut outcome: Outcome<Vec<MeetingItem>> =
            self.fetch_list(request, "report-bulk-objects/row", "row");
        self.complete_items(&mut outcome);
        outcome
    }

    /// The SCOs inside a folder or meeting room.
    pub fn meetings_in_room(&self, sco_id: &str) -> Outcome<Vec<MeetingItem>> {
        if let Err(envelope) = Self::require([("sco-id", Some(sco_id))]) {
            return Outcome::status(envelope);
        }
        let request = ApiRequest::new("sco-contents").param("sco-id", sco_id);
        let mut outcome: Outcome<Vec<MeetingItem>> = self.fetch(request, |payload| {
            marshal::decode_all(payload.descendants("sco"), Some("sco")).map(Some)
        });
        self.complete_items(&mut outcome);
        outcome
    }

    /// The `sco` elements inside a folder, undecoded.
    pub fn meetings_in_room_raw(&self, sco_id: &str) -> Outcome<Vec<XmlNode>> {
        if let Err(envelope) = Self::require([("sco-id", Some(sco_id))]) {
            return Outcome::status(envelope);
        }
        let request = ApiRequest::new("sco-contents").param("sco-id", sco_id);
        self.fetch(request, |payload| {
            Ok(Some(payload.descendants("sco").into_iter().cloned().collect()))
        })
    }

    /// Full detail of one SCO.
    ///
    /// A `sco` element without child elements carries no detail and yields
    /// no result.
    pub fn meeting_detail(&self, sco_id: &str) -> Outcome<MeetingDetail> {
        if let Err(envelope) = Self::require([("sco-id", Some(sco_id))]) {
            return Outcome::status(envelope);
        }
        let request = ApiRequest::new("sco-info").param("sco-id", sco_id);
        self.fetch(request, |payload| {
            let Some(node) = payload.find("sco").filter(|n| n.has_children()) else {
                return Ok(None);
            };
            let mut detail: MeetingDetail = marshal::decode(node, Some("sco"))?;
            detail.full_url = detail.url_path.as_deref().map(|p| self.resolve_full_url(p));
            Ok(Some(detail))
        })
    }

    /// Creates a SCO in `folder_id`.
    ///
    /// When the server creates the SCO but its reply cannot be decoded, the
    /// new SCO is deleted again; the outcome then carries the decode failure
    /// and a [`Compensation`] describing the delete.
    pub fn create_meeting(&self, mut item: MeetingUpdateItem) -> Outcome<MeetingDetail> {
        if let Err(envelope) = Self::require([("folder-id", item.folder_id.as_deref())]) {
            return Outcome::status(envelope);
        }
        if item.sco_type.is_none() {
            return Outcome::status(StatusEnvelope::missing("type"));
        }
        item.sco_id = None;
        self.sco_update(&item, true)
    }

    /// Changes an existing SCO. Never compensates.
    pub fn update_meeting(&self, mut item: MeetingUpdateItem) -> Outcome<MeetingDetail> {
        if let Err(envelope) = Self::require([("sco-id", item.sco_id.as_deref())]) {
            return Outcome::status(envelope);
        }
        item.folder_id = None;
        self.sco_update(&item, false)
    }

    fn sco_update(&self, item: &MeetingUpdateItem, compensate: bool) -> Outcome<MeetingDetail> {
        let request = ApiRequest::new("sco-update").params(encode_fields(item));
        let ApiReply {
            mut envelope,
            payload,
        } = self.dispatch(request);
        if !envelope.is_ok() {
            return Outcome::status(envelope);
        }
        let Some(node) = payload.as_ref().and_then(|p| p.find("sco")) else {
            return Outcome::status(envelope);
        };

        match marshal::decode::<MeetingDetail>(node, Some("sco")) {
            Ok(mut detail) => {
                detail.full_url = detail.url_path.as_deref().map(|p| self.resolve_full_url(p));
                Outcome::new(envelope, Some(detail))
            }
            Err(err) => {
                warn!(error = %err, "sco-update reply did not decode");
                let created = node.attribute("sco-id").map(str::to_string);
                envelope.mark_decode_failure(err);
                let mut outcome = Outcome::status(envelope);
                if compensate && let Some(sco_id) = created {
                    info!(sco_id = %sco_id, "deleting partially created sco");
                    let delete = self.sco_delete(&[sco_id.as_str()]);
                    if !delete.is_ok() {
                        warn!(sco_id = %sco_id, status = %delete, "compensating delete failed");
                    }
                    outcome.compensation = Some(Compensation {
                        sco_id,
                        envelope: delete,
                    });
                }
                outcome
            }
        }
    }

    /// Deletes SCOs. Deleting a folder deletes its contents.
    pub fn sco_delete(&self, sco_ids: &[&str]) -> StatusEnvelope {
        if sco_ids.iter().all(|id| id.is_empty()) {
            return StatusEnvelope::missing("sco-id");
        }
        let request = ApiRequest::new("sco-delete").params(
            sco_ids
                .iter()
                .filter(|id| !id.is_empty())
                .map(|id| ("sco-id", *id)),
        );
        self.call(request)
    }

    /// The account's well-known folders.
    pub fn sco_shortcuts(&self) -> Outcome<Vec<ScoShortcut>> {
        self.fetch_list(ApiRequest::new("sco-shortcuts"), "shortcuts/sco", "sco")
    }

    /// The shared meetings folder shortcuts.
    pub fn meeting_shortcuts(&self) -> Outcome<Vec<ScoShortcut>> {
        self.sco_shortcuts().map(|shortcuts| {
            shortcuts
                .into_iter()
                .filter(|s| s.shortcut_type.as_deref() == Some(MEETINGS_SHORTCUT))
                .collect()
        })
    }

    /// Meetings the logged-in user hosts or attends.
    pub fn my_meetings(&self, like: Option<&str>) -> Outcome<Vec<MeetingItem>> {
        let mut filter = Filter::new();
        if let Some(name) = like {
            filter = filter.like("name", name);
        }
        let request = ApiRequest::new("report-my-meetings").params(filter);
        let mut outcome: Outcome<Vec<MeetingItem>> =
            self.fetch_list(request, "my-meetings/meeting", "meeting");
        self.complete_items(&mut outcome);
        outcome
    }

    /// The raw `sco-contents` reply for a room, for callers that inspect
    /// quizzes and other content themselves.
    pub fn quizzes_in_room(&self, sco_id: &str) -> ApiReply {
        if let Err(envelope) = Self::require([("sco-id", Some(sco_id))]) {
            return ApiReply {
                envelope,
                payload: None,
            };
        }
        self.dispatch(ApiRequest::new("sco-contents").param("sco-id", sco_id))
    }

    /// Meetings placed directly in the shared meetings folder.
    pub fn shared_meetings(&self) -> Outcome<Vec<MeetingItem>> {
        let shortcuts = self.meeting_shortcuts();
        let Some(folder) = shortcuts.result.as_ref().and_then(|s| s.first()) else {
            if shortcuts.is_ok() {
                return Outcome::status(StatusEnvelope::new(StatusCode::NoData));
            }
            return Outcome::status(shortcuts.envelope);
        };
        let folder_id = folder.sco_id.clone();

        let request = ApiRequest::new("sco-expanded-contents")
            .param("sco-id", folder_id.as_str())
            .params(Filter::new().equals_value("type", &ScoType::Meeting));
        let mut outcome: Outcome<Vec<MeetingItem>> = self.fetch(request, |payload| {
            let direct = payload
                .descendants("sco")
                .into_iter()
                .filter(|n| n.attribute("folder-id") == Some(folder_id.as_str()));
            marshal::decode_all(direct, Some("sco")).map(Some)
        });
        self.complete_items(&mut outcome);
        outcome
    }

    /// Recordings stored in a folder.
    pub fn recordings(&self, folder_id: &str) -> Outcome<Vec<RecordingItem>> {
        if let Err(envelope) = Self::require([("folder-id", Some(folder_id))]) {
            return Outcome::status(envelope);
        }
        let request = ApiRequest::new("list-recordings").param("folder-id", folder_id);
        let mut outcome: Outcome<Vec<RecordingItem>> =
            self.fetch_list(request, "recordings/sco", "sco");
        if let Some(items) = outcome.result.as_mut() {
            for item in items {
                item.full_url = item.url_path.as_deref().map(|p| self.resolve_full_url(p));
            }
        }
        outcome
    }

    /// Fills in the derived fields of listed meetings.
    fn complete_items(&self, outcome: &mut Outcome<Vec<MeetingItem>>) {
        let Some(items) = outcome.result.as_mut() else {
            return;
        };
        for item in items {
            if let Some(span) = item.dates.span() {
                item.duration = span;
            }
            item.full_url = item.url_path.as_deref().map(|p| self.resolve_full_url(p));
        }
    }
}
