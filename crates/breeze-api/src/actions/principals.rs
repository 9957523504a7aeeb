//! Users, groups and passwords.

use tracing::debug;

use crate::client::{BreezeClient, Outcome};
use crate::encoder::encode_fields;
use crate::filter::Filter;
use crate::marshal;
use crate::model::{
    Contact, Preferences, Principal, PrincipalInfo, PrincipalListItem, PrincipalSetup,
    PrincipalType,
};
use crate::request::ApiRequest;
use crate::status::StatusEnvelope;

impl BreezeClient {
    /// Sets a user's password. Requires administrator rights.
    pub fn update_password(&self, user_id: &str, password: &str) -> StatusEnvelope {
        if let Err(envelope) = Self::require([("user-id", Some(user_id))]) {
            return envelope;
        }
        self.call(
            ApiRequest::new("user-update-pwd")
                .param("user-id", user_id)
                .param("password", password)
                .param("password-verify", password),
        )
    }

    /// Changes a user's password given the current one.
    pub fn update_password_with_old(
        &self,
        user_id: &str,
        old_password: &str,
        password: &str,
    ) -> StatusEnvelope {
        if let Err(envelope) = Self::require([("user-id", Some(user_id))]) {
            return envelope;
        }
        self.call(
            ApiRequest::new("user-update-pwd")
                .param("user-id", user_id)
                .param("password-old", old_password)
                .param("password", password)
                .param("password-verify", password),
        )
    }

    /// Contact details, preferences and identity of a principal.
    pub fn principal_info(&self, principal_id: &str) -> Outcome<PrincipalInfo> {
        if let Err(envelope) = Self::require([("principal-id", Some(principal_id))]) {
            return Outcome::status(envelope);
        }
        let request = ApiRequest::new("principal-info").param("principal-id", principal_id);
        self.fetch(request, |payload| {
            let contact = payload
                .find("contact")
                .map(|n| marshal::decode::<Contact>(n, None))
                .transpose()?;
            let preferences = payload
                .find("preferences")
                .map(|n| marshal::decode::<Preferences>(n, None))
                .transpose()?;
            let principal = payload
                .find("principal")
                .map(|n| marshal::decode::<Principal>(n, None))
                .transpose()?;
            Ok(Some(PrincipalInfo {
                contact,
                preferences,
                principal,
            }))
        })
    }

    /// Creates a principal, or updates one when `principal_id` is set.
    pub fn principal_update(&self, setup: &PrincipalSetup) -> Outcome<Principal> {
        let request = ApiRequest::new("principal-update").params(encode_fields(setup));
        self.fetch(request, |payload| {
            payload
                .find("principal")
                .map(|n| marshal::decode(n, None))
                .transpose()
        })
    }

    /// Deletes users or groups. Group members are kept.
    pub fn principals_delete(&self, principal_ids: &[&str]) -> StatusEnvelope {
        if principal_ids.iter().all(|id| id.is_empty()) {
            return StatusEnvelope::missing("principal-id");
        }
        self.call(
            ApiRequest::new("principals-delete").params(
                principal_ids
                    .iter()
                    .filter(|id| !id.is_empty())
                    .map(|id| ("principal-id", *id)),
            ),
        )
    }

    /// Adds a principal to a group or removes it.
    pub fn group_membership_update(
        &self,
        group_id: &str,
        principal_id: &str,
        is_member: bool,
    ) -> StatusEnvelope {
        if let Err(envelope) = Self::require([
            ("group-id", Some(group_id)),
            ("principal-id", Some(principal_id)),
        ]) {
            return envelope;
        }
        self.call(
            ApiRequest::new("group-membership-update")
                .param("group-id", group_id)
                .param("principal-id", principal_id)
                .param("is-member", if is_member { "1" } else { "0" }),
        )
    }

    /// Users and groups, optionally those of one group.
    pub fn principal_list(
        &self,
        group_id: Option<&str>,
        filter: Filter,
    ) -> Outcome<Vec<PrincipalListItem>> {
        let request = ApiRequest::new("principal-list")
            .param_opt("group-id", group_id.filter(|id| !id.is_empty()))
            .params(filter);
        self.fetch_list(request, "principal-list/principal", "principal")
    }

    /// Whether a principal belongs to the account's administrators group.
    ///
    /// Any failure along the way reads as "not an administrator".
    pub fn is_admin(&self, principal_id: &str) -> bool {
        if principal_id.is_empty() {
            return false;
        }
        let admins = self.principal_list(
            None,
            Filter::new().equals_value("type", &PrincipalType::Admins),
        );
        let Some(group) = admins.result.as_ref().and_then(|groups| groups.first()) else {
            debug!(status = %admins.envelope, "no administrators group");
            return false;
        };

        let members = self.principal_list(
            Some(group.principal_id.as_str()),
            Filter::new().equals("is-member", "true"),
        );
        members
            .result
            .is_some_and(|list| list.iter().any(|p| p.principal_id == principal_id))
    }
}
