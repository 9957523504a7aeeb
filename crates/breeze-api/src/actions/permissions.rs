//! ACL permissions.

use crate::client::{BreezeClient, Outcome};
use crate::filter::Filter;
use crate::model::{PermissionId, PermissionInfo, SpecialPermission};
use crate::request::ApiRequest;
use crate::status::StatusEnvelope;

/// The built-in principal that stands for anonymous visitors.
const PUBLIC_ACCESS: &str = "public-access";

impl BreezeClient {
    /// Principals holding a permission on `acl_id`.
    pub fn permissions_info(
        &self,
        acl_id: &str,
        principal_id: Option<&str>,
        filter: Filter,
    ) -> Outcome<Vec<PermissionInfo>> {
        if let Err(envelope) = Self::require([("acl-id", Some(acl_id))]) {
            return Outcome::status(envelope);
        }
        let request = ApiRequest::new("permissions-info")
            .param("acl-id", acl_id)
            .param_opt("principal-id", principal_id)
            .params(filter);
        self.fetch_list(request, "permissions/principal", "principal")
    }

    /// Drops every explicit permission on `acl_id`.
    pub fn permissions_reset(&self, acl_id: &str) -> StatusEnvelope {
        if let Err(envelope) = Self::require([("acl-id", Some(acl_id))]) {
            return envelope;
        }
        self.call(ApiRequest::new("permissions-reset").param("acl-id", acl_id))
    }

    pub fn permissions_update(
        &self,
        acl_id: &str,
        principal_id: &str,
        permission: PermissionId,
    ) -> StatusEnvelope {
        if let Err(envelope) = Self::require([
            ("acl-id", Some(acl_id)),
            ("principal-id", Some(principal_id)),
        ]) {
            return envelope;
        }
        self.call(
            ApiRequest::new("permissions-update")
                .param("acl-id", acl_id)
                .param("principal-id", principal_id)
                .param("permission-id", permission.to_string()),
        )
    }

    /// Sets public access to a meeting.
    pub fn special_permissions_update(
        &self,
        acl_id: &str,
        permission: SpecialPermission,
    ) -> StatusEnvelope {
        self.permissions_update(acl_id, PUBLIC_ACCESS, permission.permission())
    }

    /// Enrolls a principal in a course or event, as a viewer unless another
    /// permission is given.
    pub fn participant_subscribe(
        &self,
        sco_id: &str,
        principal_id: &str,
        permission: Option<PermissionId>,
    ) -> StatusEnvelope {
        self.permissions_update(
            sco_id,
            principal_id,
            permission.unwrap_or(PermissionId::View),
        )
    }

    pub fn participant_unsubscribe(&self, sco_id: &str, principal_id: &str) -> StatusEnvelope {
        self.permissions_update(sco_id, principal_id, PermissionId::Remove)
    }
}
