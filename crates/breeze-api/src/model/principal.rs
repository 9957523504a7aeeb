//! User, principal and permission records.

use serde::Serialize;

use super::{PermissionId, PrincipalType};
use crate::marshal::{FieldDescriptor, Record, attribute, element};

/// The logged-in user, from `common-info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub user_id: String,
    pub name: Option<String>,
    pub login: Option<String>,
}

impl Record for UserInfo {
    const ROOT: &'static str = "user";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            attribute!(Self, user_id),
            element!(Self, name),
            element!(Self, login),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Record for Contact {
    const ROOT: &'static str = "contact";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            element!(Self, email),
            element!(Self, first_name),
            element!(Self, last_name),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub account_id: Option<String>,
    pub principal_id: String,
    pub has_children: bool,
    pub is_hidden: bool,
    pub is_primary: bool,
    pub ext_login: Option<String>,
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Record for Principal {
    const ROOT: &'static str = "principal";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            attribute!(Self, account_id),
            attribute!(Self, principal_id),
            attribute!(Self, has_children),
            attribute!(Self, is_hidden),
            attribute!(Self, is_primary),
            element!(Self, ext_login),
            element!(Self, login),
            element!(Self, name),
            element!(Self, email),
            element!(Self, first_name),
            element!(Self, last_name),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub acl_id: Option<String>,
    pub lang: Option<String>,
    pub time_zone_id: Option<String>,
}

impl Record for Preferences {
    const ROOT: &'static str = "preferences";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            attribute!(Self, acl_id),
            attribute!(Self, lang),
            attribute!(Self, time_zone_id),
        ]
    }
}

/// The parts of a `principal-info` reply. Each part is present only when the
/// reply carried the corresponding element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrincipalInfo {
    pub contact: Option<Contact>,
    pub preferences: Option<Preferences>,
    pub principal: Option<Principal>,
}

/// A row of `principal-list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrincipalListItem {
    pub account_id: Option<String>,
    pub principal_id: String,
    pub has_children: bool,
    pub is_hidden: bool,
    pub is_primary: bool,
    pub login: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub display_uid: Option<String>,
}

impl Record for PrincipalListItem {
    const ROOT: &'static str = "principal";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            attribute!(Self, account_id),
            attribute!(Self, principal_id),
            attribute!(Self, has_children),
            attribute!(Self, is_hidden),
            attribute!(Self, is_primary),
            element!(Self, login),
            element!(Self, name),
            element!(Self, email),
            element!(Self, display_uid),
        ]
    }
}

/// Fields sent with `principal-update` to create or change a principal.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrincipalSetup {
    pub principal_type: Option<PrincipalType>,
    pub login: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[serde(skip)]
    pub password: Option<String>,
    pub description: Option<String>,
    pub has_children: bool,
    /// Set to update an existing principal.
    pub principal_id: Option<String>,
    pub send_email: bool,
}

impl std::fmt::Debug for PrincipalSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalSetup")
            .field("principal_type", &self.principal_type)
            .field("login", &self.login)
            .field("name", &self.name)
            .field("principal_id", &self.principal_id)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl Record for PrincipalSetup {
    const ROOT: &'static str = "principal";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            element!(Self, "type" => principal_type),
            element!(Self, login),
            element!(Self, name),
            element!(Self, first_name),
            element!(Self, last_name),
            element!(Self, email),
            element!(Self, password),
            element!(Self, description),
            element!(Self, has_children),
            attribute!(Self, principal_id),
            element!(Self, send_email),
        ]
    }
}

/// A principal's entry on an ACL, from `permissions-info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionInfo {
    pub principal_id: String,
    pub has_children: bool,
    pub is_primary: bool,
    pub permission_id: Option<PermissionId>,
    pub training_group_id: Option<String>,
    pub login: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Record for PermissionInfo {
    const ROOT: &'static str = "principal";

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![
            attribute!(Self, principal_id),
            attribute!(Self, has_children),
            attribute!(Self, is_primary),
            attribute!(Self, permission_id),
            attribute!(Self, training_group_id),
            element!(Self, login),
            element!(Self, name),
            element!(Self, description),
        ]
    }
}
