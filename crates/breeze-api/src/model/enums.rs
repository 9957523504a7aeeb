//! Enumerations shared by several record shapes.

use breeze_core::{WireEnum, wire_enum};
use serde::{Serialize, Serializer};

wire_enum! {
    /// The kind of a SCO.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ScoType {
        Content,
        Course,
        Curriculum,
        Event,
        Folder,
        Link,
        Meeting,
        Session,
        Tree,
    }
}

wire_enum! {
    /// A principal's role on an ACL.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum PermissionId {
        Admin,
        Author,
        Learner,
        View,
        ViewHidden => "view-hidden",
        PublicAccess => "public-access",
        Host,
        MiniHost => "mini-host",
        Remove,
        Publish,
        Manage,
        Denied,
    }
}

wire_enum! {
    /// Public access levels, applied to the `public-access` principal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum SpecialPermission {
        ViewHidden => "view-hidden",
        Remove,
        Denied,
    }
}

impl SpecialPermission {
    /// The permission written for the `public-access` principal.
    pub fn permission(self) -> PermissionId {
        match self {
            Self::ViewHidden => PermissionId::ViewHidden,
            Self::Remove => PermissionId::Remove,
            Self::Denied => PermissionId::Denied,
        }
    }
}

wire_enum! {
    /// Built-in principal and group types.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum PrincipalType {
        Admins,
        Authors,
        CourseAdmins => "course-admins",
        EventAdmins => "event-admins",
        EventGroup => "event-group",
        Everyone,
        ExternalGroup => "external-group",
        ExternalUser => "external-user",
        Group,
        Guest,
        Learners,
        LiveAdmins => "live-admins",
        SeminarAdmins => "seminar-admins",
        User,
    }
}

/// Serializes enumerations by their wire name.
macro_rules! serialize_wire_name {
    ($($ty:ty),+) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(&self.wire_name())
                }
            }
        )+
    };
}

serialize_wire_name!(ScoType, PermissionId, SpecialPermission, PrincipalType);

#[cfg(test)]
mod tests {
    use super::*;
    use breeze_core::WireValue;

    #[test]
    fn permission_wire_names() {
        assert_eq!(PermissionId::MiniHost.wire_name(), "mini-host");
        assert_eq!(PermissionId::ViewHidden.wire_name(), "view-hidden");
        assert_eq!(PermissionId::Host.wire_name(), "host");
        assert_eq!(PermissionId::from_wire("mini-host").unwrap(), PermissionId::MiniHost);
    }

    #[test]
    fn special_permission_maps_to_permission() {
        assert_eq!(SpecialPermission::ViewHidden.permission(), PermissionId::ViewHidden);
        assert_eq!(SpecialPermission::Denied.permission(), PermissionId::Denied);
    }

    #[test]
    fn principal_types_are_hyphenated() {
        assert_eq!(PrincipalType::CourseAdmins.to_string(), "course-admins");
        assert_eq!(PrincipalType::User.to_string(), "user");
        assert_eq!(
            PrincipalType::parse_wire("external_user").unwrap(),
            PrincipalType::ExternalUser
        );
    }

    #[test]
    fn serializes_as_wire_name() {
        assert_eq!(
            serde_json::to_string(&Some(ScoType::Meeting)).unwrap(),
            "\"meeting\""
        );
        assert_eq!(
            serde_json::to_string(&PermissionId::MiniHost).unwrap(),
            "\"mini-host\""
        );
    }
}
