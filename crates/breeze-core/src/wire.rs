//! Value formatting shared by query parameters and XML payloads.
//!
//! A [`WireValue`] knows how to turn itself into the single string the
//! service expects and how to read itself back. `None` from
//! [`WireValue::to_wire`] means "empty": the field is omitted entirely.
//!
//! Enumerations are declared with [`wire_enum!`](crate::wire_enum), which
//! implements [`WireEnum`] and [`WireValue`] from a member list with optional
//! wire-name overrides.

use std::borrow::Cow;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::time::{format_minutes, format_wire_date, parse_minutes, parse_wire_date};

/// A raw wire value could not be read as the expected kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value: {raw:?}")]
pub struct ValueError {
    kind: &'static str,
    raw: String,
}

impl ValueError {
    /// Creates a new value error for the given kind and raw input.
    pub fn new(kind: &'static str, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    /// Returns the name of the expected kind (e.g. `date`, `PermissionId`).
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the offending raw value.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

/// The formatting family a wire value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Free text, passed through unchanged.
    Text,
    /// `1` / `0`.
    Boolean,
    /// Decimal integer.
    Integer,
    /// A date in the fixed wire date format.
    Date,
    /// A duration in whole minutes.
    Duration,
    /// An enumeration member's wire name.
    Enumeration,
}

/// A value that can be written to and read from the wire.
pub trait WireValue: Sized {
    /// The formatting family of this value.
    const KIND: ValueKind;

    /// Returns the wire form, or `None` when the value is empty and must be
    /// omitted.
    fn to_wire(&self) -> Option<String>;

    /// Reads a value from its wire form.
    fn from_wire(raw: &str) -> Result<Self, ValueError>;
}

impl WireValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_wire(&self) -> Option<String> {
        Some(self.clone())
    }

    fn from_wire(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_string())
    }
}

impl WireValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn to_wire(&self) -> Option<String> {
        Some(if *self { "1" } else { "0" }.to_string())
    }

    fn from_wire(raw: &str) -> Result<Self, ValueError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(ValueError::new("boolean", raw)),
        }
    }
}

macro_rules! integer_wire_value {
    ($($ty:ty),+) => {
        $(
            impl WireValue for $ty {
                const KIND: ValueKind = ValueKind::Integer;

                fn to_wire(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn from_wire(raw: &str) -> Result<Self, ValueError> {
                    raw.trim()
                        .parse()
                        .map_err(|_| ValueError::new("integer", raw))
                }
            }
        )+
    };
}

integer_wire_value!(i32, i64, u32);

impl WireValue for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::Date;

    fn to_wire(&self) -> Option<String> {
        if *self == DateTime::<Utc>::MIN_UTC {
            return None;
        }
        Some(format_wire_date(self))
    }

    fn from_wire(raw: &str) -> Result<Self, ValueError> {
        parse_wire_date(raw)
    }
}

impl WireValue for TimeDelta {
    const KIND: ValueKind = ValueKind::Duration;

    fn to_wire(&self) -> Option<String> {
        if self.is_zero() {
            return None;
        }
        Some(format_minutes(self))
    }

    fn from_wire(raw: &str) -> Result<Self, ValueError> {
        parse_minutes(raw)
    }
}

impl<T: WireValue> WireValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn to_wire(&self) -> Option<String> {
        self.as_ref().and_then(WireValue::to_wire)
    }

    fn from_wire(raw: &str) -> Result<Self, ValueError> {
        // An empty element or attribute is "absent" for everything but text.
        if T::KIND != ValueKind::Text && raw.trim().is_empty() {
            return Ok(None);
        }
        T::from_wire(raw).map(Some)
    }
}

/// An enumeration with wire names.
///
/// The wire name of a member is its lower-cased identifier unless the member
/// declares an override. Parsing is case-insensitive and ignores hyphens and
/// underscores, so `no-access`, `NoAccess` and `no_access` all read as the
/// same member.
pub trait WireEnum: Copy + Sized + 'static {
    /// The enumeration's type name, used in error messages.
    const NAME: &'static str;

    /// Every member, in declaration order.
    const VARIANTS: &'static [Self];

    /// The member's Rust identifier.
    fn member_name(self) -> &'static str;

    /// The member's explicit wire name, if it declares one.
    fn wire_override(self) -> Option<&'static str>;

    /// Returns the wire name for this member.
    fn wire_name(self) -> Cow<'static, str> {
        match self.wire_override() {
            Some(name) => Cow::Borrowed(name),
            None => Cow::Owned(self.member_name().to_lowercase()),
        }
    }

    /// Reads a member from its wire name.
    fn parse_wire(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        if let Some(exact) = Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.wire_override() == Some(raw))
        {
            return Ok(exact);
        }

        let wanted = normalize_member(raw);
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| normalize_member(v.member_name()) == wanted)
            .ok_or_else(|| ValueError::new(Self::NAME, raw))
    }
}

fn normalize_member(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Declares an enumeration with wire names.
///
/// Members may carry an explicit wire name with `=> "name"`:
///
/// ```
/// breeze_core::wire_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq)]
///     pub enum Role {
///         Host,
///         MiniHost => "mini-host",
///     }
/// }
///
/// use breeze_core::WireEnum;
/// assert_eq!(Role::Host.wire_name(), "host");
/// assert_eq!(Role::MiniHost.wire_name(), "mini-host");
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident $(=> $wire:literal)?
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $crate::wire::WireEnum for $name {
            const NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn member_name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }

            fn wire_override(self) -> ::std::option::Option<&'static str> {
                match self {
                    $(Self::$variant => $crate::wire_enum!(@override $($wire)?),)+
                }
            }
        }

        impl $crate::wire::WireValue for $name {
            const KIND: $crate::wire::ValueKind = $crate::wire::ValueKind::Enumeration;

            fn to_wire(&self) -> ::std::option::Option<::std::string::String> {
                ::std::option::Option::Some(
                    $crate::wire::WireEnum::wire_name(*self).into_owned(),
                )
            }

            fn from_wire(
                raw: &str,
            ) -> ::std::result::Result<Self, $crate::wire::ValueError> {
                <Self as $crate::wire::WireEnum>::parse_wire(raw)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&$crate::wire::WireEnum::wire_name(*self))
            }
        }
    };
    (@override) => { ::std::option::Option::None };
    (@override $wire:literal) => { ::std::option::Option::Some($wire) };
}

/// Translates a Rust field identifier into its default wire name.
///
/// Underscores become hyphens and the result is lower-cased:
/// `first_name` becomes `first-name`.
pub fn default_wire_name(ident: &str) -> String {
    ident.replace('_', "-").to_lowercase()
}

/// Encodes a value using traditional form-encoding rules.
///
/// ASCII alphanumerics and `!'()*-._` pass through, a space becomes `+`,
/// other ASCII characters become `%xx` and every non-ASCII character is
/// written as a `%uXXXX` escape per UTF-16 code unit.
pub fn form_urlencode(value: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '!' | '\'' | '(' | ')' | '*' | '-' | '.' | '_' => {
                out.push(c)
            }
            ' ' => out.push('+'),
            c if c.is_ascii() => {
                let byte = c as u8;
                out.push('%');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0f) as usize] as char);
            }
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str("%u");
                    for shift in [12, 8, 4, 0] {
                        out.push(HEX[((*unit >> shift) & 0x0f) as usize] as char);
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    crate::wire_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Access {
            View,
            ViewHidden,
            MiniHost => "mini-host",
            NoAccess => "no-access",
        }
    }

    #[test]
    fn enum_default_name_is_lowercased_member() {
        assert_eq!(Access::View.wire_name(), "view");
        assert_eq!(Access::ViewHidden.wire_name(), "viewhidden");
    }

    #[test]
    fn enum_override_wins() {
        assert_eq!(Access::MiniHost.wire_name(), "mini-host");
        assert_eq!(Access::MiniHost.to_wire().as_deref(), Some("mini-host"));
        assert_eq!(Access::NoAccess.to_string(), "no-access");
    }

    #[test]
    fn enum_parse_ignores_case_and_hyphens() {
        assert_eq!(Access::parse_wire("no-access").unwrap(), Access::NoAccess);
        assert_eq!(Access::parse_wire("NOACCESS").unwrap(), Access::NoAccess);
        assert_eq!(Access::parse_wire("view-hidden").unwrap(), Access::ViewHidden);
        assert_eq!(Access::parse_wire(" mini-host ").unwrap(), Access::MiniHost);
    }

    #[test]
    fn enum_parse_unknown_fails() {
        let err = Access::parse_wire("owner").unwrap_err();
        assert_eq!(err.kind(), "Access");
        assert_eq!(err.raw(), "owner");
    }

    #[test]
    fn bool_formats_as_digit() {
        assert_eq!(true.to_wire().as_deref(), Some("1"));
        assert_eq!(false.to_wire().as_deref(), Some("0"));
        assert!(bool::from_wire("TRUE").unwrap());
        assert!(!bool::from_wire("0").unwrap());
        assert!(bool::from_wire("maybe").is_err());
    }

    #[test]
    fn empty_values_are_skipped() {
        assert_eq!(TimeDelta::zero().to_wire(), None);
        assert_eq!(DateTime::<Utc>::MIN_UTC.to_wire(), None);
        assert_eq!(Option::<String>::None.to_wire(), None);
        assert_eq!(Some(TimeDelta::zero()).to_wire(), None);
    }

    #[test]
    fn option_reads_blank_as_absent_except_text() {
        assert_eq!(Option::<DateTime<Utc>>::from_wire("").unwrap(), None);
        assert_eq!(Option::<i32>::from_wire("  ").unwrap(), None);
        assert_eq!(Option::<Access>::from_wire("").unwrap(), None);
        assert_eq!(
            Option::<String>::from_wire("").unwrap(),
            Some(String::new())
        );
    }

    #[test]
    fn date_value_round_trips() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 1, 8, 15, 0).unwrap();
        let wire = dt.to_wire().unwrap();
        assert_eq!(wire, "2024-06-01T08:15:00.000+00:00");
        assert_eq!(DateTime::<Utc>::from_wire(&wire).unwrap(), dt);
    }

    #[test]
    fn duration_value_is_minutes() {
        assert_eq!(TimeDelta::hours(2).to_wire().as_deref(), Some("120"));
        assert_eq!(TimeDelta::from_wire("45").unwrap(), TimeDelta::minutes(45));
    }

    #[test]
    fn default_name_hyphenates_and_lowercases() {
        assert_eq!(default_wire_name("first_name"), "first-name");
        assert_eq!(default_wire_name("Send_Email"), "send-email");
        assert_eq!(default_wire_name("email"), "email");
    }

    #[test]
    fn form_encoding_follows_legacy_rules() {
        assert_eq!(form_urlencode("John Smith"), "John+Smith");
        assert_eq!(form_urlencode("a&b=c"), "a%26b%3dc");
        assert_eq!(form_urlencode("it's (ok)!*-._"), "it's+(ok)!*-._");
        assert_eq!(form_urlencode("user@acme.com"), "user%40acme.com");
        assert_eq!(form_urlencode("/path?x"), "%2fpath%3fx");
    }

    #[test]
    fn form_encoding_escapes_extended_characters_as_unicode() {
        assert_eq!(form_urlencode("é"), "%u00e9");
        assert_eq!(form_urlencode("日本"), "%u65e5%u672c");
        assert_eq!(form_urlencode("😀"), "%ud83d%ude00");
    }
}
