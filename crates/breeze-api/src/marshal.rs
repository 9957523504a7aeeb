//! Record marshalling.
//!
//! Each record shape declares a static table of [`FieldDescriptor`]s: wire
//! name, whether the value lives in an attribute or a child element, and how
//! to read and write it. A [`Codec`] binds that table to one root element
//! name. Codecs are built once per (shape, root) pair and kept in a
//! [`CodecCache`]; the process-wide instance is [`codec_cache`].
//!
//! ```ignore
//! impl Record for UserInfo {
//!     const ROOT: &'static str = "user";
//!
//!     fn fields() -> Vec<FieldDescriptor<Self>> {
//!         vec![
//!             attribute!(Self, "user-id" => user_id),
//!             element!(Self, name),
//!             element!(Self, login),
//!         ]
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use breeze_core::{ValueError, ValueKind, WireValue};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::xml::XmlNode;

/// Where a field's value lives in the XML form of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Attribute,
    Element,
}

type Reader<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;
type Writer<T> = Box<dyn Fn(&mut T, &str) -> Result<(), ValueError> + Send + Sync>;

/// One wire-backed field of a record shape.
pub struct FieldDescriptor<T> {
    name: Cow<'static, str>,
    location: Location,
    kind: ValueKind,
    read: Reader<T>,
    write: Writer<T>,
}

impl<T: 'static> FieldDescriptor<T> {
    /// A field carried as an XML attribute.
    pub fn attribute<V: WireValue + 'static>(
        name: impl Into<Cow<'static, str>>,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        Self::new(name.into(), Location::Attribute, get, get_mut)
    }

    /// A field carried as the text of a child element.
    pub fn element<V: WireValue + 'static>(
        name: impl Into<Cow<'static, str>>,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        Self::new(name.into(), Location::Element, get, get_mut)
    }

    fn new<V: WireValue + 'static>(
        name: Cow<'static, str>,
        location: Location,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        Self {
            name,
            location,
            kind: V::KIND,
            read: Box::new(move |record| get(record).to_wire()),
            write: Box::new(move |record, raw| {
                *get_mut(record) = V::from_wire(raw)?;
                Ok(())
            }),
        }
    }

    /// Re-targets this descriptor at a value embedded in a larger record.
    pub fn embed<O: 'static>(self, get: fn(&O) -> &T, get_mut: fn(&mut O) -> &mut T) -> FieldDescriptor<O> {
        let Self {
            name,
            location,
            kind,
            read,
            write,
        } = self;
        FieldDescriptor {
            name,
            location,
            kind,
            read: Box::new(move |outer| read(get(outer))),
            write: Box::new(move |outer, raw| write(get_mut(outer), raw)),
        }
    }
}

impl<T> FieldDescriptor<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The field's wire value, or `None` when it is empty.
    pub fn read(&self, record: &T) -> Option<String> {
        (self.read)(record)
    }

    /// Parses `raw` into the field.
    pub fn write(&self, record: &mut T, raw: &str) -> Result<(), ValueError> {
        (self.write)(record, raw)
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Declares an attribute field: `attribute!(Self, field)` uses the
/// hyphenated field name, `attribute!(Self, "wire-name" => path.to.field)`
/// an explicit one.
macro_rules! attribute {
    ($ty:ty, $field:ident) => {
        $crate::marshal::FieldDescriptor::<$ty>::attribute(
            ::breeze_core::default_wire_name(stringify!($field)),
            |r: &$ty| &r.$field,
            |r: &mut $ty| &mut r.$field,
        )
    };
    ($ty:ty, $name:literal => $($path:ident).+) => {
        $crate::marshal::FieldDescriptor::<$ty>::attribute(
            $name,
            |r: &$ty| &r.$($path).+,
            |r: &mut $ty| &mut r.$($path).+,
        )
    };
}

/// Declares an element field, with the same forms as `attribute!`.
macro_rules! element {
    ($ty:ty, $field:ident) => {
        $crate::marshal::FieldDescriptor::<$ty>::element(
            ::breeze_core::default_wire_name(stringify!($field)),
            |r: &$ty| &r.$field,
            |r: &mut $ty| &mut r.$field,
        )
    };
    ($ty:ty, $name:literal => $($path:ident).+) => {
        $crate::marshal::FieldDescriptor::<$ty>::element(
            $name,
            |r: &$ty| &r.$($path).+,
            |r: &mut $ty| &mut r.$($path).+,
        )
    };
}

pub(crate) use {attribute, element};

/// A record shape with a static field table.
pub trait Record: Default + Send + Sync + 'static {
    /// The root element name used when the caller supplies none.
    const ROOT: &'static str;

    /// The wire-backed fields. Derived fields are not listed.
    fn fields() -> Vec<FieldDescriptor<Self>>;
}

/// A compiled serializer for one record shape under one root name.
pub struct Codec<T> {
    root: String,
    fields: Vec<FieldDescriptor<T>>,
}

impl<T: Record> Codec<T> {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            fields: T::fields(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Where the field with the given wire name lives, if the shape has it.
    pub fn location_of(&self, name: &str) -> Option<Location> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .map(FieldDescriptor::location)
    }

    /// Binds an element to a new record.
    ///
    /// Attributes and child elements without a matching field are ignored;
    /// fields without a matching attribute or element keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the element name is not this codec's root
    /// or a value cannot be parsed.
    pub fn decode(&self, node: &XmlNode) -> ApiResult<T> {
        if node.name() != self.root {
            return Err(ApiError::decode(format!(
                "expected <{}>, found <{}>",
                self.root,
                node.name()
            )));
        }

        let mut record = T::default();
        for field in &self.fields {
            let raw = match field.location {
                Location::Attribute => node.attribute(field.name()),
                Location::Element => node.child_text(field.name()),
            };
            if let Some(raw) = raw {
                field.write(&mut record, raw).map_err(|e| {
                    ApiError::decode(format!("<{}> field `{}`: {e}", self.root, field.name()))
                        .with_source(e)
                })?;
            }
        }
        Ok(record)
    }

    /// Decodes every element, failing on the first that does not bind.
    pub fn decode_all<'a>(&self, nodes: impl IntoIterator<Item = &'a XmlNode>) -> ApiResult<Vec<T>> {
        nodes.into_iter().map(|node| self.decode(node)).collect()
    }

    /// Builds the element for a record. Empty fields are omitted.
    pub fn to_node(&self, record: &T) -> XmlNode {
        let mut node = XmlNode::new(self.root.as_str());
        for field in &self.fields {
            let Some(value) = field.read(record) else {
                continue;
            };
            match field.location {
                Location::Attribute => node.set_attribute(field.name(), value),
                Location::Element => {
                    node.push_child(XmlNode::new(field.name()).with_text(value))
                }
            }
        }
        node
    }

    /// Serializes a record as a fragment.
    pub fn encode(&self, record: &T) -> ApiResult<String> {
        self.to_node(record).to_fragment()
    }

    /// Serializes each record independently and concatenates the fragments.
    pub fn encode_all(&self, records: &[T]) -> ApiResult<String> {
        records.iter().map(|r| self.encode(r)).collect()
    }

    /// The non-empty fields as `(wire name, wire value)` pairs, in table order.
    pub fn query_pairs(&self, record: &T) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|field| field.read(record).map(|v| (field.name().to_string(), v)))
            .collect()
    }
}

impl<T> std::fmt::Debug for Codec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("root", &self.root)
            .field("fields", &self.fields)
            .finish()
    }
}

type CodecKey = (TypeId, String);

/// A thread-safe table of codecs keyed by (shape, root name).
///
/// Lookups take a shared lock. A miss takes the exclusive lock and builds
/// the codec inside it, so concurrent first use of the same key builds
/// exactly once.
#[derive(Default)]
pub struct CodecCache {
    codecs: RwLock<HashMap<CodecKey, Arc<dyn Any + Send + Sync>>>,
    builds: AtomicUsize,
}

impl CodecCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the codec for `T` under `root`, or under `T::ROOT` when
    /// `root` is `None`, building it on first use.
    pub fn codec<T: Record>(&self, root: Option<&str>) -> Arc<Codec<T>> {
        let root = root.unwrap_or(T::ROOT);
        let key = (TypeId::of::<T>(), root.to_string());

        let cached = self
            .codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        if let Some(codec) = cached.and_then(|c| c.downcast::<Codec<T>>().ok()) {
            return codec;
        }

        let mut codecs = self.codecs.write().unwrap_or_else(PoisonError::into_inner);
        let entry = codecs.entry(key).or_insert_with(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            debug!(shape = std::any::type_name::<T>(), root, "building codec");
            let codec: Arc<dyn Any + Send + Sync> = Arc::new(Codec::<T>::new(root));
            codec
        });
        Arc::clone(entry)
            .downcast::<Codec<T>>()
            .unwrap_or_else(|_| Arc::new(Codec::new(root)))
    }

    /// Number of codecs built so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.codecs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CodecCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecCache")
            .field("len", &self.len())
            .field("builds", &self.builds())
            .finish()
    }
}

static CODECS: LazyLock<CodecCache> = LazyLock::new(CodecCache::new);

/// The process-wide codec cache.
pub fn codec_cache() -> &'static CodecCache {
    &CODECS
}

/// Decodes an element with the shared codec for `T`.
pub fn decode<T: Record>(node: &XmlNode, root: Option<&str>) -> ApiResult<T> {
    codec_cache().codec::<T>(root).decode(node)
}

/// Decodes a sequence of elements with the shared codec for `T`.
pub fn decode_all<'a, T: Record>(
    nodes: impl IntoIterator<Item = &'a XmlNode>,
    root: Option<&str>,
) -> ApiResult<Vec<T>> {
    codec_cache().codec::<T>(root).decode_all(nodes)
}

/// Serializes a record with the shared codec for `T`.
pub fn encode<T: Record>(record: &T) -> ApiResult<String> {
    codec_cache().codec::<T>(None).encode(record)
}

/// Serializes a sequence of records, one fragment after another.
pub fn encode_all<T: Record>(records: &[T]) -> ApiResult<String> {
    codec_cache().codec::<T>(None).encode_all(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use breeze_core::wire_enum;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use std::sync::Barrier;

    wire_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Kind {
            Meeting,
            MiniHost => "mini-host",
        }
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Stamp {
        begin: Option<DateTime<Utc>>,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Sample {
        sco_id: String,
        kind: Option<Kind>,
        name: Option<String>,
        is_folder: bool,
        duration: TimeDelta,
        stamp: Stamp,
    }

    impl Record for Sample {
        const ROOT: &'static str = "sample";

        fn fields() -> Vec<FieldDescriptor<Self>> {
            vec![
                attribute!(Self, sco_id),
                attribute!(Self, "type" => kind),
                element!(Self, name),
                element!(Self, is_folder),
                element!(Self, duration),
                element!(Self, "date-begin" => stamp.begin),
            ]
        }
    }

    fn sample() -> Sample {
        Sample {
            sco_id: "42".into(),
            kind: Some(Kind::MiniHost),
            name: Some("Weekly sync".into()),
            is_folder: true,
            duration: TimeDelta::minutes(30),
            stamp: Stamp {
                begin: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
            },
        }
    }

    #[test]
    fn encode_writes_attributes_and_elements() {
        let codec = Codec::<Sample>::new("sample");
        insta::assert_snapshot!(codec.encode(&sample()).unwrap(), @r#"<sample sco-id="42" type="mini-host"><name>Weekly sync</name><is-folder>1</is-folder><duration>30</duration><date-begin>2024-03-01T10:00:00.000+00:00</date-begin></sample>"#);
    }

    #[test]
    fn encode_skips_empty_values() {
        let codec = Codec::<Sample>::new("sample");
        let fragment = codec.encode(&Sample::default()).unwrap();
        assert_eq!(fragment, r#"<sample sco-id=""><is-folder>0</is-folder></sample>"#);
    }

    #[test]
    fn decode_round_trips_encoded_fragment() {
        let codec = Codec::<Sample>::new("sample");
        let original = sample();
        let node = XmlNode::parse(&codec.encode(&original).unwrap()).unwrap();
        assert_eq!(codec.decode(&node).unwrap(), original);
    }

    #[test]
    fn decode_ignores_unknown_and_keeps_defaults() {
        let codec = Codec::<Sample>::new("sample");
        let node = XmlNode::parse(r#"<sample sco-id="7" extra="x"><other/></sample>"#).unwrap();
        let decoded = codec.decode(&node).unwrap();
        assert_eq!(decoded.sco_id, "7");
        assert_eq!(decoded.name, None);
        assert!(!decoded.is_folder);
    }

    #[test]
    fn decode_uses_supplied_root() {
        let codec = Codec::<Sample>::new("row");
        let node = XmlNode::parse(r#"<row sco-id="9" type="meeting"/>"#).unwrap();
        let decoded = codec.decode(&node).unwrap();
        assert_eq!(decoded.kind, Some(Kind::Meeting));

        let wrong = XmlNode::parse(r#"<sco sco-id="9"/>"#).unwrap();
        assert_eq!(codec.decode(&wrong).unwrap_err().kind(), ErrorKind::Decode);
    }

    #[test]
    fn decode_reports_bad_values() {
        let codec = Codec::<Sample>::new("sample");
        let node =
            XmlNode::parse(r#"<sample sco-id="1"><date-begin>next tuesday</date-begin></sample>"#)
                .unwrap();
        let err = codec.decode(&node).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.message().contains("date-begin"));
    }

    #[test]
    fn sequences_concatenate_without_wrapper() {
        let codec = Codec::<Sample>::new("sample");
        let records = vec![
            Sample {
                sco_id: "1".into(),
                ..Sample::default()
            },
            Sample {
                sco_id: "2".into(),
                ..Sample::default()
            },
        ];
        assert_eq!(
            codec.encode_all(&records).unwrap(),
            concat!(
                r#"<sample sco-id="1"><is-folder>0</is-folder></sample>"#,
                r#"<sample sco-id="2"><is-folder>0</is-folder></sample>"#
            )
        );
    }

    #[test]
    fn query_pairs_follow_table_order() {
        let codec = Codec::<Sample>::new("sample");
        let pairs = codec.query_pairs(&sample());
        let names: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            ["sco-id", "type", "name", "is-folder", "duration", "date-begin"]
        );
        assert_eq!(codec.location_of("type"), Some(Location::Attribute));
        assert_eq!(codec.location_of("date-begin"), Some(Location::Element));
        assert_eq!(codec.location_of("nope"), None);
    }

    #[test]
    fn cache_reuses_codec_per_shape_and_root() {
        let cache = CodecCache::new();
        let a = cache.codec::<Sample>(None);
        let b = cache.codec::<Sample>(Some("sample"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.builds(), 1);

        let row = cache.codec::<Sample>(Some("row"));
        assert_eq!(row.root(), "row");
        assert_eq!(cache.builds(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cache_builds_once_under_concurrent_first_use() {
        let cache = Arc::new(CodecCache::new());
        let barrier = Arc::new(Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    cache.codec::<Sample>(Some("row"))
                })
            })
            .collect();

        let codecs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(cache.builds(), 1);
        assert!(codecs.iter().all(|c| Arc::ptr_eq(c, &codecs[0])));
    }

    #[test]
    fn embedded_descriptor_reads_through_outer() {
        let inner: FieldDescriptor<Stamp> =
            FieldDescriptor::element("date-begin", |s: &Stamp| &s.begin, |s: &mut Stamp| &mut s.begin);
        let outer: FieldDescriptor<Sample> =
            inner.embed(|s: &Sample| &s.stamp, |s: &mut Sample| &mut s.stamp);
        let mut record = Sample::default();
        outer.write(&mut record, "2024-03-01T10:00:00.000+00:00").unwrap();
        assert_eq!(outer.read(&record).as_deref(), Some("2024-03-01T10:00:00.000+00:00"));
        assert_eq!(outer.kind(), ValueKind::Date);
    }
}
