//! Field encoding: records to query parameters.

use breeze_core::form_urlencode;

use crate::marshal::{Record, codec_cache};

/// The non-empty fields of a record as `(wire name, wire value)` pairs.
///
/// Values are formatted but not yet URL-encoded; [`ApiRequest`](crate::ApiRequest)
/// encodes at send time.
pub fn encode_fields<T: Record>(record: &T) -> Vec<(String, String)> {
    codec_cache().codec::<T>(None).query_pairs(record)
}

/// The non-empty fields of a record as a query fragment, `&name=value...`.
pub fn encode_query<T: Record>(record: &T) -> String {
    encode_fields(record)
        .into_iter()
        .map(|(name, value)| format!("&{name}={}", form_urlencode(&value)))
        .collect()
}
