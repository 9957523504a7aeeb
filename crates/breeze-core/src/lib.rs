//! Core wire types: dates, durations, enumerations, form encoding, tracing

pub mod time;
pub mod tracing;
pub mod wire;

pub use time::{WIRE_DATE_FORMAT, format_wire_date, parse_wire_date};
pub use tracing::{LogFormat, TracingConfig, TracingError, init_tracing};
pub use wire::{
    ValueError, ValueKind, WireEnum, WireValue, default_wire_name, form_urlencode,
};
