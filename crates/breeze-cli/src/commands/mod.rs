//! Command implementations.

pub mod config;
pub mod info;
pub mod meetings;
pub mod session;

#[cfg(test)]
mod canned;

use breeze_api::{Outcome, StatusCode};
use serde::Serialize;

use crate::error::{CliError, CliResult};

/// The result of a call, or an empty value when the server had no data.
pub(crate) fn take<T: Default>(action: &str, outcome: Outcome<T>) -> CliResult<T> {
    if outcome.envelope.code() == StatusCode::NoData {
        return Ok(T::default());
    }
    if !outcome.envelope.is_ok() {
        return Err(CliError::call(action, &outcome.envelope));
    }
    outcome
        .result
        .ok_or_else(|| CliError::call(action, &outcome.envelope))
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Left-aligned columns, widest cell per column.
pub(crate) fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = padded(header.iter().copied(), &widths);
    for row in rows {
        out.push('\n');
        out.push_str(&padded(row.iter().map(String::as_str), &widths));
    }
    out
}

fn padded<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use breeze_api::StatusEnvelope;

    use super::*;

    #[test]
    fn no_data_reads_as_empty() {
        let outcome: Outcome<Vec<String>> =
            Outcome::status(StatusEnvelope::new(StatusCode::NoData));
        assert!(take("sco-contents", outcome).unwrap().is_empty());
    }

    #[test]
    fn failures_name_the_action() {
        let outcome: Outcome<Vec<String>> =
            Outcome::status(StatusEnvelope::new(StatusCode::NoAccess));
        let err = take("report-quotas", outcome).unwrap_err();
        assert_eq!(err.to_string(), "report-quotas failed: no-access");
    }

    #[test]
    fn table_pads_columns() {
        let rendered = table(
            &["ID", "NAME"],
            &[
                vec!["1".into(), "Weekly".into()],
                vec!["1234".into(), "-".into()],
            ],
        );
        assert_eq!(rendered, "ID    NAME\n1     Weekly\n1234  -");
    }
}
