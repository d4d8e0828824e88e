pub(super) mod cart;
pub(super) mod history;
pub(super) mod order;
pub(super) mod product;
pub(super) mod report;
pub(super) mod review;

use std::str::FromStr;

use crate::error::{AppError, AppErrorCode};

// rows in the in-memory store are plain string sequences, any column
// failing to decode indicates the table content was tampered
pub(super) fn decode_column<T: FromStr>(
    table: &'static str,
    raw: Option<&str>,
) -> Result<T, AppError> {
    let corrupted = |d: String| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(d),
    };
    let raw = raw.ok_or_else(|| corrupted(format!("table:{table}, missing-column")))?;
    raw.parse::<T>()
        .map_err(|_e| corrupted(format!("table:{table}, column:{raw}")))
}

// Option<String> columns are stored as plain strings, absence encoded
// as the empty string
pub(super) fn encode_opt_column(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
pub(super) fn decode_opt_column(raw: Option<&String>) -> Option<String> {
    match raw {
        Some(s) if !s.is_empty() => Some(s.clone()),
        _others => None,
    }
}
