//! Input validation for request fields and listing filters.
//!
//! Every function returns `Err(String)` with a human-readable message; the
//! API layer wraps it in `CoreError::Validation`.

use chrono::{Days, NaiveDate, NaiveTime};

use crate::status::RequestStatus;
use crate::types::Timestamp;

/// Date format accepted by the `from` / `to` listing filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validate an optional room dimension from an edit request.
///
/// `None` means "leave unchanged" and is always accepted.
pub fn validate_room_dimension(field: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => {
            Err(format!("{field} must be a positive number"))
        }
        _ => Ok(()),
    }
}

/// Validate a component's thermal design power in watts.
pub fn validate_tdp(tdp: i32) -> Result<(), String> {
    if tdp < 0 {
        return Err("tdp must not be negative".to_string());
    }
    Ok(())
}

/// Validate a required, non-blank text field.
pub fn validate_required_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

/// Interpret a ledger quantity from an update request.
///
/// Returns `Ok(None)` for an absent or zero quantity (nothing to update) and
/// rejects negative values.
pub fn normalize_quantity(quantity: Option<i32>) -> Result<Option<i32>, String> {
    match quantity {
        None | Some(0) => Ok(None),
        Some(q) if q < 0 => Err("quantity must be a positive integer".to_string()),
        Some(q) => Ok(Some(q)),
    }
}

/// Parse a `status` listing filter: a single id or a comma-separated set.
///
/// An empty string means "no filter". Unknown ids are rejected.
pub fn parse_status_filter(raw: &str) -> Result<Vec<RequestStatus>, String> {
    let mut statuses = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let status = part
            .parse::<i16>()
            .ok()
            .and_then(RequestStatus::from_id)
            .ok_or_else(|| format!("Unknown status '{part}'"))?;
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }
    Ok(statuses)
}

/// Half-open UTC timestamp range built from inclusive calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    /// Inclusive lower bound (start of the `from` day).
    pub start: Option<Timestamp>,
    /// Exclusive upper bound (start of the day after `to`).
    pub end: Option<Timestamp>,
}

/// Parse the `from` / `to` listing filters (`YYYY-MM-DD`, both inclusive).
pub fn parse_date_range(from: Option<&str>, to: Option<&str>) -> Result<DateRange, String> {
    let parse = |field: &str, raw: &str| {
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map_err(|_| format!("{field} must be a date in YYYY-MM-DD format"))
    };

    let from = from
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse("from", s))
        .transpose()?;
    let to = to
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse("to", s))
        .transpose()?;

    if let (Some(f), Some(t)) = (from, to) {
        if f > t {
            return Err("from must not be after to".to_string());
        }
    }

    let start_of = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc();

    let end = match to {
        Some(t) => Some(
            t.checked_add_days(Days::new(1))
                .map(start_of)
                .ok_or_else(|| "to is out of range".to_string())?,
        ),
        None => None,
    };

    Ok(DateRange {
        start: from.map(start_of),
        end,
    })
}
