//! Date formats used by the two date kinds.

use chrono::{DateTime, Local, NaiveDateTime, Timelike};

use super::ItemKind;

/// Format of `DATE` values (`YYYY-MM-DD HH:mm:ss`).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of `DATE_EXTENDED` values (`YYYY-MM-DDTHH:mm:ss`).
pub const DATE_EXTENDED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Placeholder shown for `DATE` values.
pub const DATE_PLACEHOLDER: &str = "Date format: yyyy-MM-dd HH:mm:ss";

/// Placeholder shown for `DATE_EXTENDED` values.
pub const DATE_EXTENDED_PLACEHOLDER: &str = "Date format: yyyy-MM-ddTHH:mm:ss";

fn format_str(kind: ItemKind) -> Option<&'static str> {
    match kind {
        ItemKind::Date => Some(DATE_FORMAT),
        ItemKind::DateExtended => Some(DATE_EXTENDED_FORMAT),
        _ => None,
    }
}

/// Placeholder for a date kind, `None` for every other kind.
pub fn placeholder_for(kind: ItemKind) -> Option<&'static str> {
    match kind {
        ItemKind::Date => Some(DATE_PLACEHOLDER),
        ItemKind::DateExtended => Some(DATE_EXTENDED_PLACEHOLDER),
        _ => None,
    }
}

/// Current local time truncated to whole seconds.
pub fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Render `date` in the textual format of `kind`.
pub fn format_for(kind: ItemKind, date: &NaiveDateTime) -> Option<String> {
    format_str(kind).map(|fmt| date.format(fmt).to_string())
}

/// Parse `text` with the format of `kind`.
///
/// The whole string must match the zero-padded format exactly: text that
/// parses but does not render back to itself is rejected.
pub fn parse_for(kind: ItemKind, text: &str) -> Option<NaiveDateTime> {
    let fmt = format_str(kind)?;
    NaiveDateTime::parse_from_str(text, fmt)
        .ok()
        .filter(|date| date.format(fmt).to_string() == text)
}

/// Detect whether `text` already looks like one of the two date formats.
///
/// `DATE` is tried first.
pub fn detect(text: &str) -> Option<(ItemKind, NaiveDateTime)> {
    [ItemKind::Date, ItemKind::DateExtended]
        .into_iter()
        .find_map(|kind| parse_for(kind, text).map(|date| (kind, date)))
}

/// Read a stored date picker value.
///
/// Accepts RFC 3339 timestamps with an offset (`2024-01-01T19:04:05.000Z`),
/// converted to local time, as well as naive ISO timestamps and the two
/// display formats. Sub-second precision is dropped.
pub fn parse_stored(text: &str) -> Option<NaiveDateTime> {
    let date = match DateTime::parse_from_rfc3339(text) {
        Ok(date) => date.with_timezone(&Local).naive_local(),
        Err(_) => text
            .parse::<NaiveDateTime>()
            .ok()
            .or_else(|| detect(text).map(|(_, date)| date))?,
    };
    Some(date.with_nanosecond(0).unwrap_or(date))
}
