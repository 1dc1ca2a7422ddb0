use crate::types::TableRow;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// A combined rating cell: category text, a whitespace run, then a trailing
/// digit run (e.g. "Very High 45"). Split on the last whitespace before the
/// digits; anything else is an unparseable cell.
static RATING_CELL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*\S)\s+(\d+)$").unwrap());

/// Split a combined "rating + index" cell into its two typed parts.
///
/// Cells that do not match the pattern yield `(None, None)` rather than an
/// error; a malformed cell becomes a null, never a pipeline failure.
pub fn parse_rating_cell(text: &str) -> (Option<String>, Option<String>) {
    match RATING_CELL_RE.captures(text.trim()) {
        Some(caps) => (
            Some(caps[1].to_string()),
            Some(caps[2].to_string()),
        ),
        None => (None, None),
    }
}

/// Match a column header against the English weekday names. Headers may
/// carry extra text after the name (e.g. "Wednesday 23 October"), so only
/// the first token is considered.
pub fn weekday_from_header(header: &str) -> Option<Weekday> {
    let first_token = header.split_whitespace().next()?;
    match first_token.to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Next calendar occurrence of `weekday` counted from `anchor`.
///
/// The anchor is yesterday's date, so a table fetched on any day of the
/// week maps today's weekday to today rather than a week ahead. The result
/// is always within `anchor..=anchor + 6 days`, never before the anchor.
pub fn date_for_weekday(weekday: Weekday, anchor: NaiveDate) -> NaiveDate {
    let offset = (weekday.num_days_from_monday() as i64
        - anchor.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    anchor + Duration::days(offset)
}

/// Replace each weekday column with a `<date>_rating` / `<date>_index` pair
/// and tag every row with its source region code.
pub fn normalize_rows(rows: Vec<TableRow>, state: &str, anchor: NaiveDate) -> Vec<TableRow> {
    rows.into_iter()
        .map(|row| normalize_row(row, state, anchor))
        .collect()
}

fn normalize_row(row: TableRow, state: &str, anchor: NaiveDate) -> TableRow {
    let mut normalized = TableRow::new();

    for (column, value) in row {
        match weekday_from_header(&column) {
            Some(weekday) => {
                let date = date_for_weekday(weekday, anchor);
                let (rating, index) = match value.as_str() {
                    Some(text) => parse_rating_cell(text),
                    None => (None, None),
                };
                normalized.insert(
                    format!("{date}_rating"),
                    rating.map_or(Value::Null, Value::String),
                );
                normalized.insert(
                    format!("{date}_index"),
                    index.map_or(Value::Null, Value::String),
                );
            }
            None => {
                normalized.insert(column, value);
            }
        }
    }

    normalized.insert("state".to_string(), Value::String(state.to_string()));
    normalized
}
