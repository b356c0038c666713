//! Cell values and their text, ordering, and display forms.
//!
//! A normalized record stores one `Option<Value>` per column; `None` stands for
//! a field that is absent from the record or explicitly `null`. The helpers in
//! this module are shared by the filter (search text), the sorter (generic and
//! slash-date ordering), and the renderer (`N/A` and ISO-instant formatting).

use std::{borrow::Cow, cmp::Ordering, fmt, sync::OnceLock};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Serialize, Serializer};

/// `chrono` format of the only instant shape accepted by [`looks_like_iso_date`].
const ISO_INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
/// Fixed day-first convention used when rendering recognised instants.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
pub const MISSING_CELL: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    /// Converts a scalar JSON value. Nested values are returned as `Err` with a
    /// short description of what was found so the caller can build an error.
    pub fn from_json(value: &serde_json::Value) -> Result<Option<Value>, &'static str> {
        match value {
            serde_json::Value::Null => Ok(None),
            serde_json::Value::Bool(b) => Ok(Some(Value::Boolean(*b))),
            serde_json::Value::Number(n) => Ok(Some(match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            })),
            serde_json::Value::String(s) => Ok(Some(Value::String(s.clone()))),
            other => Err(json_kind(other)),
        }
    }

    pub fn as_display(&self) -> Cow<'_, str> {
        match self {
            Value::String(s) => Cow::Borrowed(s),
            Value::Integer(i) => Cow::Owned(i.to_string()),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Cow::Owned((*f as i64).to_string())
                } else {
                    Cow::Owned(f.to_string())
                }
            }
            Value::Boolean(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        }
    }

    /// Empty strings, zero, NaN and `false` render as missing.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::Integer(i) => *i == 0,
            Value::Float(f) => *f == 0.0 || f.is_nan(),
            Value::Boolean(b) => !b,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) | Value::Float(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

/// Coarse type of a value. Values of different kinds are ordered by this rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Boolean,
    Number,
    String,
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Natural ordering within a kind; across kinds the order is only the fixed
/// [`ValueKind`] rank and carries no meaning.
pub fn compare_generic(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Integer(a), Value::Float(b)) => (*a as f64).total_cmp(b),
        (Value::Float(a), Value::Integer(b)) => a.total_cmp(&(*b as f64)),
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        (a, b) => a.kind().cmp(&b.kind()),
    }
}

/// A value written as `DD/MM/YYYY`. The shape is checked, the calendar is not:
/// `99/99/9999` is a slash date, just not a valid one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlashDate {
    Invalid,
    Valid(NaiveDate),
}

fn slash_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]{2})/([0-9]{2})/([0-9]{4})$").expect("slash date pattern compiles")
    })
}

pub fn parse_slash_date(value: &Value) -> Option<SlashDate> {
    let captures = slash_date_pattern().captures(value.as_str()?)?;
    let day: u32 = captures[1].parse().ok()?;
    let month: u32 = captures[2].parse().ok()?;
    let year: i32 = captures[3].parse().ok()?;
    Some(
        NaiveDate::from_ymd_opt(year, month, day)
            .map(SlashDate::Valid)
            .unwrap_or(SlashDate::Invalid),
    )
}

fn parse_iso_instant(value: &str) -> Option<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(value, ISO_INSTANT_FORMAT).ok()?;
    (parsed.format(ISO_INSTANT_FORMAT).to_string() == value).then_some(parsed)
}

/// True when `value` parses as an instant whose canonical
/// `YYYY-MM-DDTHH:MM:SS.sssZ` rendering is byte-for-byte the input.
pub fn looks_like_iso_date(value: &str) -> bool {
    parse_iso_instant(value).is_some()
}

/// `N/A` for absent or falsy values. Strings for which [`looks_like_iso_date`]
/// holds are shown as `DD/MM/YYYY`; both share `parse_iso_instant`.
pub fn format_cell(value: Option<&Value>) -> String {
    let Some(value) = value.filter(|v| !v.is_falsy()) else {
        return MISSING_CELL.to_string();
    };
    if let Some(instant) = value.as_str().and_then(parse_iso_instant) {
        return instant.format(DISPLAY_DATE_FORMAT).to_string();
    }
    value.as_display().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_round_tripping_instants_are_reformatted() {
        for text in [
            "2024-02-05T09:30:00.000Z",
            "2024-02-05T09:30:00Z",
            "2024-02-05",
            "2024-13-05T09:30:00.000Z",
            "hello",
        ] {
            let formatted = format_cell(Some(&Value::from(text)));
            assert_eq!(formatted != text, looks_like_iso_date(text), "{text}");
        }
        assert_eq!(
            format_cell(Some(&Value::from("2024-02-05T09:30:00.000Z"))),
            "05/02/2024"
        );
    }

    #[test]
    fn from_json_accepts_scalars_and_rejects_nested_values() {
        assert_eq!(Value::from_json(&json!(null)), Ok(None));
        assert_eq!(Value::from_json(&json!(7)), Ok(Some(Value::Integer(7))));
        assert_eq!(Value::from_json(&json!(2.5)), Ok(Some(Value::Float(2.5))));
        assert_eq!(
            Value::from_json(&json!("Bob")),
            Ok(Some(Value::String("Bob".into())))
        );
        assert_eq!(Value::from_json(&json!({"a": 1})), Err("an object"));
        assert_eq!(Value::from_json(&json!([1])), Err("an array"));
    }

    #[test]
    fn whole_floats_display_without_fraction() {
        assert_eq!(Value::Float(3.0).as_display(), "3");
        assert_eq!(Value::Float(3.25).as_display(), "3.25");
    }

    #[test]
    fn slash_dates_check_shape_but_not_calendar() {
        let valid = parse_slash_date(&Value::from("15/03/2022"));
        assert_eq!(
            valid,
            Some(SlashDate::Valid(NaiveDate::from_ymd_opt(2022, 3, 15).unwrap()))
        );
        assert_eq!(
            parse_slash_date(&Value::from("99/99/9999")),
            Some(SlashDate::Invalid)
        );
        assert_eq!(parse_slash_date(&Value::from("1/3/2022")), None);
        assert_eq!(parse_slash_date(&Value::from("on 15/03/2022")), None);
        assert_eq!(parse_slash_date(&Value::Integer(15032022)), None);
    }

    #[test]
    fn iso_detection_requires_exact_round_trip() {
        assert!(looks_like_iso_date("2023-12-01T00:00:00.000Z"));
        assert!(!looks_like_iso_date("2023-12-01"));
        assert!(!looks_like_iso_date("2023-12-01T00:00:00Z"));
        assert!(!looks_like_iso_date("2023-02-30T00:00:00.000Z"));
    }

    #[test]
    fn format_cell_handles_missing_falsy_and_instants() {
        assert_eq!(format_cell(None), "N/A");
        assert_eq!(format_cell(Some(&Value::from(""))), "N/A");
        assert_eq!(format_cell(Some(&Value::Integer(0))), "N/A");
        assert_eq!(format_cell(Some(&Value::Boolean(false))), "N/A");
        assert_eq!(
            format_cell(Some(&Value::from("2023-12-01T10:30:00.000Z"))),
            "01/12/2023"
        );
        assert_eq!(format_cell(Some(&Value::from("01/12/2023"))), "01/12/2023");
        assert_eq!(format_cell(Some(&Value::Integer(42))), "42");
    }

    #[test]
    fn mixed_kinds_order_by_rank() {
        assert_eq!(
            compare_generic(&Value::Integer(30), &Value::from("25")),
            Ordering::Less
        );
        assert_eq!(
            compare_generic(&Value::Integer(2), &Value::Float(2.5)),
            Ordering::Less
        );
    }
}
