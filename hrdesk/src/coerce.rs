//! # Coercion Module
//!
//! Turns free text typed by a user into a value typed after the destination column.
//!
//! Coercion never fails: blank input and input that does not parse for a numeric or
//! date/time column both become [`Value::Null`]. Callers that write to a column which
//! disallows NULL must check for that before sending anything.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::value::Value;

// ============================================================================
// SqlType Enum
// ============================================================================

/// The closed set of column types coercion distinguishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlType {
    Int,
    BigInt,
    Bit,
    DateTime,
    Text,
    /// Anything else; treated as opaque text.
    Other(String),
}

impl SqlType {
    /// Maps a lower- or upper-case type tag reported by the schema.
    ///
    /// Length or precision suffixes such as `(50)` are ignored, and the spellings used
    /// by Postgres, MySQL and SQLite are folded onto the same variants.
    pub fn from_tag(tag: &str) -> Self {
        let lower = tag.trim().to_ascii_lowercase();
        let base = lower.split('(').next().unwrap_or("").trim();

        match base {
            "int" | "integer" | "int4" | "smallint" | "int2" | "tinyint" | "mediumint" => SqlType::Int,
            "bigint" | "int8" => SqlType::BigInt,
            "bit" | "bool" | "boolean" => SqlType::Bit,
            "datetime" | "datetime2" | "smalldatetime" | "date" | "timestamp" => SqlType::DateTime,
            "nvarchar" | "varchar" | "nchar" | "char" | "text" | "ntext" | "character varying"
            | "character" => SqlType::Text,
            b if b.starts_with("timestamp") => SqlType::DateTime,
            _ => SqlType::Other(lower),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            SqlType::Int => "int",
            SqlType::BigInt => "bigint",
            SqlType::Bit => "bit",
            SqlType::DateTime => "datetime",
            SqlType::Text => "nvarchar",
            SqlType::Other(tag) => tag,
        }
    }
}

// ============================================================================
// Coercion
// ============================================================================

/// Coerces `text` for a column whose schema type tag is `data_type`.
pub fn coerce(text: &str, data_type: &str) -> Value {
    coerce_typed(text, &SqlType::from_tag(data_type))
}

pub fn coerce_typed(text: &str, ty: &SqlType) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }

    let parsed = match ty {
        SqlType::Int => trimmed.parse::<i32>().ok().map(Value::Int),
        SqlType::BigInt => trimmed.parse::<i64>().ok().map(Value::BigInt),
        SqlType::Bit => Some(Value::Bool(trimmed.eq_ignore_ascii_case("true") || trimmed == "1")),
        SqlType::DateTime => parse_datetime(trimmed).map(Value::DateTime),
        SqlType::Text | SqlType::Other(_) => Some(Value::Text(text.to_string())),
    };

    parsed.unwrap_or_else(|| {
        log::warn!("failed to format value {:?} for column type '{}'; using NULL", text, ty.tag());
        Value::Null
    })
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Parses the date and date/time spellings users commonly type.
///
/// A bare date means midnight.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
