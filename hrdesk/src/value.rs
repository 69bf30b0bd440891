//! # Value Module
//!
//! Dynamically typed cell values and the in-memory tabular result set that
//! query results are loaded into. Columns are not known at compile time, so every
//! `AnyRow` is decoded cell by cell into a [`Value`].

// ============================================================================
// External Crate Imports
// ============================================================================

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{any::AnyRow, Column, Row};

// ============================================================================
// Value Enum
// ============================================================================

/// Canonical text form used when a date/time value is bound or displayed.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single cell value, either read from storage or coerced from user input.
///
/// `Null` doubles as the NULL-marker produced by coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Double(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for `Null` and for text that is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Integer view of the value, parsing text when needed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(i64::from(*i)),
            Value::BigInt(i) => Some(*i),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(f64::from(*i)),
            Value::BigInt(i) => Some(*i as f64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Decodes column `index` of an `AnyRow`.
    ///
    /// The `Any` driver only exposes a handful of wire kinds, so the decode tries each of
    /// them in turn; a NULL cell succeeds on the first attempt.
    pub(crate) fn decode(row: &AnyRow, index: usize) -> Result<Value, sqlx::Error> {
        if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
            return Ok(v.map_or(Value::Null, Value::Bool));
        }
        if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
            return Ok(v.map_or(Value::Null, Value::BigInt));
        }
        if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
            return Ok(v.map_or(Value::Null, Value::Double));
        }
        if let Ok(v) = row.try_get::<Option<String>, _>(index) {
            return Ok(v.map_or(Value::Null, Value::Text));
        }
        let v = row.try_get::<Option<Vec<u8>>, _>(index)?;
        Ok(v.map_or(Value::Null, Value::Blob))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::BigInt(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::Text(s) => f.write_str(s),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::Blob(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::BigInt(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

// ============================================================================
// ResultSet Struct
// ============================================================================

/// A fully loaded query result: column headers plus rows of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Loads every row returned by a query.
    ///
    /// Column headers come from the first row; an empty result has no headers.
    pub fn from_rows(rows: &[AnyRow]) -> Result<Self, sqlx::Error> {
        let columns = rows
            .first()
            .map(|r| r.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(row.len());
            for i in 0..row.len() {
                cells.push(Value::decode(row, i)?);
            }
            out.push(cells);
        }

        Ok(Self { columns, rows: out })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matched case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }
}
