//! # Filter Module
//!
//! Row filters over the current table: `column op value` conditions joined with AND.
//! Columns must exist in the live schema and values are coerced to the column type
//! before they are bound.

// ============================================================================
// External Crate Imports
// ============================================================================

use std::{fmt, str::FromStr, sync::Arc};

use sqlx::any::AnyArguments;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    coerce::{coerce_typed, SqlType},
    database::Connection,
    schema::TableSchema,
    session::Session,
    statement::{select_all_sql, Params},
    value::ResultSet,
    Error,
};

// ============================================================================
// Op Enum
// ============================================================================

/// Comparison operators available to filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl Op {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::NotEq => "<>",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Like => "LIKE",
        }
    }
}

impl FromStr for Op {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "=" | "==" => Ok(Op::Eq),
            "!=" | "<>" => Ok(Op::NotEq),
            ">" => Ok(Op::Gt),
            ">=" => Ok(Op::Gte),
            "<" => Ok(Op::Lt),
            "<=" => Ok(Op::Lte),
            "like" => Ok(Op::Like),
            other => Err(Error::validation(format!("Unknown filter operator '{}'.", other))),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

// ============================================================================
// Filter Struct
// ============================================================================

/// One `column op value` condition; `value` is the text the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: Op,
    pub value: String,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<String>) -> Self {
        Self { column: column.into(), op, value: value.into() }
    }

    /// Parses `column op value`, e.g. `Salary >= 1000` or `LastName like Kov%`.
    pub fn parse(expr: &str) -> Result<Self, Error> {
        let malformed = || Error::validation(format!("Filter '{}' must look like: column op value", expr));
        let (column, rest) = expr.trim().split_once(char::is_whitespace).ok_or_else(malformed)?;
        let rest = rest.trim_start();
        let (op, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if op.is_empty() {
            return Err(malformed());
        }
        Ok(Self::new(column, op.parse()?, value.trim()))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op, self.value)
    }
}

/// Human-readable summary of a filter list, used as a report description.
pub fn describe_filters(table: &str, filters: &[Filter]) -> String {
    if filters.is_empty() {
        return format!("All rows of {}", table);
    }
    let conditions: Vec<String> = filters.iter().map(Filter::to_string).collect();
    format!("{} where {}", table, conditions.join(" AND "))
}

/// Runs `SELECT * FROM table WHERE ...` for `filters` against `schema`.
pub async fn select_filtered<C: Connection>(
    conn: &C,
    schema: &TableSchema,
    filters: &[Filter],
) -> Result<ResultSet, Error> {
    let driver = conn.driver();
    let mut params = Params::new(driver);
    let mut conditions = Vec::with_capacity(filters.len());

    for filter in filters {
        let column = schema.column(&filter.column).ok_or_else(|| {
            Error::validation(format!("Column {} does not exist in {}.", filter.column, schema.name))
        })?;

        // LIKE patterns are matched as text whatever the column type is.
        let ty = if filter.op == Op::Like { SqlType::Text } else { schema.sql_type(&column.name) };
        let value = coerce_typed(&filter.value, &ty);
        if value.is_null() {
            return Err(Error::validation(format!(
                "Filter value '{}' is not valid for column {} ({}).",
                filter.value,
                column.name,
                ty.tag()
            )));
        }

        let mut target = driver.quote(&column.name);
        if filter.op == Op::Like && schema.sql_type(&column.name) != SqlType::Text {
            target = driver.cast_to_text(&target);
        }
        let placeholder = params.push(&value, &ty)?;
        conditions.push(format!("{} {} {}", target, filter.op.as_sql(), placeholder));
    }

    let mut sql = select_all_sql(driver, &schema.name);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    log::debug!("executing filter: {}", sql);
    let rows = if conditions.is_empty() {
        conn.fetch_all(&sql, AnyArguments::default()).await?
    } else {
        conn.fetch_all(&sql, params.into_args()).await?
    };
    Ok(ResultSet::from_rows(&rows)?)
}

impl Session {
    /// Filters the current table and publishes the matching rows to both views.
    pub async fn filter_rows(&mut self, filters: &[Filter]) -> Result<Arc<ResultSet>, Error> {
        let table = self.require_table()?;
        let schema = self.introspector().describe(&table).await;
        if schema.columns.is_empty() {
            return Err(Error::schema(format!("No columns available in {}.", table)));
        }

        let mut result = select_filtered(self.database(), &schema, filters).await?;
        if result.columns.is_empty() {
            result.columns = schema.column_names();
        }

        let result = Arc::new(result);
        self.publish(Arc::clone(&result));
        Ok(result)
    }
}
