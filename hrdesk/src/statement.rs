//! # Statement Module
//!
//! Builders for the parameterized statements issued against arbitrary tables.
//! Identifiers are always quoted for the target engine; values always travel as bound
//! parameters.

// ============================================================================
// External Crate Imports
// ============================================================================

use sqlx::any::AnyArguments;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    coerce::SqlType,
    database::{bind_value, Connection, Drivers},
    value::Value,
    Error,
};

// ============================================================================
// Parameter List
// ============================================================================

/// Accumulates bound arguments and hands out the matching placeholders.
pub(crate) struct Params {
    driver: Drivers,
    args: AnyArguments<'static>,
    count: usize,
}

impl Params {
    pub(crate) fn new(driver: Drivers) -> Self {
        Self { driver, args: AnyArguments::default(), count: 0 }
    }

    /// Binds `value` and returns the placeholder to splice into the SQL text.
    pub(crate) fn push(&mut self, value: &Value, ty: &SqlType) -> Result<String, Error> {
        bind_value(&mut self.args, value, ty)?;
        self.count += 1;
        Ok(self.driver.typed_placeholder(self.count, ty))
    }

    pub(crate) fn into_args(self) -> AnyArguments<'static> {
        self.args
    }
}

// ============================================================================
// INSERT
// ============================================================================

/// `INSERT INTO table (...) VALUES (...)` returning the generated key.
pub struct InsertStatement {
    table: String,
    key_column: String,
    values: Vec<(String, Value, SqlType)>,
}

impl InsertStatement {
    /// `key_column` is the identity column whose generated value is returned.
    pub fn new(table: impl Into<String>, key_column: impl Into<String>) -> Self {
        Self { table: table.into(), key_column: key_column.into(), values: Vec::new() }
    }

    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>, ty: SqlType) -> Self {
        self.values.push((column.into(), value.into(), ty));
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: Value, ty: SqlType) {
        self.values.push((column.into(), value, ty));
    }

    /// Executes the insert and returns the engine-generated identifier.
    pub async fn execute<C: Connection>(self, conn: &C) -> Result<i64, Error> {
        let driver = conn.driver();
        let mut params = Params::new(driver);
        let mut columns = Vec::with_capacity(self.values.len());
        let mut placeholders = Vec::with_capacity(self.values.len());

        for (column, value, ty) in &self.values {
            columns.push(driver.quote(column));
            placeholders.push(params.push(value, ty)?);
        }

        let table = driver.quote(&self.table);
        let mut sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", table)
        } else {
            format!("INSERT INTO {} ({}) VALUES ({})", table, columns.join(", "), placeholders.join(", "))
        };

        log::debug!("executing insert: {}", sql);

        if let Drivers::Postgres = driver {
            sql.push_str(&format!(" RETURNING {}", driver.quote(&self.key_column)));
            let row = conn.fetch_one(&sql, params.into_args()).await?;
            let id = Value::decode(&row, 0)?;
            return id
                .as_i64()
                .ok_or_else(|| Error::schema(format!("generated key {} is not an integer", self.key_column)));
        }

        let result = conn.execute(&sql, params.into_args()).await?;
        result
            .last_insert_id()
            .ok_or_else(|| Error::schema(format!("the database did not report a generated {}", self.key_column)))
    }
}

// ============================================================================
// WHERE helpers
// ============================================================================

/// `SELECT COUNT(*) FROM table WHERE key = ?`
pub async fn count_by_key<C: Connection>(conn: &C, table: &str, key_column: &str, key: i64) -> Result<i64, Error> {
    let driver = conn.driver();
    let mut params = Params::new(driver);
    let placeholder = params.push(&Value::BigInt(key), &SqlType::BigInt)?;
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = {}",
        driver.quote(table),
        driver.quote(key_column),
        placeholder
    );

    let row = conn.fetch_one(&sql, params.into_args()).await?;
    Ok(Value::decode(&row, 0)?.as_i64().unwrap_or(0))
}

/// `UPDATE table SET column = ? WHERE key = ?`, returning the affected row count.
pub async fn update_by_key<C: Connection>(
    conn: &C,
    table: &str,
    column: &str,
    value: &Value,
    ty: &SqlType,
    key_column: &str,
    key: i64,
) -> Result<u64, Error> {
    let driver = conn.driver();
    let mut params = Params::new(driver);
    let value_ph = params.push(value, ty)?;
    let key_ph = params.push(&Value::BigInt(key), &SqlType::BigInt)?;
    let sql = format!(
        "UPDATE {} SET {} = {} WHERE {} = {}",
        driver.quote(table),
        driver.quote(column),
        value_ph,
        driver.quote(key_column),
        key_ph
    );

    log::debug!("executing update: {} [{} = {}]", sql, key_column, key);
    let result = conn.execute(&sql, params.into_args()).await?;
    Ok(result.rows_affected())
}

/// `DELETE FROM table WHERE key = ?`, returning the affected row count.
pub async fn delete_by_key<C: Connection>(conn: &C, table: &str, key_column: &str, key: i64) -> Result<u64, Error> {
    let driver = conn.driver();
    let mut params = Params::new(driver);
    let placeholder = params.push(&Value::BigInt(key), &SqlType::BigInt)?;
    let sql = format!("DELETE FROM {} WHERE {} = {}", driver.quote(table), driver.quote(key_column), placeholder);

    log::debug!("executing delete: {} [{} = {}]", sql, key_column, key);
    let result = conn.execute(&sql, params.into_args()).await?;
    Ok(result.rows_affected())
}

/// `SELECT column FROM table WHERE key = ?`
pub async fn select_by_key<C: Connection>(
    conn: &C,
    table: &str,
    column: &str,
    key_column: &str,
    key: i64,
) -> Result<Option<Value>, Error> {
    let driver = conn.driver();
    let mut params = Params::new(driver);
    let placeholder = params.push(&Value::BigInt(key), &SqlType::BigInt)?;
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        driver.quote(column),
        driver.quote(table),
        driver.quote(key_column),
        placeholder
    );

    match conn.fetch_optional(&sql, params.into_args()).await? {
        Some(row) => Ok(Some(Value::decode(&row, 0)?)),
        None => Ok(None),
    }
}

pub fn select_all_sql(driver: Drivers, table: &str) -> String {
    format!("SELECT * FROM {}", driver.quote(table))
}
