//! # Database Module
//!
//! This module provides the connection handling for hrdesk. It owns the sqlx `Any`
//! pool, detects which engine the URL points at and exposes the small amount of
//! engine-specific SQL spelling (identifier quoting, placeholders) the rest of the
//! crate needs.

// ============================================================================
// External Crate Imports
// ============================================================================

use futures::future::BoxFuture;
use sqlx::{
    any::{AnyArguments, AnyQueryResult, AnyRow},
    AnyPool, Arguments, Row,
};

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    coerce::SqlType,
    transaction::Transaction,
    value::{ResultSet, Value, DATETIME_FORMAT},
    Error,
};

// ============================================================================
// Database Driver Enum
// ============================================================================

/// Database engines reachable through the sqlx `Any` driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drivers {
    /// PostgreSQL driver
    Postgres,
    /// MySQL driver
    MySQL,
    /// SQLite driver
    SQLite,
}

impl Drivers {
    /// Detects the engine from the connection URL scheme.
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres") {
            Drivers::Postgres
        } else if url.starts_with("mysql") || url.starts_with("mariadb") {
            Drivers::MySQL
        } else {
            Drivers::SQLite
        }
    }

    /// Quotes an identifier for interpolation into SQL text.
    ///
    /// Embedded quote characters are doubled, so even names that came from the schema
    /// cannot terminate the quoted identifier.
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Drivers::MySQL => format!("`{}`", ident.replace('`', "``")),
            _ => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }

    /// Positional parameter placeholder (1-based).
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Drivers::Postgres => format!("${}", index),
            _ => "?".to_string(),
        }
    }

    /// Converts a non-text expression to text, e.g. for a `LIKE` on a numeric column.
    pub fn cast_to_text(&self, expr: &str) -> String {
        match self {
            Drivers::MySQL => format!("CAST({} AS CHAR)", expr),
            _ => format!("CAST({} AS TEXT)", expr),
        }
    }

    /// Placeholder for a value bound against a column of type `ty`.
    ///
    /// Date/time values travel as text, so Postgres needs an explicit cast.
    pub fn typed_placeholder(&self, index: usize, ty: &SqlType) -> String {
        match (self, ty) {
            (Drivers::Postgres, SqlType::DateTime) => format!("CAST(${} AS TIMESTAMP)", index),
            _ => self.placeholder(index),
        }
    }
}

// ============================================================================
// Database Struct
// ============================================================================

/// Pooled access to one database.
///
/// Cloning is cheap (the pool is reference counted). Statements acquire a pooled
/// connection for their own duration only.
#[derive(Debug, Clone)]
pub struct Database {
    /// The underlying SQLx connection pool
    pub(crate) pool: AnyPool,
    /// The detected database driver
    pub(crate) driver: Drivers,
}

// ============================================================================
// Database Implementation
// ============================================================================

impl Database {
    /// Creates a new DatabaseBuilder for configuring the connection.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Connects to a database using the provided connection string.
    pub async fn connect(url: &str) -> Result<Self, Error> {
        DatabaseBuilder::new().connect(url).await
    }

    pub fn driver(&self) -> Drivers {
        self.driver
    }

    /// Creates a raw SQL query builder.
    pub fn raw<'a>(&self, sql: &'a str) -> RawQuery<'a, Self> {
        RawQuery::new(self.clone(), sql)
    }

    /// Starts a new database transaction.
    pub async fn begin(&self) -> Result<Transaction, Error> {
        let tx = self.pool.begin().await?;
        Ok(Transaction::new(tx, self.driver))
    }

    /// Lists the base tables of the connected database.
    pub async fn list_tables(&self) -> Result<Vec<String>, Error> {
        let query = match self.driver {
            Drivers::Postgres => {
                "SELECT table_name::TEXT FROM information_schema.tables WHERE table_type = 'BASE TABLE' AND table_schema = current_schema() ORDER BY table_name"
            }
            Drivers::MySQL => {
                "SELECT CAST(TABLE_NAME AS CHAR) FROM information_schema.tables WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_SCHEMA = DATABASE() ORDER BY TABLE_NAME"
            }
            Drivers::SQLite => {
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name"
            }
        };

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            tables.push(row.try_get::<String, _>(0)?);
        }
        Ok(tables)
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// ============================================================================
// DatabaseBuilder Struct
// ============================================================================

pub struct DatabaseBuilder {
    max_connections: u32,
}

impl Default for DatabaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseBuilder {
    pub fn new() -> Self {
        Self { max_connections: 5 }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub async fn connect(self, url: &str) -> Result<Database, Error> {
        if url.trim().is_empty() {
            return Err(Error::Connection("connection string is empty".to_string()));
        }

        sqlx::any::install_default_drivers();
        let pool = sqlx::any::AnyPoolOptions::new()
            .max_connections(self.max_connections)
            .connect(url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let driver = Drivers::from_url(url);
        log::debug!("connected using {:?} driver", driver);
        Ok(Database { pool, driver })
    }
}

// ============================================================================
// Connection Trait
// ============================================================================

/// Something statements can be executed against: the pool or an open transaction.
pub trait Connection: Send + Sync {
    fn driver(&self) -> Drivers;
    fn execute<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<AnyQueryResult, sqlx::Error>>;
    fn fetch_all<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<Vec<AnyRow>, sqlx::Error>>;
    fn fetch_one<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<AnyRow, sqlx::Error>>;
    fn fetch_optional<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<Option<AnyRow>, sqlx::Error>>;
}

impl Connection for Database {
    fn driver(&self) -> Drivers {
        self.driver
    }
    fn execute<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<AnyQueryResult, sqlx::Error>> {
        Box::pin(async move { sqlx::query_with(sql, args).execute(&self.pool).await })
    }
    fn fetch_all<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<Vec<AnyRow>, sqlx::Error>> {
        Box::pin(async move { sqlx::query_with(sql, args).fetch_all(&self.pool).await })
    }
    fn fetch_one<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<AnyRow, sqlx::Error>> {
        Box::pin(async move { sqlx::query_with(sql, args).fetch_one(&self.pool).await })
    }
    fn fetch_optional<'a, 'q: 'a>(&'a self, sql: &'q str, args: AnyArguments<'q>) -> BoxFuture<'a, Result<Option<AnyRow>, sqlx::Error>> {
        Box::pin(async move { sqlx::query_with(sql, args).fetch_optional(&self.pool).await })
    }
}

// ============================================================================
// Value Binding
// ============================================================================

/// Appends `value` to `args`, typing a NULL after the destination column.
pub(crate) fn bind_value<'q>(args: &mut AnyArguments<'q>, value: &Value, ty: &SqlType) -> Result<(), Error> {
    let added = match value {
        Value::Null => match ty {
            SqlType::Int => args.add(None::<i32>),
            SqlType::BigInt => args.add(None::<i64>),
            SqlType::Bit => args.add(None::<bool>),
            _ => args.add(None::<String>),
        },
        Value::Bool(b) => args.add(*b),
        Value::Int(i) => args.add(*i),
        Value::BigInt(i) => args.add(*i),
        Value::Double(d) => args.add(*d),
        Value::Text(s) => args.add(s.clone()),
        Value::DateTime(dt) => args.add(dt.format(DATETIME_FORMAT).to_string()),
        Value::Blob(bytes) => args.add(bytes.clone()),
    };
    added.map_err(|e| Error::Statement(sqlx::Error::Encode(e)))
}

// ============================================================================
// Raw SQL Query Builder
// ============================================================================

/// Unparameterized SQL run as-is, e.g. scripts and DDL.
pub struct RawQuery<'a, C> {
    conn: C,
    sql: &'a str,
}

impl<'a, C> RawQuery<'a, C>
where
    C: Connection,
{
    pub(crate) fn new(conn: C, sql: &'a str) -> Self {
        Self { conn, sql }
    }

    /// Loads the full result into a [`ResultSet`].
    pub async fn fetch_result_set(self) -> Result<ResultSet, Error> {
        let rows = self.conn.fetch_all(self.sql, AnyArguments::default()).await?;
        Ok(ResultSet::from_rows(&rows)?)
    }

    /// Returns the first column of the first row, if any.
    pub async fn fetch_scalar(self) -> Result<Option<Value>, Error> {
        match self.conn.fetch_optional(self.sql, AnyArguments::default()).await? {
            Some(row) => Ok(Some(Value::decode(&row, 0)?)),
            None => Ok(None),
        }
    }

    pub async fn execute(self) -> Result<u64, Error> {
        let result = self.conn.execute(self.sql, AnyArguments::default()).await?;
        Ok(result.rows_affected())
    }
}
