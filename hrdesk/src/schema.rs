//! # Schema Module
//!
//! Live schema introspection. Nothing here is cached: every call goes back to the
//! database, so structural changes made a moment ago are always visible.
//!
//! Postgres and MySQL are read through `INFORMATION_SCHEMA.COLUMNS`,
//! `KEY_COLUMN_USAGE` and `TABLE_CONSTRAINTS`; SQLite through `PRAGMA table_info`.

// ============================================================================
// External Crate Imports
// ============================================================================

use std::fmt;

use sqlx::Row;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    coerce::SqlType,
    database::{Database, Drivers},
    Error,
};

/// Type tag reported when a column's type cannot be determined.
pub const FALLBACK_DATA_TYPE: &str = "nvarchar";

// ============================================================================
// Metadata Structs
// ============================================================================

/// Whether a column accepts NULL, as the schema reports it (`YES`/`NO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    Yes,
    No,
}

impl Nullability {
    pub fn allows(self) -> bool {
        self == Nullability::Yes
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Nullability::Yes => "YES",
            Nullability::No => "NO",
        }
    }
}

impl fmt::Display for Nullability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata about one column of a live table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// The column name in the database.
    pub name: String,
    /// Lower-cased type tag without length suffix (e.g. "int", "nvarchar").
    pub data_type: String,
    /// Whether this column allows NULL values.
    pub nullable: Nullability,
    /// Whether the column takes part in the table's primary key.
    pub is_primary_key: bool,
}

/// A table descriptor, recomputed on every [`SchemaIntrospector::describe`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    pub name: String,
    /// Columns in ordinal order.
    pub columns: Vec<ColumnInfo>,
    /// The single primary key column, if exactly one exists.
    pub primary_key: Option<String>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Type tag of `column`, `"nvarchar"` when the column is unknown.
    pub fn data_type(&self, column: &str) -> String {
        self.column(column).map_or_else(|| FALLBACK_DATA_TYPE.to_string(), |c| c.data_type.clone())
    }

    pub fn sql_type(&self, column: &str) -> SqlType {
        SqlType::from_tag(&self.data_type(column))
    }

    /// Nullability of `column`, `NO` when the column is unknown.
    pub fn allows_null(&self, column: &str) -> Nullability {
        self.column(column).map_or(Nullability::No, |c| c.nullable)
    }

    /// All columns except the primary key, in ordinal order.
    pub fn insertable_columns(&self) -> Vec<&ColumnInfo> {
        self.columns.iter().filter(|c| Some(&c.name) != self.primary_key.as_ref()).collect()
    }
}

fn normalize_type(declared: &str) -> String {
    let lower = declared.trim().to_ascii_lowercase();
    let base = lower.split('(').next().unwrap_or("").trim();
    if base.is_empty() { FALLBACK_DATA_TYPE.to_string() } else { base.to_string() }
}

// ============================================================================
// SchemaIntrospector
// ============================================================================

/// Answers questions about a table's structure against the live database.
///
/// The per-fact methods never fail: lookup errors are logged and replaced by a default
/// (no columns, no primary key, `nvarchar`, `NO`).
#[derive(Debug, Clone, Copy)]
pub struct SchemaIntrospector<'a> {
    db: &'a Database,
}

impl<'a> SchemaIntrospector<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Column names in ordinal order; empty when the lookup fails.
    pub async fn get_columns(&self, table: &str) -> Vec<String> {
        match self.load_columns(table).await {
            Ok(columns) => columns.into_iter().map(|c| c.name).collect(),
            Err(e) => {
                log::warn!("failed to load columns of {}: {}", table, e);
                Vec::new()
            }
        }
    }

    /// The single primary key column, or `None` when there is none, several, or the
    /// lookup fails.
    pub async fn get_primary_key(&self, table: &str) -> Option<String> {
        match self.primary_key_columns(table).await {
            Ok(mut keys) if keys.len() == 1 => keys.pop(),
            Ok(keys) => {
                if keys.len() > 1 {
                    log::warn!("table {} has a composite primary key ({}); not supported", table, keys.join(", "));
                }
                None
            }
            Err(e) => {
                log::warn!("failed to get primary key of {}: {}", table, e);
                None
            }
        }
    }

    /// Lower-cased type tag of a column; `"nvarchar"` on failure.
    pub async fn get_data_type(&self, table: &str, column: &str) -> String {
        match self.load_columns(table).await {
            Ok(columns) => columns
                .into_iter()
                .find(|c| c.name.eq_ignore_ascii_case(column))
                .map_or_else(|| FALLBACK_DATA_TYPE.to_string(), |c| c.data_type),
            Err(e) => {
                log::warn!("failed to get column data type of {}.{}: {}", table, column, e);
                FALLBACK_DATA_TYPE.to_string()
            }
        }
    }

    /// Whether a column accepts NULL; `NO` on failure.
    pub async fn allows_null(&self, table: &str, column: &str) -> Nullability {
        match self.load_columns(table).await {
            Ok(columns) => columns
                .into_iter()
                .find(|c| c.name.eq_ignore_ascii_case(column))
                .map_or(Nullability::No, |c| c.nullable),
            Err(e) => {
                log::warn!("failed to get column nullability of {}.{}: {}", table, column, e);
                Nullability::No
            }
        }
    }

    /// Whether `column` belongs to the table's primary key; `false` on failure.
    pub async fn is_primary_key(&self, table: &str, column: &str) -> bool {
        match self.primary_key_columns(table).await {
            Ok(keys) => keys.iter().any(|k| k.eq_ignore_ascii_case(column)),
            Err(e) => {
                log::warn!("failed to check primary key of {}: {}", table, e);
                false
            }
        }
    }

    /// Loads the whole table descriptor in one go.
    ///
    /// A failed lookup yields an empty descriptor, so the same defaults as the per-fact
    /// methods apply.
    pub async fn describe(&self, table: &str) -> TableSchema {
        let mut columns = match self.load_columns(table).await {
            Ok(columns) => columns,
            Err(e) => {
                log::warn!("failed to describe {}: {}", table, e);
                return TableSchema { name: table.to_string(), ..Default::default() };
            }
        };

        let keys = self.primary_key_columns(table).await.unwrap_or_else(|e| {
            log::warn!("failed to get primary key of {}: {}", table, e);
            Vec::new()
        });
        for col in &mut columns {
            col.is_primary_key = keys.iter().any(|k| k == &col.name);
        }

        let primary_key = if keys.len() == 1 { keys.into_iter().next() } else { None };
        TableSchema { name: table.to_string(), columns, primary_key }
    }

    async fn load_columns(&self, table: &str) -> Result<Vec<ColumnInfo>, Error> {
        let driver = self.db.driver();
        let rows = match driver {
            Drivers::Postgres => {
                let query = "SELECT column_name::TEXT, data_type::TEXT, is_nullable::TEXT FROM information_schema.columns WHERE table_name = $1 AND table_schema = current_schema() ORDER BY ordinal_position";
                sqlx::query(query).bind(table.to_string()).fetch_all(&self.db.pool).await?
            }
            Drivers::MySQL => {
                let query = "SELECT CAST(COLUMN_NAME AS CHAR), CAST(DATA_TYPE AS CHAR), CAST(IS_NULLABLE AS CHAR) FROM information_schema.columns WHERE TABLE_NAME = ? AND TABLE_SCHEMA = DATABASE() ORDER BY ORDINAL_POSITION";
                sqlx::query(query).bind(table.to_string()).fetch_all(&self.db.pool).await?
            }
            Drivers::SQLite => {
                let query = format!("PRAGMA table_info({})", driver.quote(table));
                sqlx::query(&query).fetch_all(&self.db.pool).await?
            }
        };

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let info = if let Drivers::SQLite = driver {
                let not_null: i64 = row.try_get("notnull")?;
                let pk: i64 = row.try_get("pk")?;
                ColumnInfo {
                    name: row.try_get("name")?,
                    data_type: normalize_type(&row.try_get::<String, _>("type")?),
                    // An INTEGER PRIMARY KEY is the rowid and can never be NULL.
                    nullable: if not_null != 0 || pk > 0 { Nullability::No } else { Nullability::Yes },
                    is_primary_key: false,
                }
            } else {
                let nullable: String = row.try_get(2)?;
                ColumnInfo {
                    name: row.try_get(0)?,
                    data_type: normalize_type(&row.try_get::<String, _>(1)?),
                    nullable: if nullable.eq_ignore_ascii_case("YES") { Nullability::Yes } else { Nullability::No },
                    is_primary_key: false,
                }
            };
            columns.push(info);
        }
        Ok(columns)
    }

    /// Every column referenced by the table's primary key constraint.
    ///
    /// Constraints named with the `PK_` convention count as primary keys too.
    async fn primary_key_columns(&self, table: &str) -> Result<Vec<String>, Error> {
        let driver = self.db.driver();
        let rows = match driver {
            Drivers::Postgres => {
                let query = "SELECT k.column_name::TEXT FROM information_schema.key_column_usage k JOIN information_schema.table_constraints c ON c.constraint_name = k.constraint_name AND c.table_schema = k.table_schema AND c.table_name = k.table_name WHERE k.table_name = $1 AND k.table_schema = current_schema() AND (c.constraint_type = 'PRIMARY KEY' OR k.constraint_name LIKE 'PK_%') ORDER BY k.ordinal_position";
                sqlx::query(query).bind(table.to_string()).fetch_all(&self.db.pool).await?
            }
            Drivers::MySQL => {
                let query = "SELECT CAST(k.COLUMN_NAME AS CHAR) FROM information_schema.KEY_COLUMN_USAGE k JOIN information_schema.TABLE_CONSTRAINTS c ON c.CONSTRAINT_NAME = k.CONSTRAINT_NAME AND c.TABLE_SCHEMA = k.TABLE_SCHEMA AND c.TABLE_NAME = k.TABLE_NAME WHERE k.TABLE_NAME = ? AND k.TABLE_SCHEMA = DATABASE() AND (c.CONSTRAINT_TYPE = 'PRIMARY KEY' OR k.CONSTRAINT_NAME LIKE 'PK_%') ORDER BY k.ORDINAL_POSITION";
                sqlx::query(query).bind(table.to_string()).fetch_all(&self.db.pool).await?
            }
            Drivers::SQLite => {
                let query = format!("PRAGMA table_info({})", driver.quote(table));
                let rows = sqlx::query(&query).fetch_all(&self.db.pool).await?;
                let mut keyed = Vec::new();
                for row in rows {
                    let pk: i64 = row.try_get("pk")?;
                    if pk > 0 {
                        keyed.push((pk, row.try_get::<String, _>("name")?));
                    }
                }
                keyed.sort_by_key(|(pos, _)| *pos);
                return Ok(keyed.into_iter().map(|(_, name)| name).collect());
            }
        };

        let mut keys = Vec::with_capacity(rows.len());
        for row in rows {
            keys.push(row.try_get::<String, _>(0)?);
        }
        Ok(keys)
    }
}
