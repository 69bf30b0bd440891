//! # DDL Module
//!
//! Structural changes issued from the front end: creating and dropping tables, adding,
//! renaming and dropping columns. Names typed by the user are validated before they
//! are interpolated; names picked from the live schema are checked for membership.

// ============================================================================
// External Crate Imports
// ============================================================================

use std::{fmt, str::FromStr};

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    confirm::Confirm,
    database::Drivers,
    ident::validate_identifier,
    session::Session,
    Error,
};

// ============================================================================
// ColumnType Enum
// ============================================================================

/// Column types that can be added from the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    NVarChar50,
    DateTime,
    Bit,
}

impl ColumnType {
    pub const ALL: [ColumnType; 4] = [ColumnType::Int, ColumnType::NVarChar50, ColumnType::DateTime, ColumnType::Bit];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "INT",
            ColumnType::NVarChar50 => "NVARCHAR(50)",
            ColumnType::DateTime => "DATETIME",
            ColumnType::Bit => "BIT",
        }
    }

    /// The engine's spelling of this type.
    pub fn sql(&self, driver: Drivers) -> &'static str {
        match (self, driver) {
            (ColumnType::Int, Drivers::Postgres) => "INTEGER",
            (ColumnType::Int, _) => "INT",
            (ColumnType::NVarChar50, Drivers::Postgres) => "VARCHAR(50)",
            (ColumnType::NVarChar50, _) => "NVARCHAR(50)",
            (ColumnType::DateTime, Drivers::Postgres) => "TIMESTAMP",
            (ColumnType::DateTime, Drivers::MySQL) => "DATETIME",
            // Keeps text affinity, so the driver reads the values back as text.
            (ColumnType::DateTime, Drivers::SQLite) => "DATETIME2",
            (ColumnType::Bit, Drivers::SQLite) => "BIT",
            (ColumnType::Bit, _) => "BOOLEAN",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        ColumnType::ALL.into_iter().find(|t| t.as_str() == upper).ok_or_else(|| {
            Error::validation("Invalid or unsupported data type. Choose from INT, NVARCHAR(50), DATETIME, BIT.")
        })
    }
}

/// Result of a rename request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { from: String, to: String },
    Unchanged,
}

/// Definition of the identity column every new table starts with.
pub(crate) fn identity_column(driver: Drivers, name: &str) -> String {
    let quoted = driver.quote(name);
    match driver {
        Drivers::Postgres => format!("{} SERIAL PRIMARY KEY", quoted),
        Drivers::MySQL => format!("{} INT AUTO_INCREMENT PRIMARY KEY", quoted),
        Drivers::SQLite => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted),
    }
}

// ============================================================================
// Session Operations
// ============================================================================

impl Session {
    /// Creates `name` with a single auto-increment `ID` primary key.
    pub async fn add_table(&mut self, name: &str) -> Result<(), Error> {
        let name = validate_identifier(name, "table")?.to_string();
        let driver = self.database().driver();
        let sql = format!("CREATE TABLE {} ({})", driver.quote(&name), identity_column(driver, "ID"));

        log::debug!("executing: {}", sql);
        self.database().raw(&sql).execute().await?;
        log::info!("table '{}' created", name);

        self.refresh_tables().await?;
        Ok(())
    }

    /// Drops a known table after confirmation.
    pub async fn drop_table(&mut self, name: &str, confirm: &dyn Confirm) -> Result<(), Error> {
        let name = name.trim().to_string();
        if name.is_empty() || !self.tables().iter().any(|t| t == &name) {
            return Err(Error::validation("Selected table name is invalid."));
        }
        if !confirm.confirm(&format!(
            "Are you sure you want to delete the table '{}'? This action cannot be undone.",
            name
        )) {
            return Err(Error::Cancelled);
        }

        let sql = format!("DROP TABLE {}", self.database().driver().quote(&name));
        self.database().raw(&sql).execute().await?;
        log::info!("table '{}' dropped", name);

        if self.current_table() == Some(name.as_str()) {
            self.clear_selection();
        }
        self.refresh_tables().await?;
        Ok(())
    }

    /// Adds a column to the current table.
    pub async fn add_column(&mut self, name: &str, column_type: ColumnType) -> Result<(), Error> {
        let table = self.require_table()?;
        let name = validate_identifier(name, "column")?.to_string();
        let driver = self.database().driver();

        let sql = format!(
            "ALTER TABLE {} ADD {} {}",
            driver.quote(&table),
            driver.quote(&name),
            column_type.sql(driver)
        );
        self.database().raw(&sql).execute().await?;
        log::info!("column '{}' added to '{}'", name, table);

        self.reload().await?;
        Ok(())
    }

    /// Renames an existing column of the current table.
    pub async fn rename_column(&mut self, current: &str, new_name: &str) -> Result<RenameOutcome, Error> {
        let table = self.require_table()?;
        let columns = self.introspector().get_columns(&table).await;
        if columns.is_empty() {
            return Err(Error::schema("No columns available to edit."));
        }
        if !columns.iter().any(|c| c == current) {
            return Err(Error::validation("Invalid column name."));
        }

        let new_name = new_name.trim();
        if new_name.is_empty() || new_name == current {
            return Ok(RenameOutcome::Unchanged);
        }
        let new_name = validate_identifier(new_name, "column")?;

        let driver = self.database().driver();
        let sql = format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            driver.quote(&table),
            driver.quote(current),
            driver.quote(new_name)
        );
        self.database().raw(&sql).execute().await?;
        log::info!("column '{}' renamed to '{}'", current, new_name);

        self.reload().await?;
        Ok(RenameOutcome::Renamed { from: current.to_string(), to: new_name.to_string() })
    }

    /// Drops a column of the current table after confirmation. The primary key column
    /// cannot be dropped.
    pub async fn drop_column(&mut self, name: &str, confirm: &dyn Confirm) -> Result<(), Error> {
        let table = self.require_table()?;
        let columns = self.introspector().get_columns(&table).await;
        if columns.is_empty() {
            return Err(Error::schema("No columns available to delete."));
        }
        if !columns.iter().any(|c| c == name) {
            return Err(Error::validation("Invalid column name."));
        }
        if self.introspector().is_primary_key(&table, name).await {
            return Err(Error::validation("Cannot delete the primary key column."));
        }
        if !confirm.confirm(&format!(
            "Are you sure you want to delete the column '{}' from '{}'? This action cannot be undone.",
            name, table
        )) {
            return Err(Error::Cancelled);
        }

        let driver = self.database().driver();
        let sql = format!("ALTER TABLE {} DROP COLUMN {}", driver.quote(&table), driver.quote(name));
        self.database().raw(&sql).execute().await?;
        log::info!("column '{}' deleted from '{}'", name, table);

        self.reload().await?;
        Ok(())
    }
}
