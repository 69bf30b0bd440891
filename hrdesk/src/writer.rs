//! # Writer Module
//!
//! Commits a single grid edit against any table. The writer decides per row whether
//! the edit becomes an INSERT (new row) or an UPDATE keyed on the primary key (existing
//! row), using a freshly introspected [`TableSchema`] for types and nullability.

// ============================================================================
// External Crate Imports
// ============================================================================

use std::collections::HashMap;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    coerce::coerce_typed,
    database::Database,
    schema::{SchemaIntrospector, TableSchema},
    statement::{count_by_key, select_by_key, update_by_key, InsertStatement},
    value::{ResultSet, Value},
    Error,
};

// ============================================================================
// Row Types
// ============================================================================

/// Change-tracking state of an in-memory row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// Created in the grid and not yet stored.
    Added,
    /// Loaded from (or already written to) storage.
    Unchanged,
}

/// An in-memory row: column name to value.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: HashMap<String, Value>,
    pub state: RowState,
}

impl Row {
    /// An empty row that has not been stored yet.
    pub fn added() -> Self {
        Self { values: HashMap::new(), state: RowState::Added }
    }

    /// Copies row `index` out of a loaded result set.
    pub fn from_result(result: &ResultSet, index: usize) -> Option<Self> {
        let cells = result.rows.get(index)?;
        let values = result.columns.iter().cloned().zip(cells.iter().cloned()).collect();
        Some(Self { values, state: RowState::Unchanged })
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .get(column)
            .or_else(|| self.values.iter().find(|(k, _)| k.eq_ignore_ascii_case(column)).map(|(_, v)| v))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// Stores typed-in text; blank text is kept as NULL.
    pub fn set_text(&mut self, column: impl Into<String>, text: &str) {
        let value = if text.trim().is_empty() { Value::Null } else { Value::Text(text.to_string()) };
        self.values.insert(column.into(), value);
    }

    /// Treats a loaded row as new, e.g. to store it again after it vanished from the
    /// table. Its stale key is ignored by the insert and replaced with the generated one.
    pub fn mark_added(&mut self) {
        self.state = RowState::Added;
    }

    /// A row is new when it is marked added or its key is missing or NULL.
    pub fn is_new(&self, key_column: &str) -> bool {
        self.state == RowState::Added || self.get(key_column).is_none_or(Value::is_null)
    }
}

/// One committed cell edit: the column and the text the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedCell {
    pub column: String,
    pub new_text: String,
}

impl EditedCell {
    pub fn new(column: impl Into<String>, new_text: impl Into<String>) -> Self {
        Self { column: column.into(), new_text: new_text.into() }
    }
}

/// What a successful commit did.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// A new row was stored under the generated key.
    Inserted { id: i64 },
    /// The existing row was updated; `verified` is the value read back afterwards.
    Updated { rows: u64, verified: Option<Value> },
    /// The UPDATE matched no rows.
    NotUpdated,
}

impl WriteOutcome {
    pub fn message(&self) -> String {
        match self {
            WriteOutcome::Inserted { id } => format!("Inserted 1 row with ID {}", id),
            WriteOutcome::Updated { rows, .. } => format!("Updated {} row(s)", rows),
            WriteOutcome::NotUpdated => "No rows were updated. Please check the data.".to_string(),
        }
    }
}

// ============================================================================
// DynamicRowWriter
// ============================================================================

pub struct DynamicRowWriter<'a> {
    db: &'a Database,
}

impl<'a> DynamicRowWriter<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Commits `edit` made on `row` of the selected `table`.
    ///
    /// On insert the generated key is written back into `row`, which is then no longer
    /// considered new. Nothing is sent when validation fails.
    pub async fn commit(&self, table: Option<&str>, row: &mut Row, edit: &EditedCell) -> Result<WriteOutcome, Error> {
        let table = table.filter(|t| !t.trim().is_empty()).ok_or(Error::NoTableSelected)?;
        let schema = SchemaIntrospector::new(self.db).describe(table).await;

        let key_column = schema
            .primary_key
            .clone()
            .ok_or_else(|| Error::schema("Could not determine the primary key for the table."))?;

        if !schema.has_column(&edit.column) {
            return Err(Error::schema(format!("Column {} does not exist in {}.", edit.column, table)));
        }

        if row.is_new(&key_column) {
            row.set_text(edit.column.clone(), &edit.new_text);
            let id = self.insert(&schema, row).await?;
            row.set(key_column, Value::BigInt(id));
            row.state = RowState::Unchanged;
            return Ok(WriteOutcome::Inserted { id });
        }

        let outcome = self.update(&schema, &key_column, row, edit).await?;
        if let WriteOutcome::Updated { verified, .. } = &outcome {
            let stored = verified.clone().unwrap_or_else(|| Value::Text(edit.new_text.clone()));
            row.set(edit.column.clone(), stored);
        }
        Ok(outcome)
    }

    /// Inserts every non-key column of `row`. A blank or unparsable value for a column
    /// that rejects NULL aborts the whole insert before anything is sent.
    pub async fn insert(&self, schema: &TableSchema, row: &Row) -> Result<i64, Error> {
        let key_column = schema
            .primary_key
            .as_deref()
            .ok_or_else(|| Error::schema("Could not determine the primary key for the table."))?;

        let columns = schema.insertable_columns();
        if columns.is_empty() {
            return Err(Error::schema("No columns available to insert."));
        }

        let mut insert = InsertStatement::new(&schema.name, key_column);
        for column in columns {
            let ty = schema.sql_type(&column.name);
            let value = match row.get(&column.name) {
                Some(v) if !v.is_blank() => coerce_typed(&v.to_string(), &ty),
                _ => Value::Null,
            };
            // Unparsable text coerces to NULL too.
            if value.is_null() && !column.nullable.allows() {
                return Err(Error::validation(format!(
                    "Column {} does not allow null values. Please enter a value.",
                    column.name
                )));
            }
            log::debug!("parameter {} = {:?}", column.name, value);
            insert.push(column.name.clone(), value, ty);
        }

        let id = insert.execute(self.db).await?;
        log::info!("inserted row into {} with {} = {}", schema.name, key_column, id);
        Ok(id)
    }

    async fn update(
        &self,
        schema: &TableSchema,
        key_column: &str,
        row: &Row,
        edit: &EditedCell,
    ) -> Result<WriteOutcome, Error> {
        let key = row
            .get(key_column)
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::validation("Invalid primary key value."))?;

        // The row may have been deleted by someone else since it was loaded.
        if count_by_key(self.db, &schema.name, key_column, key).await? == 0 {
            return Err(Error::StaleRow { column: key_column.to_string(), key });
        }

        let nullable = schema.allows_null(&edit.column).allows();
        let ty = schema.sql_type(&edit.column);
        let value = coerce_typed(&edit.new_text, &ty);
        if value.is_null() && !nullable {
            return Err(Error::validation(format!(
                "Column {} does not allow null values. Please enter a value.",
                edit.column
            )));
        }

        let rows = update_by_key(self.db, &schema.name, &edit.column, &value, &ty, key_column, key).await?;
        if rows == 0 {
            return Ok(WriteOutcome::NotUpdated);
        }

        let verified = select_by_key(self.db, &schema.name, &edit.column, key_column, key).await?;
        log::debug!("updated value in database: {:?}", verified);
        Ok(WriteOutcome::Updated { rows, verified })
    }
}
