//! # Session Module
//!
//! The explicit context every operation runs in. A `Session` exists only while a
//! connection is established; it owns the pool, the list of tables, the current table
//! selection and the two result views the front end displays.

// ============================================================================
// External Crate Imports
// ============================================================================

use std::sync::Arc;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    confirm::Confirm,
    database::Database,
    schema::SchemaIntrospector,
    script::{ScriptReport, ScriptRunner},
    statement::{count_by_key, delete_by_key, select_all_sql},
    value::{ResultSet, Value},
    writer::{DynamicRowWriter, EditedCell, Row, RowState, WriteOutcome},
    Error,
};

// ============================================================================
// ResultViews
// ============================================================================

/// The browse view and the query-result view.
///
/// Both always point at the same result set; they are only ever reassigned together.
#[derive(Debug, Clone, Default)]
pub struct ResultViews {
    browse: Option<Arc<ResultSet>>,
    query: Option<Arc<ResultSet>>,
}

impl ResultViews {
    pub fn publish(&mut self, result: Arc<ResultSet>) {
        self.browse = Some(Arc::clone(&result));
        self.query = Some(result);
    }

    pub fn clear(&mut self) {
        self.browse = None;
        self.query = None;
    }

    pub fn browse(&self) -> Option<&Arc<ResultSet>> {
        self.browse.as_ref()
    }

    pub fn query(&self) -> Option<&Arc<ResultSet>> {
        self.query.as_ref()
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug)]
pub struct Session {
    db: Database,
    tables: Vec<String>,
    current_table: Option<String>,
    last_script: Option<String>,
    views: ResultViews,
}

impl Session {
    /// Connects and loads the table list. No session exists if either step fails.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, Error> {
        let db = Database::builder().max_connections(max_connections).connect(url).await?;
        Self::open(db).await
    }

    /// Builds a session on an already connected database.
    pub async fn open(db: Database) -> Result<Self, Error> {
        let tables = match db.list_tables().await {
            Ok(tables) => tables,
            Err(e) => {
                db.close().await;
                return Err(Error::Connection(format!("failed to load table names: {}", e)));
            }
        };

        log::info!("session opened with {} table(s)", tables.len());
        Ok(Self { db, tables, current_table: None, last_script: None, views: ResultViews::default() })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn introspector(&self) -> SchemaIntrospector<'_> {
        SchemaIntrospector::new(&self.db)
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub async fn refresh_tables(&mut self) -> Result<&[String], Error> {
        self.tables = self.db.list_tables().await?;
        Ok(&self.tables)
    }

    pub fn current_table(&self) -> Option<&str> {
        self.current_table.as_deref()
    }

    /// The script most recently run or generated (e.g. `SELECT * FROM ...`).
    pub fn last_script(&self) -> Option<&str> {
        self.last_script.as_deref()
    }

    pub fn views(&self) -> &ResultViews {
        &self.views
    }

    /// Row `index` of the browse view, ready to be edited.
    pub fn row(&self, index: usize) -> Option<Row> {
        self.views.browse().and_then(|rs| Row::from_result(rs, index))
    }

    pub(crate) fn require_table(&self) -> Result<String, Error> {
        self.current_table.clone().ok_or(Error::NoTableSelected)
    }

    pub(crate) fn publish(&mut self, result: Arc<ResultSet>) {
        self.views.publish(result);
    }

    pub(crate) fn clear_selection(&mut self) {
        self.current_table = None;
        self.last_script = None;
        self.views.clear();
    }

    /// Selects a table and loads its contents into both views.
    pub async fn select_table(&mut self, table: &str) -> Result<Arc<ResultSet>, Error> {
        let table = table.trim();
        if table.is_empty() || !self.tables.iter().any(|t| t == table) {
            return Err(Error::validation(format!("Selected table name '{}' is invalid.", table)));
        }

        self.current_table = Some(table.to_string());
        self.reload().await
    }

    /// Re-reads the whole current table from storage.
    pub async fn reload(&mut self) -> Result<Arc<ResultSet>, Error> {
        let table = self.require_table()?;
        let sql = select_all_sql(self.db.driver(), &table);
        let report = self.run_script(&sql).await;
        let outcomes = report.into_result()?;

        let mut result = outcomes
            .into_iter()
            .find_map(|o| o.rows().cloned())
            .unwrap_or_default();

        // An empty table returns no headers; take them from the schema instead.
        if result.columns.is_empty() {
            let columns = self.introspector().get_columns(&table).await;
            result = Arc::new(ResultSet { columns, rows: Vec::new() });
            self.views.publish(Arc::clone(&result));
        }

        Ok(result)
    }

    /// Runs a script and publishes every result set it returns to both views.
    pub async fn run_script(&mut self, script: &str) -> ScriptReport {
        self.last_script = Some(script.to_string());
        let report = ScriptRunner::new(&self.db).run(script).await;
        for outcome in &report.outcomes {
            if let Some(rows) = outcome.rows() {
                self.views.publish(Arc::clone(rows));
            }
        }
        report
    }

    /// Commits one grid edit on the current table, then reloads it.
    pub async fn commit_edit(&mut self, row: &mut Row, edit: &EditedCell) -> Result<WriteOutcome, Error> {
        let writer = DynamicRowWriter::new(&self.db);
        let outcome = writer.commit(self.current_table.as_deref(), row, edit).await?;
        if outcome != WriteOutcome::NotUpdated {
            self.reload().await?;
        }
        Ok(outcome)
    }

    /// Inserts a complete new row into the current table, then reloads it.
    pub async fn insert_row(&mut self, row: &mut Row) -> Result<WriteOutcome, Error> {
        let table = self.require_table()?;
        let schema = self.introspector().describe(&table).await;
        if let Some(unknown) = row.columns().find(|c| !schema.has_column(c)) {
            return Err(Error::schema(format!("Column {} does not exist in {}.", unknown, table)));
        }

        let id = DynamicRowWriter::new(&self.db).insert(&schema, row).await?;
        if let Some(key_column) = &schema.primary_key {
            row.set(key_column.clone(), Value::BigInt(id));
        }
        row.state = RowState::Unchanged;

        self.reload().await?;
        Ok(WriteOutcome::Inserted { id })
    }

    /// The loaded row of the current table whose primary key equals `key`.
    pub async fn find_row(&self, key: i64) -> Result<Option<Row>, Error> {
        let table = self.require_table()?;
        let key_column = self
            .introspector()
            .get_primary_key(&table)
            .await
            .ok_or_else(|| Error::schema("Could not determine the primary key for the table."))?;

        let Some(result) = self.views.browse() else {
            return Ok(None);
        };
        let found = (0..result.len()).find(|&i| result.get(i, &key_column).and_then(Value::as_i64) == Some(key));
        Ok(found.and_then(|i| Row::from_result(result, i)))
    }

    /// Deletes `row` from the current table after confirmation, then reloads it.
    pub async fn delete_row(&mut self, row: &Row, confirm: &dyn Confirm) -> Result<u64, Error> {
        let table = self.require_table()?;
        let key_column = self
            .introspector()
            .get_primary_key(&table)
            .await
            .ok_or_else(|| Error::schema("Could not determine the primary key for the table."))?;
        let key = row
            .get(&key_column)
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::validation("Invalid primary key value."))?;

        if count_by_key(&self.db, &table, &key_column, key).await? == 0 {
            return Err(Error::StaleRow { column: key_column, key });
        }
        if !confirm.confirm(&format!(
            "Are you sure you want to delete the row with {} = {} from '{}'? This action cannot be undone.",
            key_column, key, table
        )) {
            return Err(Error::Cancelled);
        }

        let deleted = delete_by_key(&self.db, &table, &key_column, key).await?;
        self.reload().await?;
        Ok(deleted)
    }

    /// Closes the connection; all session state goes with it.
    pub async fn disconnect(self) {
        self.db.close().await;
        log::info!("disconnected");
    }
}
