//! Creates the tables the HR workflows write to.

use crate::{
    database::{Database, Drivers},
    ddl::identity_column,
    document::DOCUMENT_TABLE,
    Error,
};

use super::{EMPLOYEE_TABLE, PERSON_TABLE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Text(u16),
    Real,
}

impl ColumnKind {
    fn sql(&self, driver: Drivers) -> String {
        match (self, driver) {
            (ColumnKind::Int, Drivers::Postgres) => "INTEGER".to_string(),
            (ColumnKind::Int, _) => "INT".to_string(),
            (ColumnKind::Text(len), Drivers::Postgres) => format!("VARCHAR({})", len),
            (ColumnKind::Text(len), _) => format!("NVARCHAR({})", len),
            (ColumnKind::Real, Drivers::Postgres) => "DOUBLE PRECISION".to_string(),
            (ColumnKind::Real, Drivers::MySQL) => "DOUBLE".to_string(),
            (ColumnKind::Real, Drivers::SQLite) => "REAL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    /// `(table, column)` this column references.
    pub references: Option<(&'static str, &'static str)>,
}

impl ColumnDef {
    pub const fn required(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind, nullable: false, references: None }
    }

    pub const fn optional(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind, nullable: true, references: None }
    }

    pub fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some((table, column));
        self
    }
}

/// A table with an identity key followed by its data columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub key: &'static str,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn create_sql(&self, driver: Drivers) -> String {
        let mut parts = vec![identity_column(driver, self.key)];
        for column in &self.columns {
            let null = if column.nullable { "NULL" } else { "NOT NULL" };
            parts.push(format!("{} {} {}", driver.quote(column.name), column.kind.sql(driver), null));
        }
        for column in &self.columns {
            if let Some((table, key)) = column.references {
                parts.push(format!(
                    "FOREIGN KEY ({}) REFERENCES {} ({})",
                    driver.quote(column.name),
                    driver.quote(table),
                    driver.quote(key)
                ));
            }
        }

        format!("CREATE TABLE IF NOT EXISTS {} ({})", driver.quote(self.name), parts.join(", "))
    }
}

/// `Person`, `Employee` and `Document`, in creation order.
///
/// Dates are kept as text so every engine reads them back the same way.
pub fn hr_tables() -> Vec<TableDef> {
    use ColumnKind::*;

    vec![
        TableDef {
            name: PERSON_TABLE,
            key: "Person_id",
            columns: vec![
                ColumnDef::required("FirstName", Text(50)),
                ColumnDef::required("LastName", Text(50)),
                ColumnDef::required("MiddleName", Text(50)),
                ColumnDef::required("Phone", Text(20)),
                ColumnDef::required("Email", Text(100)),
                ColumnDef::required("Address", Text(200)),
            ],
        },
        TableDef {
            name: EMPLOYEE_TABLE,
            key: "Employee_id",
            columns: vec![
                ColumnDef::required("Person_id", Int).references(PERSON_TABLE, "Person_id"),
                ColumnDef::required("Department_id", Int),
                ColumnDef::required("Position_id", Int),
                ColumnDef::required("AcademicDegree_id", Int),
                ColumnDef::required("AcademicTitle_id", Int),
                ColumnDef::required("JobTitle", Text(100)),
                ColumnDef::required("HireDate", Text(32)),
                ColumnDef::required("Salary", Real),
            ],
        },
        TableDef {
            name: DOCUMENT_TABLE,
            key: "Document_id",
            columns: vec![
                ColumnDef::required("DocumentType", Text(50)),
                // Not a foreign key: audit rows outlive the employees they describe.
                ColumnDef::required("Employee_id", Int),
                ColumnDef::required("CreatedAt", Text(32)),
                ColumnDef::optional("Description", Text(500)),
            ],
        },
    ]
}

/// Runs registered table definitions in order, skipping tables that already exist.
pub struct Bootstrap<'a> {
    db: &'a Database,
    tables: Vec<TableDef>,
}

impl<'a> Bootstrap<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db, tables: Vec::new() }
    }

    pub fn register(mut self, table: TableDef) -> Self {
        self.tables.push(table);
        self
    }

    /// Returns the names of the tables that were created.
    pub async fn run(self) -> Result<Vec<String>, Error> {
        let existing = self.db.list_tables().await?;
        let mut created = Vec::new();

        for table in &self.tables {
            if existing.iter().any(|t| t.eq_ignore_ascii_case(table.name)) {
                log::debug!("table '{}' already exists", table.name);
                continue;
            }

            let sql = table.create_sql(self.db.driver());
            log::debug!("executing: {}", sql);
            self.db.raw(&sql).execute().await?;
            log::info!("table '{}' created", table.name);
            created.push(table.name.to_string());
        }

        Ok(created)
    }
}

/// Creates whichever of the HR tables are missing.
pub async fn bootstrap(db: &Database) -> Result<Vec<String>, Error> {
    hr_tables().into_iter().fold(Bootstrap::new(db), Bootstrap::register).run().await
}
