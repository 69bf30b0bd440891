//! # Document Module
//!
//! Audit documents: a row in the `Document` table paired with a generated file under
//! `Docs/`. The file name is always derived from a persisted identifier (the employee id
//! for hire and dismissal papers, the document id for filter reports), so a file and its
//! audit row can be matched up later.

// ============================================================================
// Submodules
// ============================================================================

mod sink;
pub mod templates;

pub use sink::{CsvSink, DocumentBody, DocumentFormat, DocumentSink, Letter, TextSink};

// ============================================================================
// External Crate Imports
// ============================================================================

use std::{fmt, path::PathBuf};

use chrono::Local;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    coerce::SqlType,
    database::Connection,
    statement::InsertStatement,
    value::{Value, DATETIME_FORMAT},
    Error,
};

pub const DOCUMENT_TABLE: &str = "Document";

// ============================================================================
// DocumentKind Enum
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Employment,
    Dismissal,
    Filters,
}

impl DocumentKind {
    /// Value stored in `Document.DocumentType`. The spellings are part of the existing
    /// data and must not be corrected.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Employment => "Employement",
            DocumentKind::Dismissal => "Dismissial",
            DocumentKind::Filters => "Filters",
        }
    }

    /// Subfolder of `Docs/` the files of this kind are written to.
    pub fn folder(&self) -> &'static str {
        match self {
            DocumentKind::Employment => "Hired",
            DocumentKind::Dismissal => "Fired",
            DocumentKind::Filters => "Filters",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DocumentLayout
// ============================================================================

/// Where generated files go: `{base}/Docs/{Hired|Fired|Filters}/...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLayout {
    base: PathBuf,
}

impl DocumentLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn folder(&self, kind: DocumentKind) -> PathBuf {
        self.base.join("Docs").join(kind.folder())
    }

    /// `Hired/{id}.ext` and `Fired/{id}.ext` take the employee id;
    /// `Filters/_report_{id}.ext` takes the document id.
    pub fn path(&self, kind: DocumentKind, id: i64, extension: &str) -> PathBuf {
        let file_name = match kind {
            DocumentKind::Filters => format!("_report_{}.{}", id, extension),
            _ => format!("{}.{}", id, extension),
        };
        self.folder(kind).join(file_name)
    }
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self::new(".")
    }
}

// ============================================================================
// Audit Rows
// ============================================================================

/// Inserts one `Document` audit row and returns its generated `Document_id`.
///
/// Audit rows are written once and never updated or deleted.
pub async fn insert_document<C: Connection>(
    conn: &C,
    kind: DocumentKind,
    employee_id: i64,
    description: &str,
) -> Result<i64, Error> {
    let created_at = Local::now().naive_local().format(DATETIME_FORMAT).to_string();

    let id = InsertStatement::new(DOCUMENT_TABLE, "Document_id")
        .value("DocumentType", kind.as_str(), SqlType::Text)
        .value("Employee_id", Value::BigInt(employee_id), SqlType::BigInt)
        .value("CreatedAt", created_at, SqlType::Text)
        .value("Description", description, SqlType::Text)
        .execute(conn)
        .await?;

    log::info!("document {} ({}) recorded for employee {}", id, kind, employee_id);
    Ok(id)
}
