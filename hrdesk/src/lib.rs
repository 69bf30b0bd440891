//! # hrdesk
//!
//! Administration toolkit for an employee/HR relational database, built on top of sqlx.
//!
//! The crate discovers table structure at runtime instead of relying on compile-time
//! models: every edit, insert or filter re-reads the live schema, coerces free-text input
//! into the column's SQL type and issues parameterized statements. On top of that generic
//! table engine it provides the hire and dismissal workflows and the documents they produce.
//!
//! ```rust,ignore
//! let mut session = Session::connect("sqlite://staff.db", 5).await?;
//! session.select_table("Person").await?;
//!
//! let mut row = session.row(0).expect("row 0");
//! session.commit_edit(&mut row, &EditedCell::new("Phone", "+380441234567")).await?;
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod coerce;
pub mod config;
pub mod confirm;
pub mod database;
pub mod ddl;
pub mod document;
pub mod error;
pub mod filter;
pub mod hr;
pub mod ident;
pub mod opener;
pub mod schema;
pub mod script;
pub mod session;
pub mod statement;
pub mod transaction;
pub mod value;
pub mod writer;

// ============================================================================
// Re-exports
// ============================================================================

pub use coerce::{coerce, SqlType};
pub use config::{Config, ConnectionSettings};
pub use confirm::{AssumeYes, Confirm};
pub use database::{Connection, Database, DatabaseBuilder, Drivers, RawQuery};
pub use ddl::{ColumnType, RenameOutcome};
pub use document::{
    CsvSink, DocumentBody, DocumentFormat, DocumentKind, DocumentLayout, DocumentSink, Letter, TextSink,
};
pub use error::{Error, Result};
pub use filter::{Filter, Op};
pub use hr::{
    export_filter_report, DismissalOutcome, EmployeeLifecycle, EmployeeRecord, HireForm, HireOutcome, HireRequest,
    ReportOutcome,
};
pub use opener::{FileOpener, ShellOpener};
pub use schema::{ColumnInfo, Nullability, SchemaIntrospector, TableSchema};
pub use script::{BatchFailure, BatchOutcome, ScriptReport, ScriptRunner, StatementKind};
pub use session::{ResultViews, Session};
pub use transaction::Transaction;
pub use value::{ResultSet, Value};
pub use writer::{DynamicRowWriter, EditedCell, Row, RowState, WriteOutcome};
