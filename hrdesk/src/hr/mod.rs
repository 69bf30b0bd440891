//! # HR Module
//!
//! The employee lifecycle on top of the generic table engine: creating the `Person`,
//! `Employee` and `Document` tables, hiring, dismissing and exporting filter reports.
//! Each workflow returns the path of the document it generated; opening it is left to
//! the caller.

// ============================================================================
// Submodules
// ============================================================================

mod bootstrap;
mod dismiss;
mod hire;
mod report;

pub use bootstrap::{bootstrap, hr_tables, Bootstrap, ColumnDef, ColumnKind, TableDef};
pub use dismiss::{parse_employee_id, DismissalOutcome};
pub use hire::{HireForm, HireOutcome, HireRequest};
pub use report::{export_filter_report, ReportOutcome};

// ============================================================================
// External Crate Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    coerce::SqlType,
    database::{Connection, Database},
    document::{DocumentLayout, DocumentSink},
    statement::Params,
    value::Value,
    Error,
};

pub const PERSON_TABLE: &str = "Person";
pub const EMPLOYEE_TABLE: &str = "Employee";

/// Academic degree and title assigned to every new hire.
pub const DEFAULT_ACADEMIC_ID: i32 = 1;

// ============================================================================
// EmployeeRecord
// ============================================================================

/// An employee joined with the person it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeRecord {
    pub employee_id: i64,
    pub person_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub job_title: String,
    pub hire_date: String,
    pub department_id: i64,
    pub position_id: i64,
    pub salary: f64,
}

impl EmployeeRecord {
    pub fn full_name(&self) -> String {
        [self.last_name.as_str(), self.first_name.as_str(), self.middle_name.as_str()]
            .iter()
            .filter(|part| !part.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for EmployeeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} ({}, since {})", self.employee_id, self.full_name(), self.job_title, self.hire_date)
    }
}

/// Loads one employee together with its person row.
pub(crate) async fn find_employee<C: Connection>(conn: &C, employee_id: i64) -> Result<Option<EmployeeRecord>, Error> {
    let driver = conn.driver();
    let q = |name: &str| driver.quote(name);

    let mut params = Params::new(driver);
    let placeholder = params.push(&Value::BigInt(employee_id), &SqlType::BigInt)?;
    let sql = format!(
        "SELECT e.{eid}, e.{pid}, p.{first}, p.{last}, p.{middle}, p.{phone}, p.{email}, p.{address}, \
         e.{job}, e.{hired}, e.{dept}, e.{pos}, e.{salary} \
         FROM {employee} e JOIN {person} p ON p.{pid} = e.{pid} WHERE e.{eid} = {placeholder}",
        eid = q("Employee_id"),
        pid = q("Person_id"),
        first = q("FirstName"),
        last = q("LastName"),
        middle = q("MiddleName"),
        phone = q("Phone"),
        email = q("Email"),
        address = q("Address"),
        job = q("JobTitle"),
        hired = q("HireDate"),
        dept = q("Department_id"),
        pos = q("Position_id"),
        salary = q("Salary"),
        employee = q(EMPLOYEE_TABLE),
        person = q(PERSON_TABLE),
        placeholder = placeholder,
    );

    let Some(row) = conn.fetch_optional(&sql, params.into_args()).await? else {
        return Ok(None);
    };

    let cells = (0..13).map(|i| Value::decode(&row, i)).collect::<Result<Vec<_>, _>>()?;
    let text = |i: usize| cells[i].to_string();
    let int = |i: usize| cells[i].as_i64().unwrap_or_default();

    Ok(Some(EmployeeRecord {
        employee_id: int(0),
        person_id: int(1),
        first_name: text(2),
        last_name: text(3),
        middle_name: text(4),
        phone: text(5),
        email: text(6),
        address: text(7),
        job_title: text(8),
        hire_date: text(9),
        department_id: int(10),
        position_id: int(11),
        salary: cells[12].as_f64().unwrap_or_default(),
    }))
}

// ============================================================================
// EmployeeLifecycle
// ============================================================================

/// Hire and dismissal workflows bound to one database and one document sink.
pub struct EmployeeLifecycle {
    db: Database,
    layout: DocumentLayout,
    sink: Box<dyn DocumentSink>,
}

impl EmployeeLifecycle {
    pub fn new(db: Database, layout: DocumentLayout, sink: Box<dyn DocumentSink>) -> Self {
        Self { db, layout, sink }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    pub fn sink(&self) -> &dyn DocumentSink {
        self.sink.as_ref()
    }

    pub async fn lookup(&self, employee_id: i64) -> Result<Option<EmployeeRecord>, Error> {
        find_employee(&self.db, employee_id).await
    }
}
