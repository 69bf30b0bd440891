//! Hiring: one person, one employee, one audit row and one contract.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::{
    coerce::{parse_datetime, SqlType},
    document::{insert_document, templates, DocumentKind},
    statement::InsertStatement,
    value::Value,
    Error,
};

use super::{EmployeeLifecycle, EmployeeRecord, DEFAULT_ACADEMIC_ID, EMPLOYEE_TABLE, PERSON_TABLE};

pub const DEPARTMENT_IDS: std::ops::RangeInclusive<i32> = 1..=8;
pub const POSITION_IDS: std::ops::RangeInclusive<i32> = 1..=5;

/// The hire form exactly as typed; every field is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HireForm {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub job_title: String,
    pub hire_date: String,
    pub department_id: String,
    pub position_id: String,
    pub salary: String,
}

/// A validated hire form.
#[derive(Debug, Clone, PartialEq)]
pub struct HireRequest {
    pub first_name: String,
    pub last_name: String,
    pub middle_name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub job_title: String,
    pub hire_date: NaiveDate,
    pub department_id: i32,
    pub position_id: i32,
    pub salary: f64,
}

fn required<'a>(value: &'a str, label: &str) -> Result<&'a str, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} is required.", label)));
    }
    Ok(value)
}

fn id_in_range(value: &str, label: &str, range: std::ops::RangeInclusive<i32>) -> Result<i32, Error> {
    let message = || Error::validation(format!("{} must be a number from {} to {}.", label, range.start(), range.end()));
    let id: i32 = required(value, label)?.parse().map_err(|_| message())?;
    if !range.contains(&id) {
        return Err(message());
    }
    Ok(id)
}

impl HireForm {
    /// Checks the fields in form order and stops at the first invalid one.
    pub fn validate(&self) -> Result<HireRequest, Error> {
        let first_name = required(&self.first_name, "First name")?.to_string();
        let last_name = required(&self.last_name, "Last name")?.to_string();
        let middle_name = required(&self.middle_name, "Middle name")?.to_string();
        let phone = required(&self.phone, "Phone")?.to_string();

        let email = required(&self.email, "Email")?;
        if !email.contains('@') {
            return Err(Error::validation("Email must contain '@'."));
        }
        let email = email.to_string();

        let address = required(&self.address, "Address")?.to_string();
        let job_title = required(&self.job_title, "Job title")?.to_string();

        let hire_date = parse_datetime(required(&self.hire_date, "Hire date")?)
            .map(|dt| dt.date())
            .ok_or_else(|| Error::validation("Hire date is not a valid date."))?;

        let department_id = id_in_range(&self.department_id, "Department id", DEPARTMENT_IDS)?;
        let position_id = id_in_range(&self.position_id, "Position id", POSITION_IDS)?;

        let salary: f64 = required(&self.salary, "Salary")?
            .parse()
            .map_err(|_| Error::validation("Salary must be a number."))?;
        if !salary.is_finite() || salary <= 0.0 {
            return Err(Error::validation("Salary must be greater than zero."));
        }

        Ok(HireRequest {
            first_name,
            last_name,
            middle_name,
            phone,
            email,
            address,
            job_title,
            hire_date,
            department_id,
            position_id,
            salary,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HireOutcome {
    pub person_id: i64,
    pub employee_id: i64,
    pub document_id: i64,
    /// The generated contract, for the caller to open.
    pub contract: PathBuf,
}

impl EmployeeLifecycle {
    /// Validates the form, then inserts Person, Employee and the `Employement` document
    /// and writes the contract to `Docs/Hired/{employee_id}`.
    ///
    /// The steps are not wrapped in a transaction. Once the person row exists, a later
    /// failure is reported as [`Error::PartialWorkflow`] and the rows already written
    /// stay in place.
    pub async fn hire(&self, form: &HireForm) -> Result<HireOutcome, Error> {
        let request = form.validate()?;
        let hire_date = request.hire_date.format("%Y-%m-%d").to_string();

        let person_id = InsertStatement::new(PERSON_TABLE, "Person_id")
            .value("FirstName", request.first_name.as_str(), SqlType::Text)
            .value("LastName", request.last_name.as_str(), SqlType::Text)
            .value("MiddleName", request.middle_name.as_str(), SqlType::Text)
            .value("Phone", request.phone.as_str(), SqlType::Text)
            .value("Email", request.email.as_str(), SqlType::Text)
            .value("Address", request.address.as_str(), SqlType::Text)
            .execute(self.database())
            .await?;
        log::info!("person {} created", person_id);

        let employee_id = InsertStatement::new(EMPLOYEE_TABLE, "Employee_id")
            .value("Person_id", Value::BigInt(person_id), SqlType::BigInt)
            .value("Department_id", request.department_id, SqlType::Int)
            .value("Position_id", request.position_id, SqlType::Int)
            .value("AcademicDegree_id", DEFAULT_ACADEMIC_ID, SqlType::Int)
            .value("AcademicTitle_id", DEFAULT_ACADEMIC_ID, SqlType::Int)
            .value("JobTitle", request.job_title.as_str(), SqlType::Text)
            .value("HireDate", hire_date.as_str(), SqlType::Text)
            .value("Salary", request.salary, SqlType::from_tag("float"))
            .execute(self.database())
            .await
            .map_err(|e| Error::partial(format!("person {} was saved but the employee record failed: {}", person_id, e)))?;
        log::info!("employee {} created for person {}", employee_id, person_id);

        let record = EmployeeRecord {
            employee_id,
            person_id,
            first_name: request.first_name,
            last_name: request.last_name,
            middle_name: request.middle_name,
            phone: request.phone,
            email: request.email,
            address: request.address,
            job_title: request.job_title,
            hire_date,
            department_id: i64::from(request.department_id),
            position_id: i64::from(request.position_id),
            salary: request.salary,
        };

        let description = format!("Employment contract for {}", record.full_name());
        let document_id = insert_document(self.database(), DocumentKind::Employment, employee_id, &description)
            .await
            .map_err(|e| Error::partial(format!("employee {} was saved but the document row failed: {}", employee_id, e)))?;

        let contract = self.layout().path(DocumentKind::Employment, employee_id, self.sink().extension());
        let body = templates::employment_contract(&record, Local::now().date_naive());
        self.sink()
            .write(&contract, &body)
            .await
            .map_err(|e| Error::partial(format!("employee {} was saved but the contract was not written: {}", employee_id, e)))?;

        log::info!("employee {} hired, contract at {}", employee_id, contract.display());
        Ok(HireOutcome { person_id, employee_id, document_id, contract })
    }
}
