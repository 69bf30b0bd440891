//! Fixed document texts.

use chrono::NaiveDate;

use super::{DocumentBody, Letter};
use crate::{hr::EmployeeRecord, value::ResultSet};

const DATE_FORMAT: &str = "%d.%m.%Y";

/// Employment contract handed out at the end of a hire.
pub fn employment_contract(record: &EmployeeRecord, signed_on: NaiveDate) -> DocumentBody {
    let letter = Letter::new(format!("EMPLOYMENT CONTRACT No. {}", record.employee_id))
        .field("Date", signed_on.format(DATE_FORMAT))
        .field("Employee", record.full_name())
        .field("Address", &record.address)
        .field("Phone", &record.phone)
        .field("Email", &record.email)
        .field("Job title", &record.job_title)
        .field("Department", record.department_id)
        .field("Position", record.position_id)
        .field("Start date", &record.hire_date)
        .field("Monthly salary", format!("{:.2}", record.salary))
        .paragraph(format!(
            "1. The Employer engages {} as {} starting on {}, and the Employee accepts the \
             engagement on the terms of this contract.",
            record.full_name(),
            record.job_title,
            record.hire_date
        ))
        .paragraph(
            "2. The Employee shall perform the duties of the position conscientiously and comply \
             with the internal labour regulations of the Employer.",
        )
        .paragraph(format!(
            "3. The Employer shall pay a monthly salary of {:.2} and provide the working conditions \
             required by labour legislation.",
            record.salary
        ))
        .paragraph(
            "4. This contract is concluded for an indefinite period and may be terminated on the \
             grounds provided by law.",
        )
        .paragraph("Employer: ____________________        Employee: ____________________");

    DocumentBody::Letter(letter)
}

/// Dismissal order for an employee leaving the company.
pub fn dismissal_letter(record: &EmployeeRecord, reason: &str, dismissed_on: NaiveDate) -> DocumentBody {
    let reason = if reason.trim().is_empty() { "at the employee's own request" } else { reason.trim() };

    let letter = Letter::new(format!("DISMISSAL ORDER No. {}", record.employee_id))
        .field("Date", dismissed_on.format(DATE_FORMAT))
        .field("Employee", record.full_name())
        .field("Address", &record.address)
        .field("Job title", &record.job_title)
        .field("Employed since", &record.hire_date)
        .paragraph(format!(
            "{} is dismissed from the position of {} on {}, {}.",
            record.full_name(),
            record.job_title,
            dismissed_on.format(DATE_FORMAT),
            reason
        ))
        .paragraph(
            "The accounting department shall make the final settlement with the employee on the \
             last working day.",
        )
        .paragraph("Director: ____________________        Acknowledged: ____________________");

    DocumentBody::Letter(letter)
}

/// Export of the rows that matched a filter.
pub fn filter_report(document_id: i64, description: &str, result: ResultSet) -> DocumentBody {
    DocumentBody::Table {
        title: format!("FILTER REPORT No. {}", document_id),
        description: description.to_string(),
        result,
    }
}
