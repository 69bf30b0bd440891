//! Dismissal: the audit row and both deletes commit together or not at all.

use std::path::PathBuf;

use chrono::Local;

use crate::{
    confirm::Confirm,
    document::{insert_document, templates, DocumentKind},
    statement::delete_by_key,
    transaction::Transaction,
    Error,
};

use super::{find_employee, EmployeeLifecycle, EmployeeRecord, EMPLOYEE_TABLE, PERSON_TABLE};

/// Parses an employee id typed by the user.
pub fn parse_employee_id(text: &str) -> Result<i64, Error> {
    match text.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::validation("Please enter a valid employee id.")),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DismissalOutcome {
    pub record: EmployeeRecord,
    pub document_id: i64,
    /// The generated dismissal letter, for the caller to open.
    pub letter: PathBuf,
}

async fn delete_employee(tx: &Transaction, record: &EmployeeRecord, description: &str) -> Result<i64, Error> {
    let document_id = insert_document(tx, DocumentKind::Dismissal, record.employee_id, description).await?;

    if delete_by_key(tx, EMPLOYEE_TABLE, "Employee_id", record.employee_id).await? == 0 {
        return Err(Error::StaleRow { column: "Employee_id".to_string(), key: record.employee_id });
    }
    if delete_by_key(tx, PERSON_TABLE, "Person_id", record.person_id).await? == 0 {
        return Err(Error::StaleRow { column: "Person_id".to_string(), key: record.person_id });
    }

    Ok(document_id)
}

impl EmployeeLifecycle {
    /// Dismisses an employee after confirmation.
    ///
    /// The `Dismissial` document row, the Employee delete and the Person delete run in
    /// one transaction; if any of them fails, none of them is visible afterwards. The
    /// letter is written to `Docs/Fired/{employee_id}` once the transaction committed.
    pub async fn dismiss(&self, employee_id: i64, reason: &str, confirm: &dyn Confirm) -> Result<DismissalOutcome, Error> {
        let record = find_employee(self.database(), employee_id)
            .await?
            .ok_or_else(|| Error::validation(format!("Employee with id {} does not exist.", employee_id)))?;

        if !confirm.confirm(&format!(
            "Are you sure you want to dismiss {}? The employee and person records will be deleted.",
            record
        )) {
            return Err(Error::Cancelled);
        }

        let description = if reason.trim().is_empty() {
            format!("Dismissal of {}", record.full_name())
        } else {
            format!("Dismissal of {}: {}", record.full_name(), reason.trim())
        };

        let tx = self.database().begin().await?;
        let document_id = match delete_employee(&tx, &record, &description).await {
            Ok(id) => {
                tx.commit().await?;
                id
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    log::warn!("rollback after failed dismissal of {} failed: {}", employee_id, rollback);
                }
                log::warn!("dismissal of employee {} rolled back: {}", employee_id, e);
                return Err(e);
            }
        };
        log::info!("employee {} and person {} deleted", record.employee_id, record.person_id);

        let letter = self.layout().path(DocumentKind::Dismissal, employee_id, self.sink().extension());
        let body = templates::dismissal_letter(&record, reason, Local::now().date_naive());
        self.sink()
            .write(&letter, &body)
            .await
            .map_err(|e| Error::partial(format!("employee {} was dismissed but the letter was not written: {}", employee_id, e)))?;

        Ok(DismissalOutcome { record, document_id, letter })
    }
}
