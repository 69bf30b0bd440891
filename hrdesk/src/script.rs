//! # Script Module
//!
//! Runs multi-statement scripts typed by the user. A script is cut into batches at
//! lines that hold only `GO` (the batch separator of SQL Server tooling, not SQL
//! syntax), and each batch is sent as one command.

// ============================================================================
// External Crate Imports
// ============================================================================

use std::sync::{Arc, LazyLock};

use regex::Regex;
use sqlx::any::AnyArguments;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{database::Connection, value::ResultSet, Error};

static BATCH_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*GO\s*($|--.*$)").expect("batch separator pattern is valid"));

// ============================================================================
// Batch Classification
// ============================================================================

/// How a batch is dispatched, decided by its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT` / `WITH`: returns a result set.
    Query,
    Insert,
    Update,
    Delete,
    /// Anything else, including batches that start with a comment.
    Other,
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    sql.get(..keyword.len()).is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
}

/// Classifies a trimmed batch by case-insensitive prefix match.
pub fn classify(batch: &str) -> StatementKind {
    let sql = batch.trim();
    if starts_with_keyword(sql, "SELECT") || starts_with_keyword(sql, "WITH") {
        StatementKind::Query
    } else if starts_with_keyword(sql, "INSERT") {
        StatementKind::Insert
    } else if starts_with_keyword(sql, "UPDATE") {
        StatementKind::Update
    } else if starts_with_keyword(sql, "DELETE") {
        StatementKind::Delete
    } else {
        StatementKind::Other
    }
}

/// Splits a script into trimmed, non-empty batches.
pub fn split_batches(script: &str) -> Vec<String> {
    BATCH_SEPARATOR
        .split(script)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of one executed batch.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Rows(Arc<ResultSet>),
    Inserted(u64),
    Updated(u64),
    Deleted(u64),
    Affected(u64),
}

impl BatchOutcome {
    /// Title and text of the message shown for this outcome.
    pub fn message(&self) -> (&'static str, String) {
        match self {
            BatchOutcome::Rows(rs) => ("Query Result", format!("{} row(s) returned", rs.len())),
            BatchOutcome::Inserted(n) => ("Create Result", format!("Inserted {} row(s)", n)),
            BatchOutcome::Updated(n) => ("Update Result", format!("Updated {} row(s)", n)),
            BatchOutcome::Deleted(n) => ("Delete Result", format!("Deleted {} row(s)", n)),
            BatchOutcome::Affected(n) => ("Result", format!("{} rows affected", n)),
        }
    }

    pub fn rows(&self) -> Option<&Arc<ResultSet>> {
        match self {
            BatchOutcome::Rows(rs) => Some(rs),
            _ => None,
        }
    }

    pub fn rows_affected(&self) -> Option<u64> {
        match self {
            BatchOutcome::Rows(_) => None,
            BatchOutcome::Inserted(n)
            | BatchOutcome::Updated(n)
            | BatchOutcome::Deleted(n)
            | BatchOutcome::Affected(n) => Some(*n),
        }
    }
}

/// The batch that stopped a script.
#[derive(Debug)]
pub struct BatchFailure {
    /// Zero-based position of the batch in the script.
    pub index: usize,
    pub sql: String,
    pub error: Error,
}

/// Everything that happened while running a script.
#[derive(Debug, Default)]
pub struct ScriptReport {
    /// Outcomes of the batches that completed, in order.
    pub outcomes: Vec<BatchOutcome>,
    /// Set when a batch failed; later batches were not run.
    pub failure: Option<BatchFailure>,
}

impl ScriptReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// The last result set the script produced.
    pub fn last_rows(&self) -> Option<&Arc<ResultSet>> {
        self.outcomes.iter().rev().find_map(BatchOutcome::rows)
    }

    /// Converts a failed report into its error.
    pub fn into_result(self) -> Result<Vec<BatchOutcome>, Error> {
        match self.failure {
            Some(failure) => Err(failure.error),
            None => Ok(self.outcomes),
        }
    }
}

// ============================================================================
// ScriptRunner
// ============================================================================

pub struct ScriptRunner<'a, C> {
    conn: &'a C,
}

impl<'a, C> ScriptRunner<'a, C>
where
    C: Connection,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Runs every batch of `script` in order, stopping at the first failure.
    pub async fn run(&self, script: &str) -> ScriptReport {
        let mut report = ScriptReport::default();

        for (index, sql) in split_batches(script).into_iter().enumerate() {
            match self.run_batch(&sql).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(error) => {
                    log::warn!("batch {} failed: {}", index + 1, error);
                    report.failure = Some(BatchFailure { index, sql, error });
                    break;
                }
            }
        }

        report
    }

    /// Runs a single batch.
    pub async fn run_batch(&self, sql: &str) -> Result<BatchOutcome, Error> {
        log::debug!("executing batch: {}", sql);
        let kind = classify(sql);

        if kind == StatementKind::Query {
            let rows = self.conn.fetch_all(sql, AnyArguments::default()).await?;
            return Ok(BatchOutcome::Rows(Arc::new(ResultSet::from_rows(&rows)?)));
        }

        let affected = self.conn.execute(sql, AnyArguments::default()).await?.rows_affected();
        Ok(match kind {
            StatementKind::Insert => BatchOutcome::Inserted(affected),
            StatementKind::Update => BatchOutcome::Updated(affected),
            StatementKind::Delete => BatchOutcome::Deleted(affected),
            _ => BatchOutcome::Affected(affected),
        })
    }
}
