//! Filter reports: the filtered rows of the current table written to `Docs/Filters`.

use std::path::PathBuf;

use crate::{
    document::{insert_document, templates, DocumentKind, DocumentLayout, DocumentSink},
    filter::{describe_filters, Filter},
    session::Session,
    Error,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    pub document_id: i64,
    pub rows: usize,
    pub path: PathBuf,
}

/// Filters the current table, records a `Filters` document (employee id 0) and writes
/// the matching rows to `Docs/Filters/_report_{document_id}`.
pub async fn export_filter_report(
    session: &mut Session,
    filters: &[Filter],
    layout: &DocumentLayout,
    sink: &dyn DocumentSink,
) -> Result<ReportOutcome, Error> {
    let table = session.require_table()?;
    let result = session.filter_rows(filters).await?;
    let description = describe_filters(&table, filters);

    let document_id = insert_document(session.database(), DocumentKind::Filters, 0, &description).await?;
    let path = layout.path(DocumentKind::Filters, document_id, sink.extension());
    let body = templates::filter_report(document_id, &description, result.as_ref().clone());
    sink.write(&path, &body)
        .await
        .map_err(|e| Error::partial(format!("document {} was recorded but the report was not written: {}", document_id, e)))?;

    log::info!("filter report {} written to {} ({} row(s))", document_id, path.display(), result.len());
    Ok(ReportOutcome { document_id, rows: result.len(), path })
}
