use std::path::PathBuf;

use hrdesk::{
	export_filter_report, BatchOutcome, Config, DocumentLayout, EditedCell, Filter, Row, Session,
};

use crate::output::{self, Options};

pub fn tables(session: &Session) -> Result<(), hrdesk::Error> {
	for table in session.tables() {
		println!("{}", table);
	}
	Ok(())
}

pub async fn show(session: &mut Session, table: &str, options: &Options) -> Result<(), hrdesk::Error> {
	let result = session.select_table(table).await?;
	output::print_result(&result, options);
	Ok(())
}

pub async fn query(
	session: &mut Session,
	sql: Option<String>,
	file: Option<PathBuf>,
	options: &Options,
) -> Result<(), hrdesk::Error> {
	let script = match (sql, file) {
		(Some(sql), _) => sql,
		(None, Some(path)) => tokio::fs::read_to_string(&path).await?,
		(None, None) => return Err(hrdesk::Error::validation("Query text is empty.")),
	};
	if script.trim().is_empty() {
		return Err(hrdesk::Error::validation("Query text is empty."));
	}

	let report = session.run_script(&script).await;
	for outcome in &report.outcomes {
		match outcome {
			BatchOutcome::Rows(result) => output::print_result(result, options),
			other => {
				let (title, text) = other.message();
				output::message(title, &text);
			}
		}
	}

	if let Some(failure) = &report.failure {
		log::debug!("failed batch: {}", failure.sql);
		eprintln!("Batch {} failed.", failure.index + 1);
	}
	report.into_result().map(|_| ())
}

/// Parses `column=value` pairs into a new row.
fn parse_assignments(values: &[String]) -> Result<Row, hrdesk::Error> {
	let mut row = Row::added();
	for pair in values {
		let (column, value) = pair
			.split_once('=')
			.ok_or_else(|| hrdesk::Error::validation(format!("'{}' must look like column=value", pair)))?;
		row.set_text(column.trim(), value);
	}
	Ok(row)
}

pub async fn insert(session: &mut Session, table: &str, values: &[String], options: &Options) -> Result<(), hrdesk::Error> {
	session.select_table(table).await?;
	let mut row = parse_assignments(values)?;

	let outcome = session.insert_row(&mut row).await?;
	output::message("Create Result", &outcome.message());
	if options.json {
		if let Some(result) = session.views().browse() {
			output::print_result(result, options);
		}
	}
	Ok(())
}

fn parse_key(key: &str) -> Result<i64, hrdesk::Error> {
	key.trim().parse().map_err(|_| hrdesk::Error::validation("Invalid primary key value."))
}

async fn load_row(session: &mut Session, table: &str, key: &str) -> Result<Row, hrdesk::Error> {
	session.select_table(table).await?;
	let key = parse_key(key)?;
	session
		.find_row(key)
		.await?
		.ok_or_else(|| hrdesk::Error::validation(format!("No row with key {} in {}.", key, table)))
}

/// With `insert`, a row that no longer exists is stored again as a new row.
pub async fn edit(
	session: &mut Session,
	table: &str,
	key: &str,
	column: &str,
	value: &str,
	insert: bool,
	options: &Options,
) -> Result<(), hrdesk::Error> {
	let edit = EditedCell::new(column, value);
	session.select_table(table).await?;
	let key = parse_key(key)?;
	let mut row = match session.find_row(key).await? {
		Some(row) => row,
		None if insert => Row::added(),
		None => return Err(hrdesk::Error::validation(format!("No row with key {} in {}.", key, table))),
	};

	let outcome = match session.commit_edit(&mut row, &edit).await {
		Err(hrdesk::Error::StaleRow { .. }) if insert => {
			row.mark_added();
			session.commit_edit(&mut row, &edit).await?
		}
		result => result?,
	};
	output::message("Update Result", &outcome.message());
	if options.json {
		if let Some(value) = row.get(column) {
			println!("{}", value);
		}
	}
	Ok(())
}

pub async fn delete_row(session: &mut Session, table: &str, key: &str, options: &Options) -> Result<(), hrdesk::Error> {
	let row = load_row(session, table, key).await?;
	let deleted = session.delete_row(&row, options.confirm().as_ref()).await?;
	output::message("Delete Result", &format!("Deleted {} row(s)", deleted));
	Ok(())
}

pub async fn filter(
	session: &mut Session,
	table: &str,
	filters: &[String],
	export: bool,
	config: &Config,
	options: &Options,
) -> Result<(), hrdesk::Error> {
	let filters = filters.iter().map(|f| Filter::parse(f)).collect::<Result<Vec<_>, _>>()?;
	session.select_table(table).await?;

	if !export {
		let result = session.filter_rows(&filters).await?;
		output::print_result(&result, options);
		return Ok(());
	}

	let layout = DocumentLayout::new(&config.docs_dir);
	let sink = config.document_format.sink();
	let report = export_filter_report(session, &filters, &layout, sink.as_ref()).await?;
	if let Some(result) = session.views().query() {
		output::print_result(result, options);
	}
	output::message("Report", &format!("Document {} recorded with {} row(s)", report.document_id, report.rows));
	output::document(&report.path, options).await;
	Ok(())
}
