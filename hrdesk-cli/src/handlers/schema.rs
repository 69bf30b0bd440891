use hrdesk::{ColumnType, RenameOutcome, Session};

use crate::output::{self, Options};

pub async fn add_table(session: &mut Session, name: &str) -> Result<(), hrdesk::Error> {
	session.add_table(name).await?;
	output::message("Success", &format!("Table '{}' created successfully.", name.trim()));
	Ok(())
}

pub async fn drop_table(session: &mut Session, name: &str, options: &Options) -> Result<(), hrdesk::Error> {
	session.drop_table(name, options.confirm().as_ref()).await?;
	output::message("Success", &format!("Table '{}' deleted successfully.", name.trim()));
	Ok(())
}

pub async fn add_column(session: &mut Session, table: &str, name: &str, column_type: &str) -> Result<(), hrdesk::Error> {
	let column_type: ColumnType = column_type.parse()?;
	session.select_table(table).await?;
	session.add_column(name, column_type).await?;
	output::message("Success", &format!("Column '{}' added successfully.", name.trim()));
	Ok(())
}

pub async fn rename_column(session: &mut Session, table: &str, current: &str, new_name: &str) -> Result<(), hrdesk::Error> {
	session.select_table(table).await?;
	match session.rename_column(current, new_name).await? {
		RenameOutcome::Renamed { from, to } => {
			output::message("Success", &format!("Column '{}' renamed to '{}'.", from, to))
		}
		RenameOutcome::Unchanged => output::message("Info", "No changes made."),
	}
	Ok(())
}

pub async fn drop_column(session: &mut Session, table: &str, name: &str, options: &Options) -> Result<(), hrdesk::Error> {
	session.select_table(table).await?;
	session.drop_column(name, options.confirm().as_ref()).await?;
	output::message("Success", &format!("Column '{}' deleted successfully.", name));
	Ok(())
}
