use hrdesk::Config;

use crate::{database, output::Options, Command};

pub mod schema;
pub mod staff;
pub mod table;

/// Connects, runs one command and disconnects.
pub async fn run(command: Command, config: &Config, options: &Options) -> Result<(), hrdesk::Error> {
	let mut session = database::initialize(config).await?;

	let result = match command {
		Command::Init => staff::init(&mut session).await,
		Command::Tables => table::tables(&session),
		Command::Show { table } => table::show(&mut session, &table, options).await,
		Command::Query { sql, file } => table::query(&mut session, sql, file, options).await,
		Command::Insert { table, values } => table::insert(&mut session, &table, &values, options).await,
		Command::Edit { table, key, column, value, insert } => {
			table::edit(&mut session, &table, &key, &column, &value, insert, options).await
		}
		Command::DeleteRow { table, key } => table::delete_row(&mut session, &table, &key, options).await,
		Command::Filter { table, filters, export } => {
			table::filter(&mut session, &table, &filters, export, config, options).await
		}
		Command::AddTable { name } => schema::add_table(&mut session, &name).await,
		Command::DropTable { name } => schema::drop_table(&mut session, &name, options).await,
		Command::AddColumn { table, name, column_type } => {
			schema::add_column(&mut session, &table, &name, &column_type).await
		}
		Command::RenameColumn { table, current, new_name } => {
			schema::rename_column(&mut session, &table, &current, &new_name).await
		}
		Command::DropColumn { table, name } => schema::drop_column(&mut session, &table, &name, options).await,
		Command::Hire(args) => staff::hire(&session, args, config, options).await,
		Command::Dismiss { employee_id, reason } => {
			staff::dismiss(&session, &employee_id, &reason, config, options).await
		}
	};

	session.disconnect().await;
	result
}
