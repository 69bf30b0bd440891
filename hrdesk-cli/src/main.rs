use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hrdesk::{Config, DocumentFormat};

mod database;
mod handlers;
mod output;

#[derive(Parser)]
#[command(name = "hrdesk", about = "Administration console for the HR database")]
struct Cli {
	/// Full connection URL, e.g. postgres://localhost/staff or sqlite://staff.db
	#[arg(long, global = true, env = "DATABASE_URL")]
	url: Option<String>,

	/// Directory that holds the Docs/ tree
	#[arg(long, global = true, env = "HRDESK_DOCS_DIR")]
	docs_dir: Option<PathBuf>,

	/// Document format: text or csv
	#[arg(long, global = true, env = "HRDESK_DOCUMENT_FORMAT")]
	format: Option<String>,

	/// Answer yes to every confirmation
	#[arg(long, short = 'y', global = true)]
	yes: bool,

	/// Print result sets as JSON
	#[arg(long, global = true)]
	json: bool,

	/// Open generated documents with the default application
	#[arg(long, global = true)]
	open: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Create the Person, Employee and Document tables if they are missing
	Init,
	/// List the tables of the database
	Tables,
	/// Show every row of a table
	Show { table: String },
	/// Run a script; batches are separated by lines holding only GO
	Query {
		sql: Option<String>,
		#[arg(long, conflicts_with = "sql")]
		file: Option<PathBuf>,
	},
	/// Insert a row, one column=value pair per argument
	Insert {
		table: String,
		#[arg(required = true)]
		values: Vec<String>,
	},
	/// Change one cell of the row with the given primary key
	Edit {
		table: String,
		key: String,
		column: String,
		value: String,
		/// Insert the row as a new one if it no longer exists
		#[arg(long)]
		insert: bool,
	},
	/// Delete the row with the given primary key
	#[command(name = "delete-row")]
	DeleteRow { table: String, key: String },
	/// Create a table with an auto-increment ID column
	#[command(name = "add-table")]
	AddTable { name: String },
	/// Drop a table
	#[command(name = "drop-table")]
	DropTable { name: String },
	/// Add a column: INT, NVARCHAR(50), DATETIME or BIT
	#[command(name = "add-column")]
	AddColumn {
		table: String,
		name: String,
		#[arg(value_name = "TYPE")]
		column_type: String,
	},
	/// Rename a column
	#[command(name = "rename-column")]
	RenameColumn { table: String, current: String, new_name: String },
	/// Drop a column
	#[command(name = "drop-column")]
	DropColumn { table: String, name: String },
	/// Show the rows matching every filter, e.g. "Salary >= 1000"
	Filter {
		table: String,
		#[arg(required = true)]
		filters: Vec<String>,
		/// Also record a Filters document and write the report to Docs/Filters
		#[arg(long)]
		export: bool,
	},
	/// Hire an employee
	Hire(handlers::staff::HireArgs),
	/// Dismiss an employee
	Dismiss {
		employee_id: String,
		#[arg(long, default_value = "")]
		reason: String,
	},
}

fn config(cli: &Cli) -> Result<Config, hrdesk::Error> {
	let mut config = Config::from_env();
	if let Some(url) = &cli.url {
		config.database_url = Some(url.clone());
	}
	if let Some(dir) = &cli.docs_dir {
		config.docs_dir = dir.clone();
	}
	if let Some(format) = &cli.format {
		config.document_format = format.parse::<DocumentFormat>()?;
	}
	Ok(config)
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	let cli = Cli::parse();
	let options = output::Options { json: cli.json, yes: cli.yes, open: cli.open };

	let result = match config(&cli) {
		Ok(config) => handlers::run(cli.command, &config, &options).await,
		Err(e) => Err(e),
	};

	if let Err(e) = result {
		eprintln!("{}: {}", e.title(), e);
		std::process::exit(1);
	}
}
