use clap::Args;
use hrdesk::{hr, Config, DocumentLayout, EmployeeLifecycle, HireForm, Session};

use crate::output::{self, Options};

/// Hire form fields, in the order they are validated.
#[derive(Args)]
pub struct HireArgs {
	#[arg(long)]
	first_name: String,
	#[arg(long)]
	last_name: String,
	#[arg(long)]
	middle_name: String,
	#[arg(long)]
	phone: String,
	#[arg(long)]
	email: String,
	#[arg(long)]
	address: String,
	#[arg(long)]
	job_title: String,
	/// e.g. 2024-03-01 or 01.03.2024
	#[arg(long)]
	hire_date: String,
	/// 1 to 8
	#[arg(long)]
	department_id: String,
	/// 1 to 5
	#[arg(long)]
	position_id: String,
	#[arg(long)]
	salary: String,
}

impl From<HireArgs> for HireForm {
	fn from(args: HireArgs) -> Self {
		HireForm {
			first_name: args.first_name,
			last_name: args.last_name,
			middle_name: args.middle_name,
			phone: args.phone,
			email: args.email,
			address: args.address,
			job_title: args.job_title,
			hire_date: args.hire_date,
			department_id: args.department_id,
			position_id: args.position_id,
			salary: args.salary,
		}
	}
}

fn lifecycle(session: &Session, config: &Config) -> EmployeeLifecycle {
	EmployeeLifecycle::new(
		session.database().clone(),
		DocumentLayout::new(&config.docs_dir),
		config.document_format.sink(),
	)
}

pub async fn init(session: &mut Session) -> Result<(), hrdesk::Error> {
	let created = hr::bootstrap(session.database()).await?;
	session.refresh_tables().await?;
	if created.is_empty() {
		output::message("Info", "All HR tables already exist.");
	} else {
		output::message("Success", &format!("Created {}.", created.join(", ")));
	}
	Ok(())
}

pub async fn hire(session: &Session, args: HireArgs, config: &Config, options: &Options) -> Result<(), hrdesk::Error> {
	let outcome = lifecycle(session, config).hire(&HireForm::from(args)).await?;
	output::message(
		"Success",
		&format!("Employee {} hired (person {}, document {}).", outcome.employee_id, outcome.person_id, outcome.document_id),
	);
	output::document(&outcome.contract, options).await;
	Ok(())
}

pub async fn dismiss(
	session: &Session,
	employee_id: &str,
	reason: &str,
	config: &Config,
	options: &Options,
) -> Result<(), hrdesk::Error> {
	let employee_id = hr::parse_employee_id(employee_id)?;
	let outcome = lifecycle(session, config).dismiss(employee_id, reason, options.confirm().as_ref()).await?;
	output::message(
		"Success",
		&format!("{} dismissed (document {}).", outcome.record.full_name(), outcome.document_id),
	);
	output::document(&outcome.letter, options).await;
	Ok(())
}
