use std::{
	io::{self, BufRead, Write},
	path::Path,
};

use hrdesk::{AssumeYes, Confirm, FileOpener, ResultSet, ShellOpener};

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
	pub json: bool,
	pub yes: bool,
	pub open: bool,
}

impl Options {
	pub fn confirm(&self) -> Box<dyn Confirm> {
		if self.yes { Box::new(AssumeYes) } else { Box::new(StdinConfirm) }
	}
}

/// Asks on the terminal; anything but y/yes declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
	fn confirm(&self, prompt: &str) -> bool {
		eprint!("{} [y/N] ", prompt);
		let _ = io::stderr().flush();

		let mut answer = String::new();
		if io::stdin().lock().read_line(&mut answer).is_err() {
			return false;
		}
		matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
	}
}

pub fn message(title: &str, text: &str) {
	println!("{}: {}", title, text);
}

pub fn print_result(result: &ResultSet, options: &Options) {
	if options.json {
		match serde_json::to_string_pretty(result) {
			Ok(json) => println!("{}", json),
			Err(e) => log::error!("failed to serialize result: {}", e),
		}
		return;
	}

	let cells: Vec<Vec<String>> = result.rows.iter().map(|r| r.iter().map(|v| v.to_string()).collect()).collect();
	let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
	for row in &cells {
		for (w, cell) in widths.iter_mut().zip(row) {
			*w = (*w).max(cell.chars().count());
		}
	}

	let line = |values: &[String]| {
		values.iter().zip(&widths).map(|(v, w)| format!("{:<w$}", v, w = *w)).collect::<Vec<_>>().join(" | ")
	};

	println!("{}", line(&result.columns).trim_end());
	println!("{}", widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"));
	for row in &cells {
		println!("{}", line(row).trim_end());
	}
	println!("({} row(s))", result.len());
}

/// Reports a generated document and opens it when asked to.
pub async fn document(path: &Path, options: &Options) {
	println!("Document written to {}", path.display());
	if options.open {
		if let Err(e) = ShellOpener.open(path).await {
			eprintln!("{}: could not open {}: {}", e.title(), path.display(), e);
		}
	}
}
