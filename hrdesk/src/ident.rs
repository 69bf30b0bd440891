//! Validation of table and column names supplied by the user.

use std::sync::LazyLock;

use regex::Regex;

use crate::Error;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("identifier pattern is valid"));

pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Checks a new table or column name before it is interpolated into DDL.
///
/// `what` names the object in the error message ("table", "column").
pub fn validate_identifier<'a>(name: &'a str, what: &str) -> Result<&'a str, Error> {
    let name = name.trim();
    if name.is_empty() {
        let mut chars = what.chars();
        let title: String = chars.next().map(|c| c.to_uppercase().chain(chars).collect()).unwrap_or_default();
        return Err(Error::validation(format!("{} name cannot be empty.", title)));
    }
    if !is_valid_identifier(name) {
        return Err(Error::validation(format!(
            "Invalid {} name. Use letters, numbers, and underscores only. Start with a letter or underscore.",
            what
        )));
    }
    Ok(name)
}
