/// Asks the user to approve a destructive operation.
///
/// Table, column and row drops and dismissals call this right before the statement is
/// sent; a `false` answer aborts with [`crate::Error::Cancelled`].
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Approves everything; for non-interactive use (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, prompt: &str) -> bool {
        log::info!("confirmed without prompting: {}", prompt);
        true
    }
}
