//! Interactive user prompting.

use std::io::{self, Write};

use crate::error::{DeskError, Result};
use crate::mutation::{Confirmable, Decision, StatusTransitionGuard};
use crate::utils::is_stdin_tty;

/// Prompt user for yes/no confirmation.
///
/// Anything other than `y` or `yes` is a no.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(
        input.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Pass an action through the confirmation guard.
///
/// Returns the action to run, or `None` when the user declined. With
/// `assume_yes` a held action is confirmed without asking.
pub fn gate<A: Confirmable>(action: A, assume_yes: bool) -> Result<Option<A>> {
    let mut guard = StatusTransitionGuard::new();
    match guard.submit(action) {
        Decision::Proceed(action) => Ok(Some(action)),
        Decision::AwaitConfirmation => {
            let prompt = guard.pending().map(Confirmable::prompt).unwrap_or_default();
            let confirmed = if assume_yes {
                true
            } else if is_stdin_tty() {
                confirm(prompt)?
            } else {
                guard.cancel();
                return Err(DeskError::Validation(format!(
                    "{prompt} Re-run with --yes to confirm."
                )));
            };

            if confirmed {
                Ok(guard.confirm())
            } else {
                guard.cancel();
                Ok(None)
            }
        }
    }
}
