pub mod text;
pub mod validation;

use std::io::IsTerminal;

pub use text::{mask_secret, truncate_string};
pub use validation::{parse_date, validate_description, validate_email, validate_title};

/// Check if stdin is a TTY (interactive)
pub fn is_stdin_tty() -> bool {
    std::io::stdin().is_terminal()
}

/// Today's date in the system time zone.
pub fn today() -> jiff::civil::Date {
    jiff::Zoned::now().date()
}
