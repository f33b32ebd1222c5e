//! Due-date state shown next to an issue.

use jiff::civil::Date;

/// Days ahead of the due date at which an issue counts as due soon.
pub const DUE_SOON_DAYS: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    Overdue,
    DueSoon,
    Normal,
}

/// Classify `due` relative to `today`.
pub fn due_state(due: Date, today: Date) -> DueState {
    if due < today {
        return DueState::Overdue;
    }
    let days = (due - today).get_days();
    if days <= DUE_SOON_DAYS {
        DueState::DueSoon
    } else {
        DueState::Normal
    }
}

/// Parse the calendar part of a server due date (`2024-03-01` or a full
/// timestamp starting with it).
pub fn parse_due_day(raw: &str) -> Option<Date> {
    let day = raw.split('T').next()?;
    day.parse::<Date>().ok()
}
