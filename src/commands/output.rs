//! Terminal implementations of the notification and download collaborators,
//! plus row formatting shared by the list commands.

use std::fs;
use std::path::PathBuf;

use owo_colors::OwoColorize;

use crate::error::{DeskError, Result};
use crate::notify::{Downloader, Notifier};
use crate::types::{Issue, IssueStatus, Priority, Severity};
use crate::view::{CollectionPage, DueState, due_state};
use crate::view::due::parse_due_day;

/// Prints notices to stderr so stdout stays clean for `--json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify_success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    fn notify_failure(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }
}

/// Writes exported payloads into a directory.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Downloader for FileDownloader {
    fn download(&self, file_name: &str, payload: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(file_name);
        fs::write(&path, payload).map_err(|e| {
            DeskError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write export to {}: {}", path.display(), e),
            ))
        })?;
        Ok(path)
    }
}

pub fn colored_status(status: IssueStatus) -> String {
    match status {
        IssueStatus::Open => status.yellow().to_string(),
        IssueStatus::InProgress => status.cyan().to_string(),
        IssueStatus::Resolved => status.green().to_string(),
        IssueStatus::Closed => status.dimmed().to_string(),
    }
}

pub fn colored_priority(priority: Priority) -> String {
    match priority {
        Priority::Urgent => priority.red().to_string(),
        Priority::High => priority.yellow().to_string(),
        _ => priority.to_string(),
    }
}

pub fn colored_severity(severity: Severity) -> String {
    match severity {
        Severity::Critical => severity.red().bold().to_string(),
        Severity::High => severity.red().to_string(),
        _ => severity.to_string(),
    }
}

/// Due day, highlighted when overdue or due soon.
pub fn format_due(issue: &Issue, today: jiff::civil::Date) -> String {
    let Some(day) = issue.due_day() else {
        return "-".dimmed().to_string();
    };
    match parse_due_day(day).map(|due| due_state(due, today)) {
        Some(DueState::Overdue) => day.red().to_string(),
        Some(DueState::DueSoon) => day.yellow().to_string(),
        _ => day.to_string(),
    }
}

/// `Showing 11-20 of 23 (page 2 of 3)`, or a plain "no results" line.
pub fn page_footer<T>(page: &CollectionPage<T>, noun: &str) -> String {
    match page.row_range() {
        Some((first, last)) => format!(
            "Showing {first}-{last} of {} (page {} of {})",
            page.total_count,
            page.page,
            page.page_count.max(1)
        ),
        None => format!("No {noun} found"),
    }
}
