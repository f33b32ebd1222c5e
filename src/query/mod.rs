//! Query intent for collection views.
//!
//! A query intent is what the user asked to see: search text, filters, sort
//! and page. Every change other than a page change sends the view back to
//! page 1, so an intent can never point past the end of a newly filtered
//! result set.

use serde::Serialize;

use crate::error::{DeskError, Result};
use crate::types::{IssueStatus, Priority, Severity, UserId};

pub mod params;
pub mod sort;

pub use sort::{SortDirection, SortField, toggle_sort};

/// Page size used by every list view unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Assignee filter: everyone, nobody, or one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum AssigneeFilter {
    #[default]
    Any,
    Unassigned,
    User(UserId),
}

impl AssigneeFilter {
    /// Value of the `assigned_to` parameter, `None` when the filter is off.
    pub fn as_param(&self) -> Option<String> {
        match self {
            AssigneeFilter::Any => None,
            AssigneeFilter::Unassigned => Some("unassigned".to_string()),
            AssigneeFilter::User(id) => Some(id.to_string()),
        }
    }
}

impl std::str::FromStr for AssigneeFilter {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" | "any" | "all" => Ok(AssigneeFilter::Any),
            "unassigned" | "none" => Ok(AssigneeFilter::Unassigned),
            other => other
                .parse::<UserId>()
                .map(AssigneeFilter::User)
                .map_err(|_| DeskError::InvalidValue {
                    kind: "assignee",
                    value: s.to_string(),
                }),
        }
    }
}

/// What the issue list should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueQuery {
    pub search: String,
    pub status: Option<IssueStatus>,
    pub priority: Option<Priority>,
    pub severity: Option<Severity>,
    pub assigned_to: AssigneeFilter,
    pub created_by: Option<UserId>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    page: u32,
    page_size: u32,
}

impl Default for IssueQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl IssueQuery {
    /// Fresh intent: no search, no filters, newest first, page 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            search: String::new(),
            status: None,
            priority: None,
            severity: None,
            assigned_to: AssigneeFilter::Any,
            created_by: None,
            sort_field: SortField::default(),
            sort_direction: SortDirection::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Merge a partial change into the intent.
    ///
    /// Returns `Ok(false)` when the patch touches nothing. Any non-empty patch
    /// resets the page to 1.
    pub fn apply(&mut self, patch: IssueFilterPatch) -> Result<bool> {
        if patch.is_empty() {
            return Ok(false);
        }
        if patch.page_size == Some(0) {
            return Err(DeskError::Validation(
                "Page size must be at least 1".to_string(),
            ));
        }

        if let Some(search) = patch.search {
            self.search = search;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(severity) = patch.severity {
            self.severity = severity;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(created_by) = patch.created_by {
            self.created_by = created_by;
        }
        if let Some(field) = patch.sort_field {
            self.sort_field = field;
        }
        if let Some(direction) = patch.sort_direction {
            self.sort_direction = direction;
        }
        if let Some(size) = patch.page_size {
            self.page_size = size;
        }
        self.page = 1;
        Ok(true)
    }

    /// Move to another page without touching anything else.
    pub fn set_page(&mut self, page: u32) -> Result<()> {
        self.page = validate_page(page)?;
        Ok(())
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Patch produced by clicking the `field` column header.
    pub fn sort_patch(&self, field: SortField) -> IssueFilterPatch {
        let (field, direction) = toggle_sort(self.sort_field, self.sort_direction, field);
        IssueFilterPatch::default()
            .sort_field(field)
            .sort_direction(direction)
    }

    /// The part of the intent an export carries along.
    pub fn export_filter(&self) -> ExportFilter {
        ExportFilter {
            status: self.status,
            priority: self.priority,
            severity: self.severity,
            from_date: None,
            to_date: None,
        }
    }
}

/// Partial change to an [`IssueQuery`].
///
/// Outer `None` leaves a field alone; `Some(None)` clears a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilterPatch {
    pub search: Option<String>,
    pub status: Option<Option<IssueStatus>>,
    pub priority: Option<Option<Priority>>,
    pub severity: Option<Option<Severity>>,
    pub assigned_to: Option<AssigneeFilter>,
    pub created_by: Option<Option<UserId>>,
    pub sort_field: Option<SortField>,
    pub sort_direction: Option<SortDirection>,
    pub page_size: Option<u32>,
}

impl IssueFilterPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn status(mut self, status: Option<IssueStatus>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn severity(mut self, severity: Option<Severity>) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn assigned_to(mut self, assignee: AssigneeFilter) -> Self {
        self.assigned_to = Some(assignee);
        self
    }

    pub fn created_by(mut self, user: Option<UserId>) -> Self {
        self.created_by = Some(user);
        self
    }

    pub fn sort_field(mut self, field: SortField) -> Self {
        self.sort_field = Some(field);
        self
    }

    pub fn sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = Some(direction);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }
}

/// What the user list should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserQuery {
    pub search: String,
    page: u32,
    page_size: u32,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl UserQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            search: String::new(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Replace the search text; always returns to page 1.
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.page = 1;
    }

    pub fn set_page(&mut self, page: u32) -> Result<()> {
        self.page = validate_page(page)?;
        Ok(())
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }
}

/// Filter subset sent with an export request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub status: Option<IssueStatus>,
    pub priority: Option<Priority>,
    pub severity: Option<Severity>,
    pub from_date: Option<jiff::civil::Date>,
    pub to_date: Option<jiff::civil::Date>,
}

impl ExportFilter {
    /// Reject an inverted date range before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from_date, self.to_date)
            && from > to
        {
            return Err(DeskError::Validation(
                "From date must be before or equal to To date".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_page(page: u32) -> Result<u32> {
    if page == 0 {
        return Err(DeskError::Validation(
            "Page must be at least 1".to_string(),
        ));
    }
    Ok(page)
}
