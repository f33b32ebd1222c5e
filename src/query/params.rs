//! Query-string encoding for list and export requests.
//!
//! Parameters map one-to-one onto intent fields. Filters that are off are
//! left out entirely rather than sent as empty strings.

use super::{ExportFilter, IssueQuery, UserQuery};

/// Export payload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

crate::enum_display_fromstr!(
    ExportFormat,
    "export format",
    {
        Json => "json",
        Csv => "csv",
    }
);

impl ExportFormat {
    /// File name handed to the download collaborator.
    pub fn file_name(self) -> String {
        format!("issues.{}", self.as_str())
    }
}

pub type QueryParams = Vec<(&'static str, String)>;

/// Parameters for `GET /issues`.
pub fn issue_list_params(query: &IssueQuery) -> QueryParams {
    let mut params: QueryParams = vec![
        ("page", query.page().to_string()),
        ("limit", query.page_size().to_string()),
    ];
    if !query.search.is_empty() {
        params.push(("search", query.search.clone()));
    }
    if let Some(status) = query.status {
        params.push(("status", status.to_string()));
    }
    if let Some(priority) = query.priority {
        params.push(("priority", priority.to_string()));
    }
    if let Some(severity) = query.severity {
        params.push(("severity", severity.to_string()));
    }
    if let Some(assignee) = query.assigned_to.as_param() {
        params.push(("assigned_to", assignee));
    }
    if let Some(creator) = query.created_by {
        params.push(("created_by", creator.to_string()));
    }
    params.push(("sort_by", query.sort_field.to_string()));
    params.push(("sort_order", query.sort_direction.to_string()));
    params
}

/// Parameters for `GET /users`.
pub fn user_list_params(query: &UserQuery) -> QueryParams {
    let mut params: QueryParams = vec![
        ("page", query.page().to_string()),
        ("limit", query.page_size().to_string()),
    ];
    if !query.search.is_empty() {
        params.push(("search", query.search.clone()));
    }
    params
}

/// Parameters for `GET /issues/export`.
pub fn export_params(format: ExportFormat, filter: &ExportFilter) -> QueryParams {
    let mut params: QueryParams = vec![("format", format.to_string())];
    if let Some(status) = filter.status {
        params.push(("status", status.to_string()));
    }
    if let Some(priority) = filter.priority {
        params.push(("priority", priority.to_string()));
    }
    if let Some(severity) = filter.severity {
        params.push(("severity", severity.to_string()));
    }
    if let Some(from) = filter.from_date {
        params.push(("from_date", from.to_string()));
    }
    if let Some(to) = filter.to_date {
        params.push(("to_date", to.to_string()));
    }
    params
}

/// Render parameters as `k=v&k=v` for logs and snapshots.
pub fn to_query_string(params: &QueryParams) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}
