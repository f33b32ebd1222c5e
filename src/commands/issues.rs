//! Issue commands: list, show, create, edit, status changes, delete, export.

use std::path::PathBuf;

use owo_colors::OwoColorize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::interactive::gate;
use super::output::{
    FileDownloader, colored_priority, colored_severity, colored_status, format_due, page_footer,
};
use super::{CommandOutput, OutputOptions, Session, TerminalNotifier};
use crate::error::{DeskError, Result};
use crate::mutation::{ActionOutcome, IssueCoordinator, PendingAction, SavePlan};
use crate::query::params::ExportFormat;
use crate::query::{AssigneeFilter, ExportFilter, IssueFilterPatch, SortDirection, SortField};
use crate::remote::{HttpGateway, IssueUpdate, NewIssue};
use crate::types::{Issue, IssueCounts, IssueId, IssueStatus, Priority, Severity, UserId};
use crate::utils::{parse_date, today, truncate_string};
use crate::view::{CollectionPage, FetchOutcome, SharedIssuesView, open_issue, run_issue_fetch};

/// A row in the issue list table
#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "ID")]
    id: IssueId,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Due")]
    due: String,
}

impl IssueRow {
    fn new(issue: &Issue, today: jiff::civil::Date) -> Self {
        Self {
            id: issue.id,
            title: truncate_string(&issue.title, 50),
            status: colored_status(issue.status),
            priority: colored_priority(issue.priority),
            severity: colored_severity(issue.severity),
            assignee: assignee_label(issue),
            due: format_due(issue, today),
        }
    }
}

fn assignee_label(issue: &Issue) -> String {
    match (&issue.assigned_to_email, issue.assigned_to) {
        (Some(email), _) => email.clone(),
        (None, Some(id)) => format!("#{id}"),
        (None, None) => "-".to_string(),
    }
}

/// Flags of `issues ls`, mapped one-to-one onto the list intent.
#[derive(Debug, Clone, Default)]
pub struct IssueListOptions {
    pub search: Option<String>,
    pub status: Option<IssueStatus>,
    pub priority: Option<Priority>,
    pub severity: Option<Severity>,
    pub assignee: Option<AssigneeFilter>,
    pub created_by: Option<UserId>,
    pub sort: Option<SortField>,
    pub order: Option<SortDirection>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl IssueListOptions {
    pub(super) fn patch(&self) -> IssueFilterPatch {
        let mut patch = IssueFilterPatch::default();
        if let Some(search) = &self.search {
            patch = patch.search(search.trim());
        }
        if self.status.is_some() {
            patch = patch.status(self.status);
        }
        if self.priority.is_some() {
            patch = patch.priority(self.priority);
        }
        if self.severity.is_some() {
            patch = patch.severity(self.severity);
        }
        if let Some(assignee) = self.assignee {
            patch = patch.assigned_to(assignee);
        }
        if self.created_by.is_some() {
            patch = patch.created_by(self.created_by);
        }
        if let Some(field) = self.sort {
            patch = patch.sort_field(field);
        }
        if let Some(direction) = self.order {
            patch = patch.sort_direction(direction);
        }
        if let Some(limit) = self.limit {
            patch = patch.page_size(limit);
        }
        patch
    }
}

/// List issues matching the given intent
pub async fn cmd_issue_ls(options: IssueListOptions, output: OutputOptions) -> Result<()> {
    let session = Session::load()?;
    let coordinator = session.issues();
    let view = coordinator.view();

    let request = {
        let mut view = view.lock();
        view.set_filters(options.patch())?;
        match options.page {
            Some(page) => view.set_page(page)?,
            None => view.refresh(),
        }
    };

    if let FetchOutcome::Failed(message) =
        run_issue_fetch(view, &*session.gateway, request).await
    {
        return Err(DeskError::request(None, message));
    }

    let view = view.lock();
    print_issue_page(view.page(), view.counts(), output)
}

pub(super) fn print_issue_page(
    page: &CollectionPage<Issue>,
    counts: Option<&IssueCounts>,
    output: OutputOptions,
) -> Result<()> {
    let json_output = json!({
        "issues": page.items,
        "pagination": {
            "page": page.page,
            "page_size": page.page_size,
            "total": page.total_count,
            "pages": page.page_count,
        },
        "counts": counts,
    });

    let mut text = String::new();
    if let Some(counts) = counts {
        let summary: Vec<String> = [
            IssueStatus::Open,
            IssueStatus::InProgress,
            IssueStatus::Resolved,
            IssueStatus::Closed,
        ]
        .into_iter()
        .map(|s| format!("{} {}", s.as_str().replace('_', " "), counts.get(s).bold()))
        .collect();
        text.push_str(&summary.join("  "));
        text.push_str("\n\n");
    }
    if !page.is_empty() {
        let today = today();
        let rows: Vec<IssueRow> = page.items.iter().map(|i| IssueRow::new(i, today)).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        text.push_str(&table.to_string());
        text.push('\n');
    }
    text.push_str(&page_footer(page, "issues").dimmed().to_string());

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Show one issue
pub async fn cmd_issue_show(id: IssueId, output: OutputOptions) -> Result<()> {
    let session = Session::load()?;
    let coordinator = session.issues();
    let issue = load_issue(&session, coordinator.view(), id).await?;
    print_issue(&issue, output)
}

fn print_issue(issue: &Issue, output: OutputOptions) -> Result<()> {
    let mut text = format!(
        "{} {}\n\n",
        format!("#{}", issue.id).cyan(),
        issue.title.bold()
    );
    text.push_str(&format!("  status:     {}\n", colored_status(issue.status)));
    text.push_str(&format!("  priority:   {}\n", colored_priority(issue.priority)));
    text.push_str(&format!("  severity:   {}\n", colored_severity(issue.severity)));
    text.push_str(&format!("  assignee:   {}\n", assignee_label(issue)));
    text.push_str(&format!("  due:        {}\n", format_due(issue, today())));
    text.push_str(&format!(
        "  created by: {}\n",
        issue
            .created_by_email
            .clone()
            .unwrap_or_else(|| format!("#{}", issue.created_by))
    ));
    text.push_str(&format!("  created:    {}\n", issue.created_at));
    text.push_str(&format!("  updated:    {}", issue.updated_at));
    if let Some(description) = issue.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(&format!("\n\n{description}"));
    }

    CommandOutput::new(serde_json::to_value(issue)?)
        .with_text(text)
        .print(output)
}

async fn load_issue(
    session: &Session,
    view: &SharedIssuesView,
    id: IssueId,
) -> Result<Issue> {
    open_issue(view, &*session.gateway, id)
        .await?
        .ok_or_else(|| DeskError::request(None, format!("Issue {id} is no longer in focus")))
}

pub struct IssueCreateOptions {
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub priority: Priority,
    pub assigned_to: Option<UserId>,
    pub due_date: Option<String>,
}

/// Create an issue, then show the first page so it is visible
pub async fn cmd_issue_create(options: IssueCreateOptions, output: OutputOptions) -> Result<()> {
    let due_date = options
        .due_date
        .as_deref()
        .map(parse_date)
        .transpose()?
        .map(|d| d.to_string());

    let session = Session::load()?;
    let coordinator = session.issues();
    let (created, request) = coordinator
        .create(NewIssue {
            title: options.title.trim().to_string(),
            description: options.description,
            severity: options.severity,
            priority: options.priority,
            assigned_to: options.assigned_to,
            due_date,
        })
        .await?;
    // The refetch only matters to an interactive view; a failure here does
    // not undo the create.
    let outcome = run_issue_fetch(coordinator.view(), &*session.gateway, request).await;
    tracing::debug!(?outcome, "refetched after create");

    let text = format!("Created {}", format!("#{}", created.id).cyan());
    CommandOutput::new(serde_json::to_value(&created)?)
        .with_text(text)
        .print(output)
}

/// Flags of `issues edit`
#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub priority: Option<Priority>,
    pub assignee: Option<AssigneeFilter>,
    pub due_date: Option<String>,
    pub status: Option<IssueStatus>,
}

impl EditOptions {
    fn update(&self) -> Result<IssueUpdate> {
        let assigned_to = match self.assignee {
            None | Some(AssigneeFilter::Any) => None,
            Some(AssigneeFilter::Unassigned) => Some(None),
            Some(AssigneeFilter::User(id)) => Some(Some(id)),
        };
        let due_date = self
            .due_date
            .as_deref()
            .map(parse_date)
            .transpose()?
            .map(|d| d.to_string());
        Ok(IssueUpdate {
            title: self.title.as_ref().map(|t| t.trim().to_string()),
            description: self.description.clone(),
            severity: self.severity,
            priority: self.priority,
            assigned_to,
            due_date,
        })
    }
}

/// Edit an issue's fields and/or status in one save
pub async fn cmd_issue_edit(
    id: IssueId,
    options: EditOptions,
    assume_yes: bool,
    output: OutputOptions,
) -> Result<()> {
    let update = options.update()?;
    let session = Session::load()?;
    let coordinator = session.issues();
    let current = load_issue(&session, coordinator.view(), id).await?;

    let plan = SavePlan::new(&current, update, options.status.unwrap_or(current.status))?;
    run_gated(&coordinator, PendingAction::Save(plan), assume_yes, output).await
}

/// Move an issue to `status` (the detail-view resolve/close actions)
pub async fn cmd_issue_set_status(
    id: IssueId,
    status: IssueStatus,
    assume_yes: bool,
    output: OutputOptions,
) -> Result<()> {
    let session = Session::load()?;
    let coordinator = session.issues();
    let current = load_issue(&session, coordinator.view(), id).await?;

    if current.status == status {
        let text = format!("Issue #{id} is already {status}");
        return CommandOutput::new(json!({ "id": id, "status": status, "changed": false }))
            .with_text(text)
            .print(output);
    }

    let action = PendingAction::SetStatus {
        id,
        from: current.status,
        to: status,
    };
    run_gated(&coordinator, action, assume_yes, output).await
}

/// Delete an issue
pub async fn cmd_issue_delete(id: IssueId, assume_yes: bool, output: OutputOptions) -> Result<()> {
    let session = Session::load()?;
    let coordinator = session.issues();
    run_gated(&coordinator, PendingAction::DeleteIssue(id), assume_yes, output).await
}

async fn run_gated(
    coordinator: &IssueCoordinator<HttpGateway, TerminalNotifier>,
    action: PendingAction,
    assume_yes: bool,
    output: OutputOptions,
) -> Result<()> {
    let Some(action) = gate(action, assume_yes)? else {
        return CommandOutput::new(json!({ "cancelled": true }))
            .with_text("Cancelled".dimmed().to_string())
            .print(output);
    };

    match coordinator.run(action).await? {
        ActionOutcome::Saved(issue) | ActionOutcome::StatusChanged(issue) => {
            print_issue(&issue, output)
        }
        ActionOutcome::Deleted(id) => {
            CommandOutput::new(json!({ "id": id, "deleted": true }))
                .with_text(format!("Deleted issue #{id}"))
                .print(output)
        }
    }
}

/// Flags of `issues export`
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub status: Option<IssueStatus>,
    pub priority: Option<Priority>,
    pub severity: Option<Severity>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub output_dir: Option<PathBuf>,
}

/// Export issues to `issues.<format>`
pub async fn cmd_issue_export(options: ExportOptions, output: OutputOptions) -> Result<()> {
    let filter = ExportFilter {
        status: options.status,
        priority: options.priority,
        severity: options.severity,
        from_date: options.from.as_deref().map(parse_date).transpose()?,
        to_date: options.to.as_deref().map(parse_date).transpose()?,
    };
    filter.validate()?;

    let session = Session::load()?;
    let coordinator = session.issues();
    let downloader = FileDownloader::new(options.output_dir.unwrap_or_else(|| PathBuf::from(".")));
    let path = coordinator
        .export(options.format, &filter, &downloader)
        .await?;

    CommandOutput::new(json!({
        "format": options.format.as_str(),
        "path": path.to_string_lossy(),
    }))
    .with_text(format!("Wrote {}", path.display().cyan()))
    .print(output)
}
