//! Issue mutations against the remote gateway.
//!
//! Every mutation reports its outcome through the [`Notifier`] and, on
//! success, reconciles the owning view's cache and detail slot by id. A
//! failed mutation leaves both untouched.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;

use super::guard::PendingAction;
use super::single_flight::SingleFlight;
use crate::error::{DeskError, Result};
use crate::notify::{Downloader, Notifier};
use crate::query::params::ExportFormat;
use crate::query::{ExportFilter, IssueQuery};
use crate::remote::{IssueGateway, IssueUpdate, NewIssue};
use crate::types::{Issue, IssueId, IssueStatus};
use crate::utils::{validate_description, validate_title};
use crate::view::{FetchRequest, SharedIssuesView};

pub const ISSUE_CREATED: &str = "Issue created successfully";
pub const ISSUE_UPDATED: &str = "Issue updated successfully";
pub const ISSUE_DELETED: &str = "Issue deleted successfully";
pub const SAVE_FAILED: &str = "Failed to save issue";
pub const EXPORT_FAILED: &str = "Export failed";

/// The requests an edit-form submission needs.
///
/// The status change is only planned when it differs from the record's
/// current status, and the field update only when some field is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    pub id: IssueId,
    pub fields: Option<IssueUpdate>,
    pub status: Option<IssueStatus>,
    current_status: IssueStatus,
}

impl SavePlan {
    pub fn new(current: &Issue, fields: IssueUpdate, status: IssueStatus) -> Result<Self> {
        if let Some(title) = &fields.title {
            validate_title(title)?;
        }
        if let Some(description) = &fields.description {
            validate_description(description)?;
        }

        let status = (status != current.status).then_some(status);
        let fields = (!fields.is_empty()).then_some(fields);
        if fields.is_none() && status.is_none() {
            return Err(DeskError::Validation("No changes to save".to_string()));
        }

        Ok(Self {
            id: current.id,
            fields,
            status,
            current_status: current.status,
        })
    }

    pub fn current_status(&self) -> IssueStatus {
        self.current_status
    }

    /// Number of requests the plan will issue.
    pub fn request_count(&self) -> usize {
        usize::from(self.fields.is_some()) + usize::from(self.status.is_some())
    }
}

/// Settled sub-request of a save.
enum SubRequest {
    Fields(Result<Issue>),
    Status(Result<Issue>),
}

/// What a confirmed or unguarded action produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Saved(Issue),
    StatusChanged(Issue),
    Deleted(IssueId),
}

pub struct IssueCoordinator<G, N> {
    gateway: Arc<G>,
    view: SharedIssuesView,
    notifier: Arc<N>,
    flights: SingleFlight,
}

impl<G: IssueGateway, N: Notifier> IssueCoordinator<G, N> {
    pub fn new(gateway: Arc<G>, view: SharedIssuesView, notifier: Arc<N>) -> Self {
        Self {
            gateway,
            view,
            notifier,
            flights: SingleFlight::new(),
        }
    }

    pub fn view(&self) -> &SharedIssuesView {
        &self.view
    }

    pub fn is_busy(&self, id: IssueId) -> bool {
        self.flights.is_busy(id)
    }

    /// Create an issue. On success the view goes back to page 1 and the
    /// returned request should be run so the new issue shows up.
    pub async fn create(&self, issue: NewIssue) -> Result<(Issue, FetchRequest<IssueQuery>)> {
        validate_title(&issue.title)?;
        if let Some(description) = &issue.description {
            validate_description(description)?;
        }

        match self.gateway.create_issue(&issue).await {
            Ok(created) => {
                tracing::info!(id = created.id, "issue created");
                let request = self.view.lock().reset_page();
                self.notifier.notify_success(ISSUE_CREATED);
                Ok((created, request))
            }
            Err(err) => {
                self.notify_failure(SAVE_FAILED, &err);
                Err(err)
            }
        }
    }

    /// Run an edit-form save: field update and status change issued
    /// concurrently, both awaited, success only if every issued request
    /// succeeded.
    pub async fn save(&self, plan: SavePlan) -> Result<Issue> {
        let _flight = self.flights.acquire(plan.id)?;
        let id = plan.id;
        tracing::debug!(id, requests = plan.request_count(), "saving issue");

        let mut pending: FuturesUnordered<BoxFuture<'_, SubRequest>> = FuturesUnordered::new();
        if let Some(fields) = &plan.fields {
            let gateway = &*self.gateway;
            pending.push(async move { SubRequest::Fields(gateway.update_issue(id, fields).await) }.boxed());
        }
        if let Some(status) = plan.status {
            pending.push(async move { SubRequest::Status(self.send_status(id, status).await) }.boxed());
        }

        let mut updated_fields = None;
        let mut updated_status = None;
        let mut first_error: Option<(&'static str, DeskError)> = None;
        while let Some(settled) = pending.next().await {
            let (operation, result) = match settled {
                SubRequest::Fields(result) => ("field update", result.map(|i| updated_fields = Some(i))),
                SubRequest::Status(result) => ("status change", result.map(|i| updated_status = Some(i))),
            };
            if let Err(err) = result {
                tracing::warn!(id, operation, error = %err, "save sub-request failed");
                if first_error.is_none() {
                    first_error = Some((operation, err));
                }
            }
        }
        drop(pending);

        if let Some((operation, err)) = first_error {
            let err = if updated_fields.is_some() || updated_status.is_some() {
                DeskError::PartialFailure {
                    operation,
                    message: err.user_message(),
                }
            } else {
                err
            };
            self.notify_failure(SAVE_FAILED, &err);
            return Err(err);
        }

        let saved = {
            let mut view = self.view.lock();
            let mut saved = None;
            for issue in [updated_fields, updated_status].into_iter().flatten() {
                view.store_issue(&issue);
                saved = Some(issue);
            }
            saved
        };
        self.notifier.notify_success(ISSUE_UPDATED);
        saved.ok_or_else(|| DeskError::Validation("No changes to save".to_string()))
    }

    /// Direct status change from the detail view.
    pub async fn change_status(&self, id: IssueId, status: IssueStatus) -> Result<Issue> {
        let _flight = self.flights.acquire(id)?;
        let label = status_label(status);

        match self.send_status(id, status).await {
            Ok(issue) => {
                self.view.lock().store_issue(&issue);
                self.notifier
                    .notify_success(&format!("Issue marked as {label}"));
                Ok(issue)
            }
            Err(err) => {
                self.notify_failure(&format!("Failed to mark issue as {label}"), &err);
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: IssueId) -> Result<()> {
        let _flight = self.flights.acquire(id)?;

        match self.gateway.delete_issue(id).await {
            Ok(()) => {
                tracing::info!(id, "issue deleted");
                self.view.lock().forget_issue(id);
                self.notifier.notify_success(ISSUE_DELETED);
                Ok(())
            }
            Err(err) => {
                self.notify_failure("Failed to delete issue", &err);
                Err(err)
            }
        }
    }

    /// Execute an action released by the confirmation guard.
    pub async fn run(&self, action: PendingAction) -> Result<ActionOutcome> {
        match action {
            PendingAction::Save(plan) => self.save(plan).await.map(ActionOutcome::Saved),
            PendingAction::SetStatus { id, to, .. } => self
                .change_status(id, to)
                .await
                .map(ActionOutcome::StatusChanged),
            PendingAction::DeleteIssue(id) => {
                self.delete(id).await.map(|()| ActionOutcome::Deleted(id))
            }
        }
    }

    /// Export issues matching `filter` and hand the payload to `downloader`.
    pub async fn export<D: Downloader>(
        &self,
        format: ExportFormat,
        filter: &ExportFilter,
        downloader: &D,
    ) -> Result<PathBuf> {
        filter.validate()?;

        let result = match self.gateway.export_issues(format, filter).await {
            Ok(payload) => downloader.download(&format.file_name(), &payload),
            Err(err) => Err(err),
        };

        match result {
            Ok(path) => {
                self.notifier.notify_success(&format!(
                    "Issues exported as {} successfully",
                    format.as_str().to_uppercase()
                ));
                Ok(path)
            }
            Err(err) => {
                let message = match &err {
                    DeskError::Request {
                        status: Some(_),
                        message,
                    } => message.clone(),
                    other => format!("{EXPORT_FAILED}: {other}"),
                };
                self.notifier.notify_failure(&message);
                Err(err)
            }
        }
    }

    /// The one status-change request both the edit form and the detail
    /// actions go through.
    async fn send_status(&self, id: IssueId, status: IssueStatus) -> Result<Issue> {
        tracing::debug!(id, %status, "changing issue status");
        self.gateway.set_issue_status(id, status).await
    }

    fn notify_failure(&self, context: &str, err: &DeskError) {
        self.notifier
            .notify_failure(&format!("{context}: {}", err.user_message()));
    }
}

fn status_label(status: IssueStatus) -> String {
    status.as_str().replace('_', " ")
}
