#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::{Arc, Once};
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::Barrier;

use issuedesk::error::{DeskError, Result};
use issuedesk::notify::{Downloader, Notifier};
use issuedesk::query::params::ExportFormat;
use issuedesk::query::{ExportFilter, IssueQuery, UserQuery};
use issuedesk::remote::{
    Invitation, InvitationResponse, IssueGateway, IssueListResponse, IssueUpdate, NewIssue,
    Pagination, UserGateway, UserListResponse, UserUpdate,
};
use issuedesk::types::{
    Issue, IssueCounts, IssueId, IssueStatus, Priority, Role, Severity, User, UserId, UserStatus,
};

static INIT: Once = Once::new();

/// Route the library's tracing output through the test harness.
pub fn init_test_logging() {
    INIT.call_once(|| {
        issuedesk::logging::init_test_logging();
    });
}

// ============================================================================
// CLI runner
// ============================================================================

/// Runs the issuedesk binary against a config file in a temp directory.
pub struct DeskTest {
    pub temp_dir: TempDir,
    binary_path: &'static str,
}

impl DeskTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        DeskTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_issuedesk"),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("ISSUEDESK_CONFIG", self.config_path())
            .env_remove("ISSUEDESK_API_URL")
            .env_remove("ISSUEDESK_TOKEN")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute issuedesk command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Command {:?} should have failed\nstdout: {}",
            args,
            String::from_utf8_lossy(&output.stdout)
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn issue(id: IssueId, status: IssueStatus) -> Issue {
    Issue {
        id,
        title: format!("Issue {id}"),
        description: None,
        severity: Severity::Medium,
        priority: Priority::Medium,
        status,
        created_by: 1,
        assigned_to: None,
        due_date: None,
        created_by_email: Some("admin@example.com".to_string()),
        assigned_to_email: None,
        created_at: "2024-01-01T00:00:00.000Z".to_string(),
        updated_at: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

pub fn titled(id: IssueId, title: &str) -> Issue {
    Issue {
        title: title.to_string(),
        ..issue(id, IssueStatus::Open)
    }
}

pub fn user(id: UserId) -> User {
    User {
        id,
        email: format!("user{id}@example.com"),
        fname: Some(format!("First{id}")),
        lname: Some(format!("Last{id}")),
        role: Role::User,
        status: Some(UserStatus::Active),
        created_at: None,
    }
}

// ============================================================================
// Scripted in-memory gateway
// ============================================================================

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListIssues(IssueQuery),
    GetIssue(IssueId),
    CreateIssue(NewIssue),
    UpdateIssue(IssueId, IssueUpdate),
    SetStatus(IssueId, IssueStatus),
    DeleteIssue(IssueId),
    Export(ExportFormat, ExportFilter),
    ListUsers(UserQuery),
    GetUser(UserId),
    Invite(Invitation),
    UpdateUser(UserId, UserUpdate),
    DeleteUser(UserId),
}

/// Stands in for the console API. Holds issues and users in memory, records
/// every call, and can be told to fail, to delay, or to make the field
/// update and status change of one save wait for each other.
#[derive(Default)]
pub struct FakeGateway {
    issues: Mutex<Vec<Issue>>,
    users: Mutex<Vec<User>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, (Option<u16>, String)>>,
    list_delays: Mutex<VecDeque<Duration>>,
    mutation_delay: Mutex<Option<Duration>>,
    save_rendezvous: Mutex<Option<Arc<Barrier>>>,
    invite_response: Mutex<InvitationResponse>,
    export_payload: Mutex<Vec<u8>>,
    next_id: Mutex<IssueId>,
}

impl FakeGateway {
    pub fn new() -> Self {
        init_test_logging();
        let gateway = Self::default();
        *gateway.next_id.lock() = 1000;
        gateway
    }

    pub fn with_issues(self, issues: Vec<Issue>) -> Self {
        *self.issues.lock() = issues;
        self
    }

    pub fn with_users(self, users: Vec<User>) -> Self {
        *self.users.lock() = users;
        self
    }

    /// Make `operation` fail with the given status and message until cleared.
    pub fn fail(&self, operation: &'static str, status: Option<u16>, message: &str) {
        self.failures
            .lock()
            .insert(operation, (status, message.to_string()));
    }

    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// Delays applied to successive list calls, in call order.
    pub fn delay_lists(&self, delays: impl IntoIterator<Item = Duration>) {
        self.list_delays.lock().extend(delays);
    }

    /// Delay applied to every mutation.
    pub fn delay_mutations(&self, delay: Duration) {
        *self.mutation_delay.lock() = Some(delay);
    }

    /// The field update and the status change each wait until the other has
    /// started. A save that issued them one after the other never finishes.
    pub fn require_concurrent_save(&self) {
        *self.save_rendezvous.lock() = Some(Arc::new(Barrier::new(2)));
    }

    pub fn set_invite_response(&self, response: InvitationResponse) {
        *self.invite_response.lock() = response;
    }

    pub fn set_export_payload(&self, payload: &[u8]) {
        *self.export_payload.lock() = payload.to_vec();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| matches(c)).count()
    }

    pub fn stored_issue(&self, id: IssueId) -> Option<Issue> {
        self.issues.lock().iter().find(|i| i.id == id).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn check(&self, operation: &'static str) -> Result<()> {
        match self.failures.lock().get(operation) {
            Some((status, message)) => Err(DeskError::request(*status, message.clone())),
            None => Ok(()),
        }
    }

    async fn mutation_pause(&self) {
        let delay = *self.mutation_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn rendezvous(&self) {
        let barrier = self.save_rendezvous.lock().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
    }

    fn modify_issue(&self, id: IssueId, change: impl FnOnce(&mut Issue)) -> Result<Issue> {
        let mut issues = self.issues.lock();
        let issue = issues
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| DeskError::request(Some(404), "Issue not found"))?;
        change(issue);
        issue.updated_at = "2024-02-01T00:00:00.000Z".to_string();
        Ok(issue.clone())
    }
}

fn paginate<T: Clone>(rows: &[T], page: u32, limit: u32) -> (Vec<T>, Pagination) {
    let total = rows.len() as u64;
    let start = ((page.max(1) - 1) * limit) as usize;
    let items = rows.iter().skip(start).take(limit as usize).cloned().collect();
    (
        items,
        Pagination {
            page,
            limit,
            total,
            pages: total.div_ceil(u64::from(limit.max(1))) as u32,
        },
    )
}

impl IssueGateway for FakeGateway {
    async fn list_issues(&self, query: &IssueQuery) -> Result<IssueListResponse> {
        self.record(Call::ListIssues(query.clone()));
        let delay = self.list_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check("list_issues")?;

        let issues = self.issues.lock().clone();
        let mut counts = IssueCounts::default();
        for issue in &issues {
            match issue.status {
                IssueStatus::Open => counts.open += 1,
                IssueStatus::InProgress => counts.in_progress += 1,
                IssueStatus::Resolved => counts.resolved += 1,
                IssueStatus::Closed => counts.closed += 1,
            }
        }
        let search = query.search.to_lowercase();
        let matching: Vec<Issue> = issues
            .into_iter()
            .filter(|i| search.is_empty() || i.title.to_lowercase().contains(&search))
            .filter(|i| query.status.is_none_or(|s| i.status == s))
            .filter(|i| query.priority.is_none_or(|p| i.priority == p))
            .collect();
        let (issues, pagination) = paginate(&matching, query.page(), query.page_size());
        Ok(IssueListResponse {
            issues,
            pagination,
            counts: Some(counts),
        })
    }

    async fn get_issue(&self, id: IssueId) -> Result<Issue> {
        self.record(Call::GetIssue(id));
        self.check("get_issue")?;
        self.stored_issue(id)
            .ok_or_else(|| DeskError::request(Some(404), "Issue not found"))
    }

    async fn create_issue(&self, new: &NewIssue) -> Result<Issue> {
        self.record(Call::CreateIssue(new.clone()));
        self.mutation_pause().await;
        self.check("create_issue")?;

        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            *next
        };
        let created = Issue {
            title: new.title.clone(),
            description: new.description.clone(),
            severity: new.severity,
            priority: new.priority,
            assigned_to: new.assigned_to,
            due_date: new.due_date.clone(),
            ..issue(id, IssueStatus::Open)
        };
        self.issues.lock().insert(0, created.clone());
        Ok(created)
    }

    async fn update_issue(&self, id: IssueId, update: &IssueUpdate) -> Result<Issue> {
        self.record(Call::UpdateIssue(id, update.clone()));
        self.rendezvous().await;
        self.mutation_pause().await;
        self.check("update_issue")?;
        self.modify_issue(id, |issue| {
            if let Some(title) = &update.title {
                issue.title = title.clone();
            }
            if let Some(description) = &update.description {
                issue.description = Some(description.clone());
            }
            if let Some(severity) = update.severity {
                issue.severity = severity;
            }
            if let Some(priority) = update.priority {
                issue.priority = priority;
            }
            if let Some(assigned_to) = update.assigned_to {
                issue.assigned_to = assigned_to;
            }
            if let Some(due) = &update.due_date {
                issue.due_date = Some(due.clone());
            }
        })
    }

    async fn set_issue_status(&self, id: IssueId, status: IssueStatus) -> Result<Issue> {
        self.record(Call::SetStatus(id, status));
        self.rendezvous().await;
        self.mutation_pause().await;
        self.check("set_issue_status")?;
        self.modify_issue(id, |issue| issue.status = status)
    }

    async fn delete_issue(&self, id: IssueId) -> Result<()> {
        self.record(Call::DeleteIssue(id));
        self.mutation_pause().await;
        self.check("delete_issue")?;
        self.issues.lock().retain(|i| i.id != id);
        Ok(())
    }

    async fn export_issues(&self, format: ExportFormat, filter: &ExportFilter) -> Result<Vec<u8>> {
        self.record(Call::Export(format, filter.clone()));
        self.check("export_issues")?;
        Ok(self.export_payload.lock().clone())
    }
}

impl UserGateway for FakeGateway {
    async fn list_users(&self, query: &UserQuery) -> Result<UserListResponse> {
        self.record(Call::ListUsers(query.clone()));
        let delay = self.list_delays.lock().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check("list_users")?;

        let search = query.search.to_lowercase();
        let matching: Vec<User> = self
            .users
            .lock()
            .iter()
            .filter(|u| search.is_empty() || u.email.to_lowercase().contains(&search))
            .cloned()
            .collect();
        let (users, pagination) = paginate(&matching, query.page(), query.page_size());
        Ok(UserListResponse { users, pagination })
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        self.record(Call::GetUser(id));
        self.check("get_user")?;
        self.users
            .lock()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| DeskError::request(Some(404), "User not found"))
    }

    async fn invite_user(&self, invitation: &Invitation) -> Result<InvitationResponse> {
        self.record(Call::Invite(invitation.clone()));
        self.check("invite_user")?;
        Ok(self.invite_response.lock().clone())
    }

    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<()> {
        self.record(Call::UpdateUser(id, update.clone()));
        self.mutation_pause().await;
        self.check("update_user")
    }

    async fn delete_user(&self, id: UserId) -> Result<()> {
        self.record(Call::DeleteUser(id));
        self.mutation_pause().await;
        self.check("delete_user")?;
        self.users.lock().retain(|u| u.id != id);
        Ok(())
    }
}

// ============================================================================
// Recording collaborators
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Failure(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn successes(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Success(m) => Some(m),
                Notice::Failure(_) => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter_map(|n| match n {
                Notice::Failure(m) => Some(m),
                Notice::Success(_) => None,
            })
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, message: &str) {
        self.notices.lock().push(Notice::Success(message.to_string()));
    }

    fn notify_failure(&self, message: &str) {
        self.notices.lock().push(Notice::Failure(message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingDownloader {
    downloads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl RecordingDownloader {
    pub fn downloads(&self) -> Vec<(String, Vec<u8>)> {
        self.downloads.lock().clone()
    }
}

impl Downloader for RecordingDownloader {
    fn download(&self, file_name: &str, payload: &[u8]) -> Result<PathBuf> {
        self.downloads
            .lock()
            .push((file_name.to_string(), payload.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}
