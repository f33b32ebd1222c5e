//! Remote collection gateway.
//!
//! Typed request/response mapping for the console API's issue and user
//! endpoints. Gateways hold no view state; every call is a single request
//! and a single typed result.

pub mod error;
pub mod http;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::query::params::ExportFormat;
use crate::query::{ExportFilter, IssueQuery, UserQuery};
use crate::types::{
    Issue, IssueCounts, IssueId, IssueStatus, Priority, Role, Severity, User, UserId, UserStatus,
};

pub use http::HttpGateway;

/// Pagination block returned by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

/// Response of `GET /issues`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueListResponse {
    pub issues: Vec<Issue>,
    pub pagination: Pagination,
    #[serde(default)]
    pub counts: Option<IssueCounts>,
}

/// Response of `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

/// Body of `POST /issues`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewIssue {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: Severity,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Body of `PUT /issues/{id}`: the editable fields, never the status.
///
/// `assigned_to: Some(None)` is sent as `null` and unassigns the issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<UserId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl IssueUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of `PATCH /issues/{id}/status`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusChange {
    pub status: IssueStatus,
}

/// Body of `POST /users/invite`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invitation {
    pub email: String,
    pub fname: String,
    pub lname: String,
    pub role: Role,
}

/// Response of `POST /users/invite`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InvitationResponse {
    #[serde(default)]
    pub message: Option<String>,
    /// Set when the invitation exists but the email could not be delivered.
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub invitation_link: Option<String>,
}

/// Body of `PUT /users/{id}`. The endpoint returns no record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fname: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lname: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the sent fields into a cached user, leaving the rest untouched.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(fname) = &self.fname {
            user.fname = fname.clone();
        }
        if let Some(lname) = &self.lname {
            user.lname = lname.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(status) = self.status {
            user.status = Some(status);
        }
    }
}

/// Issue endpoints of the console API.
pub trait IssueGateway: Send + Sync {
    fn list_issues(
        &self,
        query: &IssueQuery,
    ) -> impl Future<Output = Result<IssueListResponse>> + Send;

    fn get_issue(&self, id: IssueId) -> impl Future<Output = Result<Issue>> + Send;

    fn create_issue(&self, issue: &NewIssue) -> impl Future<Output = Result<Issue>> + Send;

    fn update_issue(
        &self,
        id: IssueId,
        update: &IssueUpdate,
    ) -> impl Future<Output = Result<Issue>> + Send;

    fn set_issue_status(
        &self,
        id: IssueId,
        status: IssueStatus,
    ) -> impl Future<Output = Result<Issue>> + Send;

    fn delete_issue(&self, id: IssueId) -> impl Future<Output = Result<()>> + Send;

    fn export_issues(
        &self,
        format: ExportFormat,
        filter: &ExportFilter,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// User endpoints of the console API.
pub trait UserGateway: Send + Sync {
    fn list_users(&self, query: &UserQuery)
    -> impl Future<Output = Result<UserListResponse>> + Send;

    fn get_user(&self, id: UserId) -> impl Future<Output = Result<User>> + Send;

    fn invite_user(
        &self,
        invitation: &Invitation,
    ) -> impl Future<Output = Result<InvitationResponse>> + Send;

    fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_user(&self, id: UserId) -> impl Future<Output = Result<()>> + Send;
}
