use serde::{Deserialize, Serialize};

use crate::enum_display_fromstr;

/// Server-assigned numeric identifier shared by issues and users.
pub type RecordId = u64;
pub type IssueId = RecordId;
pub type UserId = RecordId;

/// Anything that lives in a collection page and is reconciled by identity.
pub trait Record: Clone {
    fn id(&self) -> RecordId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

enum_display_fromstr!(
    IssueStatus,
    "status",
    {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
);

impl IssueStatus {
    /// Resolved and closed end an issue's working life; moving into them is guarded.
    pub fn is_terminal(self) -> bool {
        matches!(self, IssueStatus::Resolved | IssueStatus::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

enum_display_fromstr!(
    Severity,
    "severity",
    {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

enum_display_fromstr!(
    Priority,
    "priority",
    {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

enum_display_fromstr!(
    Role,
    "role",
    {
        Admin => "admin",
        User => "user",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Invited,
    Inactive,
}

enum_display_fromstr!(
    UserStatus,
    "user status",
    {
        Active => "active",
        Invited => "invited",
        Inactive => "inactive",
    }
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub severity: Severity,
    pub priority: Priority,
    pub status: IssueStatus,
    pub created_by: UserId,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_email: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Record for Issue {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Issue {
    /// Calendar part of the due date (`2024-03-01T00:00:00Z` -> `2024-03-01`).
    pub fn due_day(&self) -> Option<&str> {
        self.due_date
            .as_deref()
            .map(|d| d.split('T').next().unwrap_or(d))
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub fname: Option<String>,
    #[serde(default)]
    pub lname: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Record for User {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl User {
    /// Full name when one is set, otherwise the email address.
    pub fn display_name(&self) -> String {
        let name = [self.fname.as_deref(), self.lname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

/// Per-status totals across all issues, independent of the active filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssueCounts {
    #[serde(default)]
    pub open: u64,
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub resolved: u64,
    #[serde(default)]
    pub closed: u64,
}

impl IssueCounts {
    pub fn get(&self, status: IssueStatus) -> u64 {
        match status {
            IssueStatus::Open => self.open,
            IssueStatus::InProgress => self.in_progress,
            IssueStatus::Resolved => self.resolved,
            IssueStatus::Closed => self.closed,
        }
    }
}
