//! Confirmation gate for destructive or terminal transitions.
//!
//! Moving an issue into `resolved` or `closed` from any other status, and
//! deleting anything, must be confirmed before it runs. Everything else
//! goes straight through.

use super::issues::SavePlan;
use crate::types::{IssueId, IssueStatus, UserId};

/// True when moving from `current` to `new` must be confirmed.
pub fn requires_status_confirmation(current: IssueStatus, new: IssueStatus) -> bool {
    new != current && new.is_terminal()
}

/// Something that may have to be confirmed before it runs.
pub trait Confirmable {
    fn requires_confirmation(&self) -> bool;

    /// Question put to the user before the action runs.
    fn prompt(&self) -> &'static str;
}

/// An issue mutation waiting to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// Edit form submission: field update and/or status change.
    Save(SavePlan),
    /// Direct "mark resolved/closed" from the detail view.
    SetStatus {
        id: IssueId,
        from: IssueStatus,
        to: IssueStatus,
    },
    DeleteIssue(IssueId),
}

impl Confirmable for PendingAction {
    fn requires_confirmation(&self) -> bool {
        match self {
            PendingAction::Save(plan) => plan
                .status
                .is_some_and(|to| requires_status_confirmation(plan.current_status(), to)),
            PendingAction::SetStatus { from, to, .. } => requires_status_confirmation(*from, *to),
            PendingAction::DeleteIssue(_) => true,
        }
    }

    fn prompt(&self) -> &'static str {
        let target = match self {
            PendingAction::Save(plan) => plan.status,
            PendingAction::SetStatus { to, .. } => Some(*to),
            PendingAction::DeleteIssue(_) => {
                return "Are you sure you want to delete this issue? This action cannot be undone.";
            }
        };
        match target {
            Some(IssueStatus::Closed) => "Are you sure you want to close this issue?",
            Some(IssueStatus::Resolved) => "Are you sure you want to mark this issue as resolved?",
            _ => "Are you sure?",
        }
    }
}

/// A user mutation waiting to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingUserAction {
    Delete(UserId),
}

impl Confirmable for PendingUserAction {
    fn requires_confirmation(&self) -> bool {
        true
    }

    fn prompt(&self) -> &'static str {
        "Are you sure you want to delete this user? This action cannot be undone."
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState<A> {
    Idle,
    AwaitingConfirmation(A),
}

impl<A> Default for GuardState<A> {
    fn default() -> Self {
        GuardState::Idle
    }
}

/// Result of submitting an action to the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<A> {
    /// No confirmation needed; run it.
    Proceed(A),
    /// Held until [`StatusTransitionGuard::confirm`] or
    /// [`StatusTransitionGuard::cancel`].
    AwaitConfirmation,
}

#[derive(Debug)]
pub struct StatusTransitionGuard<A = PendingAction> {
    state: GuardState<A>,
}

impl<A> Default for StatusTransitionGuard<A> {
    fn default() -> Self {
        Self {
            state: GuardState::Idle,
        }
    }
}

impl<A: Confirmable> StatusTransitionGuard<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GuardState<A> {
        &self.state
    }

    pub fn pending(&self) -> Option<&A> {
        match &self.state {
            GuardState::AwaitingConfirmation(action) => Some(action),
            GuardState::Idle => None,
        }
    }

    /// Submit an action. A new submission replaces one still awaiting
    /// confirmation.
    pub fn submit(&mut self, action: A) -> Decision<A> {
        if action.requires_confirmation() {
            self.state = GuardState::AwaitingConfirmation(action);
            Decision::AwaitConfirmation
        } else {
            self.state = GuardState::Idle;
            Decision::Proceed(action)
        }
    }

    /// Confirm the held action and hand it back for execution.
    pub fn confirm(&mut self) -> Option<A> {
        match std::mem::take(&mut self.state) {
            GuardState::AwaitingConfirmation(action) => Some(action),
            GuardState::Idle => None,
        }
    }

    /// Drop the held action. Returns whether anything was pending.
    pub fn cancel(&mut self) -> bool {
        matches!(
            std::mem::take(&mut self.state),
            GuardState::AwaitingConfirmation(_)
        )
    }
}
