mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Call, FakeGateway, RecordingDownloader, RecordingNotifier, issue, user};
use issuedesk::error::DeskError;
use issuedesk::mutation::{
    ActionOutcome, Decision, IssueCoordinator, PendingAction, PendingUserAction, SavePlan,
    StatusTransitionGuard, UserCoordinator,
};
use issuedesk::query::ExportFilter;
use issuedesk::query::params::ExportFormat;
use issuedesk::remote::{Invitation, InvitationResponse, IssueUpdate, NewIssue, UserUpdate};
use issuedesk::types::{IssueStatus, Role, UserId, UserStatus};
use issuedesk::view::{IssuesView, UsersView, open_issue, run_issue_fetch, run_user_fetch};

type Issues = IssueCoordinator<FakeGateway, RecordingNotifier>;
type Users = UserCoordinator<FakeGateway, RecordingNotifier>;

fn issues_setup(gateway: FakeGateway) -> (Arc<FakeGateway>, Arc<RecordingNotifier>, Issues) {
    let gateway = Arc::new(gateway);
    let notifier = Arc::new(RecordingNotifier::default());
    let coordinator = IssueCoordinator::new(
        Arc::clone(&gateway),
        IssuesView::new(10).shared(),
        Arc::clone(&notifier),
    );
    (gateway, notifier, coordinator)
}

async fn load_page(coordinator: &Issues, gateway: &FakeGateway) {
    let request = coordinator.view().lock().refresh();
    assert!(
        run_issue_fetch(coordinator.view(), gateway, request)
            .await
            .is_applied()
    );
}

fn retitle(text: &str) -> IssueUpdate {
    IssueUpdate {
        title: Some(text.to_string()),
        ..Default::default()
    }
}

fn plan(gateway: &FakeGateway, fields: IssueUpdate, status: IssueStatus) -> SavePlan {
    let current = gateway.stored_issue(7).expect("issue 7 is seeded");
    SavePlan::new(&current, fields, status).unwrap()
}

// ============================================================================
// Edit-form save
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_save_runs_field_update_and_status_change_concurrently() {
    let (gateway, notifier, coordinator) =
        issues_setup(FakeGateway::new().with_issues(vec![issue(7, IssueStatus::Open)]));
    load_page(&coordinator, &gateway).await;
    gateway.require_concurrent_save();

    let plan = plan(&gateway, retitle("Renamed"), IssueStatus::InProgress);
    let saved = tokio::time::timeout(Duration::from_secs(5), coordinator.save(plan))
        .await
        .expect("both requests should be in flight together")
        .unwrap();

    assert_eq!(saved.status, IssueStatus::InProgress);
    assert_eq!(gateway.count(|c| matches!(c, Call::UpdateIssue(7, _))), 1);
    assert_eq!(
        gateway.count(|c| matches!(c, Call::SetStatus(7, IssueStatus::InProgress))),
        1
    );

    let stored = gateway.stored_issue(7).unwrap();
    assert_eq!(stored.title, "Renamed");
    assert_eq!(stored.status, IssueStatus::InProgress);
    assert_eq!(notifier.successes(), ["Issue updated successfully"]);
    assert_eq!(
        coordinator.view().lock().cache().get(7).map(|i| i.status),
        Some(IssueStatus::InProgress)
    );
    assert!(!coordinator.is_busy(7));
}

#[tokio::test]
async fn test_save_with_unchanged_status_sends_one_request() {
    let (gateway, notifier, coordinator) =
        issues_setup(FakeGateway::new().with_issues(vec![issue(7, IssueStatus::Open)]));
    load_page(&coordinator, &gateway).await;

    let plan = plan(&gateway, retitle("Renamed"), IssueStatus::Open);
    let saved = coordinator.save(plan).await.unwrap();

    assert_eq!(saved.title, "Renamed");
    assert_eq!(gateway.count(|c| matches!(c, Call::SetStatus(..))), 0);
    assert_eq!(gateway.count(|c| matches!(c, Call::UpdateIssue(..))), 1);
    assert_eq!(notifier.successes(), ["Issue updated successfully"]);
    assert_eq!(
        coordinator.view().lock().page().items[0].title,
        "Renamed"
    );
}

#[tokio::test]
async fn test_save_partial_failure_leaves_cache_untouched() {
    let (gateway, notifier, coordinator) =
        issues_setup(FakeGateway::new().with_issues(vec![issue(7, IssueStatus::Open)]));
    load_page(&coordinator, &gateway).await;
    gateway.fail("set_issue_status", Some(500), "Invalid transition");

    let plan = plan(&gateway, retitle("Renamed"), IssueStatus::Resolved);
    let err = coordinator.save(plan).await.unwrap_err();

    match err {
        DeskError::PartialFailure { operation, message } => {
            assert_eq!(operation, "status change");
            assert_eq!(message, "Invalid transition");
        }
        other => panic!("expected a partial failure, got {other:?}"),
    }
    assert_eq!(
        notifier.failures(),
        ["Failed to save issue: Invalid transition"]
    );
    assert!(notifier.successes().is_empty());

    let view = coordinator.view().lock();
    let cached = view.cache().get(7).unwrap();
    assert_eq!(cached.title, "Issue 7");
    assert_eq!(cached.status, IssueStatus::Open);
}

#[tokio::test]
async fn test_save_total_failure_is_a_request_error() {
    let (gateway, notifier, coordinator) =
        issues_setup(FakeGateway::new().with_issues(vec![issue(7, IssueStatus::Open)]));
    gateway.fail("update_issue", Some(500), "Title too long");
    gateway.fail("set_issue_status", Some(500), "Invalid transition");

    let plan = plan(&gateway, retitle("Renamed"), IssueStatus::Closed);
    let err = coordinator.save(plan).await.unwrap_err();

    assert!(matches!(
        err,
        DeskError::Request {
            status: Some(500),
            ..
        }
    ));
    assert_eq!(notifier.failures().len(), 1);
    assert!(!coordinator.is_busy(7));
}

#[tokio::test(start_paused = true)]
async fn test_second_mutation_on_same_record_is_busy() {
    let (gateway, _notifier, coordinator) = issues_setup(FakeGateway::new().with_issues(vec![
        issue(7, IssueStatus::Open),
        issue(8, IssueStatus::Open),
    ]));
    gateway.delay_mutations(Duration::from_millis(100));

    let (first, second, other) = tokio::join!(
        coordinator.change_status(7, IssueStatus::InProgress),
        coordinator.change_status(7, IssueStatus::Closed),
        coordinator.change_status(8, IssueStatus::InProgress),
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(DeskError::Busy(7))));
    assert!(other.is_ok());
    assert_eq!(gateway.count(|c| matches!(c, Call::SetStatus(7, _))), 1);
    assert_eq!(
        gateway.stored_issue(7).unwrap().status,
        IssueStatus::InProgress
    );
}

// ============================================================================
// Confirmation gate
// ============================================================================

#[tokio::test]
async fn test_guarded_status_change_runs_only_after_confirm() {
    let (gateway, notifier, coordinator) =
        issues_setup(FakeGateway::new().with_issues(vec![issue(7, IssueStatus::Open)]));
    let mut guard = StatusTransitionGuard::new();
    let action = PendingAction::SetStatus {
        id: 7,
        from: IssueStatus::Open,
        to: IssueStatus::Closed,
    };

    assert_eq!(guard.submit(action.clone()), Decision::AwaitConfirmation);
    assert!(guard.cancel());
    assert!(gateway.calls().is_empty());

    guard.submit(action);
    let confirmed = guard.confirm().expect("action is pending");
    let outcome = coordinator.run(confirmed).await.unwrap();

    let ActionOutcome::StatusChanged(updated) = outcome else {
        panic!("expected a status change");
    };
    assert_eq!(updated.status, IssueStatus::Closed);
    assert_eq!(notifier.successes(), ["Issue marked as closed"]);
}

#[tokio::test]
async fn test_failed_status_change_names_the_target() {
    let (gateway, notifier, coordinator) =
        issues_setup(FakeGateway::new().with_issues(vec![issue(7, IssueStatus::Open)]));
    gateway.fail("set_issue_status", Some(400), "Issue is locked");

    let err = coordinator
        .change_status(7, IssueStatus::Resolved)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Issue is locked");
    assert_eq!(
        notifier.failures(),
        ["Failed to mark issue as resolved: Issue is locked"]
    );
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_focused_issue_clears_detail_without_refetch() {
    let (gateway, notifier, coordinator) = issues_setup(FakeGateway::new().with_issues(vec![
        issue(1, IssueStatus::Open),
        issue(2, IssueStatus::Open),
        issue(3, IssueStatus::Open),
    ]));
    load_page(&coordinator, &gateway).await;
    open_issue(coordinator.view(), &*gateway, 2).await.unwrap();

    coordinator.delete(2).await.unwrap();

    let view = coordinator.view().lock();
    let ids: Vec<_> = view.page().items.iter().map(|i| i.id).collect();
    assert_eq!(ids, [1, 3]);
    assert_eq!(view.page().total_count, 3);
    assert!(view.detail().get().is_none());
    assert_eq!(gateway.count(|c| matches!(c, Call::ListIssues(_))), 1);
    assert_eq!(notifier.successes(), ["Issue deleted successfully"]);
}

#[tokio::test]
async fn test_failed_delete_keeps_issue() {
    let (gateway, notifier, coordinator) =
        issues_setup(FakeGateway::new().with_issues(vec![issue(2, IssueStatus::Open)]));
    load_page(&coordinator, &gateway).await;
    gateway.fail("delete_issue", Some(403), "Forbidden");

    assert!(coordinator.delete(2).await.is_err());
    assert!(coordinator.view().lock().cache().contains(2));
    assert_eq!(notifier.failures(), ["Failed to delete issue: Forbidden"]);
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_returns_to_first_page() {
    let (gateway, notifier, coordinator) = issues_setup(
        FakeGateway::new().with_issues((1..=15).map(|id| issue(id, IssueStatus::Open)).collect()),
    );
    let request = coordinator.view().lock().set_page(2).unwrap();
    run_issue_fetch(coordinator.view(), &*gateway, request).await;

    let (created, request) = coordinator
        .create(NewIssue {
            title: "Checkout button missing".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(request.query.page(), 1);
    run_issue_fetch(coordinator.view(), &*gateway, request).await;

    let view = coordinator.view().lock();
    assert_eq!(view.page().page, 1);
    assert_eq!(view.page().items[0].id, created.id);
    assert_eq!(view.page().total_count, 16);
    assert_eq!(notifier.successes(), ["Issue created successfully"]);
}

#[tokio::test]
async fn test_create_with_blank_title_sends_nothing() {
    let (gateway, notifier, coordinator) = issues_setup(FakeGateway::new());

    let err = coordinator
        .create(NewIssue {
            title: "   ".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(gateway.calls().is_empty());
    assert!(notifier.notices().is_empty());
}

// ============================================================================
// Export
// ============================================================================

#[tokio::test]
async fn test_export_rejects_inverted_dates() {
    let (gateway, _notifier, coordinator) = issues_setup(FakeGateway::new());
    let downloader = RecordingDownloader::default();
    let filter = ExportFilter {
        from_date: Some(jiff::civil::date(2024, 3, 1)),
        to_date: Some(jiff::civil::date(2024, 2, 1)),
        ..Default::default()
    };

    let err = coordinator
        .export(ExportFormat::Csv, &filter, &downloader)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "From date must be before or equal to To date"
    );
    assert!(gateway.calls().is_empty());
    assert!(downloader.downloads().is_empty());
}

#[tokio::test]
async fn test_export_hands_payload_to_downloader() {
    let (gateway, notifier, coordinator) = issues_setup(FakeGateway::new());
    gateway.set_export_payload(b"id,title\n1,Crash\n");
    let downloader = RecordingDownloader::default();
    let filter = ExportFilter {
        status: Some(IssueStatus::Open),
        ..Default::default()
    };

    coordinator
        .export(ExportFormat::Csv, &filter, &downloader)
        .await
        .unwrap();

    assert_eq!(
        downloader.downloads(),
        [("issues.csv".to_string(), b"id,title\n1,Crash\n".to_vec())]
    );
    assert_eq!(
        gateway.calls(),
        [Call::Export(ExportFormat::Csv, filter)]
    );
    assert_eq!(notifier.successes(), ["Issues exported as CSV successfully"]);
}

#[tokio::test]
async fn test_export_failure_passes_server_message_through() {
    let (gateway, notifier, coordinator) = issues_setup(FakeGateway::new());
    gateway.fail("export_issues", Some(500), "Export service unavailable");
    let downloader = RecordingDownloader::default();

    assert!(
        coordinator
            .export(ExportFormat::Json, &ExportFilter::default(), &downloader)
            .await
            .is_err()
    );
    assert_eq!(notifier.failures(), ["Export service unavailable"]);
    assert!(downloader.downloads().is_empty());
}

// ============================================================================
// Users
// ============================================================================

async fn users_setup(
    current_user: Option<UserId>,
) -> (Arc<FakeGateway>, Arc<RecordingNotifier>, Users) {
    let gateway = Arc::new(FakeGateway::new().with_users(vec![user(1), user(2), user(3)]));
    let notifier = Arc::new(RecordingNotifier::default());
    let coordinator = UserCoordinator::new(
        Arc::clone(&gateway),
        UsersView::new(10).shared(),
        Arc::clone(&notifier),
    )
    .with_current_user(current_user);

    let request = coordinator.view().lock().refresh();
    assert!(
        run_user_fetch(coordinator.view(), &*gateway, request)
            .await
            .is_applied()
    );
    (gateway, notifier, coordinator)
}

#[tokio::test]
async fn test_invite_with_email_warning_is_reported_as_failure() {
    let (gateway, notifier, coordinator) = users_setup(None).await;
    gateway.set_invite_response(InvitationResponse {
        message: Some("Invitation created".to_string()),
        warning: Some("SMTP unavailable".to_string()),
        invitation_link: Some("https://console.example.com/invite/abc".to_string()),
    });

    let (response, request) = coordinator
        .invite(Invitation {
            email: "  new@example.com ".to_string(),
            fname: "New".to_string(),
            lname: "Person".to_string(),
            role: Role::User,
        })
        .await
        .unwrap();

    assert!(response.invitation_link.is_some());
    assert_eq!(request.query.page(), 1);
    assert_eq!(
        notifier.failures(),
        ["Invitation created but email failed: SMTP unavailable"]
    );
    let Some(Call::Invite(sent)) = gateway.calls().last().cloned() else {
        panic!("expected an invite call");
    };
    assert_eq!(sent.email, "new@example.com");
}

#[tokio::test]
async fn test_invite_rejects_bad_email() {
    let (gateway, _notifier, coordinator) = users_setup(None).await;

    let err = coordinator
        .invite(Invitation {
            email: "not-an-email".to_string(),
            fname: String::new(),
            lname: String::new(),
            role: Role::Admin,
        })
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(gateway.count(|c| matches!(c, Call::Invite(_))), 0);
}

#[tokio::test]
async fn test_update_merges_cached_row() {
    let (gateway, notifier, coordinator) = users_setup(Some(1)).await;

    coordinator
        .update(
            2,
            UserUpdate {
                fname: Some(Some("Grace".to_string())),
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let view = coordinator.view().lock();
    let cached = view.cache().get(2).unwrap();
    assert_eq!(cached.fname.as_deref(), Some("Grace"));
    assert_eq!(cached.role, Role::Admin);
    assert_eq!(cached.lname.as_deref(), Some("Last2"));
    assert_eq!(notifier.successes(), ["User updated successfully"]);
    assert_eq!(gateway.count(|c| matches!(c, Call::ListUsers(_))), 1);
}

#[tokio::test]
async fn test_update_refetches_current_page() {
    let (gateway, _notifier, coordinator) = users_setup(None).await;

    let request = coordinator
        .update(
            3,
            UserUpdate {
                status: Some(UserStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(request.query.page(), 1);

    let outcome = run_user_fetch(coordinator.view(), &*gateway, request).await;
    assert!(outcome.is_applied());
    assert_eq!(gateway.count(|c| matches!(c, Call::ListUsers(_))), 2);
}

#[tokio::test]
async fn test_load_user_replaces_cached_row() {
    let (gateway, _notifier, coordinator) = users_setup(None).await;
    coordinator
        .view()
        .lock()
        .cache_mut()
        .patch_record(2, |u| u.fname = Some("Stale".to_string()));

    let loaded = coordinator.load(2).await.unwrap();
    assert_eq!(loaded.email, "user2@example.com");
    assert_eq!(
        coordinator.view().lock().cache().get(2).and_then(|u| u.fname.clone()),
        Some("First2".to_string())
    );

    let err = coordinator.load(99).await.unwrap_err();
    assert_eq!(err.to_string(), "User not found");
    assert_eq!(gateway.count(|c| matches!(c, Call::GetUser(_))), 2);
}

#[tokio::test]
async fn test_own_account_role_and_status_are_not_sent() {
    let (gateway, _notifier, coordinator) = users_setup(Some(1)).await;

    let err = coordinator
        .update(
            1,
            UserUpdate {
                role: Some(Role::Admin),
                status: Some(UserStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(gateway.count(|c| matches!(c, Call::UpdateUser(..))), 0);

    coordinator
        .update(
            1,
            UserUpdate {
                lname: Some(None),
                status: Some(UserStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let Some(Call::UpdateUser(1, sent)) = gateway.calls().last().cloned() else {
        panic!("expected an update call");
    };
    assert_eq!(sent.status, None);
    assert_eq!(sent.lname, Some(None));
}

#[tokio::test]
async fn test_cannot_delete_own_account() {
    let (gateway, _notifier, coordinator) = users_setup(Some(1)).await;

    assert!(coordinator.delete(1).await.unwrap_err().is_validation());
    assert_eq!(gateway.count(|c| matches!(c, Call::DeleteUser(_))), 0);

    coordinator.delete(3).await.unwrap();
    let ids: Vec<_> = coordinator
        .view()
        .lock()
        .page()
        .items
        .iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(ids, [1, 2]);
}

#[tokio::test]
async fn test_guarded_user_delete_runs_through_user_coordinator() {
    let (gateway, _notifier, coordinator) = users_setup(Some(1)).await;
    let mut guard = StatusTransitionGuard::new();

    assert_eq!(
        guard.submit(PendingUserAction::Delete(2)),
        Decision::AwaitConfirmation
    );
    assert_eq!(gateway.count(|c| matches!(c, Call::DeleteUser(_))), 0);

    let confirmed = guard.confirm().expect("delete is pending");
    assert_eq!(coordinator.run(confirmed).await.unwrap(), 2);
    assert_eq!(gateway.count(|c| matches!(c, Call::DeleteUser(2))), 1);
    assert!(coordinator.view().lock().page().items.iter().all(|u| u.id != 2));
}
