mod common;

use common::DeskTest;

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let desk = DeskTest::new();
    let stdout = desk.run_success(&["completions", "bash"]);
    assert!(stdout.contains("_issuedesk"));
}

#[test]
fn test_completions_zsh() {
    let desk = DeskTest::new();
    let stdout = desk.run_success(&["completions", "zsh"]);
    assert!(stdout.contains("#compdef issuedesk"));
}

#[test]
fn test_completions_fish() {
    let desk = DeskTest::new();
    let stdout = desk.run_success(&["completions", "fish"]);
    assert!(stdout.contains("complete -c issuedesk"));
}

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn test_help_lists_command_groups() {
    let desk = DeskTest::new();
    let stdout = desk.run_success(&["--help"]);
    assert!(stdout.contains("issues"));
    assert!(stdout.contains("users"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_invalid_status_lists_valid_values() {
    let desk = DeskTest::new();
    let stderr = desk.run_failure(&["issues", "ls", "--status", "done"]);
    assert!(stderr.contains("Must be one of: open, in_progress, resolved, closed"));
}

#[test]
fn test_invalid_sort_field_is_rejected() {
    let desk = DeskTest::new();
    let stderr = desk.run_failure(&["issues", "ls", "--sort", "title"]);
    assert!(stderr.contains("Must be one of"));
}

#[test]
fn test_page_zero_is_rejected() {
    let desk = DeskTest::new();
    desk.run_failure(&["issues", "ls", "--page", "0"]);
    desk.run_failure(&["users", "ls", "--page", "0"]);
}

// ============================================================================
// Checks that run before any request is sent
// ============================================================================

#[test]
fn test_delete_without_terminal_requires_yes() {
    let desk = DeskTest::new();
    let stderr = desk.run_failure(&["issues", "rm", "3"]);
    assert!(stderr.contains("Are you sure you want to delete this issue?"));
    assert!(stderr.contains("Re-run with --yes to confirm."));

    let stderr = desk.run_failure(&["users", "rm", "3"]);
    assert!(stderr.contains("delete this user"));
}

#[test]
fn test_create_with_blank_title_fails_locally() {
    let desk = DeskTest::new();
    let stderr = desk.run_failure(&["issues", "create", "  "]);
    assert!(stderr.contains("Title is required"));
}

#[test]
fn test_export_with_inverted_dates_fails_locally() {
    let desk = DeskTest::new();
    let stderr = desk.run_failure(&[
        "issues",
        "export",
        "--from",
        "2024-03-01",
        "--to",
        "2024-02-01",
    ]);
    assert!(stderr.contains("From date must be before or equal to To date"));
}
