//! Per-view client state: intent, cached page, fetch sequencing, detail
//! focus and search debouncing.

pub mod cache;
pub mod debounce;
pub mod detail;
pub mod due;
pub mod issues;
pub mod sequence;
pub mod users;

pub use cache::{CollectionCache, CollectionPage};
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use detail::{CurrentRecord, DetailLoad};
pub use due::{DueState, due_state};
pub use issues::{IssuesView, SharedIssuesView, open_issue, run_issue_fetch};
pub use sequence::{FetchOutcome, FetchRequest, FetchSequencer};
pub use users::{SharedUsersView, UsersView, run_user_fetch};
