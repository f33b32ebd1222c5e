pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod macros;
pub mod mutation;
pub mod notify;
pub mod query;
pub mod remote;
pub mod types;
pub mod utils;
pub mod view;

pub use config::Config;
pub use error::{DeskError, Result};
pub use mutation::{
    ActionOutcome, Confirmable, Decision, IssueCoordinator, PendingAction, PendingUserAction,
    SavePlan, StatusTransitionGuard, UserCoordinator,
};
pub use notify::{Downloader, Notifier};
pub use query::{AssigneeFilter, ExportFilter, IssueFilterPatch, IssueQuery, UserQuery};
pub use remote::{HttpGateway, IssueGateway, UserGateway};
pub use types::{Issue, IssueStatus, Priority, Record, RecordId, Role, Severity, User, UserStatus};
pub use view::{FetchOutcome, FetchRequest, IssuesView, UsersView};
