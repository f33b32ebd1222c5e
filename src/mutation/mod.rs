//! Record mutations and the confirmation gate in front of them.

pub mod guard;
pub mod issues;
pub mod single_flight;
pub mod users;

pub use guard::{
    Confirmable, Decision, GuardState, PendingAction, PendingUserAction, StatusTransitionGuard,
};
pub use issues::{ActionOutcome, IssueCoordinator, SavePlan};
pub use single_flight::SingleFlight;
pub use users::UserCoordinator;
