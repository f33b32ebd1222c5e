//! User mutations: invite, update, delete.

use std::sync::Arc;

use super::guard::PendingUserAction;
use super::single_flight::SingleFlight;
use crate::error::{DeskError, Result};
use crate::notify::Notifier;
use crate::query::UserQuery;
use crate::remote::{Invitation, InvitationResponse, UserGateway, UserUpdate};
use crate::types::{User, UserId};
use crate::utils::validate_email;
use crate::view::{FetchRequest, SharedUsersView};

pub const INVITATION_SENT: &str = "Invitation sent successfully";
pub const USER_UPDATED: &str = "User updated successfully";
pub const USER_DELETED: &str = "User deleted successfully";

pub struct UserCoordinator<G, N> {
    gateway: Arc<G>,
    view: SharedUsersView,
    notifier: Arc<N>,
    flights: SingleFlight,
    current_user: Option<UserId>,
}

impl<G: UserGateway, N: Notifier> UserCoordinator<G, N> {
    pub fn new(gateway: Arc<G>, view: SharedUsersView, notifier: Arc<N>) -> Self {
        Self {
            gateway,
            view,
            notifier,
            flights: SingleFlight::new(),
            current_user: None,
        }
    }

    /// The signed-in account. Its role and status are never changed and it
    /// cannot be deleted.
    pub fn with_current_user(mut self, id: Option<UserId>) -> Self {
        self.current_user = id;
        self
    }

    pub fn view(&self) -> &SharedUsersView {
        &self.view
    }

    fn is_own_account(&self, id: UserId) -> bool {
        self.current_user == Some(id)
    }

    /// Load one user by id. The cached row, if on the current page, is
    /// replaced with the server copy.
    pub async fn load(&self, id: UserId) -> Result<User> {
        let user = self.gateway.get_user(id).await?;
        self.view.lock().cache_mut().put_record(user.clone());
        Ok(user)
    }

    /// Invite a user. The invitation may exist even when its email could not
    /// be delivered; that case is reported as a failure naming the warning.
    pub async fn invite(
        &self,
        mut invitation: Invitation,
    ) -> Result<(InvitationResponse, FetchRequest<UserQuery>)> {
        invitation.email = invitation.email.trim().to_string();
        validate_email(&invitation.email)?;
        invitation.fname = invitation.fname.trim().to_string();
        invitation.lname = invitation.lname.trim().to_string();

        match self.gateway.invite_user(&invitation).await {
            Ok(response) => {
                let request = self.view.lock().reset_page();
                match &response.warning {
                    Some(warning) => self.notifier.notify_failure(&format!(
                        "Invitation created but email failed: {warning}"
                    )),
                    None => self
                        .notifier
                        .notify_success(response.message.as_deref().unwrap_or(INVITATION_SENT)),
                }
                Ok((response, request))
            }
            Err(err) => {
                self.notifier.notify_failure(&err.user_message());
                Err(err)
            }
        }
    }

    /// Update a user. The endpoint returns nothing, so the cached row is
    /// merged with the fields that were sent; the returned request refetches
    /// the current page for the columns only the server knows.
    pub async fn update(
        &self,
        id: UserId,
        mut update: UserUpdate,
    ) -> Result<FetchRequest<UserQuery>> {
        if self.is_own_account(id) {
            update.role = None;
            update.status = None;
        }
        if update.is_empty() {
            return Err(DeskError::Validation("No changes to save".to_string()));
        }
        let _flight = self.flights.acquire(id)?;

        match self.gateway.update_user(id, &update).await {
            Ok(()) => {
                let request = {
                    let mut view = self.view.lock();
                    view.cache_mut().patch_record(id, |user| update.apply_to(user));
                    view.refresh()
                };
                self.notifier.notify_success(USER_UPDATED);
                Ok(request)
            }
            Err(err) => {
                self.notifier.notify_failure(&err.user_message());
                Err(err)
            }
        }
    }

    pub async fn delete(&self, id: UserId) -> Result<()> {
        if self.is_own_account(id) {
            return Err(DeskError::Validation(
                "Cannot delete your own account".to_string(),
            ));
        }
        let _flight = self.flights.acquire(id)?;

        match self.gateway.delete_user(id).await {
            Ok(()) => {
                self.view.lock().forget_user(id);
                self.notifier.notify_success(USER_DELETED);
                Ok(())
            }
            Err(err) => {
                self.notifier.notify_failure(&err.user_message());
                Err(err)
            }
        }
    }

    /// Execute an action released by the confirmation guard.
    pub async fn run(&self, action: PendingUserAction) -> Result<UserId> {
        match action {
            PendingUserAction::Delete(id) => self.delete(id).await.map(|()| id),
        }
    }
}
