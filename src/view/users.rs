//! User list view state.

use std::sync::Arc;

use parking_lot::Mutex;

use super::cache::{CollectionCache, CollectionPage};
use super::sequence::{FetchOutcome, FetchRequest, FetchSequencer};
use crate::error::Result;
use crate::query::UserQuery;
use crate::remote::{UserGateway, UserListResponse};
use crate::types::{User, UserId};

pub type SharedUsersView = Arc<Mutex<UsersView>>;

#[derive(Debug)]
pub struct UsersView {
    query: UserQuery,
    cache: CollectionCache<User>,
    sequencer: FetchSequencer,
    last_error: Option<String>,
}

impl UsersView {
    pub fn new(page_size: u32) -> Self {
        let query = UserQuery::new(page_size);
        Self {
            cache: CollectionCache::new(query.page_size()),
            query,
            sequencer: FetchSequencer::new(),
            last_error: None,
        }
    }

    pub fn shared(self) -> SharedUsersView {
        Arc::new(Mutex::new(self))
    }

    pub fn query(&self) -> &UserQuery {
        &self.query
    }

    pub fn cache(&self) -> &CollectionCache<User> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut CollectionCache<User> {
        &mut self.cache
    }

    pub fn page(&self) -> &CollectionPage<User> {
        self.cache.page()
    }

    pub fn is_loading(&self) -> bool {
        self.sequencer.is_pending()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn refresh(&mut self) -> FetchRequest<UserQuery> {
        self.commit()
    }

    /// Same rules as the issue search: trimmed, and unchanged text is not
    /// a change.
    pub fn set_search(&mut self, text: &str) -> Option<FetchRequest<UserQuery>> {
        let text = text.trim();
        if text == self.query.search {
            return None;
        }
        self.query.set_search(text);
        Some(self.commit())
    }

    pub fn set_page(&mut self, page: u32) -> Result<FetchRequest<UserQuery>> {
        self.query.set_page(page)?;
        Ok(self.commit())
    }

    pub fn reset_page(&mut self) -> FetchRequest<UserQuery> {
        self.query.reset_page();
        self.commit()
    }

    pub fn apply_fetch(&mut self, seq: u64, result: Result<UserListResponse>) -> FetchOutcome {
        if !self.sequencer.settle(seq) {
            return FetchOutcome::Stale;
        }
        match result {
            Ok(response) => {
                self.cache.replace(CollectionPage::from_response(
                    response.users,
                    response.pagination,
                ));
                self.last_error = None;
                FetchOutcome::Applied
            }
            Err(err) => {
                let message = err.user_message();
                self.last_error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    pub fn forget_user(&mut self, id: UserId) {
        self.cache.remove_record(id);
    }

    fn commit(&mut self) -> FetchRequest<UserQuery> {
        let seq = self.sequencer.issue();
        tracing::debug!(seq, page = self.query.page(), "issuing user list fetch");
        FetchRequest {
            seq,
            query: self.query.clone(),
        }
    }
}

pub async fn run_user_fetch<G: UserGateway>(
    view: &SharedUsersView,
    gateway: &G,
    request: FetchRequest<UserQuery>,
) -> FetchOutcome {
    let result = gateway.list_users(&request.query).await;
    view.lock().apply_fetch(request.seq, result)
}
