//! Issue list view state.
//!
//! Owns the intent, the cached page, the status counts and the detail slot
//! for one issue list. Every committed intent change hands back a
//! [`FetchRequest`]; the caller runs it against a gateway and feeds the
//! result back through [`IssuesView::apply_fetch`].

use std::sync::Arc;

use parking_lot::Mutex;

use super::cache::{CollectionCache, CollectionPage};
use super::detail::CurrentRecord;
use super::sequence::{FetchOutcome, FetchRequest, FetchSequencer};
use crate::error::Result;
use crate::query::{IssueFilterPatch, IssueQuery, SortField};
use crate::remote::{IssueGateway, IssueListResponse};
use crate::types::{Issue, IssueCounts, IssueId};

/// View state shared between the input loop and in-flight requests.
pub type SharedIssuesView = Arc<Mutex<IssuesView>>;

#[derive(Debug)]
pub struct IssuesView {
    query: IssueQuery,
    cache: CollectionCache<Issue>,
    counts: Option<IssueCounts>,
    sequencer: FetchSequencer,
    last_error: Option<String>,
    detail: CurrentRecord<Issue>,
}

impl IssuesView {
    pub fn new(page_size: u32) -> Self {
        let query = IssueQuery::new(page_size);
        Self {
            cache: CollectionCache::new(query.page_size()),
            query,
            counts: None,
            sequencer: FetchSequencer::new(),
            last_error: None,
            detail: CurrentRecord::new(),
        }
    }

    pub fn shared(self) -> SharedIssuesView {
        Arc::new(Mutex::new(self))
    }

    pub fn query(&self) -> &IssueQuery {
        &self.query
    }

    pub fn cache(&self) -> &CollectionCache<Issue> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut CollectionCache<Issue> {
        &mut self.cache
    }

    pub fn page(&self) -> &CollectionPage<Issue> {
        self.cache.page()
    }

    pub fn counts(&self) -> Option<&IssueCounts> {
        self.counts.as_ref()
    }

    pub fn detail(&self) -> &CurrentRecord<Issue> {
        &self.detail
    }

    pub fn detail_mut(&mut self) -> &mut CurrentRecord<Issue> {
        &mut self.detail
    }

    pub fn is_loading(&self) -> bool {
        self.sequencer.is_pending()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetch the current intent as-is, e.g. when the view is first shown.
    pub fn refresh(&mut self) -> FetchRequest<IssueQuery> {
        self.commit()
    }

    /// Merge a filter change. `Ok(None)` means the patch changed nothing
    /// and no fetch is needed.
    pub fn set_filters(&mut self, patch: IssueFilterPatch) -> Result<Option<FetchRequest<IssueQuery>>> {
        if self.query.apply(patch)? {
            Ok(Some(self.commit()))
        } else {
            Ok(None)
        }
    }

    /// Commit debounced search text. Surrounding whitespace is trimmed
    /// before it is sent; text identical to the committed search is not a
    /// change and issues no fetch.
    pub fn set_search(&mut self, text: &str) -> Option<FetchRequest<IssueQuery>> {
        let text = text.trim();
        if text == self.query.search {
            return None;
        }
        // A search-only patch cannot fail validation.
        self.set_filters(IssueFilterPatch::default().search(text))
            .ok()
            .flatten()
    }

    pub fn set_page(&mut self, page: u32) -> Result<FetchRequest<IssueQuery>> {
        self.query.set_page(page)?;
        Ok(self.commit())
    }

    /// Column-header click on `field`.
    pub fn set_sort(&mut self, field: SortField) -> FetchRequest<IssueQuery> {
        let patch = self.query.sort_patch(field);
        if let Err(err) = self.query.apply(patch) {
            tracing::warn!(error = %err, "sort patch rejected");
        }
        self.commit()
    }

    /// Back to page 1 and refetch, so a just-created issue shows up.
    pub fn reset_page(&mut self) -> FetchRequest<IssueQuery> {
        self.query.reset_page();
        self.commit()
    }

    /// Feed a settled fetch back in. Only the most recently issued request
    /// may change the view; a failure keeps the previous page.
    pub fn apply_fetch(&mut self, seq: u64, result: Result<IssueListResponse>) -> FetchOutcome {
        if !self.sequencer.settle(seq) {
            return FetchOutcome::Stale;
        }
        match result {
            Ok(response) => {
                self.cache.replace(CollectionPage::from_response(
                    response.issues,
                    response.pagination,
                ));
                if let Some(counts) = response.counts {
                    self.counts = Some(counts);
                }
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

    /// Put a server copy of an issue into both the page and the detail slot.
    pub fn store_issue(&mut self, issue: &Issue) {
        self.cache.put_record(issue.clone());
        self.detail.refresh(issue.clone());
    }

    /// Forget a deleted issue everywhere this view holds it.
    pub fn forget_issue(&mut self, id: IssueId) {
        self.cache.remove_record(id);
        self.detail.clear_if(id);
    }

    fn commit(&mut self) -> FetchRequest<IssueQuery> {
        let seq = self.sequencer.issue();
        tracing::debug!(seq, page = self.query.page(), "issuing issue list fetch");
        FetchRequest {
            seq,
            query: self.query.clone(),
        }
    }
}

/// Run one issued fetch and apply its result to the shared view.
///
/// The view lock is not held while the request is in flight.
pub async fn run_issue_fetch<G: IssueGateway>(
    view: &SharedIssuesView,
    gateway: &G,
    request: FetchRequest<IssueQuery>,
) -> FetchOutcome {
    let result = gateway.list_issues(&request.query).await;
    view.lock().apply_fetch(request.seq, result)
}

/// Focus an issue and load it. Returns `Ok(None)` when focus moved to
/// another issue before the response came back.
pub async fn open_issue<G: IssueGateway>(
    view: &SharedIssuesView,
    gateway: &G,
    id: IssueId,
) -> Result<Option<Issue>> {
    let load = view.lock().detail_mut().open(id);
    let result = gateway.get_issue(id).await;

    let mut guard = view.lock();
    if guard.detail_mut().complete(load, result)? {
        Ok(guard.detail().get().cloned())
    } else {
        Ok(None)
    }
}
