//! The page of records a view is currently showing.

use crate::remote::Pagination;
use crate::types::{Record, RecordId};

/// One server page, kept in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPage<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_count: u32,
    pub page_size: u32,
    pub page: u32,
}

impl<T> CollectionPage<T> {
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page_count: 0,
            page_size: page_size.max(1),
            page: 1,
        }
    }

    /// Build a page from a list response.
    ///
    /// `page_count` is derived from the total and the page size rather than
    /// taken from the server, and rows beyond `page_size` are dropped.
    pub fn from_response(mut items: Vec<T>, pagination: Pagination) -> Self {
        let page_size = pagination.limit.max(1);
        if items.len() > page_size as usize {
            tracing::warn!(
                received = items.len(),
                page_size,
                "server returned more rows than the page size"
            );
            items.truncate(page_size as usize);
        }
        Self {
            items,
            total_count: pagination.total,
            page_count: page_count(pagination.total, page_size),
            page_size,
            page: pagination.page.max(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// 1-based row range for a "Showing X to Y of Z" footer.
    pub fn row_range(&self) -> Option<(u64, u64)> {
        if self.items.is_empty() {
            return None;
        }
        let first = u64::from(self.page - 1) * u64::from(self.page_size) + 1;
        Some((first, first + self.items.len() as u64 - 1))
    }
}

/// `ceil(total / page_size)`.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    u32::try_from(total.div_ceil(size)).unwrap_or(u32::MAX)
}

/// Single-page cache owned by one view.
#[derive(Debug, Clone)]
pub struct CollectionCache<T> {
    page: CollectionPage<T>,
    loaded: bool,
}

impl<T: Record> CollectionCache<T> {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: CollectionPage::empty(page_size),
            loaded: false,
        }
    }

    /// Swap in a freshly fetched page.
    pub fn replace(&mut self, page: CollectionPage<T>) {
        self.page = page;
        self.loaded = true;
    }

    /// Whether any fetch has been applied yet.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn page(&self) -> &CollectionPage<T> {
        &self.page
    }

    pub fn items(&self) -> &[T] {
        &self.page.items
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.page.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Update the record with `id` in place. Returns false, touching
    /// nothing, when the record is not on the cached page.
    pub fn patch_record(&mut self, id: RecordId, updater: impl FnOnce(&mut T)) -> bool {
        match self.page.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                updater(item);
                true
            }
            None => false,
        }
    }

    /// Overwrite the cached copy with a server response for the same id.
    pub fn put_record(&mut self, record: T) -> bool {
        let id = record.id();
        self.patch_record(id, move |item| *item = record)
    }

    /// Drop the record from the page.
    ///
    /// Totals are left as they were until the next fetch.
    pub fn remove_record(&mut self, id: RecordId) -> Option<T> {
        let index = self.page.items.iter().position(|item| item.id() == id)?;
        Some(self.page.items.remove(index))
    }
}
