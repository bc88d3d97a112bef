//! Event pages already fetched for the processed user.

use std::{collections::BTreeMap, sync::Arc};

use shared::domain::{EventPage, PageNumber, Username};
use tracing::debug;

/// Page store scoped to a single user. Entries are write-once and the whole
/// store is dropped before it is reused for someone else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationCache {
    owner: Option<Username>,
    pages: BTreeMap<PageNumber, Arc<EventPage>>,
}

impl PaginationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(&self) -> Option<&Username> {
        self.owner.as_ref()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page_numbers(&self) -> impl Iterator<Item = PageNumber> + '_ {
        self.pages.keys().copied()
    }

    pub fn contains(&self, username: &Username, page: PageNumber) -> bool {
        self.lookup(username, page).is_some()
    }

    /// Cache hit for `page`, only when the store belongs to `username`.
    pub fn lookup(&self, username: &Username, page: PageNumber) -> Option<Arc<EventPage>> {
        if self.owner.as_ref() != Some(username) {
            return None;
        }
        self.pages.get(&page).cloned()
    }

    pub fn clear(&mut self) {
        self.owner = None;
        self.pages.clear();
    }

    /// Stores a page for `username` and returns the stored entry. A page that
    /// is already present wins over the new one.
    pub fn insert(&mut self, username: &Username, page: EventPage) -> Arc<EventPage> {
        self.claim(username);
        self.pages
            .entry(page.page_number)
            .or_insert_with(|| Arc::new(page))
            .clone()
    }

    fn claim(&mut self, username: &Username) {
        if self.owner.as_ref() == Some(username) {
            return;
        }
        if let Some(previous) = &self.owner {
            debug!(%previous, next = %username, dropped = self.pages.len(), "event page cache switched user");
        }
        self.pages.clear();
        self.owner = Some(username.clone());
    }
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
