//! Per-collection view controller
//!
//! A controller owns its filters, paging offset and displayed page. Reloads
//! are split in two halves so the fetch itself can run elsewhere:
//!
//! - `begin_reload()` stamps a sequence number and builds the request
//! - `complete(seq, result)` applies the result only if `seq` is the latest
//!   issued; anything older is discarded
//!
//! This keeps the displayed page tied to the most recently *issued* reload,
//! whatever order the responses come back in.

use super::filters::{FilterKey, FilterSet};
use super::view::ViewKind;
use crate::models::Page;
use crate::transport::{decode, ApiRequest, TransportError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Server-side page size when `limit` is not sent
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Issued/settled sequence numbers for one kind of request
#[derive(Debug, Default, Clone)]
pub struct SequenceGuard {
    issued: u64,
    settled: u64,
}

impl SequenceGuard {
    /// Stamp a new request; it supersedes every earlier one
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Accept a response if it belongs to the latest issued request
    pub fn settle(&mut self, seq: u64) -> bool {
        if seq == self.issued && seq > self.settled {
            self.settled = seq;
            true
        } else {
            false
        }
    }

    /// Latest issued request has not answered yet
    pub fn is_pending(&self) -> bool {
        self.issued != self.settled
    }
}

/// A reload ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct ReloadTicket {
    pub seq: u64,
    pub request: ApiRequest,
}

/// What `complete` did with a response
#[derive(Debug, Clone, PartialEq)]
pub enum ReloadOutcome {
    /// Page replaced with this many rows
    Applied(usize),
    /// Superseded by a newer reload; dropped
    Stale,
    /// Latest reload failed; previous page kept
    Failed(TransportError),
}

pub struct ViewController<R> {
    kind: ViewKind,
    filters: FilterSet,
    offset: u32,
    page_size: Option<u32>,
    page: Vec<R>,
    guard: SequenceGuard,
    /// Bumped on every filter or offset change
    generation: u64,
    /// Generation of the latest issued reload
    issued_generation: u64,
    /// Generation the displayed page was loaded for
    loaded_generation: Option<u64>,
    last_error: Option<TransportError>,
}

impl<R: DeserializeOwned> ViewController<R> {
    pub fn new(kind: ViewKind, page_size: Option<u32>) -> Self {
        Self {
            kind,
            filters: FilterSet::new(kind.filter_keys()),
            offset: 0,
            page_size,
            page: Vec::new(),
            guard: SequenceGuard::default(),
            generation: 0,
            issued_generation: 0,
            loaded_generation: None,
            last_error: None,
        }
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn page(&self) -> &[R] {
        &self.page
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    fn effective_page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    /// Update one filter; any change returns to the first page
    pub fn set_filter(&mut self, key: FilterKey, value: impl Into<String>) -> bool {
        let changed = self.filters.set(key, value);
        if changed {
            self.offset = 0;
            self.generation += 1;
        }
        changed
    }

    pub fn clear_filters(&mut self) -> bool {
        let changed = self.filters.clear();
        if changed {
            self.offset = 0;
            self.generation += 1;
        }
        changed
    }

    /// Advance one page if the current one is full
    pub fn next_page(&mut self) -> bool {
        let size = self.effective_page_size();
        if (self.page.len() as u32) < size {
            return false;
        }
        self.offset = self.offset.saturating_add(size);
        self.generation += 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.offset == 0 {
            return false;
        }
        self.offset = self.offset.saturating_sub(self.effective_page_size());
        self.generation += 1;
        true
    }

    /// Query for the current filters and paging
    pub fn query(&self) -> Vec<(String, String)> {
        let mut query = self.filters.query_pairs();
        if let Some(limit) = self.page_size {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if self.offset > 0 {
            query.push(("offset".to_string(), self.offset.to_string()));
        }
        query
    }

    /// Issue a reload for the current filters
    pub fn begin_reload(&mut self) -> ReloadTicket {
        let seq = self.guard.issue();
        self.issued_generation = self.generation;
        ReloadTicket {
            seq,
            request: ApiRequest::get(self.kind.path()).with_query(self.query()),
        }
    }

    /// Apply the response of reload `seq`
    pub fn complete(&mut self, seq: u64, result: Result<Value, TransportError>) -> ReloadOutcome {
        if !self.guard.settle(seq) {
            return ReloadOutcome::Stale;
        }

        match result.and_then(decode::<Page<R>>) {
            Ok(page) => {
                self.page = page.items;
                self.loaded_generation = Some(self.issued_generation);
                self.last_error = None;
                ReloadOutcome::Applied(self.page.len())
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                ReloadOutcome::Failed(e)
            }
        }
    }

    /// Forget that the displayed page is current
    ///
    /// The page stays on screen; a reload still in flight is applied but does
    /// not count as fresh.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Displayed page matches the current filters and offset
    pub fn is_fresh(&self) -> bool {
        self.loaded_generation == Some(self.generation)
    }

    pub fn is_loading(&self) -> bool {
        self.guard.is_pending()
    }

    pub fn last_error(&self) -> Option<&TransportError> {
        self.last_error.as_ref()
    }
}
