//! Search state and the operations that change it.
//!
//! `SessionState` is a plain value. Each operation on `SearchSession` derives
//! the next state from the current one and swaps it in whole; nothing else
//! holds a mutable handle to the cache.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::loader::Fetcher;
use crate::models::{FetchFailure, FetchOutcome, FetchRequest, Hit, ResultCache, ResultPage, SearchResponse};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub cache: ResultCache,
    // None until the first submit; an empty query is a valid committed key
    pub active_key: Option<String>,
    pub pending_query: String,
    // Keys with an outstanding request
    pub in_flight: HashSet<String>,
    pub last_error: Option<FetchFailure>,
}

impl SessionState {
    pub fn entry(&self, key: &str) -> Option<&ResultPage> {
        self.cache.get(key).map(Arc::as_ref)
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active_key.as_deref()
    }

    fn active_entry(&self) -> Option<&ResultPage> {
        self.entry(self.active_key()?)
    }

    pub fn is_loading(&self) -> bool {
        self.active_key().map_or(false, |key| self.in_flight.contains(key))
    }

    fn with_pending_query(&self, text: String) -> Self {
        Self {
            pending_query: text,
            ..self.clone()
        }
    }

    fn with_active_key(&self, key: String) -> Self {
        Self {
            active_key: Some(key),
            ..self.clone()
        }
    }

    fn with_request_started(&self, key: &str) -> Self {
        let mut in_flight = self.in_flight.clone();
        in_flight.insert(key.to_string());
        Self {
            in_flight,
            last_error: None,
            ..self.clone()
        }
    }

    fn with_page_merged(&self, request: &FetchRequest, response: SearchResponse) -> Self {
        let mut hits = self
            .entry(&request.query)
            .map(|entry| entry.hits.clone())
            .unwrap_or_default();
        // Appended as-is: fetching the same page twice yields duplicate hits
        hits.extend(response.hits);

        let mut cache = self.cache.clone();
        cache.insert(
            request.query.clone(),
            Arc::new(ResultPage {
                hits,
                page: request.page,
                total_pages: response.nb_pages,
            }),
        );

        let mut in_flight = self.in_flight.clone();
        in_flight.remove(&request.query);

        Self {
            cache,
            in_flight,
            ..self.clone()
        }
    }

    fn with_request_failed(&self, request: &FetchRequest, message: String) -> Self {
        let mut in_flight = self.in_flight.clone();
        in_flight.remove(&request.query);
        Self {
            in_flight,
            last_error: Some(FetchFailure {
                query: request.query.clone(),
                page: request.page,
                message,
            }),
            ..self.clone()
        }
    }

    fn with_hit_removed(&self, object_id: &str) -> Option<Self> {
        let key = self.active_key()?;
        let entry = self.entry(key)?;
        if !entry.hits.iter().any(|hit| hit.object_id == object_id) {
            return None;
        }

        // Every copy goes, since re-fetched pages can repeat a story
        let mut hits = entry.hits.clone();
        hits.retain(|hit| hit.object_id != object_id);

        let mut cache = self.cache.clone();
        cache.insert(
            key.to_string(),
            Arc::new(ResultPage {
                hits,
                ..entry.clone()
            }),
        );

        Some(Self {
            cache,
            ..self.clone()
        })
    }
}

/// What the window needs to draw the active search.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub list: &'a [Hit],
    pub page: u32,
    pub is_loading: bool,
    pub has_more: bool,
    pub error: Option<&'a FetchFailure>,
}

pub struct SearchSession<F: Fetcher> {
    state: SessionState,
    fetcher: F,
    hits_per_page: u32,
}

impl<F: Fetcher> SearchSession<F> {
    pub fn new(fetcher: F, hits_per_page: u32, initial_query: &str) -> Self {
        Self {
            state: SessionState {
                pending_query: initial_query.to_string(),
                ..SessionState::default()
            },
            fetcher,
            hits_per_page,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(test)]
    pub fn fetcher_mut(&mut self) -> &mut F {
        &mut self.fetcher
    }

    /// Text box contents, nothing else happens until `submit`.
    pub fn update_query_text(&mut self, text: &str) {
        self.state = self.state.with_pending_query(text.to_string());
    }

    pub fn pending_query(&self) -> &str {
        &self.state.pending_query
    }

    /// Commits the text box as the active search. Returns whether a request went out.
    pub fn submit(&mut self) -> bool {
        let key = self.state.pending_query.clone();
        self.state = self.state.with_active_key(key.clone());

        if self.state.cache.contains_key(&key) {
            info!("Serving '{}' from cache", key);
            return false;
        }

        self.fetch_page(&key, 0)
    }

    /// Requests one page for `key`. Refused while `key` already has a request out.
    pub fn fetch_page(&mut self, key: &str, page: u32) -> bool {
        if self.state.in_flight.contains(key) {
            debug!("'{}' already has a request in flight, ignoring page {}", key, page);
            return false;
        }

        self.state = self.state.with_request_started(key);

        let request = FetchRequest {
            query: key.to_string(),
            page,
            hits_per_page: self.hits_per_page,
        };
        info!("Fetching '{}' page {}", request.query, request.page);
        self.fetcher.dispatch(request);
        true
    }

    pub fn load_more(&mut self) -> bool {
        let Some(key) = self.state.active_key.clone() else {
            debug!("No search committed yet, nothing to load more of");
            return false;
        };

        let next_page = self.state.entry(&key).map_or(0, |entry| entry.page) + 1;
        self.fetch_page(&key, next_page)
    }

    pub fn dismiss(&mut self, object_id: &str) {
        if let Some(next) = self.state.with_hit_removed(object_id) {
            self.state = next;
        }
    }

    /// Applies a finished request to the cache of the key it was made for.
    pub fn complete(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { request, result } = outcome;
        self.state = match result {
            Ok(response) => {
                info!(
                    "'{}' page {}: {} hits",
                    request.query,
                    request.page,
                    response.hits.len()
                );
                self.state.with_page_merged(&request, response)
            }
            Err(e) => {
                warn!("Search for '{}' page {} failed: {:#}", request.query, request.page, e);
                self.state.with_request_failed(&request, format!("{:#}", e))
            }
        };
    }

    /// Applies every outcome the fetcher has ready. Returns how many there were.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(outcome) = self.fetcher.poll() {
            self.complete(outcome);
            applied += 1;
        }
        applied
    }

    pub fn view(&self) -> SessionView<'_> {
        let entry = self.state.active_entry();
        SessionView {
            list: entry.map_or(&[][..], |entry| entry.hits.as_slice()),
            page: entry.map_or(0, |entry| entry.page),
            is_loading: self.state.is_loading(),
            has_more: self.state.active_key.is_some() && entry.map_or(true, ResultPage::has_more),
            error: self.state.last_error.as_ref(),
        }
    }
}
