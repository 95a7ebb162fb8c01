//! Movie list query controller
//!
//! Owns the query (page, sort, search), decides when a list fetch is
//! needed, and keeps the latest settled page. Every operation returns a
//! [`ListEffect`] that the caller executes; completions come back through
//! [`ListQueryController::resolve`].
//!
//! Only the most recently issued request may update state. Each request
//! carries a sequence number and any completion with another number is
//! dropped, whatever order the responses arrive in.

use crate::api::ApiError;
use crate::models::{ListParams, MovieSummary, PageResult, QueryState, SortField};

/// Message shown when a list fetch fails
pub const LIST_ERROR: &str = "Failed to load movies";

/// A list fetch the caller must perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Sequence number to hand back to `resolve`
    pub seq: u64,
    pub params: ListParams,
    /// Bearer token of the session
    pub token: String,
}

/// What the caller has to do after a controller operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEffect {
    /// Issue this request
    Fetch(ListRequest),
    /// No session: show the login flow instead of the list
    AuthRequired,
    /// Nothing changed
    None,
}

impl ListEffect {
    pub fn request(&self) -> Option<&ListRequest> {
        match self {
            ListEffect::Fetch(req) => Some(req),
            _ => None,
        }
    }

    pub fn into_request(self) -> Option<ListRequest> {
        match self {
            ListEffect::Fetch(req) => Some(req),
            _ => None,
        }
    }
}

/// Status of the list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A fetch is in flight (previous page, if any, stays visible)
    Loading,
    /// Latest fetch succeeded
    Ready,
    /// Latest fetch failed
    Failed(String),
    /// No valid session
    AuthRequired,
}

/// Paginated, sortable, searchable movie list
#[derive(Debug)]
pub struct ListQueryController {
    query: QueryState,
    result: Option<PageResult>,
    status: ListStatus,
    token: Option<String>,
    /// Last issued sequence number
    seq: u64,
    /// Sequence number whose completion is still awaited
    in_flight: Option<u64>,
    mounted: bool,
}

impl ListQueryController {
    /// Controller with default query state (sorted by title)
    pub fn new(token: Option<String>) -> Self {
        Self::with_sort(token, SortField::default())
    }

    /// Controller whose initial sort is `field` in its default direction
    pub fn with_sort(token: Option<String>, field: SortField) -> Self {
        Self {
            query: QueryState::with_sort(field),
            result: None,
            status: ListStatus::Idle,
            token: token.filter(|t| !t.is_empty()),
            seq: 0,
            in_flight: None,
            mounted: false,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.query.page
    }

    /// Total pages of the latest settled result (1 before any result)
    pub fn total_pages(&self) -> u32 {
        self.result.as_ref().map(|r| r.total_pages).unwrap_or(1)
    }

    /// Items of the latest settled result
    pub fn items(&self) -> &[MovieSummary] {
        self.result
            .as_ref()
            .map(|r| r.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn result(&self) -> Option<&PageResult> {
        self.result.as_ref()
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ListStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn needs_auth(&self) -> bool {
        self.status == ListStatus::AuthRequired
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Start the controller and request the first page
    pub fn mount(&mut self) -> ListEffect {
        self.mounted = true;
        self.fetch()
    }

    /// Stop the controller; anything in flight is discarded
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.supersede();
        if self.status == ListStatus::Loading {
            self.status = ListStatus::Idle;
        }
    }

    /// Session became available or went away
    pub fn set_session(&mut self, token: Option<String>) -> ListEffect {
        let token = token.filter(|t| !t.is_empty());
        if token == self.token && self.status != ListStatus::AuthRequired {
            return ListEffect::None;
        }
        self.token = token;
        self.fetch()
    }

    // -------------------------------------------------------------------------
    // Query operations
    // -------------------------------------------------------------------------

    pub fn set_search_text(&mut self, text: impl Into<String>) -> ListEffect {
        let mut next = self.query.clone();
        next.search = text.into();
        next.page = 1;
        self.apply(next)
    }

    pub fn clear_search(&mut self) -> ListEffect {
        self.set_search_text("")
    }

    /// Change the sort field; direction falls back to the field's default
    pub fn set_sort_field(&mut self, field: SortField) -> ListEffect {
        let mut next = self.query.clone();
        next.sort_field = field;
        next.sort_direction = field.default_direction();
        next.page = 1;
        self.apply(next)
    }

    pub fn toggle_sort_direction(&mut self) -> ListEffect {
        let mut next = self.query.clone();
        next.sort_direction = next.sort_direction.toggled();
        next.page = 1;
        self.apply(next)
    }

    /// Go to page `n`, clamped to `[1, total_pages]`
    pub fn set_page(&mut self, n: u32) -> ListEffect {
        let target = n.clamp(1, self.total_pages());
        let mut next = self.query.clone();
        next.page = target;
        self.apply(next)
    }

    pub fn next_page(&mut self) -> ListEffect {
        self.set_page(self.query.page.saturating_add(1))
    }

    pub fn prev_page(&mut self) -> ListEffect {
        self.set_page(self.query.page.saturating_sub(1))
    }

    pub fn first_page(&mut self) -> ListEffect {
        self.set_page(1)
    }

    pub fn last_page(&mut self) -> ListEffect {
        self.set_page(self.total_pages())
    }

    /// Back to page 1 and fetch again, even when the query is unchanged
    pub fn refresh(&mut self) -> ListEffect {
        self.query.page = 1;
        self.fetch()
    }

    /// Re-issue the current query unchanged
    pub fn retry(&mut self) -> ListEffect {
        self.fetch()
    }

    // -------------------------------------------------------------------------
    // Completion
    // -------------------------------------------------------------------------

    /// Apply the completion of request `seq`.
    ///
    /// Returns `false` when the completion was stale and ignored.
    pub fn resolve(&mut self, seq: u64, result: Result<PageResult, ApiError>) -> bool {
        if !self.mounted || self.in_flight != Some(seq) {
            tracing::debug!(seq, latest = self.seq, "dropping stale list response");
            return false;
        }
        self.in_flight = None;

        match result {
            Ok(page) => {
                tracing::debug!(
                    seq,
                    items = page.items.len(),
                    total_pages = page.total_pages,
                    "list page loaded"
                );
                self.result = Some(page);
                self.status = ListStatus::Ready;
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(seq, "list request rejected: session no longer valid");
                self.status = ListStatus::AuthRequired;
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "list request failed");
                self.status = ListStatus::Failed(LIST_ERROR.to_string());
            }
        }
        true
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn apply(&mut self, next: QueryState) -> ListEffect {
        if next == self.query {
            return ListEffect::None;
        }
        self.query = next;
        self.fetch()
    }

    fn supersede(&mut self) {
        self.seq += 1;
        self.in_flight = None;
    }

    fn fetch(&mut self) -> ListEffect {
        if !self.mounted {
            return ListEffect::None;
        }
        self.supersede();

        let Some(token) = self.token.clone() else {
            self.status = ListStatus::AuthRequired;
            return ListEffect::AuthRequired;
        };

        self.in_flight = Some(self.seq);
        self.status = ListStatus::Loading;
        ListEffect::Fetch(ListRequest {
            seq: self.seq,
            params: self.query.to_params(),
            token,
        })
    }
}
