//! Catalog state machines
//!
//! Pure, synchronous controllers that turn user intent into request
//! effects and fold request completions back into displayable state:
//!
//! - `list` - paginated/sorted/searchable movie list (`ListQueryController`)
//! - `detail` - single movie record plus its comments (`DetailFetcher`)
//! - `edit` - movie edit form validation and submission (`EditSubmitter`)
//! - `worker` - runs the effects on tokio tasks and reports back

pub mod detail;
pub mod edit;
pub mod list;
pub mod worker;

pub use detail::{DetailEffect, DetailFetcher, DetailRequest};
pub use edit::{
    EditEffect, EditField, EditForm, EditOutcome, EditRequest, EditSubmitter, ValidationError,
};
pub use list::{ListEffect, ListQueryController, ListRequest, ListStatus};
pub use worker::{CatalogEvent, CatalogWorker};

/// Loading state for a single async operation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadingState {
    /// Idle - no loading in progress
    #[default]
    Idle,
    /// Loading with optional message
    Loading(Option<String>),
    /// Error with message
    Error(String),
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadingState::Error(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            LoadingState::Loading(Some(msg)) => Some(msg),
            LoadingState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}
