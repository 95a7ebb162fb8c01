//! mflix - terminal client for the Mflix movie catalog
//!
//! Browse, search and sort the catalog page by page, open a movie with its
//! comments, and edit its core fields. Works as an interactive TUI or as a
//! scriptable CLI.
//!
//! # Modules
//!
//! - `models` - wire and domain types
//! - `api` - HTTP client for the catalog backend
//! - `catalog` - list/detail/edit state machines and the background worker
//! - `auth`, `session` - login state and its on-disk persistence
//! - `config`, `logging` - ambient setup
//! - `cli`, `commands` - scriptable interface
//! - `app`, `ui` - TUI state and rendering

pub mod api;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod session;
pub mod ui;

// Re-export commonly used types
pub use api::{ApiError, MflixClient};
pub use app::{App, AppState};
pub use catalog::{
    CatalogEvent, CatalogWorker, DetailFetcher, EditSubmitter, ListQueryController,
};
pub use models::{
    Comment, MovieDetail, MovieSummary, MovieUpdate, PageResult, QueryState, Session,
    SortDirection, SortField, User,
};
