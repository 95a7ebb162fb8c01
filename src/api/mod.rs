//! API clients for external services
//!
//! - Mflix: movie catalog, comments and accounts

pub mod mflix;

pub use mflix::{ApiError, MflixClient, DEFAULT_BASE_URL};
