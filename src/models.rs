//! Data structures and types for mflix
//!
//! Contains all shared models used across the application organized by domain:
//! - **Query**: sort fields, directions, the list query and its request parameters
//! - **Catalog**: movie summaries, full movie records, comments, page results
//! - **Auth**: users and sessions
//! - **Edit**: the body of a movie update

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of movies requested per page
pub const PAGE_SIZE: u32 = 10;

// =============================================================================
// Query Models
// =============================================================================

/// Fields the catalog can be sorted by (server-side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Title,
    Year,
    Rating,
    Popularity,
    DateAdded,
}

impl SortField {
    /// All sort fields in menu order
    pub const ALL: [SortField; 5] = [
        SortField::Title,
        SortField::Year,
        SortField::Rating,
        SortField::Popularity,
        SortField::DateAdded,
    ];

    /// Value sent as the `sortBy` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Year => "year",
            SortField::Rating => "rating",
            SortField::Popularity => "popularity",
            SortField::DateAdded => "dateAdded",
        }
    }

    /// Parse a `sortBy` value
    pub fn from_param(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_param() == s)
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            SortField::Title => "Title",
            SortField::Year => "Release Year",
            SortField::Rating => "IMDb Rating",
            SortField::Popularity => "Popularity (Votes)",
            SortField::DateAdded => "Date Added",
        }
    }

    /// Direction applied when the user picks this field.
    ///
    /// Titles read naturally A→Z; every numeric or date field is most
    /// useful newest/highest first.
    pub fn default_direction(&self) -> SortDirection {
        match self {
            SortField::Title => SortDirection::Ascending,
            SortField::Year | SortField::Rating | SortField::Popularity | SortField::DateAdded => {
                SortDirection::Descending
            }
        }
    }

    /// Next field in menu order (wraps around)
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    /// Value sent as the `sortOrder` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Arrow glyph for the UI
    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "ascending"),
            SortDirection::Descending => write!(f, "descending"),
        }
    }
}

/// User-controlled parameters describing which slice of the catalog to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub search: String,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::with_sort(SortField::default())
    }
}

impl QueryState {
    /// Page 1, empty search, sorted by `field` in its default direction
    pub fn with_sort(field: SortField) -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZE,
            sort_field: field,
            sort_direction: field.default_direction(),
            search: String::new(),
        }
    }

    /// Number of rows before the current page
    pub fn offset(&self) -> usize {
        (self.page as usize)
            .saturating_sub(1)
            .saturating_mul(self.page_size as usize)
    }

    /// Request parameters for `GET /movies`
    pub fn to_params(&self) -> ListParams {
        ListParams {
            page: self.page,
            limit: self.page_size,
            sort_by: self.sort_field,
            sort_order: self.sort_direction,
            search: self.search.clone(),
        }
    }
}

/// Query string of a list request, serialized with the backend's names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub sort_by: SortField,
    pub sort_order: SortDirection,
    pub search: String,
}

// =============================================================================
// Catalog Models
// =============================================================================

/// Read-only projection of a movie used for list rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub rating: Option<f64>,
    pub votes: Option<u64>,
    /// Release date (or date added), as sent by the backend
    pub released: Option<String>,
}

impl MovieSummary {
    /// Release date formatted as `YYYY-MM-DD`, or "N/A"
    pub fn released_display(&self) -> String {
        display_date(self.released.as_deref())
    }
}

impl fmt::Display for MovieSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        let rating = self
            .rating
            .map(|r| format!("{:.1}", r))
            .unwrap_or_else(|| "N/A".into());
        write!(f, "{}{} - ⭐ {}", self.title, year_str, rating)
    }
}

/// Full movie record, fetched on demand when an item is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub plot: Option<String>,
    pub full_plot: Option<String>,
    pub cast: Vec<String>,
    pub genres: Vec<String>,
    pub directors: Vec<String>,
    pub languages: Vec<String>,
    pub countries: Vec<String>,
    pub rated: Option<String>,
    pub poster: Option<String>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    pub released: Option<String>,
    pub rating: Option<f64>,
    pub votes: Option<u64>,
    /// Rotten Tomatoes viewer meter (percent)
    pub tomato_meter: Option<u32>,
    pub awards: Option<String>,
    /// Year exactly as stored, when it is not a usable number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_text: Option<String>,
    /// Runtime exactly as stored, when it is not a usable number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_text: Option<String>,
}

impl MovieDetail {
    pub fn released_display(&self) -> String {
        display_date(self.released.as_deref())
    }

    /// Runtime as "N minutes", or "N/A"
    pub fn runtime_display(&self) -> String {
        self.runtime
            .map(|m| format!("{} minutes", m))
            .unwrap_or_else(|| "N/A".into())
    }

    /// Summary projection of this record
    pub fn summary(&self) -> MovieSummary {
        MovieSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            year: self.year,
            rating: self.rating,
            votes: self.votes,
            released: self.released.clone(),
        }
    }
}

impl fmt::Display for MovieDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".into());
        write!(f, "{} ({}) - {}", self.title, year, self.runtime_display())?;
        if let Some(rating) = self.rating {
            write!(f, " - ⭐ {:.1}", rating)?;
        }
        Ok(())
    }
}

/// A user comment on a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub date: Option<String>,
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.author, self.text)
    }
}

/// One settled page of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub items: Vec<MovieSummary>,
    /// Always at least 1
    pub total_pages: u32,
}

impl PageResult {
    pub fn new(items: Vec<MovieSummary>, total_pages: u32) -> Self {
        Self {
            items,
            total_pages: total_pages.max(1),
        }
    }
}

// =============================================================================
// Auth Models
// =============================================================================

/// Authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Authenticated identity plus bearer credential
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
        }
    }
}

// Tokens never end up in logs
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Edit Models
// =============================================================================

/// Body of `PUT /movies/{id}`; empty fields are sent as null
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieUpdate {
    pub title: String,
    pub year: Option<i32>,
    pub runtime: Option<u32>,
    pub rated: Option<String>,
    pub plot: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Format a backend date (RFC 3339 timestamp or plain date) as `YYYY-MM-DD`
pub fn display_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return "N/A".to_string();
    };

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().format("%Y-%m-%d").to_string();
    }
    if let Some(prefix) = raw.get(..10) {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}
