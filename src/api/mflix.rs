//! Mflix backend API client
//!
//! Movies (list, detail, update), comments, and account endpoints.
//! Every catalog request is bearer-authenticated with the session token.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::models::{
    Comment, ListParams, MovieDetail, MovieSummary, MovieUpdate, PageResult, Session, User,
};

/// Public Mflix deployment
pub const DEFAULT_BASE_URL: &str = "https://mflix-backend-ysnw.onrender.com/api";

/// Mflix API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Not authorized (401)")]
    Unauthorized(Option<String>),

    #[error("Resource not found (404)")]
    NotFound(Option<String>),

    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// The backend's `error` string, when the response carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(message) | ApiError::NotFound(message) => message.as_deref(),
            ApiError::Server { message, .. } => message.as_deref(),
            ApiError::Network(_) | ApiError::InvalidResponse(_) => None,
        }
    }

    /// Server message verbatim, or `fallback` when there is none
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

/// Mflix API client
#[derive(Debug, Clone)]
pub struct MflixClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for MflixClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MflixClient {
    /// Client for the public deployment
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (self-hosted backend, tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::build(base_url.into(), None)
    }

    /// Create a client with an explicit request timeout.
    /// `None` keeps the transport default (no timeout).
    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self::build(base_url.into(), timeout)
    }

    fn build(base_url: String, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = match builder.build() {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    ?timeout,
                    "http client setup failed, timeout not applied"
                );
                reqwest::Client::default()
            }
        };
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.header("Authorization", format!("Bearer {}", token))
    }

    /// Send a request and return the body of a successful response
    async fn send_raw(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.header("Accept", "application/json").send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(&body);
        tracing::debug!(status = status.as_u16(), ?message, "request rejected");

        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized(message)),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(message)),
            status => Err(ApiError::Server {
                status: status.as_u16(),
                message,
            }),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    /// Fetch one page of the catalog
    pub async fn list_movies(
        &self,
        params: &ListParams,
        token: &str,
    ) -> Result<PageResult, ApiError> {
        tracing::debug!(
            page = params.page,
            sort_by = params.sort_by.as_param(),
            sort_order = params.sort_order.as_param(),
            search = %params.search,
            "fetching movie list"
        );
        let request = self
            .authorized(self.client.get(self.url("/movies")), token)
            .query(params);
        let response: MoviesResponse = self.send(request).await?;
        Ok(response.into_page())
    }

    /// Fetch the full record of one movie
    pub async fn movie_detail(&self, id: &str, token: &str) -> Result<MovieDetail, ApiError> {
        let endpoint = format!("/movies/{}", urlencoding::encode(id));
        let request = self.authorized(self.client.get(self.url(&endpoint)), token);
        let raw: MovieRaw = self.send(request).await?;
        Ok(raw.into_detail())
    }

    /// Update editable fields of a movie.
    ///
    /// Returns the updated record when the backend echoes one back.
    pub async fn update_movie(
        &self,
        id: &str,
        update: &MovieUpdate,
        token: &str,
    ) -> Result<Option<MovieDetail>, ApiError> {
        tracing::debug!(movie_id = id, "updating movie");
        let endpoint = format!("/movies/{}", urlencoding::encode(id));
        let request = self
            .authorized(self.client.put(self.url(&endpoint)), token)
            .json(update);
        let body = self.send_raw(request).await?;
        Ok(UpdateResponse::parse(&body))
    }

    /// Fetch comments for a movie, in backend order
    pub async fn comments(&self, movie_id: &str, token: &str) -> Result<Vec<Comment>, ApiError> {
        let endpoint = format!("/comments/{}", urlencoding::encode(movie_id));
        let request = self.authorized(self.client.get(self.url(&endpoint)), token);
        let raw: Option<Vec<CommentRaw>> = self.send(request).await?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .map(CommentRaw::into_comment)
            .collect())
    }

    /// Exchange credentials for a session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password });
        let response: LoginResponse = self.send(request).await?;
        Ok(Session::new(response.user, response.token))
    }

    /// Create an account
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .post(self.url("/auth/register"))
            .json(&RegisterRequest {
                name,
                email,
                password,
            });
        self.send_raw(request).await?;
        Ok(())
    }
}

/// Extract `{ "error": "..." }` from an error body
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
}

// =============================================================================
// Request Structures
// =============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

// =============================================================================
// Response Structures (internal deserialization)
// =============================================================================

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    user: User,
    token: String,
}

#[derive(Debug, Deserialize)]
struct MoviesResponse {
    movies: Option<Vec<MovieRaw>>,
    #[serde(rename = "totalPages")]
    total_pages: Option<u32>,
}

impl MoviesResponse {
    fn into_page(self) -> PageResult {
        let items = self
            .movies
            .unwrap_or_default()
            .into_iter()
            .map(MovieRaw::into_summary)
            .collect();
        PageResult::new(items, self.total_pages.unwrap_or(1))
    }
}

/// PUT responses are either the record itself or `{ movie: record }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UpdateResponse {
    Wrapped { movie: MovieRaw },
    Record(MovieRaw),
}

impl UpdateResponse {
    fn parse(body: &str) -> Option<MovieDetail> {
        match serde_json::from_str::<UpdateResponse>(body).ok()? {
            UpdateResponse::Wrapped { movie } => Some(movie.into_detail()),
            UpdateResponse::Record(raw) => Some(raw.into_detail()),
        }
    }
}

/// Mongo ids arrive either as plain strings or as `{ "$oid": "..." }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdRaw {
    Plain(String),
    Oid {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

impl IdRaw {
    fn into_string(self) -> String {
        match self {
            IdRaw::Plain(s) => s,
            IdRaw::Oid { oid } => oid,
        }
    }
}

/// Numbers in the sample dataset are sometimes strings (often empty)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberRaw {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberRaw {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberRaw::Int(n) => Some(*n as f64),
            NumberRaw::Float(n) => Some(*n),
            NumberRaw::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            NumberRaw::Int(n) => Some(*n),
            NumberRaw::Float(n) if n.fract() == 0.0 => Some(*n as i64),
            NumberRaw::Float(_) => None,
            NumberRaw::Text(s) => s.trim().replace(',', "").parse().ok(),
        }
    }

    /// The value as text; `None` for blank strings
    fn text(&self) -> Option<String> {
        match self {
            NumberRaw::Int(n) => Some(n.to_string()),
            NumberRaw::Float(n) => Some(n.to_string()),
            NumberRaw::Text(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DateRaw {
    Text(String),
    Extended {
        #[serde(rename = "$date")]
        date: ExtendedDate,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExtendedDate {
    Text(String),
    Millis(i64),
    Long {
        #[serde(rename = "$numberLong")]
        millis: String,
    },
}

impl DateRaw {
    fn into_string(self) -> Option<String> {
        let millis = match self {
            DateRaw::Text(s) | DateRaw::Extended { date: ExtendedDate::Text(s) } => return Some(s),
            DateRaw::Extended { date: ExtendedDate::Millis(ms) } => ms,
            DateRaw::Extended { date: ExtendedDate::Long { millis } } => millis.parse().ok()?,
        };
        chrono::DateTime::from_timestamp_millis(millis).map(|dt| dt.to_rfc3339())
    }
}

#[derive(Debug, Deserialize)]
struct ImdbRaw {
    rating: Option<NumberRaw>,
    votes: Option<NumberRaw>,
}

#[derive(Debug, Deserialize)]
struct TomatoesRaw {
    viewer: Option<TomatoViewerRaw>,
}

#[derive(Debug, Deserialize)]
struct TomatoViewerRaw {
    meter: Option<NumberRaw>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AwardsRaw {
    Text(String),
    Detailed { text: Option<String> },
}

#[derive(Debug, Deserialize)]
struct MovieRaw {
    #[serde(rename = "_id")]
    id: IdRaw,
    title: Option<String>,
    year: Option<NumberRaw>,
    plot: Option<String>,
    fullplot: Option<String>,
    cast: Option<Vec<String>>,
    genres: Option<Vec<String>>,
    directors: Option<Vec<String>>,
    languages: Option<Vec<String>>,
    countries: Option<Vec<String>>,
    rated: Option<String>,
    poster: Option<String>,
    runtime: Option<NumberRaw>,
    released: Option<DateRaw>,
    #[serde(rename = "dateAdded")]
    date_added: Option<DateRaw>,
    imdb: Option<ImdbRaw>,
    // Flat fallbacks used by some backend revisions
    rating: Option<NumberRaw>,
    views: Option<NumberRaw>,
    tomatoes: Option<TomatoesRaw>,
    awards: Option<AwardsRaw>,
}

impl MovieRaw {
    fn rating(&self) -> Option<f64> {
        self.imdb
            .as_ref()
            .and_then(|i| i.rating.as_ref())
            .and_then(NumberRaw::as_f64)
            .or_else(|| self.rating.as_ref().and_then(NumberRaw::as_f64))
    }

    fn votes(&self) -> Option<u64> {
        self.imdb
            .as_ref()
            .and_then(|i| i.votes.as_ref())
            .and_then(NumberRaw::as_i64)
            .or_else(|| self.views.as_ref().and_then(NumberRaw::as_i64))
            .and_then(|v| u64::try_from(v).ok())
    }

    fn year(&self) -> Option<i32> {
        self.year
            .as_ref()
            .and_then(NumberRaw::as_i64)
            .and_then(|y| i32::try_from(y).ok())
    }

    fn into_summary(self) -> MovieSummary {
        let rating = self.rating();
        let votes = self.votes();
        let year = self.year();
        let released = self
            .released
            .and_then(DateRaw::into_string)
            .or_else(|| self.date_added.and_then(DateRaw::into_string));

        MovieSummary {
            id: self.id.into_string(),
            title: self.title.unwrap_or_default(),
            year,
            rating,
            votes,
            released,
        }
    }

    fn into_detail(self) -> MovieDetail {
        let rating = self.rating();
        let votes = self.votes();
        let year = self.year();
        let runtime = self
            .runtime
            .as_ref()
            .and_then(NumberRaw::as_i64)
            .and_then(|r| u32::try_from(r).ok());
        let year_text = year
            .is_none()
            .then(|| self.year.as_ref().and_then(NumberRaw::text))
            .flatten();
        let runtime_text = runtime
            .is_none()
            .then(|| self.runtime.as_ref().and_then(NumberRaw::text))
            .flatten();
        let tomato_meter = self
            .tomatoes
            .and_then(|t| t.viewer)
            .and_then(|v| v.meter)
            .and_then(|m| m.as_i64())
            .and_then(|m| u32::try_from(m).ok());
        let awards = self.awards.and_then(|a| match a {
            AwardsRaw::Text(text) => Some(text),
            AwardsRaw::Detailed { text } => text,
        });

        MovieDetail {
            id: self.id.into_string(),
            title: self.title.unwrap_or_default(),
            year,
            plot: self.plot,
            full_plot: self.fullplot,
            cast: self.cast.unwrap_or_default(),
            genres: self.genres.unwrap_or_default(),
            directors: self.directors.unwrap_or_default(),
            languages: self.languages.unwrap_or_default(),
            countries: self.countries.unwrap_or_default(),
            rated: self.rated,
            poster: self.poster,
            runtime,
            released: self
                .released
                .and_then(DateRaw::into_string)
                .or_else(|| self.date_added.and_then(DateRaw::into_string)),
            rating,
            votes,
            tomato_meter,
            awards,
            year_text,
            runtime_text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommentRaw {
    name: Option<String>,
    text: Option<String>,
    date: Option<DateRaw>,
}

impl CommentRaw {
    fn into_comment(self) -> Comment {
        Comment {
            author: self.name.unwrap_or_else(|| "Anonymous".to_string()),
            text: self.text.unwrap_or_default(),
            date: self.date.and_then(DateRaw::into_string),
        }
    }
}
