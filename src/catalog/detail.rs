//! Movie detail fetcher
//!
//! Loads the full record and the comments of one movie when it is opened.
//! Nothing is cached: closing discards both, reopening fetches again.

use crate::api::ApiError;
use crate::catalog::LoadingState;
use crate::models::{Comment, MovieDetail};

pub const DETAIL_ERROR: &str = "Failed to load movie";
pub const COMMENTS_ERROR: &str = "Failed to load comments";

/// Fetch of one movie's record and comments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub seq: u64,
    pub movie_id: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailEffect {
    Fetch(DetailRequest),
    AuthRequired,
    None,
}

impl DetailEffect {
    pub fn into_request(self) -> Option<DetailRequest> {
        match self {
            DetailEffect::Fetch(req) => Some(req),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct DetailFetcher {
    movie_id: Option<String>,
    detail: Option<MovieDetail>,
    detail_state: LoadingState,
    comments: Vec<Comment>,
    comments_state: LoadingState,
    seq: u64,
}

impl DetailFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a movie. Any previously open movie is discarded first.
    pub fn open(&mut self, movie_id: impl Into<String>, token: Option<&str>) -> DetailEffect {
        self.close();

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return DetailEffect::AuthRequired;
        };

        let movie_id = movie_id.into();
        self.movie_id = Some(movie_id.clone());
        self.detail_state = LoadingState::Loading(Some("Loading movie...".into()));
        self.comments_state = LoadingState::Loading(Some("Loading comments...".into()));

        DetailEffect::Fetch(DetailRequest {
            seq: self.seq,
            movie_id,
            token: token.to_string(),
        })
    }

    /// Close the view and drop everything that was loaded or is in flight
    pub fn close(&mut self) {
        self.seq += 1;
        self.movie_id = None;
        self.detail = None;
        self.detail_state = LoadingState::Idle;
        self.comments.clear();
        self.comments_state = LoadingState::Idle;
    }

    pub fn is_open(&self) -> bool {
        self.movie_id.is_some()
    }

    pub fn movie_id(&self) -> Option<&str> {
        self.movie_id.as_deref()
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        self.detail.as_ref()
    }

    pub fn detail_state(&self) -> &LoadingState {
        &self.detail_state
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comments_state(&self) -> &LoadingState {
        &self.comments_state
    }

    /// Replace the shown record (after a successful edit)
    pub fn replace_detail(&mut self, detail: MovieDetail) {
        if self.movie_id.as_deref() == Some(detail.id.as_str()) {
            self.detail = Some(detail);
        }
    }

    fn is_current(&self, seq: u64) -> bool {
        self.is_open() && seq == self.seq
    }

    pub fn resolve_detail(&mut self, seq: u64, result: Result<MovieDetail, ApiError>) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        match result {
            Ok(detail) => {
                self.detail = Some(detail);
                self.detail_state = LoadingState::Idle;
            }
            Err(e) => {
                tracing::warn!(error = %e, movie_id = ?self.movie_id, "movie detail failed");
                self.detail_state = LoadingState::Error(DETAIL_ERROR.to_string());
            }
        }
        true
    }

    pub fn resolve_comments(&mut self, seq: u64, result: Result<Vec<Comment>, ApiError>) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        match result {
            Ok(comments) => {
                self.comments = comments;
                self.comments_state = LoadingState::Idle;
            }
            Err(e) => {
                tracing::warn!(error = %e, movie_id = ?self.movie_id, "comments failed");
                self.comments_state = LoadingState::Error(COMMENTS_ERROR.to_string());
            }
        }
        true
    }
}
