//! Movie edit form and submitter
//!
//! Validation happens locally; an invalid form never reaches the network.
//! A successful save tells the caller to refresh the list.

use thiserror::Error;

use crate::api::ApiError;
use crate::catalog::LoadingState;
use crate::models::{MovieDetail, MovieUpdate};

pub const UPDATE_ERROR: &str = "Failed to update movie";
pub const UPDATE_SUCCESS: &str = "Movie updated successfully!";

/// Local validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Year must be a 4-digit number")]
    InvalidYear,

    #[error("Runtime must be a whole number of minutes")]
    InvalidRuntime,
}

fn is_four_digit_year(s: &str) -> bool {
    regex::Regex::new(r"^\d{4}$")
        .map(|re| re.is_match(s))
        .unwrap_or(false)
}

/// Editable fields, in form order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditField {
    #[default]
    Title,
    Year,
    Runtime,
    Rated,
    Plot,
}

impl EditField {
    pub const ALL: [EditField; 5] = [
        EditField::Title,
        EditField::Year,
        EditField::Runtime,
        EditField::Rated,
        EditField::Plot,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EditField::Title => "Title",
            EditField::Year => "Year",
            EditField::Runtime => "Runtime (min)",
            EditField::Rated => "Rated",
            EditField::Plot => "Plot",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Raw text of the edit form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub title: String,
    pub year: String,
    pub runtime: String,
    pub rated: String,
    pub plot: String,
}

impl EditForm {
    /// Form prefilled from the current record
    pub fn from_detail(detail: &MovieDetail) -> Self {
        Self {
            title: detail.title.clone(),
            year: detail
                .year
                .map(|y| y.to_string())
                .or_else(|| detail.year_text.clone())
                .unwrap_or_default(),
            runtime: detail
                .runtime
                .map(|r| r.to_string())
                .or_else(|| detail.runtime_text.clone())
                .unwrap_or_default(),
            rated: detail.rated.clone().unwrap_or_default(),
            plot: detail.plot.clone().unwrap_or_default(),
        }
    }

    pub fn field(&self, field: EditField) -> &str {
        match field {
            EditField::Title => &self.title,
            EditField::Year => &self.year,
            EditField::Runtime => &self.runtime,
            EditField::Rated => &self.rated,
            EditField::Plot => &self.plot,
        }
    }

    pub fn field_mut(&mut self, field: EditField) -> &mut String {
        match field {
            EditField::Title => &mut self.title,
            EditField::Year => &mut self.year,
            EditField::Runtime => &mut self.runtime,
            EditField::Rated => &mut self.rated,
            EditField::Plot => &mut self.plot,
        }
    }

    /// Check the form and build the update body
    pub fn validate(&self) -> Result<MovieUpdate, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::TitleRequired);
        }

        let year = self.year.trim();
        let year = if year.is_empty() {
            None
        } else if is_four_digit_year(year) {
            Some(year.parse().map_err(|_| ValidationError::InvalidYear)?)
        } else {
            return Err(ValidationError::InvalidYear);
        };

        let runtime = self.runtime.trim();
        let runtime = if runtime.is_empty() {
            None
        } else {
            Some(
                runtime
                    .parse::<u32>()
                    .map_err(|_| ValidationError::InvalidRuntime)?,
            )
        };

        Ok(MovieUpdate {
            title: title.to_string(),
            year,
            runtime,
            rated: non_empty(&self.rated),
            plot: non_empty(&self.plot),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// A validated update the caller must send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub movie_id: String,
    pub update: MovieUpdate,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEffect {
    Submit(EditRequest),
    /// Form rejected locally; nothing was sent
    Invalid(ValidationError),
    AuthRequired,
    /// A save is already in flight
    None,
}

/// Result of a completed save
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Saved; the list should be refreshed. Carries the echoed record if any.
    Saved(Option<MovieDetail>),
    /// Rejected; the form stays open with the error
    Failed(String),
}

/// Edit form for one movie plus its submission state
#[derive(Debug, Clone)]
pub struct EditSubmitter {
    movie_id: String,
    pub form: EditForm,
    state: LoadingState,
    success: Option<String>,
}

impl EditSubmitter {
    pub fn new(movie_id: impl Into<String>, form: EditForm) -> Self {
        Self {
            movie_id: movie_id.into(),
            form,
            state: LoadingState::Idle,
            success: None,
        }
    }

    pub fn for_detail(detail: &MovieDetail) -> Self {
        Self::new(detail.id.clone(), EditForm::from_detail(detail))
    }

    pub fn movie_id(&self) -> &str {
        &self.movie_id
    }

    pub fn is_saving(&self) -> bool {
        self.state.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadingState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Validate and, if valid, produce the update request
    pub fn submit(&mut self, token: Option<&str>) -> EditEffect {
        if self.is_saving() {
            return EditEffect::None;
        }
        self.success = None;

        let update = match self.form.validate() {
            Ok(update) => update,
            Err(e) => {
                self.state = LoadingState::Error(e.to_string());
                return EditEffect::Invalid(e);
            }
        };

        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return EditEffect::AuthRequired;
        };

        self.state = LoadingState::Loading(Some("Saving...".into()));
        EditEffect::Submit(EditRequest {
            movie_id: self.movie_id.clone(),
            update,
            token: token.to_string(),
        })
    }

    /// Apply the completion of the save
    pub fn resolve(&mut self, result: Result<Option<MovieDetail>, ApiError>) -> EditOutcome {
        match result {
            Ok(detail) => {
                tracing::info!(movie_id = %self.movie_id, "movie updated");
                self.state = LoadingState::Idle;
                self.success = Some(UPDATE_SUCCESS.to_string());
                EditOutcome::Saved(detail)
            }
            Err(e) => {
                tracing::warn!(movie_id = %self.movie_id, error = %e, "movie update failed");
                let message = e.user_message(UPDATE_ERROR);
                self.state = LoadingState::Error(message.clone());
                EditOutcome::Failed(message)
            }
        }
    }
}
