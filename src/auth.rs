//! Authentication
//!
//! `Auth` owns the current session. Controllers only ever see the token,
//! handed to them by the caller.

use thiserror::Error;

use crate::api::{ApiError, MflixClient};
use crate::models::{Session, User};
use crate::session::SessionStore;

pub const LOGIN_ERROR: &str = "Login failed";
pub const REGISTER_ERROR: &str = "Registration failed";
pub const REGISTER_SUCCESS: &str = "Registration successful! You can now log in.";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Name, email and password are required")]
    MissingRegistration,

    /// Backend rejected the request; `message` is what the user sees
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: ApiError,
    },
}

impl AuthError {
    fn from_api(source: ApiError, fallback: &str) -> Self {
        Self::Failed {
            message: source.user_message(fallback),
            source,
        }
    }

    /// Rejected locally, before any request
    pub fn is_validation(&self) -> bool {
        matches!(self, AuthError::MissingCredentials | AuthError::MissingRegistration)
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AuthError::Failed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Both fields present after trimming the email
pub fn validate_login(email: &str, password: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(())
}

pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), AuthError> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(AuthError::MissingRegistration);
    }
    Ok(())
}

/// Message for a failed login response
pub fn login_failure(err: ApiError) -> AuthError {
    AuthError::from_api(err, LOGIN_ERROR)
}

/// Message for a failed registration response
pub fn register_failure(err: ApiError) -> AuthError {
    AuthError::from_api(err, REGISTER_ERROR)
}

/// Create an account. Does not log in.
pub async fn register(
    client: &MflixClient,
    name: &str,
    email: &str,
    password: &str,
) -> Result<&'static str, AuthError> {
    validate_registration(name, email, password)?;
    client
        .register(name.trim(), email.trim(), password)
        .await
        .map_err(register_failure)?;
    tracing::info!(email = email.trim(), "account registered");
    Ok(REGISTER_SUCCESS)
}

/// Holder of the current session
#[derive(Debug)]
pub struct Auth {
    store: SessionStore,
    session: Option<Session>,
}

impl Auth {
    /// Logged out, persisting to `store`
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            session: None,
        }
    }

    /// Read the persisted session, if any. A corrupt record is discarded.
    pub fn restore(store: SessionStore) -> Self {
        let session = match store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %store.path().display(),
                    "discarding stored session"
                );
                let _ = store.clear();
                None
            }
        };
        if let Some(s) = &session {
            tracing::debug!(user = %s.user.name, "session restored");
        }
        Self { store, session }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Log in and persist the session
    pub async fn login(
        &mut self,
        client: &MflixClient,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        validate_login(email, password)?;
        let session = client
            .login(email.trim(), password)
            .await
            .map_err(login_failure)?;
        self.establish(session.clone());
        Ok(session)
    }

    /// Hold and persist a session obtained elsewhere (e.g. the worker)
    pub fn establish(&mut self, session: Session) {
        if let Err(e) = self.store.save(&session) {
            // Still logged in for this run
            tracing::warn!(error = %e, "could not persist session");
        }
        tracing::info!(user = %session.user.name, "logged in");
        self.session = Some(session);
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "could not remove stored session");
        }
        if self.session.take().is_some() {
            tracing::info!("logged out");
        }
    }
}
