//! Configuration management for mflix
//!
//! Handles config file loading and backend selection.
//! Config is stored at ~/.config/mflix/config.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::models::SortField;

/// Environment override for the backend URL
pub const BASE_URL_ENV: &str = "MFLIX_API_BASE_URL";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Backend base URL (including the `/api` prefix)
    pub api_base_url: Option<String>,
    /// Initial sort field of the movie list
    pub default_sort: Option<SortField>,
    /// Per-request timeout; unset keeps the transport default
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Get config file path (~/.config/mflix/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("mflix").join("config.toml"))
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
    }

    /// Load config from an explicit path. A missing file is the default config;
    /// a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// `--config` path when given, else the default location
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Ok(Self::load()),
        }
    }

    /// Get the backend URL with fallback chain:
    /// 1. Environment variable MFLIX_API_BASE_URL
    /// 2. `api_base_url` from the config file
    /// 3. The public deployment
    pub fn api_base_url(&self) -> String {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                return url;
            }
        }

        self.api_base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn default_sort(&self) -> SortField {
        self.default_sort.unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}
