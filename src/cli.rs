//! CLI - Command Line Interface for mflix
//!
//! Every TUI action is scriptable. All output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Authenticate once; the session is remembered
//! mflix login ned@example.com hunter2
//!
//! # Browse the catalog
//! mflix list --sort year --page 2
//! mflix list --search batman --json
//!
//! # Inspect and edit a movie
//! mflix show 573a1390f29313caabcd4135
//! mflix edit 573a1390f29313caabcd4135 --year 1903 --runtime 11
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::models::{SortDirection, SortField};

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// No session, or the backend rejected it
    AuthRequired = 4,
    /// Input rejected by local validation
    ValidationFailed = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// mflix - terminal client for the Mflix movie catalog
///
/// Run without arguments to launch interactive TUI.
/// Use subcommands for scriptable automation.
#[derive(Parser, Debug)]
#[command(
    name = "mflix",
    version,
    about = "Terminal client for the Mflix movie catalog",
    long_about = "Browse, search, sort and edit the Mflix movie catalog from \
                  the terminal.\n\n\
                  Run without arguments to launch the interactive TUI.\n\
                  Use subcommands for automation and scripting.",
    after_help = "EXAMPLES:\n\
                  mflix                               Launch interactive TUI\n\
                  mflix login me@example.com secret   Start a session\n\
                  mflix list --sort rating --desc     Top rated first\n\
                  mflix show <id> --json              Full movie record"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session
    Login(LoginCmd),

    /// Create an account
    Register(RegisterCmd),

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// List one page of the catalog
    #[command(visible_alias = "ls")]
    List(ListCmd),

    /// Show the full record of a movie
    #[command(visible_alias = "i")]
    Show(ShowCmd),

    /// Show the comments on a movie
    Comments(ShowCmd),

    /// Edit a movie's title, year, runtime, rating or plot
    Edit(EditCmd),
}

// =============================================================================
// Auth Commands
// =============================================================================

#[derive(Args, Debug)]
pub struct LoginCmd {
    pub email: String,
    pub password: String,
}

#[derive(Args, Debug)]
pub struct RegisterCmd {
    pub name: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// List Command
// =============================================================================

/// List movies, sorted and filtered server-side
#[derive(Args, Debug)]
pub struct ListCmd {
    /// Page number (clamped to the available pages)
    #[arg(long, short = 'p', default_value = "1")]
    pub page: u32,

    /// Sort field (defaults to the configured sort, else title)
    #[arg(long, short = 's', value_enum)]
    pub sort: Option<SortArg>,

    /// Ascending order
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,

    /// Descending order
    #[arg(long)]
    pub desc: bool,

    /// Title search text
    #[arg(long, short = 'S')]
    pub search: Option<String>,
}

impl ListCmd {
    /// Explicit direction, if one was requested
    pub fn direction(&self) -> Option<SortDirection> {
        match (self.asc, self.desc) {
            (true, _) => Some(SortDirection::Ascending),
            (_, true) => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// Sort field argument
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    Title,
    Year,
    Rating,
    Popularity,
    #[value(name = "date-added", alias = "dateAdded")]
    DateAdded,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Title => SortField::Title,
            SortArg::Year => SortField::Year,
            SortArg::Rating => SortField::Rating,
            SortArg::Popularity => SortField::Popularity,
            SortArg::DateAdded => SortField::DateAdded,
        }
    }
}

// =============================================================================
// Movie Commands
// =============================================================================

#[derive(Args, Debug)]
pub struct ShowCmd {
    /// Movie id
    #[arg(required = true)]
    pub id: String,
}

/// Edit a movie; fields not given keep their current value
#[derive(Args, Debug)]
pub struct EditCmd {
    /// Movie id
    #[arg(required = true)]
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    /// Four-digit year (empty string clears it)
    #[arg(long)]
    pub year: Option<String>,

    /// Runtime in minutes (empty string clears it)
    #[arg(long)]
    pub runtime: Option<String>,

    /// MPAA rating, e.g. PG-13
    #[arg(long)]
    pub rated: Option<String>,

    #[arg(long)]
    pub plot: Option<String>,
}

impl EditCmd {
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.year.is_some()
            || self.runtime.is_some()
            || self.rated.is_some()
            || self.plot.is_some()
    }
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// Status OK response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusOk {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusOk {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            status: "ok",
            message: Some(message.into()),
        }
    }
}

impl Default for StatusOk {
    fn default() -> Self {
        Self {
            status: "ok",
            message: None,
        }
    }
}

/// One page of the list command
#[derive(Debug, Serialize)]
pub struct ListResponse<'a> {
    pub page: u32,
    pub total_pages: u32,
    pub sort_by: &'static str,
    pub sort_order: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<&'a str>,
    pub movies: &'a [crate::models::MovieSummary],
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data as JSON (wrapped in `data` in JSON mode)
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print `data` in JSON mode, else the human rendering `text`
    pub fn print_or<T: Serialize>(
        &self,
        data: T,
        text: impl FnOnce() -> String,
    ) -> anyhow::Result<()> {
        if self.json {
            self.print(data)
        } else {
            println!("{}", text());
            Ok(())
        }
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
