//! CLI Command Handlers
//!
//! Implements all CLI commands on top of the same controllers the TUI uses.
//! Each handler takes CLI args, a context and Output, returns ExitCode.

use serde::Serialize;

use crate::api::{ApiError, MflixClient};
use crate::auth::{self, Auth, AuthError};
use crate::catalog::{
    DetailEffect, DetailFetcher, EditEffect, EditForm, EditOutcome, EditSubmitter, ListEffect,
    ListQueryController, ListStatus,
};
use crate::cli::{
    EditCmd, ExitCode, ListCmd, ListResponse, LoginCmd, Output, RegisterCmd, ShowCmd, StatusOk,
};
use crate::config::Config;
use crate::models::{Comment, MovieDetail, MovieSummary, MovieUpdate, SortField, User};
use crate::session::SessionStore;

/// Shared state of a CLI invocation
pub struct CmdContext {
    pub client: MflixClient,
    pub store: SessionStore,
    pub default_sort: SortField,
}

impl CmdContext {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: MflixClient::with_timeout(config.api_base_url(), config.request_timeout()),
            store: SessionStore::open_default()?,
            default_sort: config.default_sort(),
        })
    }

    fn auth(&self) -> Auth {
        Auth::restore(self.store.clone())
    }
}

/// Exit code for a failed request
pub fn api_exit_code(err: &ApiError) -> ExitCode {
    match err {
        ApiError::Network(_) => ExitCode::NetworkError,
        ApiError::Unauthorized(_) => ExitCode::AuthRequired,
        _ => ExitCode::Error,
    }
}

const NOT_LOGGED_IN: &str = "Not logged in. Run `mflix login <email> <password>` first.";

fn print_or_fail<T: Serialize>(
    output: &Output,
    data: T,
    text: impl FnOnce() -> String,
) -> ExitCode {
    if let Err(e) = output.print_or(data, text) {
        return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
    }
    ExitCode::Success
}

// =============================================================================
// Auth Commands
// =============================================================================

fn auth_exit(output: &Output, err: AuthError) -> ExitCode {
    let code = match &err {
        e if e.is_validation() => ExitCode::ValidationFailed,
        e => e.api_error().map(api_exit_code).unwrap_or(ExitCode::Error),
    };
    output.error(err.to_string(), code)
}

pub async fn login_cmd(cmd: LoginCmd, ctx: &CmdContext, output: &Output) -> ExitCode {
    let mut auth = ctx.auth();
    output.info(format!("Logging in as {}...", cmd.email.trim()));

    match auth.login(&ctx.client, &cmd.email, &cmd.password).await {
        Ok(session) => print_or_fail(output, &session.user, || {
            format!("Logged in as {}", session.user.name)
        }),
        Err(e) => auth_exit(output, e),
    }
}

pub async fn register_cmd(cmd: RegisterCmd, ctx: &CmdContext, output: &Output) -> ExitCode {
    match auth::register(&ctx.client, &cmd.name, &cmd.email, &cmd.password).await {
        Ok(message) => print_or_fail(output, StatusOk::with_message(message), || {
            message.to_string()
        }),
        Err(e) => auth_exit(output, e),
    }
}

pub fn logout_cmd(ctx: &CmdContext, output: &Output) -> ExitCode {
    let mut auth = ctx.auth();
    auth.logout();
    print_or_fail(output, StatusOk::default(), || "Logged out".to_string())
}

pub fn whoami_cmd(ctx: &CmdContext, output: &Output) -> ExitCode {
    let auth = ctx.auth();
    match auth.user() {
        Some(user) => print_or_fail(output, user, || format_user(user)),
        None => output.error(NOT_LOGGED_IN, ExitCode::AuthRequired),
    }
}

fn format_user(user: &User) -> String {
    match &user.email {
        Some(email) => format!("{} <{}>", user.name, email),
        None => user.name.clone(),
    }
}

// =============================================================================
// List Command
// =============================================================================

/// Run the request of `effect` and fold the result into `ctl`.
/// Returns the exit code of a failed attempt.
async fn settle_list(
    ctl: &mut ListQueryController,
    client: &MflixClient,
    effect: ListEffect,
) -> Result<(), ExitCode> {
    let req = match effect {
        ListEffect::Fetch(req) => req,
        ListEffect::AuthRequired => return Err(ExitCode::AuthRequired),
        ListEffect::None => return Ok(()),
    };

    let result = client.list_movies(&req.params, &req.token).await;
    let code = result.as_ref().err().map(api_exit_code);
    ctl.resolve(req.seq, result);

    match ctl.status() {
        ListStatus::Ready => Ok(()),
        ListStatus::AuthRequired => Err(ExitCode::AuthRequired),
        _ => Err(code.unwrap_or(ExitCode::Error)),
    }
}

pub async fn list_cmd(cmd: ListCmd, ctx: &CmdContext, output: &Output) -> ExitCode {
    let auth = ctx.auth();
    let field = cmd.sort.map(SortField::from).unwrap_or(ctx.default_sort);
    let mut ctl = ListQueryController::with_sort(auth.token().map(String::from), field);

    // Shape the query before mounting so only one request goes out
    if let Some(direction) = cmd.direction() {
        if direction != ctl.query().sort_direction {
            ctl.toggle_sort_direction();
        }
    }
    if let Some(search) = &cmd.search {
        ctl.set_search_text(search.trim());
    }

    let effect = ctl.mount();
    if let Err(code) = settle_list(&mut ctl, &ctx.client, effect).await {
        return list_failure(output, &ctl, code);
    }

    // Total pages are only known after the first page
    if cmd.page != 1 {
        let effect = ctl.set_page(cmd.page);
        if let Err(code) = settle_list(&mut ctl, &ctx.client, effect).await {
            return list_failure(output, &ctl, code);
        }
    }

    let query = ctl.query();
    let response = ListResponse {
        page: ctl.page(),
        total_pages: ctl.total_pages(),
        sort_by: query.sort_field.as_param(),
        sort_order: query.sort_direction.as_param(),
        search: Some(query.search.as_str()).filter(|s| !s.is_empty()),
        movies: ctl.items(),
    };
    print_or_fail(output, &response, || format_list(&ctl))
}

fn list_failure(output: &Output, ctl: &ListQueryController, code: ExitCode) -> ExitCode {
    if code == ExitCode::AuthRequired {
        return output.error(NOT_LOGGED_IN, code);
    }
    output.error(ctl.error().unwrap_or(crate::catalog::list::LIST_ERROR), code)
}

/// Human-readable page of the catalog
pub fn format_list(ctl: &ListQueryController) -> String {
    let query = ctl.query();
    let mut out = format!(
        "Sorted by {} {}",
        query.sort_field,
        query.sort_direction.arrow()
    );
    if !query.search.is_empty() {
        out.push_str(&format!("  |  Search: \"{}\"", query.search));
    }
    out.push('\n');

    if ctl.items().is_empty() {
        out.push_str("No movies found.\n");
    }
    let offset = query.offset();
    for (i, movie) in ctl.items().iter().enumerate() {
        out.push_str(&format_summary_row(offset.saturating_add(i + 1), movie));
        out.push('\n');
    }
    out.push_str(&format!("Page {} of {}", ctl.page(), ctl.total_pages()));
    out
}

fn format_summary_row(n: usize, movie: &MovieSummary) -> String {
    let year = movie
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "----".into());
    let rating = movie
        .rating
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "N/A".into());
    let votes = movie
        .votes
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".into());
    format!(
        "{:>4}. {} ({})  ⭐ {}  votes: {}  released: {}  [{}]",
        n,
        movie.title,
        year,
        rating,
        votes,
        movie.released_display(),
        movie.id
    )
}

// =============================================================================
// Show / Comments Commands
// =============================================================================

#[derive(Debug, Serialize)]
struct ShowResponse<'a> {
    movie: &'a MovieDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    comments: Option<&'a [Comment]>,
}

pub async fn show_cmd(cmd: ShowCmd, ctx: &CmdContext, output: &Output) -> ExitCode {
    let auth = ctx.auth();
    let mut fetcher = DetailFetcher::new();

    let req = match fetcher.open(cmd.id.trim(), auth.token()) {
        DetailEffect::Fetch(req) => req,
        _ => return output.error(NOT_LOGGED_IN, ExitCode::AuthRequired),
    };

    let (detail, comments) = tokio::join!(
        ctx.client.movie_detail(&req.movie_id, &req.token),
        ctx.client.comments(&req.movie_id, &req.token),
    );
    let code = detail.as_ref().err().map(api_exit_code);
    fetcher.resolve_detail(req.seq, detail);
    fetcher.resolve_comments(req.seq, comments);

    let Some(movie) = fetcher.detail() else {
        let msg = fetcher.detail_state().message().unwrap_or("Failed to load movie");
        return output.error(msg, code.unwrap_or(ExitCode::Error));
    };

    let comments_failed = fetcher.comments_state().is_error();
    let response = ShowResponse {
        movie,
        comments: (!comments_failed).then(|| fetcher.comments()),
    };
    print_or_fail(output, &response, || {
        let mut text = format_detail(movie);
        text.push_str("\n\n");
        match fetcher.comments_state().message() {
            Some(msg) if comments_failed => text.push_str(msg),
            _ => text.push_str(&format_comments(fetcher.comments())),
        }
        text
    })
}

pub async fn comments_cmd(cmd: ShowCmd, ctx: &CmdContext, output: &Output) -> ExitCode {
    let auth = ctx.auth();
    let Some(token) = auth.token() else {
        return output.error(NOT_LOGGED_IN, ExitCode::AuthRequired);
    };

    match ctx.client.comments(cmd.id.trim(), token).await {
        Ok(comments) => print_or_fail(output, &comments, || format_comments(&comments)),
        Err(e) => {
            tracing::warn!(error = %e, movie_id = %cmd.id, "comments failed");
            output.error(
                crate::catalog::detail::COMMENTS_ERROR,
                api_exit_code(&e),
            )
        }
    }
}

/// Human-readable movie record
pub fn format_detail(movie: &MovieDetail) -> String {
    fn list(items: &[String]) -> String {
        if items.is_empty() {
            "N/A".into()
        } else {
            items.join(", ")
        }
    }
    fn or_na(value: Option<&str>) -> &str {
        value.filter(|v| !v.is_empty()).unwrap_or("N/A")
    }

    let mut lines = vec![
        movie.title.clone(),
        format!(
            "Year: {}",
            movie.year.map(|y| y.to_string()).unwrap_or_else(|| "N/A".into())
        ),
        format!("Rated: {}", or_na(movie.rated.as_deref())),
        format!("Runtime: {}", movie.runtime_display()),
        format!("Released: {}", movie.released_display()),
        format!("Genres: {}", list(&movie.genres)),
        format!("Directors: {}", list(&movie.directors)),
        format!("Cast: {}", list(&movie.cast)),
        format!("Languages: {}", list(&movie.languages)),
        format!("Countries: {}", list(&movie.countries)),
    ];
    if let Some(rating) = movie.rating {
        let votes = movie.votes.map(|v| format!(" ({} votes)", v)).unwrap_or_default();
        lines.push(format!("IMDb: {:.1}{}", rating, votes));
    }
    if let Some(meter) = movie.tomato_meter {
        lines.push(format!("Tomatometer (viewers): {}%", meter));
    }
    if let Some(awards) = &movie.awards {
        lines.push(format!("Awards: {}", awards));
    }
    let plot = movie.full_plot.as_deref().or(movie.plot.as_deref());
    lines.push(String::new());
    lines.push(or_na(plot).to_string());
    lines.join("\n")
}

pub fn format_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "No comments yet.".to_string();
    }
    let mut out = format!("Comments ({})", comments.len());
    for c in comments {
        out.push_str(&format!(
            "\n- {} ({}): {}",
            c.author,
            crate::models::display_date(c.date.as_deref()),
            c.text
        ));
    }
    out
}

// =============================================================================
// Edit Command
// =============================================================================

fn apply_edits(form: &mut EditForm, cmd: &EditCmd) {
    if let Some(title) = &cmd.title {
        form.title = title.clone();
    }
    if let Some(year) = &cmd.year {
        form.year = year.clone();
    }
    if let Some(runtime) = &cmd.runtime {
        form.runtime = runtime.clone();
    }
    if let Some(rated) = &cmd.rated {
        form.rated = rated.clone();
    }
    if let Some(plot) = &cmd.plot {
        form.plot = plot.clone();
    }
}

/// Record as it reads after `update`, for backends that do not echo it
fn with_update(mut movie: MovieDetail, update: MovieUpdate) -> MovieDetail {
    movie.title = update.title;
    movie.year = update.year;
    movie.runtime = update.runtime;
    movie.rated = update.rated;
    movie.plot = update.plot;
    movie.year_text = None;
    movie.runtime_text = None;
    movie
}

pub async fn edit_cmd(cmd: EditCmd, ctx: &CmdContext, output: &Output) -> ExitCode {
    if !cmd.has_changes() {
        return output.error(
            "Nothing to change. Pass at least one of --title --year --runtime --rated --plot",
            ExitCode::InvalidArgs,
        );
    }

    let auth = ctx.auth();
    let Some(token) = auth.token() else {
        return output.error(NOT_LOGGED_IN, ExitCode::AuthRequired);
    };

    // Unspecified fields keep their current values
    let current = match ctx.client.movie_detail(cmd.id.trim(), token).await {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!(error = %e, movie_id = %cmd.id, "movie detail failed");
            return output.error(
                crate::catalog::detail::DETAIL_ERROR,
                api_exit_code(&e),
            );
        }
    };

    let mut editor = EditSubmitter::for_detail(&current);
    apply_edits(&mut editor.form, &cmd);

    let req = match editor.submit(Some(token)) {
        EditEffect::Submit(req) => req,
        EditEffect::Invalid(e) => return output.error(e.to_string(), ExitCode::ValidationFailed),
        EditEffect::AuthRequired => return output.error(NOT_LOGGED_IN, ExitCode::AuthRequired),
        EditEffect::None => return ExitCode::Error,
    };

    let result = ctx
        .client
        .update_movie(&req.movie_id, &req.update, &req.token)
        .await;
    let code = result.as_ref().err().map(api_exit_code);

    match editor.resolve(result) {
        EditOutcome::Saved(updated) => {
            let message = editor.success().unwrap_or_default().to_string();
            let record = updated.unwrap_or_else(|| with_update(current, req.update));
            print_or_fail(output, &record, || {
                format!("{}\n\n{}", message, format_detail(&record))
            })
        }
        EditOutcome::Failed(message) => output.error(message, code.unwrap_or(ExitCode::Error)),
    }
}
