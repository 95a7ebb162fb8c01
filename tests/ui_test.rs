//! UI rendering tests for mflix
//!
//! Draws the whole app onto a `TestBackend` and checks what ends up on
//! screen for each state.
//!
//! ## Test Cases
//! - login screen when there is no session
//! - movie list with pagination, loading and empty states
//! - detail overlay with comments, edit overlay, error popup
//! - small terminals do not panic

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use tempfile::TempDir;

use mflix::api::ApiError;
use mflix::app::{App, AppState, Task};
use mflix::auth::Auth;
use mflix::catalog::CatalogEvent;
use mflix::models::{Comment, MovieDetail, MovieSummary, PageResult, Session, SortField, User};
use mflix::session::SessionStore;
use mflix::ui;

// =============================================================================
// Helpers
// =============================================================================

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn movie(n: usize) -> MovieSummary {
    MovieSummary {
        id: format!("m{n}"),
        title: format!("Feature Film {n}"),
        year: Some(1990 + n as i32),
        rating: Some(7.9),
        votes: Some(1200),
        released: Some("1994-09-23T00:00:00.000Z".into()),
    }
}

fn auth(dir: &TempDir, logged_in: bool) -> Auth {
    let mut auth = Auth::new(SessionStore::new(dir.path().join("session.json")));
    if logged_in {
        auth.establish(Session::new(
            User {
                id: Some("u1".into()),
                name: "Ned Stark".into(),
                email: None,
            },
            "tok",
        ));
    }
    auth
}

fn list_seq(app: &mut App) -> u64 {
    app.take_tasks()
        .into_iter()
        .find_map(|t| match t {
            Task::FetchList(req) => Some(req.seq),
            _ => None,
        })
        .expect("expected a list fetch")
}

/// Logged-in app showing a settled first page
fn app_with_page(dir: &TempDir, items: usize, total_pages: u32) -> App {
    let mut app = App::new(auth(dir, true), SortField::Title);
    app.start();
    let seq = list_seq(&mut app);
    app.apply_event(CatalogEvent::List {
        seq,
        result: Ok(PageResult::new((1..=items).map(movie).collect(), total_pages)),
    });
    app
}

fn draw(app: &App, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|frame| ui::render(frame, app)).unwrap();

    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

// =============================================================================
// Screens
// =============================================================================

#[test]
fn test_login_screen_without_session() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(auth(&dir, false), SortField::Title);
    app.start();

    assert_eq!(app.state, AppState::Login);
    let screen = draw(&app, 120, 30);
    assert!(screen.contains("LOGIN"));
    assert!(screen.contains("Email"));
    assert!(screen.contains("Password"));
    assert!(screen.contains("signed out"));
}

#[test]
fn test_password_never_rendered() {
    let dir = TempDir::new().unwrap();
    let mut app = App::new(auth(&dir, false), SortField::Title);
    app.start();
    app.handle_key(key(KeyCode::Tab));
    for c in "hunter2".chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }

    assert_eq!(app.login.password.value, "hunter2");
    assert!(!draw(&app, 120, 30).contains("hunter2"));
}

#[test]
fn test_movie_list_renders_page() {
    let dir = TempDir::new().unwrap();
    let app = app_with_page(&dir, 10, 5);

    let screen = draw(&app, 140, 30);
    assert!(screen.contains("Feature Film 1"));
    assert!(screen.contains("Feature Film 10"));
    assert!(screen.contains("Page 1 of 5"));
    assert!(screen.contains("1994-09-23"));
    assert!(screen.contains("Sort: Title ↑"));
    assert!(screen.contains("Ned Stark"));
}

#[test]
fn test_loading_keeps_previous_page_visible() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_page(&dir, 10, 5);

    app.handle_key(key(KeyCode::Right));
    assert!(app.list.is_loading());

    let screen = draw(&app, 140, 30);
    assert!(screen.contains("Loading"));
    assert!(screen.contains("Feature Film 1"));
    assert!(screen.contains("Page 2 of 5"));
}

#[test]
fn test_empty_result_message() {
    let dir = TempDir::new().unwrap();
    let app = app_with_page(&dir, 0, 1);

    let screen = draw(&app, 120, 30);
    assert!(screen.contains("No movies found."));
    assert!(screen.contains("Page 1 of 1"));
}

#[test]
fn test_failed_fetch_shows_error_popup_and_message() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_page(&dir, 10, 5);

    app.handle_key(key(KeyCode::Right));
    let seq = list_seq(&mut app);
    app.apply_event(CatalogEvent::List {
        seq,
        result: Err(ApiError::InvalidResponse("boom".into())),
    });

    let screen = draw(&app, 140, 30);
    assert!(screen.contains("ERROR"));
    assert!(screen.contains("Failed to load movies"));

    // popup goes away on the next key; the inline message stays
    app.handle_key(key(KeyCode::Down));
    let screen = draw(&app, 140, 30);
    assert!(!screen.contains("✗ ERROR"));
    assert!(screen.contains("Failed to load movies"));
}

#[test]
fn test_search_box_shows_typed_text() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_page(&dir, 10, 5);

    app.handle_key(key(KeyCode::Char('/')));
    for c in "batman".chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }

    let screen = draw(&app, 140, 30);
    assert!(screen.contains("batman"));
    assert!(screen.contains("INSERT"));
}

#[test]
fn test_detail_overlay_with_comments() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_page(&dir, 3, 1);

    app.handle_key(key(KeyCode::Enter));
    assert_eq!(app.state, AppState::Detail);
    let seq = app
        .take_tasks()
        .into_iter()
        .find_map(|t| match t {
            Task::FetchDetail(req) => Some(req.seq),
            _ => None,
        })
        .unwrap();

    let screen = draw(&app, 140, 36);
    assert!(screen.contains("Loading movie"));

    app.apply_event(CatalogEvent::Detail {
        seq,
        result: Ok(MovieDetail {
            id: "m1".into(),
            title: "Feature Film 1".into(),
            plot: Some("A quiet town hides a secret.".into()),
            genres: vec!["Drama".into()],
            runtime: Some(101),
            ..MovieDetail::default()
        }),
    });
    app.apply_event(CatalogEvent::Comments {
        seq,
        result: Ok(vec![Comment {
            author: "Arya".into(),
            text: "Loved it".into(),
            date: Some("2016-01-01T00:00:00Z".into()),
        }]),
    });

    let screen = draw(&app, 140, 36);
    assert!(screen.contains("A quiet town hides a secret."));
    assert!(screen.contains("101 minutes"));
    assert!(screen.contains("COMMENTS (1)"));
    assert!(screen.contains("Arya"));
    assert!(screen.contains("Loved it"));
}

#[test]
fn test_detail_without_comments() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_page(&dir, 1, 1);
    app.handle_key(key(KeyCode::Enter));
    let tasks = app.take_tasks();
    let Some(Task::FetchDetail(req)) = tasks.into_iter().next() else {
        panic!("expected a detail fetch");
    };
    app.apply_event(CatalogEvent::Comments {
        seq: req.seq,
        result: Ok(vec![]),
    });

    assert!(draw(&app, 140, 36).contains("No comments yet."));
}

#[test]
fn test_edit_overlay() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_page(&dir, 1, 1);
    app.handle_key(key(KeyCode::Enter));
    let Some(Task::FetchDetail(req)) = app.take_tasks().into_iter().next() else {
        panic!("expected a detail fetch");
    };
    app.apply_event(CatalogEvent::Detail {
        seq: req.seq,
        result: Ok(MovieDetail {
            id: "m1".into(),
            title: "Feature Film 1".into(),
            year: Some(1991),
            ..MovieDetail::default()
        }),
    });

    app.handle_key(key(KeyCode::Char('e')));
    assert_eq!(app.state, AppState::Edit);

    let screen = draw(&app, 140, 36);
    assert!(screen.contains("EDIT MOVIE"));
    assert!(screen.contains("Runtime (min)"));
    assert!(screen.contains("1991"));
}

#[test]
fn test_small_terminal_does_not_panic() {
    let dir = TempDir::new().unwrap();
    let mut app = app_with_page(&dir, 10, 5);
    draw(&app, 20, 6);

    app.handle_key(key(KeyCode::Enter));
    draw(&app, 20, 6);

    let mut app = App::new(auth(&dir, false), SortField::Title);
    app.start();
    draw(&app, 10, 4);
}
