//! End-to-end flows for mflix
//!
//! Drives the real `App` and `CatalogWorker` against a mock backend the
//! same way the TUI loop does: keys in, tasks dispatched, completions
//! folded back into the state.
//!
//! ## Test Cases
//! - login, then the first page loads
//! - typing a search refetches page one
//! - opening a movie loads record and comments
//! - saving an edit refetches the record and refreshes the list
//! - an expired token sends the user back to the login screen
//! - registering returns to login with a notice

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mockito::{Matcher, Server, ServerGuard};
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

use mflix::api::MflixClient;
use mflix::app::{App, AppState, SESSION_EXPIRED};
use mflix::auth::{Auth, REGISTER_SUCCESS};
use mflix::catalog::edit::UPDATE_SUCCESS;
use mflix::catalog::{CatalogEvent, CatalogWorker, ListStatus};
use mflix::models::{Session, SortField, User};
use mflix::session::SessionStore;

// =============================================================================
// Harness
// =============================================================================

struct Harness {
    app: App,
    worker: CatalogWorker,
    events: UnboundedReceiver<CatalogEvent>,
    store: SessionStore,
    _dir: TempDir,
}

impl Harness {
    fn new(server: &ServerGuard, logged_in: bool) -> Self {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let mut auth = Auth::new(store.clone());
        if logged_in {
            auth.establish(Session::new(
                User {
                    id: Some("u1".into()),
                    name: "Ned Stark".into(),
                    email: Some("ned@example.com".into()),
                },
                "tok",
            ));
        }

        let (worker, events) = CatalogWorker::new(MflixClient::with_base_url(server.url()));
        let mut app = App::new(auth, SortField::Title);
        app.start();

        Self {
            app,
            worker,
            events,
            store,
            _dir: dir,
        }
    }

    fn dispatch(&mut self) {
        for task in self.app.take_tasks() {
            task.run(&mut self.worker);
        }
    }

    fn press(&mut self, code: KeyCode) {
        self.app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(&mut self, c: char) {
        self.app
            .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c));
        }
    }

    /// Run queued work and fold completions in until `done` holds
    async fn settle(&mut self, done: impl Fn(&App) -> bool) {
        self.dispatch();
        while !done(&self.app) {
            let event = timeout(Duration::from_secs(5), self.events.recv())
                .await
                .expect("timed out waiting for the backend")
                .expect("worker channel closed");
            self.app.apply_event(event);
            self.dispatch();
        }
    }
}

fn list_settled(app: &App) -> bool {
    app.list.in_flight().is_none() && !app.list.is_loading()
}

fn detail_settled(app: &App) -> bool {
    !app.detail.detail_state().is_loading() && !app.detail.comments_state().is_loading()
}

fn movies_body(titles: &[(&str, &str)], total_pages: u32) -> String {
    let movies: Vec<_> = titles
        .iter()
        .map(|(id, title)| {
            serde_json::json!({
                "_id": id,
                "title": title,
                "year": 1927,
                "imdb": { "rating": 8.3, "votes": 118880 }
            })
        })
        .collect();
    serde_json::json!({ "movies": movies, "totalPages": total_pages }).to_string()
}

fn default_query() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("page".into(), "1".into()),
        Matcher::UrlEncoded("search".into(), "".into()),
    ])
}

// =============================================================================
// Flows
// =============================================================================

#[tokio::test]
async fn test_login_then_first_page_loads() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "email": "ned@example.com",
            "password": "winter"
        })))
        .with_status(200)
        .with_body(r#"{"token": "jwt-abc", "user": {"_id": "u1", "name": "Ned Stark"}}"#)
        .create_async()
        .await;
    let list = server
        .mock("GET", "/movies")
        .match_header("authorization", "Bearer jwt-abc")
        .match_query(default_query())
        .with_status(200)
        .with_body(movies_body(&[("m1", "Metropolis"), ("m2", "Nosferatu")], 3))
        .create_async()
        .await;

    let mut h = Harness::new(&server, false);
    assert_eq!(h.app.state, AppState::Login);

    h.type_text("ned@example.com");
    h.press(KeyCode::Tab);
    h.type_text("winter");
    h.press(KeyCode::Enter);
    assert!(h.app.login.submitting);

    h.settle(|app| app.state == AppState::Movies && list_settled(app))
        .await;

    login.assert_async().await;
    list.assert_async().await;
    assert!(h.app.auth.is_authenticated());
    assert!(h.store.path().exists());
    assert_eq!(h.app.list.items().len(), 2);
    assert_eq!(h.app.list.total_pages(), 3);
    assert_eq!(h.app.selected_movie().map(|m| m.title.as_str()), Some("Metropolis"));
}

#[tokio::test]
async fn test_login_rejected_stays_on_form() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_body(r#"{"error": "Invalid credentials"}"#)
        .create_async()
        .await;

    let mut h = Harness::new(&server, false);
    h.type_text("ned@example.com");
    h.press(KeyCode::Tab);
    h.type_text("summer");
    h.press(KeyCode::Enter);

    h.settle(|app| !app.login.submitting).await;

    assert_eq!(h.app.state, AppState::Login);
    assert_eq!(h.app.login.error.as_deref(), Some("Invalid credentials"));
    assert!(!h.store.path().exists());
}

#[tokio::test]
async fn test_search_refetches_first_page() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/movies")
        .match_query(default_query())
        .with_status(200)
        .with_body(movies_body(&[("m1", "Metropolis")], 5))
        .create_async()
        .await;
    let search = server
        .mock("GET", "/movies")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("search".into(), "batman".into()),
        ]))
        .with_status(200)
        .with_body(movies_body(&[("b1", "Batman"), ("b2", "Batman Returns")], 1))
        .create_async()
        .await;

    let mut h = Harness::new(&server, true);
    h.settle(list_settled).await;
    assert_eq!(h.app.list.total_pages(), 5);

    h.press(KeyCode::Char('/'));
    h.type_text("batman");
    h.press(KeyCode::Enter);

    h.settle(|app| list_settled(app) && app.list.query().search == "batman")
        .await;

    search.assert_async().await;
    assert_eq!(h.app.list.page(), 1);
    let titles: Vec<_> = h.app.list.items().iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Batman", "Batman Returns"]);
    assert_eq!(h.app.list.status(), &ListStatus::Ready);
}

#[tokio::test]
async fn test_logout_drops_search_for_next_login() {
    let mut server = Server::new_async().await;
    let unfiltered = server
        .mock("GET", "/movies")
        .match_query(default_query())
        .with_status(200)
        .with_body(movies_body(&[("m1", "Metropolis")], 2))
        .expect(2)
        .create_async()
        .await;
    server
        .mock("GET", "/movies")
        .match_query(Matcher::UrlEncoded("search".into(), "batman".into()))
        .with_status(200)
        .with_body(movies_body(&[("b1", "Batman")], 1))
        .create_async()
        .await;
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(r#"{"token": "jwt-2", "user": {"name": "Ned Stark"}}"#)
        .create_async()
        .await;

    let mut h = Harness::new(&server, true);
    h.settle(list_settled).await;

    h.press(KeyCode::Char('/'));
    h.type_text("batman");
    h.press(KeyCode::Enter);
    h.settle(|app| list_settled(app) && app.list.query().search == "batman")
        .await;

    h.press(KeyCode::Char('L'));
    assert_eq!(h.app.state, AppState::Login);
    assert_eq!(h.app.search.value, "");
    assert_eq!(h.app.list.query().search, "");

    h.type_text("ned@example.com");
    h.press(KeyCode::Tab);
    h.type_text("winter");
    h.press(KeyCode::Enter);
    h.settle(|app| app.state == AppState::Movies && list_settled(app))
        .await;

    unfiltered.assert_async().await;
    assert_eq!(h.app.list.query().search, "");
    assert_eq!(h.app.list.items()[0].title, "Metropolis");
}

#[tokio::test]
async fn test_open_movie_loads_record_and_comments() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/movies")
        .match_query(default_query())
        .with_status(200)
        .with_body(movies_body(&[("m1", "Metropolis")], 1))
        .create_async()
        .await;
    server
        .mock("GET", "/movies/m1")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"_id": "m1", "title": "Metropolis", "year": 1927, "runtime": 153}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/comments/m1")
        .with_status(200)
        .with_body(r#"[{"name": "Arya", "text": "Loved it"}]"#)
        .create_async()
        .await;

    let mut h = Harness::new(&server, true);
    h.settle(list_settled).await;

    h.press(KeyCode::Enter);
    assert_eq!(h.app.state, AppState::Detail);
    h.settle(detail_settled).await;

    let movie = h.app.detail.detail().expect("record loaded");
    assert_eq!(movie.runtime, Some(153));
    assert_eq!(h.app.detail.comments().len(), 1);
    assert_eq!(h.app.detail.comments()[0].author, "Arya");

    h.press(KeyCode::Esc);
    assert_eq!(h.app.state, AppState::Movies);
    assert!(!h.app.detail.is_open());
}

#[tokio::test]
async fn test_saved_edit_refreshes_record_and_list() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/movies")
        .match_query(default_query())
        .with_status(200)
        .with_body(movies_body(&[("m1", "Metropolis")], 1))
        .expect(2)
        .create_async()
        .await;
    let detail = server
        .mock("GET", "/movies/m1")
        .with_status(200)
        .with_body(r#"{"_id": "m1", "title": "Metropolis", "year": 1927}"#)
        .expect(2)
        .create_async()
        .await;
    server
        .mock("GET", "/comments/m1")
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/movies/m1")
        .match_header("authorization", "Bearer tok")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "title": "Metropolis!",
            "year": 1927,
            "runtime": null
        })))
        .with_status(200)
        .with_body(r#"{"message": "Movie updated"}"#)
        .create_async()
        .await;

    let mut h = Harness::new(&server, true);
    h.settle(list_settled).await;
    h.press(KeyCode::Enter);
    h.settle(detail_settled).await;

    h.press(KeyCode::Char('e'));
    assert_eq!(h.app.state, AppState::Edit);
    h.press(KeyCode::Char('!'));
    h.press(KeyCode::Enter);
    assert!(h.app.editor.as_ref().is_some_and(|e| e.is_saving()));

    h.settle(|app| {
        app.editor.is_none()
            && list_settled(app)
            && detail_settled(app)
            && app.detail.detail().is_some()
    })
    .await;

    update.assert_async().await;
    detail.assert_async().await;
    list.assert_async().await;
    assert_eq!(h.app.state, AppState::Detail);
    assert_eq!(h.app.notice.as_deref(), Some(UPDATE_SUCCESS));
}

#[tokio::test]
async fn test_expired_token_returns_to_login() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/movies")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error": "jwt expired"}"#)
        .create_async()
        .await;

    let mut h = Harness::new(&server, true);
    assert!(h.store.path().exists());

    h.settle(|app| app.state == AppState::Login).await;

    assert!(!h.app.auth.is_authenticated());
    assert!(!h.store.path().exists());
    assert_eq!(h.app.login.error.as_deref(), Some(SESSION_EXPIRED));
    assert!(h.app.list.items().is_empty());
}

#[tokio::test]
async fn test_register_returns_to_login_with_notice() {
    let mut server = Server::new_async().await;
    let register = server
        .mock("POST", "/auth/register")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "Arya",
            "email": "arya@example.com"
        })))
        .with_status(201)
        .with_body(r#"{"message": "User registered"}"#)
        .create_async()
        .await;

    let mut h = Harness::new(&server, false);
    h.ctrl('r');
    assert_eq!(h.app.state, AppState::Register);

    h.type_text("Arya");
    h.press(KeyCode::Tab);
    h.type_text("arya@example.com");
    h.press(KeyCode::Tab);
    h.type_text("needle");
    h.press(KeyCode::Enter);

    h.settle(|app| app.state == AppState::Login).await;

    register.assert_async().await;
    assert!(!h.app.auth.is_authenticated());
    assert_eq!(h.app.login.email.value, "arya@example.com");
    assert_eq!(h.app.login.focus, 1);
    assert_eq!(h.app.login.notice.as_deref(), Some(REGISTER_SUCCESS));
}
