//! App state and core application logic
//!
//! Manages the screen state machine, navigation stack and keyboard input,
//! and coordinates the catalog controllers. The app never performs I/O:
//! requests are queued as [`Task`]s for the event loop to hand to the
//! worker, and completions come back through [`App::apply_event`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::api::ApiError;
use crate::auth::{self, Auth, REGISTER_SUCCESS};
use crate::catalog::{
    CatalogEvent, CatalogWorker, DetailEffect, DetailFetcher, DetailRequest, EditEffect,
    EditField, EditOutcome, EditRequest, EditSubmitter, ListEffect, ListQueryController,
    ListRequest,
};
use crate::models::{MovieSummary, SortField};

pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";

// =============================================================================
// App State Enum
// =============================================================================

/// Application state enum representing current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Email/password login
    #[default]
    Login,
    /// Account creation
    Register,
    /// Paginated movie list
    Movies,
    /// One movie with its comments
    Detail,
    /// Edit form over the detail view
    Edit,
}

// =============================================================================
// Input Mode
// =============================================================================

/// Current input mode for keyboard handling
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Text input mode (search box focused)
    Editing,
}

// =============================================================================
// Tasks
// =============================================================================

/// Work the event loop must hand to the catalog worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    FetchList(ListRequest),
    FetchDetail(DetailRequest),
    SubmitEdit(EditRequest),
    Login { email: String, password: String },
    Register { name: String, email: String, password: String },
    CancelDetail,
    CancelAll,
}

impl Task {
    /// Hand the task to the worker
    pub fn run(self, worker: &mut CatalogWorker) {
        match self {
            Task::FetchList(req) => worker.fetch_list(req),
            Task::FetchDetail(req) => worker.fetch_detail(req),
            Task::SubmitEdit(req) => worker.submit_edit(req),
            Task::Login { email, password } => worker.login(email, password),
            Task::Register {
                name,
                email,
                password,
            } => worker.register(name, email, password),
            Task::CancelDetail => worker.cancel_detail(),
            Task::CancelAll => worker.cancel_all(),
        }
    }
}

// =============================================================================
// Selection State
// =============================================================================

/// Selection state for list views
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Currently selected index
    pub selected: usize,
    /// Total number of items
    pub len: usize,
}

impl ListState {
    pub fn new(len: usize) -> Self {
        Self { selected: 0, len }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.len > 0 && self.selected < self.len - 1 {
            self.selected += 1;
        }
    }

    pub fn reset(&mut self) {
        self.selected = 0;
    }

    /// Update length (e.g., when a new page comes in)
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

// =============================================================================
// Text Input
// =============================================================================

/// Single-line text input with a cursor (in chars)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    /// Insert character at cursor
    pub fn insert(&mut self, c: char) {
        let i = self.byte_index();
        self.value.insert(i, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let i = self.byte_index();
            self.value.remove(i);
        }
    }

    /// Delete character at cursor
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let i = self.byte_index();
            self.value.remove(i);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.char_len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Text before and after the cursor
    pub fn split(&self) -> (&str, &str) {
        self.value.split_at(self.byte_index())
    }

    /// Apply an editing key. Returns true when the value changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert(c);
                true
            }
            KeyCode::Backspace => {
                let before = self.value.len();
                self.backspace();
                before != self.value.len()
            }
            KeyCode::Delete => {
                let before = self.value.len();
                self.delete();
                before != self.value.len()
            }
            KeyCode::Left => {
                self.cursor_left();
                false
            }
            KeyCode::Right => {
                self.cursor_right();
                false
            }
            KeyCode::Home => {
                self.cursor_home();
                false
            }
            KeyCode::End => {
                self.cursor_end();
                false
            }
            _ => false,
        }
    }
}

// =============================================================================
// Auth Forms
// =============================================================================

/// Login or registration form
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    pub name: TextInput,
    pub email: TextInput,
    pub password: TextInput,
    /// Focused field index
    pub focus: usize,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub submitting: bool,
}

impl AuthForm {
    /// Inputs in focus order
    fn inputs_mut(&mut self, with_name: bool) -> Vec<&mut TextInput> {
        if with_name {
            vec![&mut self.name, &mut self.email, &mut self.password]
        } else {
            vec![&mut self.email, &mut self.password]
        }
    }

    fn focused_mut(&mut self, with_name: bool) -> Option<&mut TextInput> {
        let focus = self.focus;
        self.inputs_mut(with_name).into_iter().nth(focus)
    }

    fn next_field(&mut self, count: usize) {
        self.focus = (self.focus + 1) % count;
    }

    fn prev_field(&mut self, count: usize) {
        self.focus = (self.focus + count - 1) % count;
    }
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Current state/screen
    pub state: AppState,
    /// Navigation history stack
    pub nav_stack: Vec<AppState>,
    /// Whether the app is running
    pub running: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Global error message (popup)
    pub error: Option<String>,
    /// Transient success message for the status bar
    pub notice: Option<String>,

    pub auth: Auth,
    pub login: AuthForm,
    pub register: AuthForm,

    pub list: ListQueryController,
    pub selection: ListState,
    pub search: TextInput,

    pub detail: DetailFetcher,
    /// Scroll offset of the detail view
    pub detail_scroll: u16,

    pub editor: Option<EditSubmitter>,
    pub edit_field: EditField,

    tasks: Vec<Task>,
}

impl App {
    /// App for the restored session. Call [`App::start`] before the first frame.
    pub fn new(auth: Auth, default_sort: SortField) -> Self {
        let token = auth.token().map(String::from);
        Self {
            state: AppState::Login,
            nav_stack: Vec::new(),
            running: true,
            input_mode: InputMode::Normal,
            error: None,
            notice: None,

            auth,
            login: AuthForm::default(),
            register: AuthForm::default(),

            list: ListQueryController::with_sort(token, default_sort),
            selection: ListState::default(),
            search: TextInput::default(),

            detail: DetailFetcher::new(),
            detail_scroll: 0,

            editor: None,
            edit_field: EditField::default(),

            tasks: Vec::new(),
        }
    }

    /// Mount the movie list (or land on the login screen)
    pub fn start(&mut self) {
        self.state = AppState::Movies;
        let effect = self.list.mount();
        self.handle_list_effect(effect);
    }

    /// Drain queued work for the worker
    pub fn take_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }

    /// Navigate to a new state, pushing current to stack
    pub fn navigate(&mut self, state: AppState) {
        if self.state != state {
            self.nav_stack.push(self.state);
            self.state = state;
        }
        self.input_mode = InputMode::Normal;
    }

    /// Go back to previous state
    pub fn back(&mut self) -> bool {
        if self.input_mode == InputMode::Editing {
            self.input_mode = InputMode::Normal;
            return true;
        }

        match self.state {
            AppState::Detail => {
                self.detail.close();
                self.tasks.push(Task::CancelDetail);
            }
            AppState::Edit => {
                self.editor = None;
            }
            _ => {}
        }

        if let Some(prev) = self.nav_stack.pop() {
            self.state = prev;
            true
        } else {
            false
        }
    }

    /// Quit the application; everything in flight is abandoned
    pub fn quit(&mut self) {
        self.running = false;
        self.list.unmount();
        self.detail.close();
        self.tasks.push(Task::CancelAll);
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }

    /// Movie under the cursor
    pub fn selected_movie(&self) -> Option<&MovieSummary> {
        self.list.items().get(self.selection.selected)
    }

    // -------------------------------------------------------------------------
    // Effects
    // -------------------------------------------------------------------------

    fn handle_list_effect(&mut self, effect: ListEffect) {
        match effect {
            ListEffect::Fetch(req) => {
                self.selection.reset();
                self.tasks.push(Task::FetchList(req));
            }
            ListEffect::AuthRequired => self.show_login(),
            ListEffect::None => {}
        }
    }

    fn show_login(&mut self) {
        if self.editor.take().is_some() || self.detail.is_open() {
            self.detail.close();
            self.tasks.push(Task::CancelDetail);
        }
        self.nav_stack.clear();
        self.state = AppState::Login;
        self.input_mode = InputMode::Normal;
        self.login.submitting = false;
    }

    fn session_expired(&mut self) {
        self.auth.logout();
        self.login.error = Some(SESSION_EXPIRED.to_string());
        let effect = self.list.set_session(None);
        self.handle_list_effect(effect);
        self.show_login();
    }

    fn open_selected(&mut self) {
        let Some(id) = self.selected_movie().map(|m| m.id.clone()) else {
            return;
        };
        match self.detail.open(id, self.auth.token()) {
            DetailEffect::Fetch(req) => {
                self.detail_scroll = 0;
                self.tasks.push(Task::FetchDetail(req));
                self.navigate(AppState::Detail);
            }
            DetailEffect::AuthRequired => self.show_login(),
            DetailEffect::None => {}
        }
    }

    fn reopen_detail(&mut self) {
        let Some(id) = self.detail.movie_id().map(String::from) else {
            return;
        };
        if let DetailEffect::Fetch(req) = self.detail.open(id, self.auth.token()) {
            self.tasks.push(Task::FetchDetail(req));
        }
    }

    fn open_editor(&mut self) {
        let Some(detail) = self.detail.detail() else {
            return;
        };
        self.editor = Some(EditSubmitter::for_detail(detail));
        self.edit_field = EditField::default();
        self.navigate(AppState::Edit);
    }

    fn submit_edit(&mut self) {
        let token = self.auth.token().map(String::from);
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        match editor.submit(token.as_deref()) {
            EditEffect::Submit(req) => self.tasks.push(Task::SubmitEdit(req)),
            EditEffect::AuthRequired => self.show_login(),
            EditEffect::Invalid(_) | EditEffect::None => {}
        }
    }

    fn logout(&mut self) {
        self.auth.logout();
        self.search.clear();
        let effect = self.list.set_session(None);
        self.handle_list_effect(effect);
        // No token any more, so this only resets the query
        let effect = self.list.clear_search();
        self.handle_list_effect(effect);
        self.show_login();
    }

    fn submit_login(&mut self) {
        let email = self.login.email.value.trim().to_string();
        let password = self.login.password.value.clone();
        self.login.notice = None;
        if let Err(e) = auth::validate_login(&email, &password) {
            self.login.error = Some(e.to_string());
            return;
        }
        self.login.error = None;
        self.login.submitting = true;
        self.tasks.push(Task::Login { email, password });
    }

    fn submit_register(&mut self) {
        let name = self.register.name.value.trim().to_string();
        let email = self.register.email.value.trim().to_string();
        let password = self.register.password.value.clone();
        if let Err(e) = auth::validate_registration(&name, &email, &password) {
            self.register.error = Some(e.to_string());
            return;
        }
        self.register.error = None;
        self.register.submitting = true;
        self.tasks.push(Task::Register {
            name,
            email,
            password,
        });
    }

    // -------------------------------------------------------------------------
    // Worker Events
    // -------------------------------------------------------------------------

    /// Fold a background completion into the state
    pub fn apply_event(&mut self, event: CatalogEvent) {
        match event {
            CatalogEvent::List { seq, result } => {
                if self.list.resolve(seq, result) {
                    self.selection.set_len(self.list.items().len());
                    if self.list.needs_auth() {
                        self.session_expired();
                    } else if let Some(msg) = self.list.error() {
                        let msg = msg.to_string();
                        self.set_error(msg);
                    }
                }
            }
            CatalogEvent::Detail { seq, result } => {
                let expired = matches!(&result, Err(e) if e.is_unauthorized());
                if self.detail.resolve_detail(seq, result) && expired {
                    self.session_expired();
                }
            }
            CatalogEvent::Comments { seq, result } => {
                let expired = matches!(&result, Err(e) if e.is_unauthorized());
                if self.detail.resolve_comments(seq, result) && expired {
                    self.session_expired();
                }
            }
            CatalogEvent::Edit { movie_id, result } => self.apply_edit_result(movie_id, result),
            CatalogEvent::Login { result } => {
                self.login.submitting = false;
                match result {
                    Ok(session) => {
                        let token = session.token.clone();
                        self.auth.establish(session);
                        self.login = AuthForm::default();
                        self.state = AppState::Movies;
                        self.nav_stack.clear();
                        let effect = self.list.set_session(Some(token));
                        self.handle_list_effect(effect);
                    }
                    Err(e) => {
                        self.login.error = Some(auth::login_failure(e).to_string());
                    }
                }
            }
            CatalogEvent::Register { result } => {
                self.register.submitting = false;
                match result {
                    Ok(()) => {
                        let email = self.register.email.value.trim().to_string();
                        self.register = AuthForm::default();
                        self.login = AuthForm {
                            email: TextInput::with_value(email),
                            focus: 1,
                            notice: Some(REGISTER_SUCCESS.to_string()),
                            ..AuthForm::default()
                        };
                        self.show_login();
                    }
                    Err(e) => {
                        self.register.error = Some(auth::register_failure(e).to_string());
                    }
                }
            }
        }
    }

    fn apply_edit_result(
        &mut self,
        movie_id: String,
        result: Result<Option<crate::models::MovieDetail>, ApiError>,
    ) {
        let Some(editor) = self.editor.as_mut().filter(|e| e.movie_id() == movie_id) else {
            tracing::debug!(movie_id = %movie_id, "edit result for a closed form");
            return;
        };
        let expired = matches!(&result, Err(e) if e.is_unauthorized());

        match editor.resolve(result) {
            EditOutcome::Saved(updated) => {
                self.notice = editor.success().map(String::from);
                self.editor = None;
                if self.state == AppState::Edit {
                    self.back();
                }
                match updated {
                    Some(detail) => self.detail.replace_detail(detail),
                    None => self.reopen_detail(),
                }
                let effect = self.list.refresh();
                self.handle_list_effect(effect);
            }
            EditOutcome::Failed(_) if expired => self.session_expired(),
            EditOutcome::Failed(_) => {}
        }
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event, returns true if event was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Popups and notices go away on any keypress
        self.error = None;
        self.notice = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return true;
        }

        match self.state {
            AppState::Login => self.handle_login_key(key),
            AppState::Register => self.handle_register_key(key),
            AppState::Edit => self.handle_edit_key(key),
            AppState::Movies if self.input_mode == InputMode::Editing => {
                self.handle_search_key(key)
            }
            AppState::Movies => self.handle_movies_key(key),
            AppState::Detail => self.handle_detail_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> bool {
        if self.login.submitting {
            return false;
        }
        match key.code {
            KeyCode::Esc => {
                self.quit();
                true
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.register = AuthForm::default();
                self.navigate(AppState::Register);
                true
            }
            KeyCode::Tab | KeyCode::Down => {
                self.login.next_field(2);
                true
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.login.prev_field(2);
                true
            }
            KeyCode::Enter => {
                if self.login.focus == 0 {
                    self.login.next_field(2);
                } else {
                    self.submit_login();
                }
                true
            }
            _ => self
                .login
                .focused_mut(false)
                .map(|input| input.handle_key(key))
                .unwrap_or(false),
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) -> bool {
        if self.register.submitting {
            return false;
        }
        match key.code {
            KeyCode::Esc => self.back(),
            KeyCode::Tab | KeyCode::Down => {
                self.register.next_field(3);
                true
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.register.prev_field(3);
                true
            }
            KeyCode::Enter => {
                if self.register.focus < 2 {
                    self.register.next_field(3);
                } else {
                    self.submit_register();
                }
                true
            }
            _ => self
                .register
                .focused_mut(true)
                .map(|input| input.handle_key(key))
                .unwrap_or(false),
        }
    }

    /// Search box focused: every change refetches
    fn handle_search_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                true
            }
            _ => {
                if self.search.handle_key(key) {
                    let effect = self.list.set_search_text(self.search.value.clone());
                    self.handle_list_effect(effect);
                }
                true
            }
        }
    }

    fn handle_movies_key(&mut self, key: KeyEvent) -> bool {
        let effect = match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return true;
            }
            KeyCode::Esc => return self.back(),
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Editing;
                self.search.cursor_end();
                return true;
            }
            KeyCode::Char('L') => {
                self.logout();
                return true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selection.up();
                return true;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selection.down();
                return true;
            }
            KeyCode::Enter => {
                self.open_selected();
                return true;
            }
            KeyCode::Char('x') => {
                self.search.clear();
                self.list.clear_search()
            }
            KeyCode::Char('s') => {
                let next = self.list.query().sort_field.next();
                self.list.set_sort_field(next)
            }
            KeyCode::Char('o') => self.list.toggle_sort_direction(),
            KeyCode::Left | KeyCode::Char('h') => self.list.prev_page(),
            KeyCode::Right | KeyCode::Char('l') => self.list.next_page(),
            KeyCode::Char('g') => self.list.first_page(),
            KeyCode::Char('G') => self.list.last_page(),
            KeyCode::Char('r') => self.list.retry(),
            _ => return false,
        };
        self.handle_list_effect(effect);
        true
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                true
            }
            KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
                true
            }
            KeyCode::Char('e') => {
                self.open_editor();
                true
            }
            KeyCode::Char('r') => {
                self.reopen_detail();
                true
            }
            _ => false,
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return self.back();
        };
        if editor.is_saving() {
            return false;
        }

        match key.code {
            KeyCode::Esc => self.back(),
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.submit_edit();
                true
            }
            KeyCode::Enter => {
                self.submit_edit();
                true
            }
            KeyCode::Tab | KeyCode::Down => {
                self.edit_field = self.edit_field.next();
                true
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.edit_field = self.edit_field.prev();
                true
            }
            KeyCode::Backspace => {
                editor.form.field_mut(self.edit_field).pop();
                true
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                editor.form.field_mut(self.edit_field).push(c);
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
