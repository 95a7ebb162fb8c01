//! Terminal UI components
//!
//! Built with ratatui. Keyboard-first navigation throughout; rendering is a
//! pure function of [`App`] so it can be drawn onto a `TestBackend`.

pub mod browser;
pub mod detail;
pub mod form;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, InputMode};
use browser::BrowserView;
use detail::DetailView;

/// Main render function - dispatches to view-specific renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Clear with background color
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(Theme::BACKGROUND)), area);

    // Main layout: header, content, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    render_content(frame, chunks[1], app);
    render_status_bar(frame, chunks[2], app);

    if let Some(ref error) = app.error {
        render_error_popup(frame, area, error);
    }
}

/// Logo, search box and signed-in user
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(13), // Logo
            Constraint::Min(1),     // Search box
            Constraint::Length(28), // User
        ])
        .split(area);

    let border = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border());

    let logo = Paragraph::new(Line::from(vec![
        Span::styled("M", Theme::accent()),
        Span::styled("FLIX", Theme::title()),
    ]))
    .alignment(Alignment::Center)
    .block(border.clone());
    frame.render_widget(logo, header_chunks[0]);

    let editing = app.input_mode == InputMode::Editing && app.state == AppState::Movies;
    let search_text = if editing {
        let (before, after) = app.search.split();
        format!("⌕ {}│{}", before, after)
    } else if app.search.value.is_empty() {
        "⌕ Type / to search...".to_string()
    } else {
        format!("⌕ {}", app.search.value)
    };

    let search_box = Paragraph::new(search_text)
        .style(if editing {
            Theme::input().fg(Theme::PRIMARY)
        } else {
            Theme::input()
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(if editing {
                    Theme::border_focused()
                } else {
                    Theme::border()
                })
                .title(Span::styled(" SEARCH ", Theme::title())),
        );
    frame.render_widget(search_box, header_chunks[1]);

    let user = match app.auth.user() {
        Some(user) => Span::styled(format!("● {}", user.name), Theme::success()),
        None => Span::styled("○ signed out", Theme::dimmed()),
    };
    frame.render_widget(
        Paragraph::new(Line::from(user))
            .alignment(Alignment::Center)
            .block(border),
        header_chunks[2],
    );
}

/// Render the main content area based on current state
fn render_content(frame: &mut Frame, area: Rect, app: &App) {
    match app.state {
        AppState::Login => form::render_login(frame, area, &app.login),
        AppState::Register => form::render_register(frame, area, &app.register),
        AppState::Movies => BrowserView::new(&app.list, &app.selection).render(frame, area),
        AppState::Detail => {
            BrowserView::new(&app.list, &app.selection).render(frame, area);
            DetailView::new(&app.detail, app.detail_scroll).render(frame, overlay_area(area));
        }
        AppState::Edit => {
            DetailView::new(&app.detail, app.detail_scroll).render(frame, overlay_area(area));
            if let Some(editor) = &app.editor {
                form::render_edit(frame, area, editor, app.edit_field);
            }
        }
    }
}

/// Inset used for overlays on top of the list
fn overlay_area(area: Rect) -> Rect {
    Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(2),
    }
}

fn help_text(app: &App) -> &'static str {
    match (app.state, &app.input_mode) {
        (AppState::Movies, InputMode::Editing) => " type to search  Enter/Esc:done ",
        (AppState::Movies, _) => {
            concat!(
                " /:search x:clear s:sort o:order ←→:page g/G:first/last",
                " ↵:open r:retry L:logout q:quit "
            )
        }
        (AppState::Detail, _) => " ↑↓:scroll e:edit r:reload Esc:back q:quit ",
        (AppState::Edit, _) => " Tab:next field ↵:save Esc:cancel ",
        (AppState::Login, _) => " Tab:next ↵:login Ctrl+R:register Esc:quit ",
        (AppState::Register, _) => " Tab:next ↵:register Esc:back ",
    }
}

/// Render status bar at bottom
fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let mode_indicator = match app.input_mode {
        InputMode::Normal => Span::styled(
            " NORMAL ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::PRIMARY),
        ),
        InputMode::Editing => Span::styled(
            " INSERT ",
            Style::default().fg(Theme::BACKGROUND).bg(Theme::ACCENT),
        ),
    };

    let state_indicator = Span::styled(
        format!(" {} ", format!("{:?}", app.state).to_uppercase()),
        Style::default().fg(Theme::DIM),
    );

    let mut spans = vec![mode_indicator, state_indicator];
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(format!("✓ {} ", notice), Theme::success()));
    }
    spans.push(Span::raw("│"));
    spans.push(Span::styled(help_text(app), Theme::keybind_desc()));

    let status = Paragraph::new(Line::from(spans)).style(Theme::status_bar());
    frame.render_widget(status, area);
}

/// Render error popup overlay
fn render_error_popup(frame: &mut Frame, area: Rect, error: &str) {
    let popup_area = form::centered(area, 60.min(area.width.saturating_sub(4)), 5);

    frame.render_widget(Clear, popup_area);

    let error_block = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(error, Theme::error())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Theme::error())
            .title(Span::styled(" ✗ ERROR ", Theme::error()))
            .style(Style::default().bg(Theme::BACKGROUND)),
    );

    frame.render_widget(error_block, popup_area);
}
