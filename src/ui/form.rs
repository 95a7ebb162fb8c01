//! Login, registration and edit forms

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::app::{AuthForm, TextInput};
use crate::catalog::{EditField, EditSubmitter};
use crate::ui::Theme;

/// Centered rectangle of at most `width` x `height` inside `area`
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// One labelled input line, with a cursor when focused
fn input_line(
    label: &str,
    value: &str,
    cursor: Option<(&str, &str)>,
    masked: bool,
) -> Line<'static> {
    let mask = |s: &str| {
        if masked {
            "•".repeat(s.chars().count())
        } else {
            s.to_string()
        }
    };

    let mut spans = vec![Span::styled(format!("{:<14}", label), Theme::label())];
    match cursor {
        Some((before, after)) => {
            spans.push(Span::styled(mask(before), Theme::input().fg(Theme::PRIMARY)));
            spans.push(Span::styled("│", Theme::input_cursor()));
            spans.push(Span::styled(mask(after), Theme::input().fg(Theme::PRIMARY)));
        }
        None => spans.push(Span::styled(mask(value), Theme::input())),
    }
    Line::from(spans)
}

fn text_input_line(label: &str, input: &TextInput, focused: bool, masked: bool) -> Line<'static> {
    let cursor = focused.then(|| input.split());
    input_line(label, &input.value, cursor, masked)
}

fn message_lines(
    error: Option<&str>,
    notice: Option<&str>,
    busy: Option<&str>,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from("")];
    if let Some(msg) = busy {
        lines.push(Line::from(Span::styled(format!("⟳ {}", msg), Theme::loading())));
    } else if let Some(err) = error {
        lines.push(Line::from(Span::styled(format!("✗ {}", err), Theme::error())));
    } else if let Some(msg) = notice {
        lines.push(Line::from(Span::styled(format!("✓ {}", msg), Theme::success())));
    }
    lines
}

fn form_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Theme::border_focused())
        .title(Span::styled(format!(" {} ", title), Theme::title()))
        .style(Theme::text())
}

/// Email/password login screen
pub fn render_login(frame: &mut Frame, area: Rect, form: &AuthForm) {
    let popup = centered(area, 64, 11);

    let mut lines = vec![
        Line::from(Span::styled("Sign in to browse the catalog", Theme::dimmed())),
        Line::from(""),
        text_input_line("Email", &form.email, form.focus == 0, false),
        text_input_line("Password", &form.password, form.focus == 1, true),
    ];
    lines.extend(message_lines(
        form.error.as_deref(),
        form.notice.as_deref(),
        form.submitting.then_some("Logging in..."),
    ));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(form_block("LOGIN")),
        popup,
    );
}

/// Account creation screen
pub fn render_register(frame: &mut Frame, area: Rect, form: &AuthForm) {
    let popup = centered(area, 64, 12);

    let mut lines = vec![
        Line::from(Span::styled("Create an account", Theme::dimmed())),
        Line::from(""),
        text_input_line("Name", &form.name, form.focus == 0, false),
        text_input_line("Email", &form.email, form.focus == 1, false),
        text_input_line("Password", &form.password, form.focus == 2, true),
    ];
    lines.extend(message_lines(
        form.error.as_deref(),
        form.notice.as_deref(),
        form.submitting.then_some("Creating account..."),
    ));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(form_block("REGISTER")),
        popup,
    );
}

/// Edit overlay; the cursor always sits at the end of the focused field
pub fn render_edit(frame: &mut Frame, area: Rect, editor: &EditSubmitter, focus: EditField) {
    let popup = centered(area, 72, 13);

    let mut lines = vec![Line::from("")];
    for field in EditField::ALL {
        let value = editor.form.field(field);
        let cursor = (field == focus).then_some((value, ""));
        lines.push(input_line(field.label(), value, cursor, false));
    }
    lines.extend(message_lines(
        editor.error(),
        None,
        editor.is_saving().then_some("Saving..."),
    ));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(form_block("EDIT MOVIE")),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered(area, 60, 10);
        assert_eq!(popup, Rect::new(20, 15, 60, 10));

        let small = Rect::new(0, 0, 30, 5);
        assert_eq!(centered(small, 60, 10), small);
    }

    #[test]
    fn test_password_is_masked() {
        let line = input_line("Password", "hunter2", None, true);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(!text.contains("hunter2"));
        assert!(text.contains("•••••••"));
    }
}
