//! Movie detail overlay
//!
//! Full record on the left, comments on the right. Each side shows its
//! own loading or error state.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::catalog::{DetailFetcher, LoadingState};
use crate::models::{display_date, MovieDetail};
use crate::ui::browser::rating_style;
use crate::ui::Theme;

pub const NO_COMMENTS: &str = "No comments yet.";

pub struct DetailView<'a> {
    fetcher: &'a DetailFetcher,
    scroll: u16,
}

impl<'a> DetailView<'a> {
    pub fn new(fetcher: &'a DetailFetcher, scroll: u16) -> Self {
        Self { fetcher, scroll }
    }

    /// Render over `area`, clearing whatever is underneath
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(area);

        self.render_info_panel(frame, chunks[0]);
        self.render_comments_panel(frame, chunks[1]);
    }

    fn render_info_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_focused())
            .title(Span::styled(" MOVIE ", Theme::title()))
            .style(Theme::text());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = match (self.fetcher.detail(), self.fetcher.detail_state()) {
            (Some(movie), _) => info_lines(movie, inner.width),
            (None, LoadingState::Error(msg)) => vec![
                Line::from(""),
                Line::from(Span::styled(msg.clone(), Theme::error())),
                Line::from(Span::styled("r to retry, Esc to go back", Theme::dimmed())),
            ],
            (None, _) => vec![
                Line::from(""),
                Line::from(Span::styled("⟳ Loading movie...", Theme::loading())),
            ],
        };

        let paragraph = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, inner);
    }

    fn render_comments_panel(&self, frame: &mut Frame, area: Rect) {
        let comments = self.fetcher.comments();
        let title = format!(" COMMENTS ({}) ", comments.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border())
            .title(Span::styled(title, Theme::title()))
            .style(Theme::text());

        let status = match self.fetcher.comments_state() {
            LoadingState::Loading(_) => Some(("⟳ Loading comments...", Theme::loading())),
            LoadingState::Error(msg) => Some((msg.as_str(), Theme::error())),
            LoadingState::Idle if comments.is_empty() => Some((NO_COMMENTS, Theme::dimmed())),
            LoadingState::Idle => None,
        };

        if let Some((text, style)) = status {
            let empty = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, style))])
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = comments
            .iter()
            .map(|c| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(c.author.clone(), Theme::accent()),
                        Span::styled(
                            format!("  {}", display_date(c.date.as_deref())),
                            Theme::dimmed(),
                        ),
                    ]),
                    Line::from(Span::styled(c.text.clone(), Theme::text())),
                    Line::from(""),
                ])
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

fn field_line(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Theme::label()),
        Span::styled(value, Theme::text()),
    ])
}

fn join_or_na(values: &[String]) -> String {
    if values.is_empty() {
        "N/A".to_string()
    } else {
        values.join(", ")
    }
}

fn info_lines(movie: &MovieDetail, width: u16) -> Vec<Line<'static>> {
    let year_str = movie.year.map(|y| format!(" ({})", y)).unwrap_or_default();
    let mut lines = vec![Line::from(vec![
        Span::styled("▶ ", Theme::accent()),
        Span::styled(movie.title.clone(), Theme::title()),
        Span::styled(year_str, Theme::year()),
    ])];

    let mut meta = vec![Span::styled(
        movie
            .rating
            .map(|r| format!("★ {:.1}", r))
            .unwrap_or_else(|| "★ N/A".into()),
        rating_style(movie.rating),
    )];
    if let Some(votes) = movie.votes {
        meta.push(Span::styled(format!(" ({} votes)", votes), Theme::dimmed()));
    }
    if let Some(meter) = movie.tomato_meter {
        meta.push(Span::styled(" │ ", Theme::dimmed()));
        meta.push(Span::styled(format!("🍅 {}%", meter), Theme::secondary()));
    }
    meta.push(Span::styled(" │ ", Theme::dimmed()));
    meta.push(Span::styled(movie.runtime_display(), Theme::secondary()));
    if let Some(rated) = &movie.rated {
        meta.push(Span::styled(" │ ", Theme::dimmed()));
        meta.push(Span::styled(rated.clone(), Theme::warning()));
    }
    lines.push(Line::from(meta));
    lines.push(Line::from(""));

    lines.push(field_line("Released", movie.released_display()));
    lines.push(field_line("Genres", join_or_na(&movie.genres)));
    lines.push(field_line("Directed", join_or_na(&movie.directors)));
    lines.push(field_line("Cast", join_or_na(&movie.cast)));
    lines.push(field_line("Language", join_or_na(&movie.languages)));
    lines.push(field_line("Country", join_or_na(&movie.countries)));
    if let Some(awards) = &movie.awards {
        lines.push(field_line("Awards", awards.clone()));
    }

    lines.push(Line::from(Span::styled(
        "─".repeat(width as usize),
        Theme::dimmed(),
    )));

    let plot = movie
        .full_plot
        .as_deref()
        .or(movie.plot.as_deref())
        .unwrap_or("No plot available.");
    lines.push(Line::from(Span::styled("PLOT", Theme::accent())));
    for line in plot.lines() {
        lines.push(Line::from(Span::styled(line.to_string(), Theme::text())));
    }

    lines
}
