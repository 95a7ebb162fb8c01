//! Movie list view
//!
//! One page of the catalog in a selectable list, with the query summary
//! and pagination above it. The previous page stays on screen while the
//! next one loads.

use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};

use crate::app::ListState;
use crate::catalog::{ListQueryController, ListStatus};
use crate::models::MovieSummary;
use crate::ui::Theme;

pub const EMPTY_MESSAGE: &str = "No movies found.";

/// Borrowed view over the list controller
pub struct BrowserView<'a> {
    list: &'a ListQueryController,
    selection: &'a ListState,
}

impl<'a> BrowserView<'a> {
    pub fn new(list: &'a ListQueryController, selection: &'a ListState) -> Self {
        Self { list, selection }
    }

    /// Render the browser view
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        frame.render_widget(Paragraph::new(self.summary_line()), chunks[0]);

        if self.list.items().is_empty() {
            self.render_empty(frame, chunks[1]);
        } else {
            self.render_list(frame, chunks[1]);
        }
    }

    /// "Sort: Year ↓  │  Page 2 of 7  │  ⟳ Loading..."
    fn summary_line(&self) -> Line<'static> {
        let query = self.list.query();
        let mut spans = vec![
            Span::styled(" Sort: ", Theme::dimmed()),
            Span::styled(
                format!(
                    "{} {}",
                    query.sort_field.label(),
                    query.sort_direction.arrow()
                ),
                Theme::accent(),
            ),
            Span::styled("  │  ", Theme::dimmed()),
            Span::styled(
                format!("Page {} of {}", self.list.page(), self.list.total_pages()),
                Theme::title(),
            ),
        ];

        if !query.search.is_empty() {
            spans.push(Span::styled("  │  ", Theme::dimmed()));
            spans.push(Span::styled(
                format!("\"{}\"", query.search),
                Theme::secondary(),
            ));
        }

        match self.list.status() {
            ListStatus::Loading => {
                spans.push(Span::styled("  │  ", Theme::dimmed()));
                spans.push(Span::styled("⟳ Loading...", Theme::loading()));
            }
            ListStatus::Failed(msg) => {
                spans.push(Span::styled("  │  ", Theme::dimmed()));
                spans.push(Span::styled(format!("✗ {} (r to retry)", msg), Theme::error()));
            }
            _ => {}
        }

        Line::from(spans)
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;
        let offset = self
            .selection
            .selected
            .saturating_sub(visible_height.saturating_sub(1));
        let first_number = self.list.query().offset();

        let items: Vec<ListItem> = self
            .list
            .items()
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible_height)
            .map(|(i, movie)| self.render_item(i, first_number.saturating_add(i + 1), movie))
            .collect();

        let title = format!(
            " MOVIES ({}/{}) ",
            self.selection.selected + 1,
            self.list.items().len()
        );

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border_focused())
                    .border_type(BorderType::Rounded)
                    .title(Span::styled(title, Theme::title()))
                    .title_alignment(Alignment::Left),
            )
            .style(Theme::text());

        frame.render_widget(list, area);
    }

    /// ▸ 11. Title (Year)        ★ 8.5  (1,234 votes)  1994-09-23
    fn render_item(&self, index: usize, number: usize, movie: &MovieSummary) -> ListItem<'static> {
        let is_selected = index == self.selection.selected;
        let marker = if is_selected { "▸ " } else { "  " };

        let year_str = movie.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        let rating_str = movie
            .rating
            .map(|r| format!("★ {:.1}", r))
            .unwrap_or_else(|| "★ N/A".into());
        let votes_str = movie
            .votes
            .map(|v| format!("  ({} votes)", v))
            .unwrap_or_default();

        let line = Line::from(vec![
            Span::styled(
                marker.to_string(),
                if is_selected { Theme::accent() } else { Theme::dimmed() },
            ),
            Span::styled(format!("{:>3}. ", number), Theme::dimmed()),
            Span::styled(
                movie.title.clone(),
                if is_selected {
                    Theme::list_item_selected()
                } else {
                    Theme::list_item()
                },
            ),
            Span::styled(year_str, Theme::year()),
            Span::raw("  "),
            Span::styled(rating_str, rating_style(movie.rating)),
            Span::styled(votes_str, Theme::dimmed()),
            Span::raw("  "),
            Span::styled(movie.released_display(), Theme::dimmed()),
        ]);

        ListItem::new(line)
    }

    fn render_empty(&self, frame: &mut Frame, area: Rect) {
        let (text, style) = match self.list.status() {
            ListStatus::Loading | ListStatus::Idle => ("Loading movies...", Theme::loading()),
            ListStatus::Failed(msg) => (msg.as_str(), Theme::error()),
            ListStatus::AuthRequired => ("Log in to browse movies.", Theme::warning()),
            ListStatus::Ready => (EMPTY_MESSAGE, Theme::dimmed()),
        };

        let empty = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, style))])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .border_type(BorderType::Rounded)
                    .title(Span::styled(" MOVIES ", Theme::title())),
            );

        frame.render_widget(empty, area);
    }
}

/// Get style for rating based on value
pub fn rating_style(rating: Option<f64>) -> Style {
    match rating {
        Some(r) if r >= 7.5 => Theme::success(),
        Some(r) if r >= 6.0 => Theme::warning(),
        Some(_) => Theme::error(),
        None => Theme::dimmed(),
    }
}
