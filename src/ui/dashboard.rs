//! Dashboard view: rated movies with counts and filters.

use crate::app::App;
use crate::dashboard::{available_genres, rating_counts};
use crate::gesture::Rating;
use crate::util::{sanitize_line, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::swipe::rating_color;

pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let entries = app.dashboard_entries();
    let visible = app.dashboard_filter.apply(&entries);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    // Summary: one count per rating, highlighted when it is an active filter
    let mut counts = Vec::new();
    for (i, (rating, count)) in rating_counts(&entries).into_iter().enumerate() {
        let mut style = Style::default().fg(rating_color(rating));
        if app.dashboard_filter.statuses.contains(&rating) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        counts.push(Span::styled(
            format!("[{}] {} {}", i + 1, rating.badge(), count),
            style,
        ));
        counts.push(Span::raw("  "));
    }

    let dim = Style::default().fg(Color::DarkGray);
    let search = if app.search_mode {
        Span::styled(
            format!("/{}_", app.dashboard_filter.search),
            Style::default().fg(Color::Cyan),
        )
    } else if app.dashboard_filter.search.is_empty() {
        Span::styled("[/] search title, director, cast", dim)
    } else {
        Span::raw(format!("\"{}\"", app.dashboard_filter.search))
    };
    let mut filter_line = vec![search];
    if app.dashboard_filter.min_rating > 0.0 {
        filter_line.push(Span::raw(format!(
            "  ★ ≥ {:.1}",
            app.dashboard_filter.min_rating
        )));
    }
    let genres = available_genres(&entries);
    if !genres.is_empty() {
        filter_line.push(Span::styled(format!("  {} genres", genres.len()), dim));
    }

    let header = Paragraph::new(vec![Line::from(counts), Line::from(filter_line)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("My Movies ({})", app.preferences.log().len())),
    );
    f.render_widget(header, chunks[0]);

    let title_width = usize::from(chunks[1].width.saturating_sub(32));
    let items: Vec<ListItem> = if visible.is_empty() {
        let text = if entries.is_empty() {
            "Nothing rated yet. Swipe some cards first."
        } else {
            "No rated movies match the filters"
        };
        vec![ListItem::new(text)]
    } else {
        visible
            .iter()
            .map(|entry| {
                let rating: Rating = entry.preference.rating;
                let title = sanitize_line(entry.title());
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<14}", entry.badge()),
                        Style::default().fg(rating_color(rating)),
                    ),
                    Span::raw(truncate_to_width(&title, title_width).into_owned()),
                    Span::styled(
                        format!(
                            "  ★ {:.1}  {}",
                            entry.vote_average(),
                            entry.preference.timestamp.format("%Y-%m-%d")
                        ),
                        dim,
                    ),
                ]))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("[x] remove  [c] clear filters"),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.dashboard_selected));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);
}
