//! Browse view: the filterable catalog list.

use crate::app::App;
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
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_filters(f, app, chunks[0]);
    render_list(f, app, chunks[1]);
}

fn render_filters(f: &mut Frame, app: &App, area: Rect) {
    let active = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let search = if app.search_mode {
        Span::styled(format!("/{}_", app.filter.search_term), active)
    } else if app.filter.search_term.is_empty() {
        Span::styled("[/] search", dim)
    } else {
        Span::raw(format!("\"{}\"", app.filter.search_term))
    };

    let mut spans = vec![search, Span::raw("  ")];
    let genres = app.genres();
    if let Some(genre) = genres.get(app.genre_cursor) {
        let style = if app.filter.genres.contains(genre) {
            active
        } else {
            Style::default()
        };
        spans.push(Span::styled("[ ", dim));
        spans.push(Span::styled(genre.clone(), style));
        spans.push(Span::styled(" ] [g] toggle  ", dim));
    }
    if !app.filter.genres.is_empty() {
        spans.push(Span::raw(format!("genres: {}  ", app.filter.genres.join("+"))));
    }
    if app.filter.min_rating > 0.0 {
        spans.push(Span::raw(format!("★ ≥ {:.1}", app.filter.min_rating)));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Filters"));
    f.render_widget(paragraph, area);
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    let visible = app.visible_movies();
    let title_width = usize::from(area.width.saturating_sub(30));

    let items: Vec<ListItem> = if visible.is_empty() {
        vec![ListItem::new("No movies match")]
    } else {
        visible
            .iter()
            .map(|movie| {
                let title = sanitize_line(&movie.title);
                let mut spans = vec![
                    Span::styled(
                        format!("★ {:>4.1} ", movie.rating),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::raw(truncate_to_width(&title, title_width).into_owned()),
                    Span::styled(
                        format!(
                            "  {} · {}",
                            movie
                                .release_year()
                                .map_or_else(String::new, |y| y.to_string()),
                            movie.duration_label()
                        ),
                        Style::default().fg(Color::DarkGray),
                    ),
                ];
                if let Some(rating) = app.preferences.log().latest_rating(movie.id) {
                    spans.push(Span::styled(
                        format!("  {}", rating.badge()),
                        Style::default().fg(rating_color(rating)),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let more = if app.catalog.is_loading_more() {
        " loading..."
    } else if app.catalog.has_more() {
        " [m] more"
    } else {
        ""
    };
    let title = format!(
        "Movies ({}/{}) page {}/{}{}",
        visible.len(),
        app.movies.len(),
        app.catalog.current_page(),
        app.catalog.max_pages(),
        more
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.browse_selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
