//! Swipe view: the current card and the gesture legend.

use crate::app::App;
use crate::catalog::{InitState, Movie};
use crate::gesture::{Rating, SwipeDirection};
use crate::util::{sanitize_line, truncate_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use super::render::centered_rect;

fn layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(area);
    (centered_rect(70, 100, chunks[0]), chunks[1])
}

/// Where [`render`] draws the card within the view's area.
pub(super) fn card_area(area: Rect) -> Rect {
    layout(area).0
}

pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let (card_area, legend_area) = layout(area);
    match app.current_movie() {
        Some(movie) => render_card(f, app, movie, card_area),
        None => render_placeholder(f, app, card_area),
    }
    render_legend(f, legend_area);
}

fn direction_color(direction: SwipeDirection) -> Color {
    rating_color(direction.rating())
}

pub(super) fn rating_color(rating: Rating) -> Color {
    match rating {
        Rating::SeenLiked => Color::Green,
        Rating::SeenDisliked => Color::Red,
        Rating::NotSeenLiked => Color::Yellow,
        Rating::NotSeenDisliked => Color::DarkGray,
    }
}

fn render_card(f: &mut Frame, app: &App, movie: &Movie, area: Rect) {
    let card = &app.card;

    // A finished swipe outranks a live drag for the border colour
    let (border_color, hint) = match (card.swipe_direction(), card.drag()) {
        (Some(direction), _) => (direction_color(direction), Some(direction.hint())),
        (None, Some(drag)) if drag.distance > 0.0 => {
            (direction_color(drag.direction), card.drag_hint())
        }
        _ => (Color::Cyan, None),
    };

    let position = format!(" {}/{} ", app.deck_index + 1, app.movies.len());
    let title_width = usize::from(area.width.saturating_sub(position.len() as u16 + 4));
    let title = truncate_to_width(&sanitize_line(&movie.title), title_width).into_owned();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(position).alignment(Alignment::Right));
    if let Some(hint) = hint {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" {hint} "),
                Style::default()
                    .fg(border_color)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
        );
    }

    let lines = if card.is_flipped() {
        back_face(movie)
    } else {
        front_face(app, movie)
    };
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn front_face<'a>(app: &App, movie: &'a Movie) -> Vec<Line<'a>> {
    let dim = Style::default().fg(Color::DarkGray);
    let year = movie
        .release_year()
        .map_or_else(|| "----".to_string(), |y| y.to_string());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("★ {:.1}", movie.rating), Style::default().fg(Color::Yellow)),
            Span::styled(format!("  {year}  {}", movie.duration_label()), dim),
        ]),
        Line::from(Span::styled(movie.genres.join(" · "), dim)),
        Line::from(""),
        Line::from(sanitize_line(&movie.description).into_owned()),
    ];

    if let Some(rating) = app.preferences.log().latest_rating(movie.id) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Already rated: {}", rating.badge()),
            Style::default().fg(rating_color(rating)),
        )));
    }
    lines
}

fn back_face(movie: &Movie) -> Vec<Line<'_>> {
    let label = Style::default().add_modifier(Modifier::BOLD);
    let director = movie.director.as_deref().unwrap_or("Unknown");
    let cast = if movie.cast.is_empty() {
        "Unknown".to_string()
    } else {
        movie.cast.join(", ")
    };
    let released = movie
        .release_date
        .map_or_else(|| "Unknown".to_string(), |d| d.format("%B %-d, %Y").to_string());

    vec![
        Line::from(vec![
            Span::styled("Director  ", label),
            Span::raw(sanitize_line(director).into_owned()),
        ]),
        Line::from(vec![
            Span::styled("Cast      ", label),
            Span::raw(sanitize_line(&cast).into_owned()),
        ]),
        Line::from(vec![
            Span::styled("Runtime   ", label),
            Span::raw(movie.duration_label()),
        ]),
        Line::from(vec![Span::styled("Released  ", label), Span::raw(released)]),
        Line::from(""),
        Line::from(Span::styled(
            "[space] flip back  [t] trailer",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn render_placeholder(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.catalog.init_state() {
        InitState::Uninitialized | InitState::Loading => "Loading movies...",
        InitState::Ready if app.movies.is_empty() => "No movies to show",
        InitState::Ready if app.catalog.is_loading_more() => "Loading more movies...",
        InitState::Ready => "Waiting for the next page, [m] in Browse to load it",
    };
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        );
    f.render_widget(paragraph, area);
}

fn render_legend(f: &mut Frame, area: Rect) {
    let entry = |key: &'static str, direction: SwipeDirection| {
        vec![
            Span::styled(key, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" {}  ", direction.hint()),
                Style::default().fg(direction_color(direction)),
            ),
        ]
    };
    let mut spans = Vec::new();
    spans.extend(entry("←", SwipeDirection::Left));
    spans.extend(entry("→", SwipeDirection::Right));
    spans.extend(entry("↑", SwipeDirection::Up));
    spans.extend(entry("↓", SwipeDirection::Down));

    let paragraph = Paragraph::new(vec![
        Line::from(spans),
        Line::from(Span::styled(
            "Drag the card with the mouse, click or [space] to flip",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}
