//! Render dispatch.

use crate::app::{App, View};
use crate::util::{display_width, sanitize_line};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame,
};

use super::{browse, dashboard, friends, help, status, swipe};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 12;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = screen_layout(area);

    render_tabs(f, app, chunks[0]);
    match app.view {
        View::Swipe => swipe::render(f, app, chunks[1]),
        View::Browse => browse::render(f, app, chunks[1]),
        View::Dashboard => dashboard::render(f, app, chunks[1]),
        View::Friends => friends::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    if app.show_help {
        help::render(f);
    }
}

/// Tabs, view body and status line.
fn screen_layout(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// The swipe card's cells on a screen of this size, or `None` when the
/// screen is too small to show it.
pub(super) fn swipe_card_area(screen: Rect) -> Option<Rect> {
    if screen.width < MIN_WIDTH || screen.height < MIN_HEIGHT {
        return None;
    }
    Some(swipe::card_area(screen_layout(screen)[1]))
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL.iter().map(|v| Line::from(v.title())).collect();
    let selected = View::ALL.iter().position(|v| *v == app.view).unwrap_or(0);

    let who = match app.auth.user() {
        Some(user) => format!(" {} ", sanitize_line(&user.name)),
        None => " guest ".to_string(),
    };
    let who_width = display_width(&who).min(usize::from(area.width / 2)) as u16;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(who_width)])
        .split(area);

    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    f.render_widget(tabs, chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(who, Style::default().fg(Color::DarkGray))),
        chunks[1],
    );
}

/// A rectangle `percent_x` by `percent_y` of `area`, centred.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
