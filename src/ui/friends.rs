//! Friends view: incoming requests first, then friends.

use crate::app::App;
use crate::util::sanitize_line;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::helpers::display_name;

pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let Some(me) = app.current_user_id() else {
        let paragraph = Paragraph::new(vec![
            Line::from("Not signed in."),
            Line::from(""),
            Line::from("Run `reelswipe login` or `reelswipe register` to use friends."),
        ])
        .block(Block::default().borders(Borders::ALL).title("Friends"));
        f.render_widget(paragraph, area);
        return;
    };

    let dim = Style::default().fg(Color::DarkGray);
    let mut items: Vec<ListItem> = Vec::new();

    for request in app.friends.received_requests(me) {
        let mut spans = vec![
            Span::styled("➕ ", Style::default().fg(Color::Yellow)),
            Span::styled(
                sanitize_line(display_name(&request.from_user)).into_owned(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" @{}", request.from_user.username), dim),
        ];
        if let Some(message) = &request.message {
            spans.push(Span::raw(format!("  \"{}\"", sanitize_line(message))));
        }
        spans.push(Span::styled("  [a] accept [x] reject", dim));
        items.push(ListItem::new(Line::from(spans)));
    }

    for connection in app.friends.friends() {
        let friend = &connection.friend;
        let (dot, color) = if friend.is_online {
            ("● ", Color::Green)
        } else {
            ("○ ", Color::DarkGray)
        };
        items.push(ListItem::new(Line::from(vec![
            Span::styled(dot, Style::default().fg(color)),
            Span::raw(sanitize_line(display_name(friend)).into_owned()),
            Span::styled(format!(" @{}", friend.username), dim),
        ])));
    }

    let empty = items.is_empty();
    if empty {
        let text = if app.friends_loading {
            "Loading..."
        } else {
            "No friends yet"
        };
        items.push(ListItem::new(text));
    }

    let sent = app.friends.sent_requests(me).count();
    let mut title = format!(
        "Friends ({}, {} online)",
        app.friends.friends_count(),
        app.friends.online_friends()
    );
    if sent > 0 {
        title.push_str(&format!(", {sent} sent"));
    }
    title.push_str("  [r] refresh");

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default();
    if !empty {
        state.select(Some(app.friends_selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
