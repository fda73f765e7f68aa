//! Help overlay: key table grouped by view.

use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

use super::render::centered_rect;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "General",
        &[
            ("Tab / Shift+Tab", "Next / previous view"),
            ("?", "Toggle help"),
            ("q, Ctrl+C", "Quit"),
        ],
    ),
    (
        "Swipe",
        &[
            ("drag right, → / l", "Want to watch"),
            ("drag left, ← / h", "Skip"),
            ("drag up, ↑ / k", "Seen and loved it"),
            ("drag down, ↓ / j", "Seen, not for me"),
            ("click, Space, Enter", "Flip card"),
            ("n", "Next card without rating"),
            ("t", "Open trailer"),
            ("r", "Back to the first page"),
            ("R", "Retry the catalog after going offline"),
        ],
    ),
    (
        "Browse",
        &[
            ("j / k", "Move selection"),
            ("Enter", "Show in swipe view"),
            ("/", "Search titles"),
            ("[ / ]", "Pick genre"),
            ("g", "Toggle picked genre"),
            ("+ / -", "Minimum rating"),
            ("m", "Load more"),
            ("c", "Clear filters"),
        ],
    ),
    (
        "My Movies",
        &[
            ("1-4", "Toggle rating filter"),
            ("/", "Search title, director, cast"),
            ("+ / -", "Minimum rating"),
            ("x, Delete", "Remove entry"),
            ("c", "Clear filters"),
        ],
    ),
    (
        "Friends",
        &[
            ("r", "Refresh"),
            ("a", "Accept request"),
            ("x, Delete", "Reject request or remove friend"),
            ("L", "Sign out"),
        ],
    ),
];

pub(super) fn render(f: &mut Frame) {
    let overlay = centered_rect(70, 85, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut rows = Vec::new();
    for (section, keys) in SECTIONS {
        rows.push(Row::new(vec![
            Line::from(Span::styled(format!("-- {section} --"), bold)),
            Line::from(""),
        ]));
        for (key, description) in *keys {
            rows.push(Row::new(vec![Line::from(*key), Line::from(*description)]));
        }
    }

    let table = Table::new(rows, [Constraint::Length(22), Constraint::Min(10)]).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Keys (? or Esc to close) "),
    );
    f.render_widget(table, overlay);
}
