use crate::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.search_mode {
        Cow::Borrowed("Type to search | ESC clear | ENTER keep")
    } else {
        match app.view {
            View::Swipe if app.catalog.is_using_fallback() => {
                Cow::Borrowed("Offline list | [R]etry [?]help [q]uit")
            }
            View::Swipe => {
                Cow::Borrowed("[←→↑↓]rate [space]flip [t]railer [n]ext [?]help [q]uit")
            }
            View::Browse => Cow::Borrowed("[/]search [g]enre [+/-]rating [Enter]swipe [?]help"),
            View::Dashboard => Cow::Borrowed("[1-4]status [/]search [x]remove [?]help"),
            View::Friends => Cow::Borrowed("[r]efresh [a]ccept [x]remove [L]ogout [?]help"),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
