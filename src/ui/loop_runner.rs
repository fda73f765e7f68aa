//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background task events and a periodic tick.

use crate::app::{App, AppEvent, View};
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_app_event;
use super::helpers::spawn_initial_load;
use super::input::{handle_input, handle_mouse};
use super::render::{render, swipe_card_area};

/// Result of handling an input event.
pub enum Action {
    Continue,
    Quit,
}

/// Runs the TUI until the user quits or a termination signal arrives.
///
/// Installs a panic hook that restores the terminal (raw mode, alternate
/// screen and mouse capture) before the default hook prints. The initial
/// catalog load is spawned before the first frame.
///
/// # Arguments
///
/// * `app` - Application state, restored by [`App::init`]
/// * `event_tx` - Sender handed to background tasks spawned from the loop
/// * `event_rx` - Receiver for those tasks' results and catalog events
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up, drawn to or
/// restored, or if the signal handlers cannot be installed. Input handler
/// failures (a rating that cannot be saved, say) are logged and shown on
/// the status line instead.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    spawn_initial_load(app, &event_tx);

    loop {
        if app.needs_redraw {
            let frame = terminal.draw(|f| render(f, app))?;
            app.card_area = swipe_card_area(frame.area);
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain background results before waiting on more input
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_app_event(app, event, &event_tx).await;
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                let result = match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind != KeyEventKind::Release => {
                        app.needs_redraw = true;
                        handle_input(app, key, &event_tx).await
                    }
                    Some(Ok(Event::Mouse(mouse))) => {
                        app.needs_redraw = true;
                        handle_mouse(app, mouse, &event_tx).await
                    }
                    Some(Ok(Event::Resize(..))) => {
                        app.needs_redraw = true;
                        Ok(Action::Continue)
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Terminal event error");
                        Ok(Action::Continue)
                    }
                    None => break,
                    _ => Ok(Action::Continue),
                };
                match result {
                    Ok(Action::Quit) => break,
                    Ok(Action::Continue) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Input handling failed");
                        app.set_status(format!("Error: {e:#}"));
                    }
                }
            }

            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_app_event(app, event, &event_tx).await;
            }

            _ = tick_interval.tick() => handle_tick(app),
        }
    }

    restore_terminal(terminal)?;
    Ok(())
}

/// Redraw while the swipe card animates out, and once more when it stops.
fn handle_tick(app: &mut App) {
    let animating = app.card.is_animating();
    if app.view == View::Swipe && (animating || app.card_animating) {
        app.needs_redraw = true;
    }
    app.card_animating = animating;
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}
