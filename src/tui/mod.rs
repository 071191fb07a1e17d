//! Terminal User Interface module using ratatui

mod app;
mod clipboard;
mod events;
mod formatting;
mod keys;
mod styles;

use app::ChatView;
use events::EventHandler;

use anyhow::Result;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::app::{AppEvent, ChatApp, PendingReply};

pub type Backend = CrosstermBackend<io::Stdout>;
pub type Frame<'a> = ratatui::Frame<'a>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<Backend>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main TUI entry point
pub async fn run(
    app: ChatApp,
    app_events: mpsc::UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
) -> Result<()> {
    let mut terminal = init_terminal()?;
    let mut input = EventHandler::new(tick_rate);

    let result = run_app(&mut terminal, app, app_events, &mut input).await;

    restore_terminal(&mut terminal)?;
    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<Backend>,
    mut app: ChatApp,
    mut app_events: mpsc::UnboundedReceiver<AppEvent>,
    input: &mut EventHandler,
) -> Result<()> {
    let mut view = ChatView::new();
    let mut pending: Option<(PendingReply, Instant)> = None;
    info!("Entering interactive mode");

    loop {
        while let Ok(event) = app_events.try_recv() {
            if event.is_error() {
                warn!(conversation = ?event.conversation_id(), ?event, "app error");
            } else {
                debug!(conversation = ?event.conversation_id(), ?event, "app event");
            }
            view.on_app_event(&event);
        }

        terminal.draw(|frame| view.render(frame, &app))?;

        if view.should_quit {
            break;
        }

        let deadline = pending.as_ref().map(|(_, at)| *at);

        tokio::select! {
            event = input.next() => {
                let Some(event) = event else {
                    warn!("Terminal input closed");
                    break;
                };
                if let Some(reply) = view.handle_event(event, &mut app) {
                    let at = Instant::now() + reply.delay;
                    pending = Some((reply, at));
                }
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                if let Some((reply, _)) = pending.take() {
                    if let Err(e) = app.complete_exchange(reply) {
                        warn!("Failed to record reply: {}", e);
                    }
                }
            }
        }
    }

    info!("Leaving interactive mode");
    Ok(())
}
