use crossterm::event::{Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::warn;

/// Terminal input events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Bracketed paste
    Paste(String),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event
    Tick,
}

/// Reads terminal input on a blocking task and forwards it over a channel
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Start polling the terminal, emitting a tick whenever `tick_rate`
    /// passes without input
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::task::spawn_blocking(move || loop {
            let event = match crossterm::event::poll(tick_rate) {
                Ok(true) => match crossterm::event::read() {
                    Ok(event) => convert_crossterm_event(event),
                    Err(e) => {
                        warn!("Failed to read terminal event: {}", e);
                        continue;
                    }
                },
                Ok(false) => Some(Event::Tick),
                Err(e) => {
                    warn!("Failed to poll terminal: {}", e);
                    break;
                }
            };

            if let Some(event) = event {
                if sender.send(event).is_err() {
                    break;
                }
            }
        });

        Self { receiver }
    }

    /// Get the next event; `None` once input polling has stopped
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }
}

/// Convert crossterm events to application events
fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        // Only presses; Windows also reports releases
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Paste(text) => Some(Event::Paste(text)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}
