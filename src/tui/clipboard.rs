use arboard::Clipboard;
use tracing::{debug, warn};

/// Copy `text` to the system clipboard. Returns whether it worked; failures
/// (headless sessions, missing display server) are logged, never fatal.
pub fn copy_to_clipboard(text: &str) -> bool {
    let mut clipboard = match Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(e) => {
            warn!("Failed to initialize clipboard: {}", e);
            return false;
        }
    };

    match clipboard.set_text(text) {
        Ok(()) => {
            debug!("Copied {} bytes to the clipboard", text.len());
            true
        }
        Err(e) => {
            warn!("Failed to set clipboard text: {}", e);
            false
        }
    }
}
