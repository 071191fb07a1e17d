use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Key binding configuration
#[derive(Debug, Clone)]
pub struct KeyBinding {
    pub key: KeyCode,
    pub modifiers: KeyModifiers,
    pub label: &'static str,
    pub description: &'static str,
}

impl KeyBinding {
    pub const fn new(
        key: KeyCode,
        modifiers: KeyModifiers,
        label: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            modifiers,
            label,
            description,
        }
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key == event.code && self.modifiers == event.modifiers
    }
}

/// What a key press asks the view to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    NewConversation,
    ClearConversation,
    Export,
    CopyLastReply,
    NextConversation,
    PreviousConversation,
    Suggestion(usize),
}

/// Application key mappings
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: Vec<(KeyBinding, Action)>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let ctrl = KeyModifiers::CONTROL;
        let none = KeyModifiers::NONE;

        Self {
            bindings: vec![
                (KeyBinding::new(KeyCode::Char('c'), ctrl, "Ctrl+C", "Quit application"), Action::Quit),
                (KeyBinding::new(KeyCode::Char('g'), ctrl, "Ctrl+G", "Show/hide help"), Action::ToggleHelp),
                (KeyBinding::new(KeyCode::Char('n'), ctrl, "Ctrl+N", "New conversation"), Action::NewConversation),
                (KeyBinding::new(KeyCode::Char('l'), ctrl, "Ctrl+L", "Clear conversation"), Action::ClearConversation),
                (KeyBinding::new(KeyCode::Char('e'), ctrl, "Ctrl+E", "Export conversation"), Action::Export),
                (KeyBinding::new(KeyCode::Char('y'), ctrl, "Ctrl+Y", "Copy last reply"), Action::CopyLastReply),
                (KeyBinding::new(KeyCode::Tab, none, "Tab", "Next conversation"), Action::NextConversation),
                (KeyBinding::new(KeyCode::BackTab, KeyModifiers::SHIFT, "Shift+Tab", "Previous conversation"), Action::PreviousConversation),
                (KeyBinding::new(KeyCode::F(1), none, "F1-F4", "Send a suggested prompt"), Action::Suggestion(0)),
                (KeyBinding::new(KeyCode::F(2), none, "", ""), Action::Suggestion(1)),
                (KeyBinding::new(KeyCode::F(3), none, "", ""), Action::Suggestion(2)),
                (KeyBinding::new(KeyCode::F(4), none, "", ""), Action::Suggestion(3)),
            ],
        }
    }
}

impl KeyMap {
    /// Action bound to `event`, if any
    pub fn action_for(&self, event: &KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(binding, _)| binding.matches(event))
            .map(|(_, action)| *action)
    }

    /// Get help text for all key bindings
    pub fn help_text(&self) -> String {
        let mut lines: Vec<String> = self
            .bindings
            .iter()
            .filter(|(binding, _)| !binding.label.is_empty())
            .map(|(binding, _)| format!("{:<10} {}", binding.label, binding.description))
            .collect();
        lines.push(format!("{:<10} {}", "Enter", "Send message"));
        lines.push(format!("{:<10} {}", "PgUp/PgDn", "Scroll messages"));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_default_bindings() {
        let map = KeyMap::default();
        assert_eq!(map.action_for(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(Action::Quit));
        assert_eq!(map.action_for(&key(KeyCode::F(3), KeyModifiers::NONE)), Some(Action::Suggestion(2)));
        assert_eq!(map.action_for(&key(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_help_text_skips_unlabelled_bindings() {
        let help = KeyMap::default().help_text();
        assert!(help.contains("Ctrl+N"));
        assert!(help.contains("F1-F4"));
        assert_eq!(help.lines().count(), 11);
    }
}
