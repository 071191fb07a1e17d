use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::{
    app::{AppEvent, ChatApp, PendingReply, ViewCommand},
    responder::SUGGESTED_PROMPTS,
    session::{Conversation, MessageRole},
    tui::{
        clipboard::copy_to_clipboard,
        events::Event,
        formatting::format_message,
        keys::{Action, KeyMap},
        styles::Theme,
        Frame,
    },
    utils::text::time::relative_time,
};

const SIDEBAR_WIDTH: u16 = 32;

/// Status line content
#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Ready,
    Thinking,
    Info(String),
    Error(String),
}

/// Terminal view over a [`ChatApp`]: renders its state and turns key presses
/// into view commands. It reads the store but never mutates it directly.
pub struct ChatView {
    /// Whether the application should quit
    pub should_quit: bool,
    key_map: KeyMap,
    theme: Theme,
    input: String,
    status: Status,
    show_help: bool,
    confirm_clear: bool,
    /// Lines scrolled up from the bottom of the message list
    scroll_back: u16,
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            key_map: KeyMap::default(),
            theme: Theme::default(),
            input: String::new(),
            status: Status::Ready,
            show_help: false,
            confirm_clear: false,
            scroll_back: 0,
        }
    }

    /// React to a store event
    pub fn on_app_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::BusyChanged { busy: true } => self.status = Status::Thinking,
            AppEvent::BusyChanged { busy: false } => {
                if self.status == Status::Thinking {
                    self.status = Status::Ready;
                }
            }
            AppEvent::ActiveConversationChanged { .. }
            | AppEvent::MessageAppended { .. }
            | AppEvent::ConversationCleared { .. } => self.scroll_back = 0,
            AppEvent::Exported { path } => {
                self.status = Status::Info(format!("Exported to {}", path.display()));
            }
            AppEvent::Error { error } => self.status = Status::Error(error.clone()),
            AppEvent::ConversationsChanged | AppEvent::TitleChanged { .. } => {}
        }
    }

    /// Handle terminal input. Returns an exchange the caller must complete.
    pub fn handle_event(&mut self, event: Event, app: &mut ChatApp) -> Option<PendingReply> {
        match event {
            Event::Key(key) => self.handle_key(key, app),
            Event::Paste(text) => {
                self.input.push_str(&text);
                None
            }
            Event::Resize(_, _) | Event::Tick => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, app: &mut ChatApp) -> Option<PendingReply> {
        if self.confirm_clear {
            self.confirm_clear = false;
            let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
            app.dispatch(ViewCommand::Clear { confirmed });
            if confirmed {
                self.status = Status::Info("Conversation cleared".to_string());
            }
            return None;
        }

        if let Some(action) = self.key_map.action_for(&key) {
            return self.perform(action, app);
        }

        match key.code {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.input);
                if app.is_busy() {
                    // Keep what was typed until the reply arrives
                    self.input = text;
                    return None;
                }
                app.dispatch(ViewCommand::Submit(text))
            }
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::PageUp | KeyCode::Up => {
                self.scroll_back = self.scroll_back.saturating_add(3);
                None
            }
            KeyCode::PageDown | KeyCode::Down => {
                self.scroll_back = self.scroll_back.saturating_sub(3);
                None
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                None
            }
            _ => None,
        }
    }

    fn perform(&mut self, action: Action, app: &mut ChatApp) -> Option<PendingReply> {
        match action {
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::ToggleHelp => {
                self.show_help = !self.show_help;
                None
            }
            Action::NewConversation => app.dispatch(ViewCommand::NewConversation),
            Action::ClearConversation => {
                self.confirm_clear = true;
                None
            }
            Action::Export => app.dispatch(ViewCommand::Export),
            Action::CopyLastReply => {
                let reply = app
                    .store()
                    .active()
                    .and_then(Conversation::last_reply)
                    .map(|m| m.content.clone());
                self.status = match reply {
                    Some(text) if copy_to_clipboard(&text) => Status::Info("Copied last reply".to_string()),
                    Some(_) => Status::Error("Copy failed".to_string()),
                    None => Status::Info("Nothing to copy yet".to_string()),
                };
                None
            }
            Action::NextConversation | Action::PreviousConversation => {
                let target = neighbour(app, action == Action::NextConversation)?;
                app.dispatch(ViewCommand::Select(target))
            }
            Action::Suggestion(index) => {
                let empty = app.store().active().map_or(false, Conversation::is_empty);
                if empty {
                    app.dispatch(ViewCommand::Suggestion(index))
                } else {
                    None
                }
            }
        }
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame, app: &ChatApp) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(frame.size());

        frame.render_widget(Block::default().style(self.theme.base_style()), frame.size());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(rows[0]);

        self.render_history(frame, columns[0], app);

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(columns[1]);

        self.render_messages(frame, main[0], app);
        self.render_input(frame, main[1], app);
        self.render_status_bar(frame, rows[1]);

        if self.show_help {
            self.render_overlay(frame, "Help", self.key_map.help_text(), 60, 60);
        }
        if self.confirm_clear {
            self.render_overlay(
                frame,
                "Clear conversation",
                "Clear the current conversation? (y/N)".to_string(),
                50,
                20,
            );
        }
    }

    fn render_history(&self, frame: &mut Frame, area: Rect, app: &ChatApp) {
        let store = app.store();
        let now = Utc::now();

        let items: Vec<ListItem> = store
            .conversations()
            .iter()
            .map(|conv| {
                let updated = conv.last_message().map_or(conv.created_at, |m| m.timestamp);
                ListItem::new(vec![
                    Line::from(Span::styled(conv.title.clone(), self.theme.text_style())),
                    Line::from(Span::styled(conv.preview(), self.theme.dim_style())),
                    Line::from(Span::styled(relative_time(updated, now), self.theme.placeholder_style())),
                ])
            })
            .collect();

        let mut state = ListState::default();
        state.select(
            store
                .active_id()
                .and_then(|id| store.conversations().iter().position(|c| c.id == id)),
        );

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("History")
                    .border_style(self.theme.border_style()),
            )
            .highlight_style(self.theme.selection_style());

        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect, app: &ChatApp) {
        let Some(conversation) = app.store().active() else {
            return;
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(conversation.title.clone())
            .border_style(self.theme.focused_border_style());

        let lines = if conversation.is_empty() {
            self.welcome_lines()
        } else {
            self.message_lines(conversation)
        };

        let inner_width = area.width.saturating_sub(2).max(1) as usize;
        let inner_height = area.height.saturating_sub(2);
        let total: usize = lines
            .iter()
            .map(|line| line.width().max(1).div_ceil(inner_width))
            .sum();
        let offset = scroll_offset(total, inner_height, self.scroll_back);

        let paragraph = Paragraph::new(Text::from(lines))
            .block(block)
            .style(self.theme.text_style())
            .wrap(Wrap { trim: false })
            .scroll((offset, 0));

        frame.render_widget(paragraph, area);
    }

    fn message_lines(&self, conversation: &Conversation) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for message in &conversation.messages {
            let label_style = match message.role {
                MessageRole::User => self.theme.user_label_style(),
                MessageRole::Assistant => self.theme.assistant_label_style(),
            };
            lines.push(Line::from(vec![
                Span::styled(message.role.label().to_string(), label_style),
                Span::styled(
                    format!("  {}", message.timestamp.with_timezone(&chrono::Local).format("%H:%M")),
                    self.theme.dim_style(),
                ),
            ]));
            lines.extend(format_message(&message.content, self.theme.text_style(), &self.theme));
            lines.push(Line::default());
        }

        lines
    }

    fn welcome_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled("Welcome to Zed AI", self.theme.assistant_label_style())),
            Line::default(),
            Line::from("I'm your AI assistant. I can answer questions, help with your work, or just chat."),
            Line::default(),
            Line::from(Span::styled("Try one of these:", self.theme.dim_style())),
        ];
        lines.extend(SUGGESTED_PROMPTS.iter().enumerate().map(|(i, prompt)| {
            Line::from(vec![
                Span::styled(format!("  F{}  ", i + 1), self.theme.user_label_style()),
                Span::raw(*prompt),
            ])
        }));
        lines
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, app: &ChatApp) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Message")
            .border_style(if app.is_busy() {
                self.theme.border_style()
            } else {
                self.theme.focused_border_style()
            });

        let paragraph = if self.input.is_empty() {
            Paragraph::new("Type your message here...").style(self.theme.placeholder_style())
        } else {
            Paragraph::new(self.input.as_str()).style(self.theme.text_style())
        };

        frame.render_widget(paragraph.block(block), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let (text, style) = match &self.status {
            Status::Ready => ("Ready | Ctrl+G help | Ctrl+C quit".to_string(), self.theme.status_bar_style()),
            Status::Thinking => ("Zed AI is thinking...".to_string(), self.theme.status_bar_style()),
            Status::Info(message) => (message.clone(), self.theme.status_bar_style()),
            Status::Error(message) => (message.clone(), self.theme.error_style()),
        };

        frame.render_widget(Paragraph::new(text).style(style), area);
    }

    fn render_overlay(&self, frame: &mut Frame, title: &str, body: String, percent_x: u16, percent_y: u16) {
        let area = centered_rect(percent_x, percent_y, frame.size());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(self.theme.warning_style())
            .style(self.theme.help_style());

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(body).block(block).style(Style::default().fg(self.theme.text)),
            area,
        );
    }
}

/// First visible line when `total` wrapped lines fill a view `height` tall,
/// scrolled `scroll_back` lines up from the bottom
fn scroll_offset(total: usize, height: u16, scroll_back: u16) -> u16 {
    let total = u16::try_from(total).unwrap_or(u16::MAX);
    total.saturating_sub(height).saturating_sub(scroll_back)
}

/// Id of the conversation after (or before) the active one, wrapping around
fn neighbour(app: &ChatApp, forward: bool) -> Option<String> {
    let conversations = app.store().conversations();
    let len = conversations.len();
    if len < 2 {
        return None;
    }

    let current = app
        .store()
        .active_id()
        .and_then(|id| conversations.iter().position(|c| c.id == id))
        .unwrap_or(0);
    let next = if forward { (current + 1) % len } else { (current + len - 1) % len };
    Some(conversations[next].id.clone())
}

/// Create a centered rectangle with given percentage of the screen
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
