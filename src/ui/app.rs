//! Input handling and UI-local state.
//!
//! The UI holds no business state beyond the input draft and cosmetic
//! counters; everything else is read from coordinator snapshots.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::api::Session;
use crate::state::ChatView;

/// User intents emitted by the presentation surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Exit the application.
    Quit,
    /// Send the given (already trimmed) text to the active session.
    Send(String),
    /// Create a new session.
    CreateSession,
    /// Delete the given session.
    DeleteSession(Session),
    /// Activate the given session.
    SelectSession(Session),
    /// Reload the session list.
    RefreshSessions,
}

/// Spinner frames for the typing indicator.
pub const SPINNER: &[char] = &['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

/// UI-local state: the input draft and the spinner phase.
#[derive(Debug, Default)]
pub struct UiState {
    /// Draft text in the input box.
    pub draft: String,
    /// Animation tick, advanced by the UI timer.
    pub tick: usize,
}

impl UiState {
    /// Create an empty UI state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the spinner animation.
    pub const fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Current spinner frame.
    #[must_use]
    pub const fn spinner(&self) -> char {
        SPINNER[self.tick % SPINNER.len()]
    }

    /// Submit the draft: returns the trimmed text and clears the draft,
    /// unless the draft is blank or a send is already in flight.
    pub fn submit(&mut self, sending: bool) -> Option<String> {
        let trimmed = self.draft.trim();
        if trimmed.is_empty() || sending {
            return None;
        }
        let text = trimmed.to_string();
        self.draft.clear();
        Some(text)
    }

    /// Translate a terminal event into an intent, updating the draft as a
    /// side effect.
    pub fn handle_event(&mut self, event: &Event, view: &ChatView) -> Option<Intent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key, view),
            Event::Paste(text) => {
                self.draft.push_str(text);
                None
            }
            _ => None,
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, view: &ChatView) -> Option<Intent> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Esc => Some(Intent::Quit),
            KeyCode::Char('c') if ctrl => Some(Intent::Quit),
            KeyCode::Char('n') if ctrl => Some(Intent::CreateSession),
            KeyCode::Char('r') if ctrl => Some(Intent::RefreshSessions),
            KeyCode::Char('x') if ctrl => view
                .active_session
                .clone()
                .map(Intent::DeleteSession),
            KeyCode::Up if alt => neighbor_session(view, -1).map(Intent::SelectSession),
            KeyCode::Down if alt => neighbor_session(view, 1).map(Intent::SelectSession),
            KeyCode::Enter if shift => {
                self.draft.push('\n');
                None
            }
            KeyCode::Enter => self.submit(view.sending).map(Intent::Send),
            KeyCode::Backspace => {
                self.draft.pop();
                None
            }
            KeyCode::Char(c) if !ctrl && !alt => {
                self.draft.push(c);
                None
            }
            _ => None,
        }
    }
}

/// Session `offset` places away from the active one in the session list,
/// clamped to the ends. Falls back to the first session when nothing is
/// active.
fn neighbor_session(view: &ChatView, offset: i32) -> Option<Session> {
    if view.sessions.is_empty() {
        return None;
    }
    let current = view
        .active_session
        .as_ref()
        .and_then(|active| view.sessions.iter().position(|s| s.id == active.id));
    let index = match current {
        Some(index) => {
            let max = view.sessions.len() as i32 - 1;
            (index as i32 + offset).clamp(0, max) as usize
        }
        None => 0,
    };
    view.sessions.get(index).cloned()
}
