//! The client-side view of sessions and messages.

use crate::api::{ChatMessage, Session};

/// A message as displayed in the transcript.
///
/// `pending` marks an optimistic user message that has not been confirmed
/// by the backend yet. A failed send leaves the entry pending rather than
/// retracting it.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptEntry {
    /// The underlying message.
    pub message: ChatMessage,
    /// True while the backend has not confirmed the message.
    pub pending: bool,
}

impl TranscriptEntry {
    /// Entry for a server-confirmed message.
    #[must_use]
    pub const fn confirmed(message: ChatMessage) -> Self {
        Self {
            message,
            pending: false,
        }
    }

    /// Entry for an optimistic, not-yet-confirmed message.
    #[must_use]
    pub const fn pending(message: ChatMessage) -> Self {
        Self {
            message,
            pending: true,
        }
    }
}

/// Snapshot of everything the presentation surface reads.
///
/// Published as a whole on every mutation; no field is ever mutated in
/// place.
#[derive(Clone, Debug, Default)]
pub struct ChatView {
    /// Sessions in the order the backend returned them, newest creations
    /// prepended.
    pub sessions: Vec<Session>,
    /// The session whose transcript is displayed, if any.
    pub active_session: Option<Session>,
    /// Transcript of the active session. May be stale while a load is
    /// pending.
    pub messages: Vec<TranscriptEntry>,
    /// A session list request is in flight.
    pub loading_sessions: bool,
    /// A transcript request is in flight.
    pub loading_messages: bool,
    /// A send request is in flight.
    pub sending: bool,
    /// The assistant is expected to be generating a reply.
    pub typing: bool,
    /// Most recent operation failure, cleared when the next operation
    /// starts.
    pub error: Option<String>,
}

impl ChatView {
    /// Whether `session_id` is the active session.
    #[must_use]
    pub fn is_active(&self, session_id: &str) -> bool {
        self.active_session
            .as_ref()
            .is_some_and(|session| session.id == session_id)
    }
}
