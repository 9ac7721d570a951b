//! The client state coordinator.
//!
//! Owns the authoritative [`ChatView`] and mediates every state transition
//! through the transport adapter. Operations are independent: nothing
//! queues or serializes them, responses apply in arrival order, and a
//! failure is always local to the operation that produced it.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ChatApi, ChatMessage, Role, SendMessageRequest, Session, SessionCreateRequest};

use super::store::StateStore;
use super::view::{ChatView, TranscriptEntry};

/// Title given to sessions the coordinator creates on its own.
pub const NEW_CHAT_TITLE: &str = "New Chat";

/// Error surfaced when a message is sent with no active session.
pub const NO_ACTIVE_SESSION: &str = "No active session.";

/// Page size requested when refreshing the session list.
const SESSION_PAGE_LIMIT: u32 = 50;

/// Mediates between the presentation surface and the transport adapter.
///
/// Every operation clears the previous error when it starts and clears its
/// own loading flag when it completes, success or failure, so the UI can
/// never be stuck in a permanent loading state after a request settles.
pub struct ChatCoordinator {
    api: Arc<dyn ChatApi>,
    store: StateStore<ChatView>,
}

impl ChatCoordinator {
    /// Create a coordinator over the given transport.
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            store: StateStore::new(ChatView::default()),
        }
    }

    /// Cloned snapshot of the current view.
    #[must_use]
    pub fn snapshot(&self) -> ChatView {
        self.store.snapshot()
    }

    /// Subscribe to view changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ChatView> {
        self.store.subscribe()
    }

    /// Startup sequence: log backend reachability, then load sessions.
    pub async fn init(&self) {
        match self.api.health().await {
            Ok(health) => info!(
                service = %health.service,
                version = %health.version,
                status = %health.status,
                "backend reachable"
            ),
            Err(e) => warn!("backend health check failed: {e}"),
        }
        self.refresh_sessions().await;
    }

    /// Reload the session list. If nothing is active afterwards, activate
    /// the most recently updated session, or create a fresh one when the
    /// backend has none.
    pub async fn refresh_sessions(&self) {
        self.store.update(|view| ChatView {
            loading_sessions: true,
            error: None,
            ..view.clone()
        });

        match self.api.list_sessions(0, SESSION_PAGE_LIMIT).await {
            Ok(sessions) => {
                debug!("loaded {} sessions", sessions.len());
                let most_recent = sessions
                    .iter()
                    .max_by_key(|session| session.updated_at)
                    .cloned();
                self.store.update(move |view| ChatView {
                    sessions,
                    loading_sessions: false,
                    ..view.clone()
                });
                if self.store.snapshot().active_session.is_none() {
                    match most_recent {
                        Some(session) => self.set_active_session(session).await,
                        None => self.create_session(Some(NEW_CHAT_TITLE.to_string())).await,
                    }
                }
            }
            Err(e) => {
                warn!("failed to load sessions: {e}");
                self.store.update(move |view| ChatView {
                    error: Some(e.to_string()),
                    loading_sessions: false,
                    ..view.clone()
                });
            }
        }
    }

    /// Create a session and make it active.
    pub async fn create_session(&self, title: Option<String>) {
        self.store.update(|view| ChatView {
            error: None,
            ..view.clone()
        });

        match self.api.create_session(SessionCreateRequest { title }).await {
            Ok(session) => {
                info!("created session {}", session.id);
                let prepended = session.clone();
                self.store.update(move |view| {
                    let mut sessions = Vec::with_capacity(view.sessions.len() + 1);
                    sessions.push(prepended);
                    sessions.extend(view.sessions.iter().cloned());
                    ChatView {
                        sessions,
                        ..view.clone()
                    }
                });
                self.set_active_session(session).await;
            }
            Err(e) => {
                warn!("failed to create session: {e}");
                self.store.update(move |view| ChatView {
                    error: Some(e.to_string()),
                    ..view.clone()
                });
            }
        }
    }

    /// Delete a session. When it was the active one, switch to the first
    /// remaining session or create a fresh one when none remain.
    pub async fn delete_session(&self, session: &Session) {
        self.store.update(|view| ChatView {
            error: None,
            ..view.clone()
        });

        match self.api.delete_session(&session.id).await {
            Ok(()) => {
                info!("deleted session {}", session.id);
                let deleted = session.id.clone();
                let was_active = self.store.snapshot().is_active(&session.id);
                self.store.update(move |view| {
                    let sessions: Vec<Session> = view
                        .sessions
                        .iter()
                        .filter(|s| s.id != deleted)
                        .cloned()
                        .collect();
                    ChatView {
                        sessions,
                        ..view.clone()
                    }
                });
                if was_active {
                    match self.store.snapshot().sessions.first().cloned() {
                        Some(next) => self.set_active_session(next).await,
                        None => self.create_session(Some(NEW_CHAT_TITLE.to_string())).await,
                    }
                }
            }
            Err(e) => {
                warn!("failed to delete session {}: {e}", session.id);
                self.store.update(move |view| ChatView {
                    error: Some(e.to_string()),
                    ..view.clone()
                });
            }
        }
    }

    /// Make `session` active and load its transcript. Activation happens
    /// immediately; transcript population follows asynchronously.
    pub async fn set_active_session(&self, session: Session) {
        let session_id = session.id.clone();
        debug!("activating session {session_id}");
        self.store.update(move |view| ChatView {
            active_session: Some(session),
            ..view.clone()
        });
        self.load_messages(&session_id).await;
    }

    /// Load the transcript for a session.
    pub async fn load_messages(&self, session_id: &str) {
        self.store.update(|view| ChatView {
            loading_messages: true,
            error: None,
            ..view.clone()
        });

        match self.api.list_messages(session_id).await {
            Ok(response) => {
                debug!(
                    "loaded {} messages for session {session_id}",
                    response.messages.len()
                );
                self.store.update(move |view| ChatView {
                    messages: response
                        .messages
                        .into_iter()
                        .map(TranscriptEntry::confirmed)
                        .collect(),
                    loading_messages: false,
                    ..view.clone()
                });
            }
            Err(e) => {
                warn!("failed to load messages for session {session_id}: {e}");
                self.store.update(move |view| ChatView {
                    error: Some(e.to_string()),
                    loading_messages: false,
                    ..view.clone()
                });
            }
        }
    }

    /// Send a user message to the active session.
    ///
    /// The user message is appended optimistically before the request goes
    /// out. On success the assistant reply is appended, the optimistic
    /// entry is confirmed, and the session's metadata is refreshed. On
    /// failure the entry stays in the transcript, still marked pending, and
    /// the error is surfaced; there is no rollback and no retry.
    pub async fn send_message(&self, text: &str) {
        let Some(active) = self.store.snapshot().active_session else {
            self.store.update(|view| ChatView {
                error: Some(NO_ACTIVE_SESSION.to_string()),
                ..view.clone()
            });
            return;
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }

        let optimistic = ChatMessage {
            role: Role::User,
            content: trimmed.to_string(),
            timestamp: Utc::now(),
        };
        self.store.update(move |view| {
            let mut messages = view.messages.clone();
            messages.push(TranscriptEntry::pending(optimistic));
            ChatView {
                messages,
                sending: true,
                typing: true,
                error: None,
                ..view.clone()
            }
        });

        let request = SendMessageRequest {
            session_id: active.id.clone(),
            message: trimmed.to_string(),
        };
        match self.api.send_message(request).await {
            Ok(response) => {
                debug!(
                    "assistant replied in session {} ({} messages total)",
                    response.session_id, response.total_messages
                );
                let now = Utc::now();
                self.store.update(move |view| {
                    let mut messages = view.messages.clone();
                    if let Some(entry) = messages.iter_mut().rev().find(|entry| entry.pending) {
                        entry.pending = false;
                    }
                    messages.push(TranscriptEntry::confirmed(response.assistant_message));
                    let sessions = view
                        .sessions
                        .iter()
                        .map(|session| {
                            if session.id == response.session_id {
                                Session {
                                    updated_at: now,
                                    message_count: response.total_messages,
                                    ..session.clone()
                                }
                            } else {
                                session.clone()
                            }
                        })
                        .collect();
                    ChatView {
                        messages,
                        sessions,
                        sending: false,
                        typing: false,
                        ..view.clone()
                    }
                });
            }
            Err(e) => {
                warn!("failed to send message: {e}");
                self.store.update(move |view| ChatView {
                    error: Some(e.to_string()),
                    sending: false,
                    typing: false,
                    ..view.clone()
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::{ApiError, ApiResult};
    use crate::api::{HealthResponse, ListMessagesResponse, SendMessageResponse};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn ts(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, minute, 0).unwrap()
    }

    fn session(id: &str, updated_minute: u32) -> Session {
        Session {
            id: id.to_string(),
            title: format!("Session {id}"),
            created_at: ts(0),
            updated_at: ts(updated_minute),
            message_count: 0,
        }
    }

    fn message(role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
            timestamp: ts(1),
        }
    }

    fn backend_error() -> ApiError {
        ApiError::Api {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "backend exploded".to_string(),
        }
    }

    /// Scripted transport: fixed responses per operation plus a call log.
    #[derive(Default)]
    struct MockApi {
        sessions: Vec<Session>,
        messages: Vec<ChatMessage>,
        send_response: Option<SendMessageResponse>,
        fail: Mutex<Vec<&'static str>>,
        created: AtomicU32,
        calls: Mutex<Vec<String>>,
    }

    impl MockApi {
        fn set_fail(&self, op: &'static str) {
            self.fail.lock().unwrap().push(op);
        }

        fn log(&self, entry: impl Into<String>) {
            self.calls.lock().unwrap().push(entry.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn fails(&self, op: &str) -> bool {
            self.fail.lock().unwrap().contains(&op)
        }
    }

    #[async_trait]
    impl ChatApi for MockApi {
        async fn health(&self) -> ApiResult<HealthResponse> {
            self.log("health");
            Ok(HealthResponse {
                status: "ok".to_string(),
                service: "mock".to_string(),
                version: "0.0.0".to_string(),
            })
        }

        async fn create_session(&self, request: SessionCreateRequest) -> ApiResult<Session> {
            self.log(format!(
                "create_session:{}",
                request.title.as_deref().unwrap_or("")
            ));
            if self.fails("create_session") {
                return Err(backend_error());
            }
            let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Session {
                id: format!("new-{n}"),
                title: request.title.unwrap_or_default(),
                created_at: ts(30),
                updated_at: ts(30),
                message_count: 0,
            })
        }

        async fn list_sessions(&self, skip: u32, limit: u32) -> ApiResult<Vec<Session>> {
            self.log(format!("list_sessions:{skip}:{limit}"));
            if self.fails("list_sessions") {
                return Err(backend_error());
            }
            Ok(self.sessions.clone())
        }

        async fn get_session(&self, session_id: &str) -> ApiResult<Session> {
            self.log(format!("get_session:{session_id}"));
            self.sessions
                .iter()
                .find(|s| s.id == session_id)
                .cloned()
                .ok_or_else(|| ApiError::Api {
                    status: StatusCode::NOT_FOUND,
                    message: "Session not found".to_string(),
                })
        }

        async fn delete_session(&self, session_id: &str) -> ApiResult<()> {
            self.log(format!("delete_session:{session_id}"));
            if self.fails("delete_session") {
                return Err(backend_error());
            }
            Ok(())
        }

        async fn list_messages(&self, session_id: &str) -> ApiResult<ListMessagesResponse> {
            self.log(format!("list_messages:{session_id}"));
            if self.fails("list_messages") {
                return Err(backend_error());
            }
            Ok(ListMessagesResponse {
                session_id: session_id.to_string(),
                messages: self.messages.clone(),
            })
        }

        async fn send_message(
            &self,
            request: SendMessageRequest,
        ) -> ApiResult<SendMessageResponse> {
            self.log(format!("send_message:{}", request.message));
            if self.fails("send_message") {
                return Err(backend_error());
            }
            Ok(self
                .send_response
                .clone()
                .unwrap_or_else(|| SendMessageResponse {
                    session_id: request.session_id,
                    user_message: message(Role::User, &request.message),
                    assistant_message: message(Role::Assistant, "hello"),
                    total_messages: 2,
                }))
        }
    }

    fn coordinator(api: MockApi) -> (ChatCoordinator, Arc<MockApi>) {
        let api = Arc::new(api);
        (ChatCoordinator::new(api.clone()), api)
    }

    #[tokio::test]
    async fn test_refresh_activates_most_recently_updated() {
        let (coordinator, api) = coordinator(MockApi {
            sessions: vec![session("a", 1), session("b", 2)],
            ..MockApi::default()
        });

        coordinator.refresh_sessions().await;

        let view = coordinator.snapshot();
        assert_eq!(view.active_session.as_ref().unwrap().id, "b");
        assert!(!view.loading_sessions);
        assert!(api.calls().contains(&"list_messages:b".to_string()));
    }

    #[tokio::test]
    async fn test_refresh_empty_creates_new_chat_once() {
        let (coordinator, api) = coordinator(MockApi::default());

        coordinator.refresh_sessions().await;

        let creates: Vec<String> = api
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("create_session"))
            .collect();
        assert_eq!(creates, vec!["create_session:New Chat".to_string()]);

        let view = coordinator.snapshot();
        let active = view.active_session.as_ref().unwrap();
        assert_eq!(active.title, NEW_CHAT_TITLE);
        assert!(view.is_active(&view.sessions[0].id));
    }

    #[tokio::test]
    async fn test_refresh_keeps_existing_active_session() {
        let (coordinator, api) = coordinator(MockApi {
            sessions: vec![session("a", 1), session("b", 2)],
            ..MockApi::default()
        });

        coordinator.set_active_session(session("a", 1)).await;
        coordinator.refresh_sessions().await;

        assert_eq!(coordinator.snapshot().active_session.unwrap().id, "a");
        // Only the explicit activation loaded messages.
        let loads: Vec<String> = api
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("list_messages"))
            .collect();
        assert_eq!(loads, vec!["list_messages:a".to_string()]);
    }

    #[tokio::test]
    async fn test_refresh_failure_sets_error_and_keeps_sessions() {
        let (coordinator, api) = coordinator(MockApi {
            sessions: vec![session("a", 1)],
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;
        assert_eq!(coordinator.snapshot().sessions.len(), 1);

        api.set_fail("list_sessions");
        coordinator.refresh_sessions().await;

        let view = coordinator.snapshot();
        assert_eq!(view.error.as_deref(), Some("backend exploded"));
        assert!(!view.loading_sessions);
        assert_eq!(view.sessions.len(), 1, "sessions unchanged on failure");
    }

    #[tokio::test]
    async fn test_create_session_prepends_and_activates() {
        let (coordinator, _api) = coordinator(MockApi {
            sessions: vec![session("a", 1)],
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;
        coordinator.create_session(Some("Fresh".to_string())).await;

        let view = coordinator.snapshot();
        assert_eq!(view.sessions[0].title, "Fresh");
        assert_eq!(view.active_session.unwrap().title, "Fresh");
    }

    #[tokio::test]
    async fn test_send_empty_and_whitespace_are_silent_noops() {
        let (coordinator, api) = coordinator(MockApi {
            sessions: vec![session("a", 1)],
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;
        let before = coordinator.snapshot();

        coordinator.send_message("").await;
        coordinator.send_message("   ").await;

        let after = coordinator.snapshot();
        assert_eq!(after.messages, before.messages);
        assert!(after.error.is_none());
        assert!(!after.sending);
        assert!(!api.calls().iter().any(|c| c.starts_with("send_message")));
    }

    #[tokio::test]
    async fn test_send_without_active_session_sets_error() {
        let (coordinator, api) = coordinator(MockApi::default());

        coordinator.send_message("hi").await;

        let view = coordinator.snapshot();
        assert_eq!(view.error.as_deref(), Some(NO_ACTIVE_SESSION));
        assert!(view.messages.is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_success_appends_user_and_assistant() {
        let reply = SendMessageResponse {
            session_id: "a".to_string(),
            user_message: message(Role::User, "hi"),
            assistant_message: ChatMessage {
                role: Role::Assistant,
                content: "hello".to_string(),
                timestamp: ts(45),
            },
            total_messages: 4,
        };
        let (coordinator, _api) = coordinator(MockApi {
            sessions: vec![session("a", 1)],
            send_response: Some(reply),
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;
        let before = coordinator.snapshot().messages.len();

        coordinator.send_message("  hi  ").await;

        let view = coordinator.snapshot();
        assert_eq!(view.messages.len(), before + 2);

        let user = &view.messages[view.messages.len() - 2];
        assert_eq!(user.message.role, Role::User);
        assert_eq!(user.message.content, "hi");
        assert!(!user.pending, "confirmed once the backend answered");

        let assistant = view.messages.last().unwrap();
        assert_eq!(assistant.message.role, Role::Assistant);
        assert_eq!(assistant.message.content, "hello");

        let updated = view.sessions.iter().find(|s| s.id == "a").unwrap();
        assert_eq!(updated.message_count, 4);
        assert!(updated.updated_at > ts(1));
        assert!(!view.sending);
        assert!(!view.typing);
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_send_failure_keeps_optimistic_entry_pending() {
        let (coordinator, _api) = coordinator(MockApi {
            sessions: vec![session("a", 1)],
            fail: Mutex::new(vec!["send_message"]),
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;
        let before = coordinator.snapshot().messages.len();

        coordinator.send_message("hi").await;

        let view = coordinator.snapshot();
        assert_eq!(view.messages.len(), before + 1);
        let entry = view.messages.last().unwrap();
        assert_eq!(entry.message.role, Role::User);
        assert!(entry.pending, "failed send leaves the entry unconfirmed");
        assert_eq!(view.error.as_deref(), Some("backend exploded"));
        assert!(!view.sending);
        assert!(!view.typing);
    }

    #[tokio::test]
    async fn test_delete_active_switches_to_first_remaining() {
        let (coordinator, api) = coordinator(MockApi {
            sessions: vec![session("a", 1), session("b", 2)],
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;
        // b was activated as most recent; delete it.
        let active = coordinator.snapshot().active_session.unwrap();
        assert_eq!(active.id, "b");

        coordinator.delete_session(&active).await;

        let view = coordinator.snapshot();
        assert_eq!(view.sessions.len(), 1);
        assert_eq!(view.active_session.unwrap().id, "a");
        assert!(api.calls().contains(&"list_messages:a".to_string()));
    }

    #[tokio::test]
    async fn test_delete_last_session_creates_new_chat() {
        let (coordinator, api) = coordinator(MockApi {
            sessions: vec![session("a", 1)],
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;
        let active = coordinator.snapshot().active_session.unwrap();

        coordinator.delete_session(&active).await;

        assert!(
            api.calls()
                .contains(&"create_session:New Chat".to_string())
        );
        let view = coordinator.snapshot();
        assert_eq!(view.active_session.unwrap().title, NEW_CHAT_TITLE);
    }

    #[tokio::test]
    async fn test_delete_inactive_session_keeps_active() {
        let (coordinator, _api) = coordinator(MockApi {
            sessions: vec![session("a", 1), session("b", 2)],
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;

        let inactive = session("a", 1);
        coordinator.delete_session(&inactive).await;

        let view = coordinator.snapshot();
        assert_eq!(view.sessions.len(), 1);
        assert_eq!(view.active_session.unwrap().id, "b");
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_session_in_view() {
        let (coordinator, _api) = coordinator(MockApi {
            sessions: vec![session("a", 1)],
            fail: Mutex::new(vec!["delete_session"]),
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;
        let active = coordinator.snapshot().active_session.unwrap();

        coordinator.delete_session(&active).await;

        let view = coordinator.snapshot();
        assert_eq!(view.sessions.len(), 1);
        assert_eq!(view.error.as_deref(), Some("backend exploded"));
    }

    /// Delegates to [`MockApi`] but fails every `list_messages` after the
    /// first.
    struct FlakyMessagesApi {
        inner: MockApi,
        loads: AtomicU32,
    }

    #[async_trait]
    impl ChatApi for FlakyMessagesApi {
        async fn health(&self) -> ApiResult<HealthResponse> {
            self.inner.health().await
        }
        async fn create_session(&self, request: SessionCreateRequest) -> ApiResult<Session> {
            self.inner.create_session(request).await
        }
        async fn list_sessions(&self, skip: u32, limit: u32) -> ApiResult<Vec<Session>> {
            self.inner.list_sessions(skip, limit).await
        }
        async fn get_session(&self, session_id: &str) -> ApiResult<Session> {
            self.inner.get_session(session_id).await
        }
        async fn delete_session(&self, session_id: &str) -> ApiResult<()> {
            self.inner.delete_session(session_id).await
        }
        async fn list_messages(&self, session_id: &str) -> ApiResult<ListMessagesResponse> {
            if self.loads.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(backend_error());
            }
            self.inner.list_messages(session_id).await
        }
        async fn send_message(
            &self,
            request: SendMessageRequest,
        ) -> ApiResult<SendMessageResponse> {
            self.inner.send_message(request).await
        }
    }

    #[tokio::test]
    async fn test_load_messages_failure_keeps_transcript() {
        let api = Arc::new(FlakyMessagesApi {
            inner: MockApi {
                sessions: vec![session("a", 1)],
                messages: vec![message(Role::User, "old")],
                ..MockApi::default()
            },
            loads: AtomicU32::new(0),
        });
        let coordinator = ChatCoordinator::new(api);
        coordinator.refresh_sessions().await;
        assert_eq!(coordinator.snapshot().messages.len(), 1);

        // The second load fails and must leave the transcript alone.
        coordinator.load_messages("a").await;

        let view = coordinator.snapshot();
        assert_eq!(view.messages.len(), 1, "transcript untouched on failure");
        assert_eq!(view.messages[0].message.content, "old");
        assert!(view.error.is_some());
        assert!(!view.loading_messages);
    }

    #[tokio::test]
    async fn test_new_operation_clears_previous_error() {
        let (coordinator, _api) = coordinator(MockApi {
            sessions: vec![session("a", 1)],
            fail: Mutex::new(vec!["send_message"]),
            ..MockApi::default()
        });
        coordinator.refresh_sessions().await;
        coordinator.send_message("hi").await;
        assert!(coordinator.snapshot().error.is_some());

        coordinator.load_messages("a").await;
        assert!(coordinator.snapshot().error.is_none());
    }

    #[tokio::test]
    async fn test_init_checks_health_then_loads_sessions() {
        let (coordinator, api) = coordinator(MockApi {
            sessions: vec![session("a", 1)],
            ..MockApi::default()
        });

        coordinator.init().await;

        let calls = api.calls();
        assert_eq!(calls[0], "health");
        assert!(calls[1].starts_with("list_sessions"));
        assert!(coordinator.snapshot().active_session.is_some());
    }
}
