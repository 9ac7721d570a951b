//! Terminal presentation surface.
//!
//! Renders coordinator snapshots with ratatui and feeds user intents back
//! into the coordinator. Each intent is spawned as an independent task;
//! the view re-renders whenever the coordinator publishes a new snapshot.

pub mod app;
pub mod views;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use crossterm::event::EventStream;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::debug;

use crate::api::ApiConfig;
use crate::state::ChatCoordinator;

use app::{Intent, UiState};
use views::HeaderContext;

/// Application title shown in the header.
const APP_TITLE: &str = "Q&A Chatbot";

/// Spinner animation period.
const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Restores the terminal on drop so a panic or early return cannot leave
/// raw mode enabled.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Run the TUI until the user quits.
///
/// # Errors
/// Returns an error if the terminal cannot be set up or an I/O failure
/// interrupts the event loop.
pub async fn run(coordinator: Arc<ChatCoordinator>, config: &ApiConfig) -> anyhow::Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let _guard = TerminalGuard;
    execute!(io::stdout(), EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let header = HeaderContext {
        title: APP_TITLE.to_string(),
        base_url: config.base_url.to_string(),
        docs_url: config.docs_url(),
    };

    {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.init().await });
    }

    let mut view_rx = coordinator.subscribe();
    let mut events = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    let mut ui = UiState::new();

    loop {
        let view = view_rx.borrow_and_update().clone();
        terminal.draw(|frame| views::draw(frame, &view, &ui, &header))?;

        let intent = tokio::select! {
            changed = view_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                None
            }
            _ = ticker.tick() => {
                ui.advance();
                None
            }
            event = events.next() => {
                let Some(event) = event else { break };
                let event = event.context("terminal event stream failed")?;
                ui.handle_event(&event, &view)
            }
        };

        let Some(intent) = intent else { continue };
        debug!("intent: {intent:?}");
        match intent {
            Intent::Quit => break,
            Intent::Send(text) => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.send_message(&text).await });
            }
            Intent::CreateSession => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    coordinator
                        .create_session(Some(crate::state::NEW_CHAT_TITLE.to_string()))
                        .await;
                });
            }
            Intent::DeleteSession(session) => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.delete_session(&session).await });
            }
            Intent::SelectSession(session) => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.set_active_session(session).await });
            }
            Intent::RefreshSessions => {
                let coordinator = coordinator.clone();
                tokio::spawn(async move { coordinator.refresh_sessions().await });
            }
        }
    }

    Ok(())
}
