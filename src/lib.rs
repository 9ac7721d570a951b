//! Terminal chat client for the Q&A assistant backend.
//!
//! A thin presentation layer: sessions, transcripts, and assistant
//! inference all live in an external REST service. This crate renders the
//! conversation, coordinates client-side view state, and forwards every
//! user intent to the backend over HTTP.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]

/// Transport adapter for the backend REST API.
pub mod api;
/// Client-side view state and the coordinator.
pub mod state;
/// Entry helpers to start the chat client.
pub mod start_chat_client;
/// Terminal presentation surface.
pub mod ui;
