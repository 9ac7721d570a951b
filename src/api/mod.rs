//! Transport adapter for the backend REST API.
//!
//! Translates the six logical chat operations into HTTP calls against a
//! configurable base URL, applies per-call timeouts, and normalizes every
//! failure shape into a single human-readable message.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::{ChatApi, HttpApiClient};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use types::{
    ChatMessage, HealthResponse, ListMessagesResponse, Role, SendMessageRequest,
    SendMessageResponse, Session, SessionCreateRequest,
};
