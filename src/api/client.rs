//! HTTP implementation of the backend API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::config::ApiConfig;
use super::error::{ApiError, ApiResult, normalize_error_body};
use super::types::{
    HealthResponse, ListMessagesResponse, SendMessageRequest, SendMessageResponse, Session,
    SessionCreateRequest,
};

/// Typed operations against the backend chat service.
///
/// The coordinator only depends on this trait, so tests can substitute a
/// mock transport.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `GET /` — service status.
    async fn health(&self) -> ApiResult<HealthResponse>;

    /// `POST /sessions` — create a session.
    async fn create_session(&self, request: SessionCreateRequest) -> ApiResult<Session>;

    /// `GET /sessions` — list sessions with pagination.
    async fn list_sessions(&self, skip: u32, limit: u32) -> ApiResult<Vec<Session>>;

    /// `GET /sessions/{id}` — fetch one session. NotFound if unknown.
    async fn get_session(&self, session_id: &str) -> ApiResult<Session>;

    /// `DELETE /sessions/{id}` — delete a session. NotFound if unknown.
    async fn delete_session(&self, session_id: &str) -> ApiResult<()>;

    /// `GET /messages?session_id=` — full transcript for a session.
    async fn list_messages(&self, session_id: &str) -> ApiResult<ListMessagesResponse>;

    /// `POST /messages` — send a user message and wait for the assistant
    /// reply.
    async fn send_message(&self, request: SendMessageRequest) -> ApiResult<SendMessageResponse>;
}

/// `reqwest`-backed [`ChatApi`] implementation.
pub struct HttpApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl HttpApiClient {
    /// Build a client for the given configuration.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Join path segments onto the base URL with proper percent-encoding.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.config.base_url.clone();
        {
            let mut parts = url
                .path_segments_mut()
                .map_err(|()| ApiError::Client("base URL cannot carry paths".to_string()))?;
            parts.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Reject non-success responses, normalizing the error body.
    async fn check(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status,
            message: normalize_error_body(status, &body),
        })
    }

    /// Check the response and decode its JSON body.
    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let response = Self::check(response).await?;
        response.json::<T>().await.map_err(ApiError::from_transport)
    }
}

#[async_trait]
impl ChatApi for HttpApiClient {
    async fn health(&self) -> ApiResult<HealthResponse> {
        let response = self
            .http
            .get(self.config.base_url.clone())
            .timeout(self.config.health_timeout)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::parse(response).await
    }

    async fn create_session(&self, request: SessionCreateRequest) -> ApiResult<Session> {
        let url = self.endpoint(&["sessions"])?;
        let response = self
            .http
            .post(url)
            .json(&request)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::parse(response).await
    }

    async fn list_sessions(&self, skip: u32, limit: u32) -> ApiResult<Vec<Session>> {
        let mut url = self.endpoint(&["sessions"])?;
        url.query_pairs_mut()
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string());
        let response = self
            .http
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::parse(response).await
    }

    async fn get_session(&self, session_id: &str) -> ApiResult<Session> {
        let url = self.endpoint(&["sessions", session_id])?;
        let response = self
            .http
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::parse(response).await
    }

    async fn delete_session(&self, session_id: &str) -> ApiResult<()> {
        let url = self.endpoint(&["sessions", session_id])?;
        let response = self
            .http
            .delete(url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list_messages(&self, session_id: &str) -> ApiResult<ListMessagesResponse> {
        let mut url = self.endpoint(&["messages"])?;
        url.query_pairs_mut().append_pair("session_id", session_id);
        let response = self
            .http
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::parse(response).await
    }

    async fn send_message(&self, request: SendMessageRequest) -> ApiResult<SendMessageResponse> {
        let url = self.endpoint(&["messages"])?;
        let response = self
            .http
            .post(url)
            .json(&request)
            .timeout(self.config.send_timeout)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        Self::parse(response).await
    }
}
