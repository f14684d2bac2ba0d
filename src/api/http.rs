//! reqwest-backed task API client
//!
//! [`HttpApiClient`] wraps every request the same way:
//!
//! - The access token is read from the shared [`TokenRepository`] right
//!   before sending and attached as `Authorization: Bearer <token>`.
//! - A `401 Unauthorized` clears the repository and broadcasts
//!   [`TransportEvent::Unauthorized`], whichever store issued the request.
//! - Other non-success statuses become [`TaskdeckError::Api`] when the body
//!   is an API envelope, and [`TaskdeckError::Status`] otherwise.
//!
//! Network failures and timeouts surface as [`TaskdeckError::Http`]. There
//! are no retries.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use tokio::sync::broadcast;
use url::Url;

use crate::api::types::{
    ApiResponse, CreateTaskRequest, LoginRequest, LoginResponse, Task, TaskListParams,
    UpdateTaskRequest,
};
use crate::api::{ApiTransport, TransportEvent};
use crate::config::ApiConfig;
use crate::error::{Result, TaskdeckError};
use crate::storage::TokenRepository;

/// Capacity of the transport event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// HTTP client for the task API.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck::api::http::HttpApiClient;
/// use taskdeck::config::ApiConfig;
/// use taskdeck::storage::MemoryTokenStore;
///
/// let client = HttpApiClient::new(&ApiConfig::default(), Arc::new(MemoryTokenStore::new()))
///     .unwrap();
/// let mut events = client.subscribe();
/// ```
#[derive(Debug)]
pub struct HttpApiClient {
    /// Underlying reqwest HTTP client.
    http_client: reqwest::Client,
    /// API root, e.g. `http://localhost:3000/api/v1`.
    base_url: Url,
    /// Shared persisted token pair.
    tokens: Arc<dyn TokenRepository>,
    /// Broadcasts cross-cutting events such as forced logout.
    events: broadcast::Sender<TransportEvent>,
}

impl HttpApiClient {
    /// Builds a client for `config.base_url` with a fixed per-request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TaskdeckError::Config`] if the base URL does not parse, or
    /// [`TaskdeckError::Http`] if the TLS backend cannot be initialised.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenRepository>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            TaskdeckError::Config(format!("Invalid API base URL {}: {}", config.base_url, e))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(TaskdeckError::Http)?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            http_client,
            base_url,
            tokens,
            events,
        })
    }

    /// Subscribes to transport events.
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    /// The API root this client targets.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TaskdeckError::Config(format!("API base URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.load() {
            Ok(pair) => match pair.access_token {
                Some(token) => request.bearer_auth(token),
                None => request,
            },
            Err(e) => {
                tracing::warn!("Could not read stored access token: {:#}", e);
                request
            }
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<ApiResponse<T>> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(TaskdeckError::Http)?;

        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await.map_err(TaskdeckError::Http)?;
        tracing::debug!("{} -> {}", url.path(), status);

        if status == StatusCode::UNAUTHORIZED {
            let message = envelope_message(&body).unwrap_or_else(|| "Unauthorized".to_string());
            self.handle_unauthorized();
            return Err(TaskdeckError::Authentication(message).into());
        }

        if !status.is_success() {
            return Err(match envelope_message(&body) {
                Some(message) => TaskdeckError::Api(message),
                None => TaskdeckError::Status {
                    status: status.as_u16(),
                },
            }
            .into());
        }

        Ok(serde_json::from_slice(&body).map_err(TaskdeckError::Serialization)?)
    }

    fn handle_unauthorized(&self) {
        tracing::warn!("Server rejected the session; clearing stored tokens");
        if let Err(e) = self.tokens.clear() {
            tracing::warn!("Failed to clear stored tokens: {:#}", e);
        }
        // No subscribers is fine; the tokens are already gone.
        let _ = self.events.send(TransportEvent::Unauthorized);
    }
}

/// Extracts the `message` of an envelope body, if the body is one.
fn envelope_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ApiResponse<IgnoredAny>>(body)
        .ok()
        .map(|envelope| envelope.message)
        .filter(|message| !message.is_empty())
}

#[async_trait::async_trait]
impl ApiTransport for HttpApiClient {
    async fn login(&self, credentials: &LoginRequest) -> Result<ApiResponse<LoginResponse>> {
        let url = self.endpoint(&["auth", "login"])?;
        tracing::debug!("Logging in as {}", credentials.email);
        self.send(self.http_client.post(url).json(credentials)).await
    }

    async fn get_tasks(&self, params: &TaskListParams) -> Result<ApiResponse<Vec<Task>>> {
        let url = self.endpoint(&["tasks"])?;
        self.send(self.http_client.get(url).query(params)).await
    }

    async fn get_task(&self, id: &str) -> Result<ApiResponse<Task>> {
        let url = self.endpoint(&["tasks", id])?;
        self.send(self.http_client.get(url)).await
    }

    async fn create_task(&self, task: &CreateTaskRequest) -> Result<ApiResponse<Task>> {
        let url = self.endpoint(&["tasks"])?;
        self.send(self.http_client.post(url).json(task)).await
    }

    async fn update_task(
        &self,
        id: &str,
        task: &UpdateTaskRequest,
    ) -> Result<ApiResponse<Task>> {
        let url = self.endpoint(&["tasks", id])?;
        self.send(self.http_client.put(url).json(task)).await
    }

    async fn delete_task(&self, id: &str) -> Result<ApiResponse<IgnoredAny>> {
        let url = self.endpoint(&["tasks", id])?;
        self.send(self.http_client.delete(url)).await
    }
}
