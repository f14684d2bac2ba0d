//! Authentication session store
//!
//! [`SessionStore`] owns who is logged in. The token pair is the source of
//! truth: the session is authenticated exactly when an access token is
//! held, and the [`User`] is rebuilt from the token's claims whenever the
//! token changes. Every token mutation is written through to the shared
//! [`TokenRepository`].
//!
//! State is published through a [`watch`] channel; each mutation is applied
//! atomically and is visible to every subscriber.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdeck::api::http::HttpApiClient;
//! use taskdeck::api::LoginRequest;
//! use taskdeck::config::ApiConfig;
//! use taskdeck::storage::{MemoryTokenStore, TokenRepository};
//! use taskdeck::stores::SessionStore;
//!
//! # async fn example() -> taskdeck::Result<()> {
//! let tokens: Arc<dyn TokenRepository> = Arc::new(MemoryTokenStore::new());
//! let api = Arc::new(HttpApiClient::new(&ApiConfig::default(), Arc::clone(&tokens))?);
//! let session = Arc::new(SessionStore::new(api.clone(), tokens));
//! session.spawn_event_listener(api.subscribe());
//!
//! session.initialize_auth();
//! if !session.is_authenticated() {
//!     session.login(&LoginRequest::new("a@b.com", "secret")).await?;
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::api::{ApiTransport, LoginRequest, LoginResponse, TransportEvent, User};
use crate::error::{Result, TaskdeckError};
use crate::storage::{TokenPair, TokenRepository};
use crate::stores::operation::{InFlight, OperationState};
use crate::token;

/// Id given to a user whose token claims could not be read at login.
pub const PLACEHOLDER_USER_ID: &str = "user-id";

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Identity derived from the access token's claims.
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    login: OperationState,
}

impl SessionState {
    /// Authenticated exactly when an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// `true` while a login request is in flight.
    pub fn is_loading(&self) -> bool {
        self.login.is_loading()
    }

    /// Message of the last failed login.
    pub fn error(&self) -> Option<&str> {
        self.login.error()
    }

    /// The user's email, or an empty string when anonymous.
    pub fn user_email(&self) -> &str {
        self.user.as_ref().map_or("", |user| user.email.as_str())
    }

    fn clear_credentials(&mut self) {
        self.user = None;
        self.access_token = None;
        self.refresh_token = None;
    }

    fn reset(&mut self) {
        self.clear_credentials();
        self.login.clear_error();
    }
}

/// Owns the authentication session.
#[derive(Debug)]
pub struct SessionStore {
    api: Arc<dyn ApiTransport>,
    tokens: Arc<dyn TokenRepository>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Creates an empty (anonymous) session. Call
    /// [`initialize_auth`](Self::initialize_auth) to restore a persisted one.
    pub fn new(api: Arc<dyn ApiTransport>, tokens: Arc<dyn TokenRepository>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { api, tokens, state }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(str::to_string)
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn user_email(&self) -> String {
        self.state.borrow().user_email().to_string()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().access_token.clone()
    }

    /// Logs in and starts a session.
    ///
    /// On success both tokens are persisted and the user is read from the
    /// access token's claims. When the claims are unreadable the user falls
    /// back to the submitted email with [`PLACEHOLDER_USER_ID`].
    ///
    /// On failure the message is recorded in the error slot, the current
    /// tokens are left alone, and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TaskdeckError::Api`] with the server message when the login
    /// is rejected, or the transport/storage error that interrupted it.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
        let call = InFlight::begin(&self.state, |s| &mut s.login);

        match self.try_login(credentials).await {
            Ok((response, user)) => {
                tracing::info!("Logged in as {}", user.email);
                let tokens = response.clone();
                call.succeed(move |s| {
                    s.access_token = Some(tokens.access_token);
                    s.refresh_token = Some(tokens.refresh_token);
                    s.user = Some(user);
                });
                Ok(response)
            }
            Err(err) => {
                tracing::warn!("Login failed: {:#}", err);
                call.fail_with_message(crate::error::error_message(&err));
                Err(err)
            }
        }
    }

    async fn try_login(&self, credentials: &LoginRequest) -> Result<(LoginResponse, User)> {
        let response = self.api.login(credentials).await?.ensure_ok()?;
        let data = response.data.ok_or_else(|| {
            TaskdeckError::Api("Login response did not include tokens".to_string())
        })?;

        self.tokens
            .save(&TokenPair::new(&data.access_token, &data.refresh_token))?;

        let now = Utc::now();
        let user = match token::extract_user_info(&data.access_token) {
            Some(info) => User {
                id: info.user_id,
                email: info.email,
                created_at: now,
                updated_at: now,
            },
            None => {
                // TODO: recover the real id once the login response carries
                // the user record; until then the placeholder sticks.
                tracing::warn!("Could not read claims from access token; using placeholder user id");
                User {
                    id: PLACEHOLDER_USER_ID.to_string(),
                    email: credentials.email.clone(),
                    created_at: now,
                    updated_at: now,
                }
            }
        };

        Ok((data, user))
    }

    /// Ends the session: clears the user, both tokens, and the error.
    /// Idempotent.
    pub fn logout(&self) {
        self.clear_stored_tokens();
        self.state.send_modify(SessionState::reset);
        tracing::info!("Session cleared");
    }

    fn clear_stored_tokens(&self) {
        if let Err(e) = self.tokens.clear() {
            tracing::warn!("Failed to clear stored tokens: {:#}", e);
        }
    }

    /// Clears the error slot.
    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.login.clear_error());
    }

    /// Re-derives the user from the current access token.
    ///
    /// Tokens are never touched. Does nothing without a token or when its
    /// claims cannot be read. An existing user keeps its `created_at`.
    pub fn refresh_user_info(&self) {
        let Some(access_token) = self.access_token() else {
            return;
        };
        let Some(info) = token::extract_user_info(&access_token) else {
            return;
        };

        self.state.send_modify(|s| {
            let now = Utc::now();
            let created_at = s.user.as_ref().map_or(now, |user| user.created_at);
            s.user = Some(User {
                id: info.user_id,
                email: info.email,
                created_at,
                updated_at: now,
            });
        });
    }

    /// Restores the session persisted by a previous run.
    ///
    /// An expired access token, or one whose claims cannot be read, ends the
    /// session instead. Storage read failures are treated as "no session".
    pub fn initialize_auth(&self) {
        let stored = match self.tokens.load() {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("Could not read stored session: {:#}", e);
                TokenPair::default()
            }
        };

        let Some(access_token) = stored.access_token.clone() else {
            self.state.send_modify(|s| {
                s.access_token = None;
                s.refresh_token = stored.refresh_token;
            });
            return;
        };

        if token::is_token_expired(&access_token) {
            tracing::info!("Stored access token has expired");
            self.logout();
            return;
        }

        match token::extract_user_info(&access_token) {
            Some(info) => {
                let now = Utc::now();
                self.state.send_modify(|s| {
                    s.access_token = stored.access_token;
                    s.refresh_token = stored.refresh_token;
                    s.user = Some(User {
                        id: info.user_id,
                        email: info.email,
                        created_at: now,
                        updated_at: now,
                    });
                });
                tracing::info!("Restored session for {}", self.user_email());
            }
            None => {
                tracing::info!("Stored access token has unreadable claims");
                self.logout();
            }
        }
    }

    /// Reacts to a cross-cutting transport event.
    ///
    /// `Unauthorized` drops the user and both tokens but keeps the error
    /// slot, so a rejected login still reports the server's message.
    pub fn handle_transport_event(&self, event: &TransportEvent) {
        match event {
            TransportEvent::Unauthorized => {
                if self.is_authenticated() {
                    tracing::warn!("Session rejected by server; logging out");
                }
                self.clear_stored_tokens();
                self.state.send_modify(SessionState::clear_credentials);
            }
        }
    }

    /// Applies transport events to this store until the channel closes.
    pub fn spawn_event_listener(
        self: &Arc<Self>,
        mut events: broadcast::Receiver<TransportEvent>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => store.handle_transport_event(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("Skipped {} transport events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
