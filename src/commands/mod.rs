/*!
Command handlers for the CLI

This module wires the stores to a transport and dispatches parsed commands.

- `auth`  -- login, logout, whoami
- `tasks` -- list, show, create, update, delete

Handlers only call store actions and render the resulting state; they never
edit store-owned collections directly.
*/

use std::sync::Arc;

use colored::Colorize;

use crate::api::http::HttpApiClient;
use crate::api::ApiTransport;
use crate::cli::Commands;
use crate::config::Config;
use crate::error::{is_authentication_error, Result, TaskdeckError};
use crate::storage::{self, TokenRepository};
use crate::stores::{SessionStore, TaskStore};

pub mod auth;
pub mod tasks;

/// The stores a command works against.
#[derive(Debug)]
pub struct App {
    pub session: Arc<SessionStore>,
    pub tasks: TaskStore,
}

impl App {
    /// Builds the stores over `api` and restores any persisted session.
    pub fn new(api: Arc<dyn ApiTransport>, tokens: Arc<dyn TokenRepository>) -> Self {
        let session = Arc::new(SessionStore::new(Arc::clone(&api), tokens));
        session.initialize_auth();
        Self {
            session,
            tasks: TaskStore::new(api),
        }
    }

    /// Builds the HTTP transport and token storage described by `config`
    /// and subscribes the session to the transport's events.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let tokens = storage::open(&config.storage)?;
        let client = Arc::new(HttpApiClient::new(&config.api, Arc::clone(&tokens))?);
        tracing::debug!("Using API at {}", client.base_url());

        let events = client.subscribe();
        let app = Self::new(client, tokens);
        app.session.spawn_event_listener(events);
        Ok(app)
    }

    /// Fails unless a session is active.
    pub fn require_session(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(TaskdeckError::Authentication(
                "Not logged in. Run `taskdeck login --email <EMAIL>` first".to_string(),
            )
            .into())
        }
    }
}

/// Runs one parsed command.
pub async fn run(app: &App, command: Commands) -> Result<()> {
    let result = match command {
        Commands::Login { email, password } => auth::login(app, email, password).await,
        Commands::Logout => {
            auth::logout(app);
            Ok(())
        }
        Commands::Whoami => auth::whoami(app),
        Commands::Tasks { command } => {
            app.require_session()?;
            tasks::handle_tasks(app, command).await
        }
    };

    if let Err(err) = &result {
        if is_authentication_error(err) && !app.session.is_authenticated() {
            eprintln!(
                "{}",
                "Your session is missing or has expired. Log in again with `taskdeck login`."
                    .yellow()
            );
        }
    }

    result
}
