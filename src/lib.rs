//! Taskdeck - task manager client library
//!
//! This library provides the state layer of a task manager front end: an
//! authentication session backed by persisted tokens, a task collection kept
//! consistent with the remote API, and the transport both talk through.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `token`: Unverified decoding of signed session tokens
//! - `api`: Wire types, the transport trait, and the reqwest client
//! - `storage`: Persistence of the access/refresh token pair
//! - `stores`: Observable session and task stores
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` and `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use taskdeck::commands::App;
//! use taskdeck::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let app = App::from_config(&config)?;
//!     if app.session.is_authenticated() {
//!         let tasks = app.tasks.fetch_tasks(None).await?;
//!         println!("{} tasks", tasks.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod storage;
pub mod stores;
pub mod token;

// Re-export commonly used types
pub use api::{ApiTransport, Task, TaskStatus, TransportEvent, User};
pub use config::Config;
pub use error::{Result, TaskdeckError};
pub use storage::TokenRepository;
pub use stores::{SessionStore, TaskStore};

#[cfg(test)]
pub mod test_utils;
