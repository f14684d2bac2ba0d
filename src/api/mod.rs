//! Task API transport abstraction and implementations
//!
//! This module defines the [`ApiTransport`] trait that the stores call into.
//! Concrete implementations live in submodules:
//!
//! - [`http::HttpApiClient`] -- reqwest client that attaches the bearer
//!   token and reacts to `401 Unauthorized` responses.
//! - `fake::FakeApi` -- scripted in-process fake used in unit tests
//!   (cfg(test) only).
//!
//! # Authentication failures
//!
//! A `401` from any endpoint is handled here, not in the stores: the
//! persisted token pair is cleared and a [`TransportEvent::Unauthorized`]
//! is broadcast. The session store subscribes to these events; the front
//! end reacts by sending the user back to the login surface.

use serde::de::IgnoredAny;

use crate::error::Result;

pub mod http;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use types::{
    ApiResponse, CreateTaskRequest, LoginRequest, LoginResponse, Meta, Pagination, SortField,
    SortOrder, Task, TaskFilterUpdate, TaskListParams, TaskStatus, UpdateTaskRequest, User,
};

/// Cross-cutting events emitted by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The server rejected the session; persisted tokens were cleared and
    /// the user must log in again.
    Unauthorized,
}

/// Abstraction over the remote task API.
///
/// Every method is a thin pass-through returning the decoded envelope.
/// Application-level failures arrive as envelopes with `error: true`;
/// callers convert them with [`ApiResponse::ensure_ok`].
#[async_trait::async_trait]
pub trait ApiTransport: Send + Sync + std::fmt::Debug {
    /// `POST /auth/login`
    async fn login(&self, credentials: &LoginRequest) -> Result<ApiResponse<LoginResponse>>;

    /// `GET /tasks` with `params` as the query string.
    async fn get_tasks(&self, params: &TaskListParams) -> Result<ApiResponse<Vec<Task>>>;

    /// `GET /tasks/:id`
    async fn get_task(&self, id: &str) -> Result<ApiResponse<Task>>;

    /// `POST /tasks`
    async fn create_task(&self, task: &CreateTaskRequest) -> Result<ApiResponse<Task>>;

    /// `PUT /tasks/:id`
    async fn update_task(&self, id: &str, task: &UpdateTaskRequest)
        -> Result<ApiResponse<Task>>;

    /// `DELETE /tasks/:id`
    async fn delete_task(&self, id: &str) -> Result<ApiResponse<IgnoredAny>>;
}
