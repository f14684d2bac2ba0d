//! Wire types for the task API
//!
//! Every response is wrapped in an [`ApiResponse`] envelope. Field names
//! match the JSON the server produces (`snake_case`).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskdeckError};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Uniform wrapper around every API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// `true` when the server reports an application-level failure.
    #[serde(default)]
    pub error: bool,

    /// Human-readable status or error message.
    #[serde(default)]
    pub message: String,

    /// Response payload, absent on errors and on some mutations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Pagination, sort, and filter metadata for list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T> ApiResponse<T> {
    /// Builds a successful envelope carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            error: false,
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    /// Builds an error envelope.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            data: None,
            meta: None,
        }
    }

    /// Attaches metadata to the envelope.
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Converts an error envelope into [`TaskdeckError::Api`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskdeckError::Api`] carrying the server message when
    /// `error` is set.
    pub fn ensure_ok(self) -> Result<Self> {
        if self.error {
            return Err(TaskdeckError::Api(self.message).into());
        }
        Ok(self)
    }
}

/// Response metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Server-reported pagination for a task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            total: 0,
            total_pages: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Credentials submitted to `POST /auth/login`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token pair returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: i64,
}

/// The logged-in user, reconstructed from token claims.
///
/// Timestamps are local bookkeeping, not server data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// All statuses in display order.
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    /// The wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "invalid status '{}': expected pending, in_progress, completed or cancelled",
                    s
                )
            })
    }
}

/// A task as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
}

/// Body of `PUT /tasks/:id`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

/// Field a task list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Status,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            "title" => Ok(SortField::Title),
            "status" => Ok(SortField::Status),
            other => Err(format!(
                "invalid sort field '{}': expected created_at, updated_at, title or status",
                other
            )),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("invalid sort order '{}': expected asc or desc", other)),
        }
    }
}

/// Query parameters for `GET /tasks`, also used as the store's filters.
///
/// Unset fields are omitted from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<SortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl TaskListParams {
    /// The filters a fresh store starts with: first page of ten, newest
    /// first.
    pub fn default_filters() -> Self {
        Self {
            page: Some(1),
            limit: Some(10),
            status: None,
            search: None,
            sort_field: Some(SortField::CreatedAt),
            sort_order: Some(SortOrder::Desc),
        }
    }

    /// Applies a partial filter update.
    pub fn merge(&mut self, update: TaskFilterUpdate) {
        if let Some(page) = update.page {
            self.page = page;
        }
        if let Some(limit) = update.limit {
            self.limit = limit;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(search) = update.search {
            self.search = search;
        }
        if let Some(sort_field) = update.sort_field {
            self.sort_field = sort_field;
        }
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
    }
}

/// Partial update of the store's filters.
///
/// The outer `Option` says whether a field is touched at all; `Some(None)`
/// removes the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilterUpdate {
    pub page: Option<Option<u32>>,
    pub limit: Option<Option<u32>>,
    pub status: Option<Option<TaskStatus>>,
    pub search: Option<Option<String>>,
    pub sort_field: Option<Option<SortField>>,
    pub sort_order: Option<Option<SortOrder>>,
}

/// Sets every field that is `Some` in the params and leaves the rest alone.
impl From<TaskListParams> for TaskFilterUpdate {
    fn from(params: TaskListParams) -> Self {
        Self {
            page: params.page.map(Some),
            limit: params.limit.map(Some),
            status: params.status.map(Some),
            search: params.search.map(Some),
            sort_field: params.sort_field.map(Some),
            sort_order: params.sort_order.map(Some),
        }
    }
}
