//! Scripted in-process fake of the task API for unit tests
//!
//! Each endpoint has a queue of canned results. A call pops the next result
//! for its endpoint; when the queue is empty the call never completes, which
//! lets tests observe in-flight state and cancellation.
//!
//! Every call is recorded so tests can assert on what the store sent.
//!
//! # Example
//!
//! ```ignore
//! let api = FakeApi::new();
//! api.push_get_task(Ok(ApiResponse::ok("ok", sample_task("t1", "Docs"))));
//! let task = api.get_task("t1").await?.data;
//! assert_eq!(api.calls(), vec![FakeCall::GetTask("t1".into())]);
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::IgnoredAny;

use crate::api::types::{
    ApiResponse, CreateTaskRequest, LoginRequest, LoginResponse, Task, TaskListParams,
    UpdateTaskRequest,
};
use crate::api::ApiTransport;
use crate::error::Result;

/// A request the fake received.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCall {
    Login(String),
    GetTasks(TaskListParams),
    GetTask(String),
    CreateTask(CreateTaskRequest),
    UpdateTask(String, UpdateTaskRequest),
    DeleteTask(String),
}

#[derive(Default)]
struct Script {
    login: VecDeque<Result<ApiResponse<LoginResponse>>>,
    get_tasks: VecDeque<Result<ApiResponse<Vec<Task>>>>,
    get_task: VecDeque<Result<ApiResponse<Task>>>,
    create_task: VecDeque<Result<ApiResponse<Task>>>,
    update_task: VecDeque<Result<ApiResponse<Task>>>,
    delete_task: VecDeque<Result<ApiResponse<IgnoredAny>>>,
    calls: Vec<FakeCall>,
}

/// Scripted [`ApiTransport`] for tests.
#[derive(Default)]
pub struct FakeApi {
    script: Mutex<Script>,
}

impl std::fmt::Debug for FakeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeApi")
            .field("calls", &self.lock().calls.len())
            .finish()
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Everything the fake received, in order.
    pub fn calls(&self) -> Vec<FakeCall> {
        self.lock().calls.clone()
    }

    pub fn push_login(&self, result: Result<ApiResponse<LoginResponse>>) {
        self.lock().login.push_back(result);
    }

    pub fn push_get_tasks(&self, result: Result<ApiResponse<Vec<Task>>>) {
        self.lock().get_tasks.push_back(result);
    }

    pub fn push_get_task(&self, result: Result<ApiResponse<Task>>) {
        self.lock().get_task.push_back(result);
    }

    pub fn push_create_task(&self, result: Result<ApiResponse<Task>>) {
        self.lock().create_task.push_back(result);
    }

    pub fn push_update_task(&self, result: Result<ApiResponse<Task>>) {
        self.lock().update_task.push_back(result);
    }

    pub fn push_delete_task(&self, result: Result<ApiResponse<IgnoredAny>>) {
        self.lock().delete_task.push_back(result);
    }

    /// Records `call` and pops the next scripted result from the queue
    /// chosen by `queue`. Waits forever when the queue is empty.
    async fn respond<T>(
        &self,
        call: FakeCall,
        queue: fn(&mut Script) -> &mut VecDeque<Result<T>>,
    ) -> Result<T> {
        let next = {
            let mut script = self.lock();
            script.calls.push(call);
            queue(&mut script).pop_front()
        };
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

#[async_trait::async_trait]
impl ApiTransport for FakeApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<ApiResponse<LoginResponse>> {
        self.respond(FakeCall::Login(credentials.email.clone()), |s| &mut s.login)
            .await
    }

    async fn get_tasks(&self, params: &TaskListParams) -> Result<ApiResponse<Vec<Task>>> {
        self.respond(FakeCall::GetTasks(params.clone()), |s| &mut s.get_tasks)
            .await
    }

    async fn get_task(&self, id: &str) -> Result<ApiResponse<Task>> {
        self.respond(FakeCall::GetTask(id.to_string()), |s| &mut s.get_task)
            .await
    }

    async fn create_task(&self, task: &CreateTaskRequest) -> Result<ApiResponse<Task>> {
        self.respond(FakeCall::CreateTask(task.clone()), |s| &mut s.create_task)
            .await
    }

    async fn update_task(
        &self,
        id: &str,
        task: &UpdateTaskRequest,
    ) -> Result<ApiResponse<Task>> {
        self.respond(
            FakeCall::UpdateTask(id.to_string(), task.clone()),
            |s| &mut s.update_task,
        )
        .await
    }

    async fn delete_task(&self, id: &str) -> Result<ApiResponse<IgnoredAny>> {
        self.respond(FakeCall::DeleteTask(id.to_string()), |s| &mut s.delete_task)
            .await
    }
}
