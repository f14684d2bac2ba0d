//! Task collection store
//!
//! [`TaskStore`] keeps a local copy of the user's tasks consistent with the
//! last successful server response. It is never updated optimistically:
//! the collection changes only after the server confirms an operation.
//!
//! Each of the five operations (list, get, create, update, delete) has its
//! own loading/error slot. Operations are not serialized against each other;
//! when two overlap, whichever response arrives last is applied last.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::{
    ApiResponse, ApiTransport, CreateTaskRequest, Pagination, Task, TaskFilterUpdate,
    TaskListParams, TaskStatus, UpdateTaskRequest,
};
use crate::error::{Result, TaskdeckError};
use crate::stores::operation::{InFlight, OperationState};

/// Observable task store state.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStoreState {
    /// Tasks from the last list fetch, adjusted by later mutations.
    pub tasks: Vec<Task>,
    /// Task loaded by [`TaskStore::fetch_task`].
    pub current_task: Option<Task>,
    /// Pagination reported by the last list fetch.
    pub pagination: Pagination,
    /// Query used when [`TaskStore::fetch_tasks`] gets no explicit params.
    pub filters: TaskListParams,
    list: OperationState,
    get: OperationState,
    create: OperationState,
    update: OperationState,
    delete: OperationState,
}

impl Default for TaskStoreState {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            current_task: None,
            pagination: Pagination::default(),
            filters: TaskListParams::default_filters(),
            list: OperationState::default(),
            get: OperationState::default(),
            create: OperationState::default(),
            update: OperationState::default(),
            delete: OperationState::default(),
        }
    }
}

/// Tasks grouped by status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasksByStatus {
    pub pending: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub completed: Vec<Task>,
    pub cancelled: Vec<Task>,
}

impl TaskStoreState {
    fn slots(&self) -> [&OperationState; 5] {
        [
            &self.list,
            &self.get,
            &self.create,
            &self.update,
            &self.delete,
        ]
    }

    /// `true` while any operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.slots().iter().any(|op| op.is_loading())
    }

    /// First recorded error, in the order list, get, create, update,
    /// delete.
    pub fn error(&self) -> Option<&str> {
        self.slots().into_iter().find_map(OperationState::error)
    }

    pub fn list_state(&self) -> &OperationState {
        &self.list
    }

    pub fn get_state(&self) -> &OperationState {
        &self.get
    }

    pub fn create_state(&self) -> &OperationState {
        &self.create
    }

    pub fn update_state(&self) -> &OperationState {
        &self.update
    }

    pub fn delete_state(&self) -> &OperationState {
        &self.delete
    }

    /// Tasks with `status`, in collection order.
    pub fn with_status(&self, status: TaskStatus) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.status == status)
            .cloned()
            .collect()
    }

    pub fn by_status(&self) -> TasksByStatus {
        let mut grouped = TasksByStatus::default();
        for task in &self.tasks {
            let bucket = match task.status {
                TaskStatus::Pending => &mut grouped.pending,
                TaskStatus::InProgress => &mut grouped.in_progress,
                TaskStatus::Completed => &mut grouped.completed,
                TaskStatus::Cancelled => &mut grouped.cancelled,
            };
            bucket.push(task.clone());
        }
        grouped
    }

    fn clear_errors(&mut self) {
        self.list.clear_error();
        self.get.clear_error();
        self.create.clear_error();
        self.update.clear_error();
        self.delete.clear_error();
    }
}

/// Owns the local task collection.
#[derive(Debug)]
pub struct TaskStore {
    api: Arc<dyn ApiTransport>,
    state: watch::Sender<TaskStoreState>,
}

impl TaskStore {
    pub fn new(api: Arc<dyn ApiTransport>) -> Self {
        let (state, _) = watch::channel(TaskStoreState::default());
        Self { api, state }
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<TaskStoreState> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> TaskStoreState {
        self.state.borrow().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    pub fn current_task(&self) -> Option<Task> {
        self.state.borrow().current_task.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.state.borrow().pagination
    }

    pub fn filters(&self) -> TaskListParams {
        self.state.borrow().filters.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error().map(str::to_string)
    }

    pub fn pending_tasks(&self) -> Vec<Task> {
        self.state.borrow().with_status(TaskStatus::Pending)
    }

    pub fn in_progress_tasks(&self) -> Vec<Task> {
        self.state.borrow().with_status(TaskStatus::InProgress)
    }

    pub fn completed_tasks(&self) -> Vec<Task> {
        self.state.borrow().with_status(TaskStatus::Completed)
    }

    pub fn cancelled_tasks(&self) -> Vec<Task> {
        self.state.borrow().with_status(TaskStatus::Cancelled)
    }

    pub fn tasks_by_status(&self) -> TasksByStatus {
        self.state.borrow().by_status()
    }

    /// Fetches one page of tasks and replaces the collection with it.
    ///
    /// Uses `params` when given, otherwise the current filters. Pagination
    /// is replaced when the response carries it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskdeckError::Api`] with the server message when the
    /// request is rejected, or the transport error that interrupted it.
    pub async fn fetch_tasks(&self, params: Option<TaskListParams>) -> Result<Vec<Task>> {
        let params = params.unwrap_or_else(|| self.filters());
        let call = InFlight::begin(&self.state, |s| &mut s.list);

        let response = match self.api.get_tasks(&params).await.and_then(|r| r.ensure_ok()) {
            Ok(response) => response,
            Err(err) => {
                call.fail(&err);
                return Err(err);
            }
        };

        let tasks = response.data.unwrap_or_default();
        let pagination = response.meta.and_then(|meta| meta.pagination);
        tracing::debug!("Fetched {} tasks", tasks.len());

        let fetched = tasks.clone();
        call.succeed(move |s| {
            s.tasks = fetched;
            if let Some(pagination) = pagination {
                s.pagination = pagination;
            }
        });
        Ok(tasks)
    }

    /// Loads a single task into `current_task`. The collection is not
    /// touched.
    pub async fn fetch_task(&self, id: &str) -> Result<Task> {
        let call = InFlight::begin(&self.state, |s| &mut s.get);

        let task = match into_task(self.api.get_task(id).await) {
            Ok(task) => task,
            Err(err) => {
                call.fail(&err);
                return Err(err);
            }
        };

        let current = task.clone();
        call.succeed(move |s| s.current_task = Some(current));
        Ok(task)
    }

    /// Creates a task and puts it at the front of the collection.
    pub async fn create_task(&self, request: &CreateTaskRequest) -> Result<Task> {
        let call = InFlight::begin(&self.state, |s| &mut s.create);

        let task = match into_task(self.api.create_task(request).await) {
            Ok(task) => task,
            Err(err) => {
                call.fail(&err);
                return Err(err);
            }
        };

        tracing::info!("Created task {}", task.id);
        let created = task.clone();
        call.succeed(move |s| {
            s.tasks.retain(|existing| existing.id != created.id);
            s.tasks.insert(0, created);
        });
        Ok(task)
    }

    /// Updates a task and replaces it in place.
    ///
    /// A task that is not held locally is not added; the server result is
    /// still returned.
    pub async fn update_task(&self, id: &str, request: &UpdateTaskRequest) -> Result<Task> {
        let call = InFlight::begin(&self.state, |s| &mut s.update);

        let task = match into_task(self.api.update_task(id, request).await) {
            Ok(task) => task,
            Err(err) => {
                call.fail(&err);
                return Err(err);
            }
        };

        tracing::info!("Updated task {}", task.id);
        let updated = task.clone();
        call.succeed(move |s| {
            if let Some(slot) = s.tasks.iter_mut().find(|t| t.id == id) {
                *slot = updated.clone();
            }
            if s.current_task.as_ref().is_some_and(|t| t.id == id) {
                s.current_task = Some(updated);
            }
        });
        Ok(task)
    }

    /// Deletes a task and removes it locally.
    pub async fn delete_task(&self, id: &str) -> Result<()> {
        let call = InFlight::begin(&self.state, |s| &mut s.delete);

        if let Err(err) = self.api.delete_task(id).await.and_then(|r| r.ensure_ok()) {
            call.fail(&err);
            return Err(err);
        }

        tracing::info!("Deleted task {}", id);
        call.succeed(|s| {
            s.tasks.retain(|task| task.id != id);
            if s.current_task.as_ref().is_some_and(|t| t.id == id) {
                s.current_task = None;
            }
        });
        Ok(())
    }

    /// Applies a partial update to the filters. Does not refetch.
    ///
    /// Plain [`TaskListParams`] set their `Some` fields; a
    /// [`TaskFilterUpdate`] can also remove a filter.
    pub fn update_filters(&self, update: impl Into<TaskFilterUpdate>) {
        let update = update.into();
        self.state.send_modify(|s| s.filters.merge(update));
    }

    /// Resets the filters to the first page of ten, newest first.
    pub fn clear_filters(&self) {
        self.state
            .send_modify(|s| s.filters = TaskListParams::default_filters());
    }

    /// Clears every operation's error slot.
    pub fn clear_error(&self) {
        self.state.send_modify(TaskStoreState::clear_errors);
    }

    pub fn clear_current_task(&self) {
        self.state.send_modify(|s| s.current_task = None);
    }
}

/// Unwraps a single-task envelope.
fn into_task(response: Result<ApiResponse<Task>>) -> Result<Task> {
    response?
        .ensure_ok()?
        .data
        .ok_or_else(|| TaskdeckError::Api("Response did not include a task".to_string()).into())
}
