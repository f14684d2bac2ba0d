//! Observable application state
//!
//! Two stores hold everything the front end renders:
//!
//! - [`SessionStore`] -- who is logged in, backed by the persisted token pair.
//! - [`TaskStore`] -- the local task collection, filters, and pagination.
//!
//! Both publish their state through `tokio::sync::watch` channels. Every
//! asynchronous action tracks its own loading/error slot and releases it on
//! every exit path, cancellation included.

pub(crate) mod operation;
pub mod session;
pub mod tasks;

pub use operation::OperationState;
pub use session::{SessionState, SessionStore, PLACEHOLDER_USER_ID};
pub use tasks::{TaskStore, TaskStoreState, TasksByStatus};
