//! Loading and error bookkeeping for asynchronous store actions

use tokio::sync::watch;

use crate::error::{error_message, is_authentication_error};

/// Loading/error slot of one asynchronous operation.
///
/// Loading is tracked as a count of calls in flight, so overlapping calls
/// keep the slot loading until the last one finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    in_flight: usize,
    error: Option<String>,
}

impl OperationState {
    /// `true` while at least one call is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Message of the most recent failure, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn clear_error(&mut self) {
        self.error = None;
    }
}

/// Selects an [`OperationState`] inside a store's state.
pub(crate) type SlotFn<S> = fn(&mut S) -> &mut OperationState;

/// Marks one call in flight for as long as it lives.
///
/// The call is released exactly once: by [`InFlight::succeed`],
/// [`InFlight::fail`], or on drop when the call's future is cancelled.
pub(crate) struct InFlight<'a, S> {
    state: &'a watch::Sender<S>,
    slot: SlotFn<S>,
    armed: bool,
}

impl<'a, S> InFlight<'a, S> {
    /// Starts a call: bumps the in-flight count and clears the slot's error.
    pub(crate) fn begin(state: &'a watch::Sender<S>, slot: SlotFn<S>) -> Self {
        state.send_modify(|s| {
            let op = slot(s);
            op.in_flight += 1;
            op.error = None;
        });
        Self {
            state,
            slot,
            armed: true,
        }
    }

    /// Applies the successful outcome and releases the call in one update.
    pub(crate) fn succeed(mut self, apply: impl FnOnce(&mut S)) {
        let slot = self.slot;
        self.armed = false;
        self.state.send_modify(|s| {
            apply(s);
            release(slot(s));
        });
    }

    /// Records the failure and releases the call in one update.
    ///
    /// Authentication failures are not recorded: the transport has already
    /// ended the session.
    pub(crate) fn fail(self, err: &anyhow::Error) {
        let message = error_message(err);
        self.fail_with(|op| {
            if !is_authentication_error(err) {
                op.error = Some(message);
            }
        });
    }

    /// Records `message` unconditionally and releases the call.
    pub(crate) fn fail_with_message(self, message: String) {
        self.fail_with(|op| op.error = Some(message));
    }

    fn fail_with(mut self, record: impl FnOnce(&mut OperationState)) {
        let slot = self.slot;
        self.armed = false;
        self.state.send_modify(|s| {
            let op = slot(s);
            record(op);
            release(op);
        });
    }
}

impl<S> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            let slot = self.slot;
            self.state.send_modify(|s| release(slot(s)));
        }
    }
}

fn release(op: &mut OperationState) {
    op.in_flight = op.in_flight.saturating_sub(1);
}
