//! Event sources
//!
//! Every iteration of the reactor runs two phases over its sources in
//! registration order: [`EventSource::poll`] before the wait and
//! [`EventSource::notify`] after it, with the handles the selector
//! reported. A level-triggered [`Poller`] acts in the first phase, an
//! edge-triggered [`EdgeSource`] in the second.

use crate::error::CallbackError;

use super::Handle;

/// Condition evaluated by a [`Poller`] on every iteration
pub type Predicate = Box<dyn FnMut() -> Result<bool, CallbackError> + Send>;

/// Work run by the reactor when a source fires
pub type Callback = Box<dyn FnMut() -> Result<(), CallbackError> + Send>;

/// Something the reactor evaluates on each iteration
pub trait EventSource: Send {
    /// Level phase, run before the wait
    fn poll(&mut self) -> Result<(), CallbackError> {
        Ok(())
    }

    /// Edge phase, run after the wait with every handle that fired
    fn notify(&mut self, _ready: &[Handle]) -> Result<(), CallbackError> {
        Ok(())
    }

    /// Handle the selector must watch for this source, if any
    fn handle(&self) -> Option<Handle> {
        None
    }
}

/// Level-triggered source: runs its callback on every iteration in which
/// the predicate holds
pub struct Poller {
    predicate: Predicate,
    callback: Callback,
}

impl Poller {
    pub fn new(predicate: Predicate, callback: Callback) -> Self {
        Self { predicate, callback }
    }
}

impl EventSource for Poller {
    fn poll(&mut self) -> Result<(), CallbackError> {
        if (self.predicate)()? {
            (self.callback)()?;
        }
        Ok(())
    }
}

/// Edge-triggered source: runs its callback when the selector reports
/// its handle
pub struct EdgeSource {
    handle: Handle,
    callback: Callback,
}

impl EdgeSource {
    pub fn new(handle: Handle, callback: Callback) -> Self {
        Self { handle, callback }
    }
}

impl EventSource for EdgeSource {
    fn notify(&mut self, ready: &[Handle]) -> Result<(), CallbackError> {
        if ready.contains(&self.handle) {
            (self.callback)()?;
        }
        Ok(())
    }

    fn handle(&self) -> Option<Handle> {
        Some(self.handle)
    }
}
