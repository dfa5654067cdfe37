//! Event-multiplexing reactor
//!
//! A [`Reactor`] owns one background thread that repeatedly evaluates every
//! registered [`EventSource`]. Each iteration runs the level phase of all
//! sources (predicate-polled [`Poller`]s), then waits for at most the
//! configured interval on the edge-triggered handles and runs the edge
//! phase ([`EdgeSource`]s) for those that fired. With no edge source
//! registered the loop sleeps for the interval instead.
//!
//! Registration and evaluation share one mutex: registering while the
//! loop runs blocks until the current iteration completes. Registrations
//! and interval changes made from a predicate or callback are queued
//! instead and take effect once the running iteration ends. Callbacks run
//! on the reactor thread, so a blocking callback stalls every other
//! source.
//!
//! A failing predicate or callback is not caught. It ends the background
//! loop, which is reported by [`Reactor::state`] as
//! [`ReactorState::Faulted`] and by [`Reactor::join`] as
//! [`ReactorError::Faulted`].
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use nrf24_reactor::{Reactor, ReactorConfig};
//!
//! # fn main() -> Result<(), nrf24_reactor::ReactorError> {
//! let mut reactor = Reactor::new(ReactorConfig::default().with_interval(Duration::from_millis(5)));
//! reactor.poll(|| Ok(true), || {
//!     println!("tick");
//!     Ok(())
//! })?;
//! reactor.start()?;
//! std::thread::sleep(Duration::from_millis(50));
//! reactor.join()?;
//! # Ok(())
//! # }
//! ```

mod selector;
mod source;

pub use selector::*;
pub use source::*;

use std::io;
use std::mem;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use log::{debug, error, info, trace, warn};

use crate::error::{CallbackError, ReactorError};

/// Handle watched by a [`Selector`], such as a GPIO value file descriptor
pub type Handle = RawFd;

/// Reactor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactorConfig {
    /// Upper bound on one wait, and the sleep when no edge source exists.
    /// Also the worst-case latency of [`Reactor::join`].
    pub interval: Duration,
}

impl ReactorConfig {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1);

    pub fn with_interval(self, interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

/// Lifecycle of the background loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactorState {
    /// Never started
    Idle,
    Running,
    /// Joined after a clean shutdown
    Stopped,
    /// The loop ended on a failing predicate or callback
    Faulted(String),
}

struct Registry {
    sources: Vec<Box<dyn EventSource>>,
    selector: Option<Box<dyn Selector>>,
    /// Handles reported by the selector but not yet dispatched
    ready: Vec<Handle>,
    interval: Duration,
}

impl Registry {
    fn has_edges(&self) -> bool {
        self.sources.iter().any(|source| source.handle().is_some())
    }

    fn selector(&mut self) -> io::Result<&mut (dyn Selector + 'static)> {
        if self.selector.is_none() {
            self.selector = Some(default_selector()?);
        }
        self.selector
            .as_deref_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "no selector"))
    }

    /// Adds `source`, registering its handle with the selector.
    ///
    /// Once the selector accepts the handle the source is kept, even if
    /// draining the registration wake fails afterwards.
    fn add(&mut self, source: Box<dyn EventSource>) -> Result<(), ReactorError> {
        let Some(handle) = source.handle() else {
            self.sources.push(source);
            debug!("registered polled source");
            return Ok(());
        };

        if self.sources.iter().any(|s| s.handle() == Some(handle)) {
            return Err(ReactorError::AlreadyRegistered(handle));
        }
        self.selector()?.register(handle)?;
        self.sources.push(source);
        debug!("registered edge source on handle {handle}");

        let mut woken = Vec::new();
        self.selector()?.wait(&mut woken, Duration::ZERO)?;
        let before = woken.len();
        woken.retain(|&h| h != handle);
        if woken.len() != before {
            trace!("discarded registration wake on handle {handle}");
        }
        self.ready.extend(woken);
        Ok(())
    }
}

/// Changes requested from inside a running iteration
#[derive(Default)]
struct Deferred {
    sources: Vec<Box<dyn EventSource>>,
    interval: Option<Duration>,
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn default_selector() -> io::Result<Box<dyn Selector>> {
    Ok(Box::new(Epoll::new()?))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn default_selector() -> io::Result<Box<dyn Selector>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "no edge notification facility on this platform",
    ))
}

struct Shared {
    registry: Mutex<Registry>,
    /// Thread currently evaluating sources while holding `registry`
    evaluator: Mutex<Option<ThreadId>>,
    deferred: Mutex<Deferred>,
    shutdown: AtomicBool,
    state: Mutex<ReactorState>,
}

impl Shared {
    fn registry(&self) -> Result<MutexGuard<'_, Registry>, ReactorError> {
        self.registry.lock().map_err(|_| ReactorError::Poisoned)
    }

    fn set_state(&self, state: ReactorState) {
        match self.state.lock() {
            Ok(mut current) => *current = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }
    }

    fn state(&self) -> ReactorState {
        match self.state.lock() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set_evaluator(&self, thread: Option<ThreadId>) {
        match self.evaluator.lock() {
            Ok(mut current) => *current = thread,
            Err(poisoned) => *poisoned.into_inner() = thread,
        }
    }

    /// Whether the calling thread is inside an iteration, so taking
    /// `registry` again would deadlock
    fn in_iteration(&self) -> bool {
        let current = thread::current().id();
        match self.evaluator.lock() {
            Ok(thread) => *thread == Some(current),
            Err(poisoned) => *poisoned.into_inner() == Some(current),
        }
    }

    fn deferred(&self) -> Result<MutexGuard<'_, Deferred>, ReactorError> {
        self.deferred.lock().map_err(|_| ReactorError::Poisoned)
    }

    fn add(&self, source: Box<dyn EventSource>) -> Result<(), ReactorError> {
        if self.in_iteration() {
            trace!("deferring registration until the iteration ends");
            self.deferred()?.sources.push(source);
            return Ok(());
        }
        self.registry()?.add(source)
    }

    fn set_interval(&self, interval: Duration) -> Result<(), ReactorError> {
        if self.in_iteration() {
            self.deferred()?.interval = Some(interval);
            return Ok(());
        }
        self.registry()?.interval = interval;
        Ok(())
    }

    fn run_once(&self) -> Result<(), CallbackError> {
        if self.in_iteration() {
            return Err(ReactorError::Reentrant.into());
        }
        let mut registry = self.registry()?;

        self.set_evaluator(Some(thread::current().id()));
        let evaluated = Self::evaluate(&mut registry);
        self.set_evaluator(None);
        let merged = self.merge(&mut registry);
        drop(registry);

        let idle = evaluated?;
        merged?;
        if let Some(interval) = idle {
            thread::sleep(interval);
        }
        Ok(())
    }

    /// Runs both phases. Returns the interval to sleep once the registry
    /// is released when no edge source exists.
    fn evaluate(registry: &mut Registry) -> Result<Option<Duration>, CallbackError> {
        for source in registry.sources.iter_mut() {
            source.poll()?;
        }

        if !registry.has_edges() {
            return Ok(Some(registry.interval));
        }

        let interval = registry.interval;
        let mut ready = mem::take(&mut registry.ready);
        registry.selector()?.wait(&mut ready, interval)?;
        if !ready.is_empty() {
            trace!("edges on {:?}", ready);
        }
        for source in registry.sources.iter_mut() {
            source.notify(&ready)?;
        }
        Ok(None)
    }

    /// Applies the changes queued by callbacks of the last iteration
    fn merge(&self, registry: &mut Registry) -> Result<(), ReactorError> {
        let deferred = mem::take(&mut *self.deferred()?);
        if let Some(interval) = deferred.interval {
            registry.interval = interval;
        }
        for source in deferred.sources {
            registry.add(source)?;
        }
        Ok(())
    }

    fn run(&self) {
        while !self.shutdown.load(Ordering::Acquire) {
            if let Err(error) = self.run_once() {
                error!("reactor loop terminated: {error}");
                self.set_state(ReactorState::Faulted(error.to_string()));
                return;
            }
            // let blocked registrations take the lock
            thread::yield_now();
        }
    }
}

/// Background event loop multiplexing polled conditions and edge-triggered
/// handles
pub struct Reactor {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl Reactor {
    /// Creates a reactor using the platform selector, opened on the first
    /// edge registration
    pub fn new(config: ReactorConfig) -> Self {
        Self::build(config, None)
    }

    /// Creates a reactor waiting on `selector` instead of the platform one
    pub fn with_selector(config: ReactorConfig, selector: Box<dyn Selector>) -> Self {
        Self::build(config, Some(selector))
    }

    fn build(config: ReactorConfig, selector: Option<Box<dyn Selector>>) -> Self {
        let registry = Registry {
            sources: Vec::new(),
            selector,
            ready: Vec::new(),
            interval: config.interval,
        };
        Self {
            shared: Arc::new(Shared {
                registry: Mutex::new(registry),
                evaluator: Mutex::new(None),
                deferred: Mutex::new(Deferred::default()),
                shutdown: AtomicBool::new(false),
                state: Mutex::new(ReactorState::Idle),
            }),
            thread: None,
        }
    }

    /// Registers a level-triggered condition. `callback` runs on every
    /// iteration in which `predicate` returns `true`.
    pub fn poll<P, C>(&self, predicate: P, callback: C) -> Result<(), ReactorError>
    where
        P: FnMut() -> Result<bool, CallbackError> + Send + 'static,
        C: FnMut() -> Result<(), CallbackError> + Send + 'static,
    {
        self.add(Box::new(Poller::new(Box::new(predicate), Box::new(callback))))
    }

    /// Registers an edge-triggered handle. `callback` runs on every
    /// iteration in which the selector reports `handle`.
    pub fn select<C>(&self, handle: Handle, callback: C) -> Result<(), ReactorError>
    where
        C: FnMut() -> Result<(), CallbackError> + Send + 'static,
    {
        self.add(Box::new(EdgeSource::new(handle, Box::new(callback))))
    }

    /// Registers any event source.
    ///
    /// A source with a handle is registered with the selector, and the
    /// wake the selector raises right after registration is discarded.
    /// Wakes reported for other handles during that drain are kept for the
    /// next iteration. Called from a predicate or callback of this
    /// reactor, the source is queued and registered when the running
    /// iteration ends; registration errors then end that iteration.
    pub fn add(&self, source: Box<dyn EventSource>) -> Result<(), ReactorError> {
        self.shared.add(source)
    }

    /// Changes the wait interval, effective from the next iteration
    pub fn set_interval(&self, interval: Duration) -> Result<(), ReactorError> {
        self.shared.set_interval(interval)
    }

    /// Runs a single iteration on the calling thread, for callers driving
    /// the reactor without the background loop.
    ///
    /// Fails with [`ReactorError::Reentrant`] when called from one of this
    /// reactor's own callbacks.
    pub fn run_once(&self) -> Result<(), CallbackError> {
        self.shared.run_once()
    }

    /// Spawns the background loop, joining a previous run first
    pub fn start(&mut self) -> Result<(), ReactorError> {
        if self.thread.is_some() {
            if let Err(error) = self.join() {
                warn!("previous reactor run ended with: {error}");
            }
        }

        self.shared.shutdown.store(false, Ordering::Release);
        self.shared.set_state(ReactorState::Running);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("reactor".into())
            .spawn(move || shared.run());
        match spawned {
            Ok(thread) => {
                self.thread = Some(thread);
                info!("reactor started");
                Ok(())
            }
            Err(error) => {
                self.shared.set_state(ReactorState::Stopped);
                Err(error.into())
            }
        }
    }

    /// Requests shutdown and blocks until the background loop exits.
    ///
    /// Returns [`ReactorError::Faulted`] if the loop ended on a failing
    /// predicate or callback rather than on this request.
    pub fn join(&mut self) -> Result<(), ReactorError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        self.shared.shutdown.store(true, Ordering::Release);
        if thread.join().is_err() {
            error!("reactor thread panicked");
            self.shared
                .set_state(ReactorState::Faulted("callback panicked".into()));
        }

        match self.shared.state() {
            ReactorState::Faulted(message) => Err(ReactorError::Faulted(message)),
            _ => {
                self.shared.set_state(ReactorState::Stopped);
                info!("reactor stopped");
                Ok(())
            }
        }
    }

    pub fn state(&self) -> ReactorState {
        self.shared.state()
    }

    /// Whether the background loop is alive
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new(ReactorConfig::default())
    }
}

impl Drop for Reactor {
    fn drop(&mut self) {
        if let Err(error) = self.join() {
            warn!("reactor dropped after fault: {error}");
        }
    }
}
