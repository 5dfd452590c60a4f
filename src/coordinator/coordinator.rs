use super::entry::{completion_callback, CompletionCallback, ProgressCallback, Waiter};
use super::{Completion, LoadRequest, PendingRequest, RequestId, RequestRegistry};
use crate::clock::{Clock, SystemClock};
use crate::config::CoordinatorConfig;
use crate::errors::CoordinatorError;
use crate::events::{CoordinatorEvent, EventBus, Subscription};
use crate::net::{Request, Transport, TransportHandle, TransportResult};
use crate::tick::TickResult;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// What `load` did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// A new transport call was started
    Issued { id: RequestId },
    /// The caller joined a request already in flight for the same URL
    Attached { id: RequestId, waiters: usize },
}

impl LoadStatus {
    pub fn id(&self) -> RequestId {
        match self {
            LoadStatus::Issued { id } | LoadStatus::Attached { id, .. } => *id,
        }
    }
}

/// Single point through which URL fetches are issued, deduplicated and resolved.
///
/// The coordinator is a cheap handle; clones share the same registry. Callbacks may capture a
/// clone and call [`load`](Self::load) from inside a tick. Nothing happens between ticks: the
/// host calls [`tick`](Self::tick) on its own cadence (or spawns [`run`](Self::run)) and that is
/// where completion and timeouts are detected and callbacks fire.
pub struct HttpCoordinator<P = ()> {
    inner: Arc<Inner<P>>,
}

struct Inner<P> {
    config: CoordinatorConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    registry: Mutex<RequestRegistry<P>>,
    events: EventBus,
    /// Held for the whole of a tick; ticks from different threads run one after another.
    tick_lock: Mutex<()>,
    /// Thread currently inside `tick`, if any
    ticker: Mutex<Option<ThreadId>>,
}

impl<P> Clone for HttpCoordinator<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P> std::fmt::Debug for HttpCoordinator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCoordinator")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

/// Resolved entries are taken out of the registry before their callbacks run.
enum Resolution<P> {
    Completed(PendingRequest<P>),
    TimedOut(PendingRequest<P>),
}

/// Progress callbacks lent out of an in-flight entry for the duration of a tick.
struct InFlight {
    id: RequestId,
    url: String,
    handle: Arc<dyn TransportHandle>,
    progress: Vec<ProgressCallback>,
}

impl<P: Send + 'static> HttpCoordinator<P> {
    pub fn new(config: CoordinatorConfig, transport: Arc<dyn Transport>) -> Self {
        Self::with_clock(config, transport, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CoordinatorConfig, transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        let events = EventBus::new(config.event_capacity);

        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                clock,
                registry: Mutex::new(RequestRegistry::new()),
                events,
                tick_lock: Mutex::new(()),
                ticker: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// Receive [`CoordinatorEvent`]s from now on.
    pub fn subscribe(&self) -> Subscription {
        self.inner.events.subscribe()
    }

    /// GET `url`. `on_complete` receives `param` back once the request resolves; a missing
    /// callback behaves like one that does nothing.
    pub fn load(
        &self,
        url: &str,
        on_complete: Option<CompletionCallback<P>>,
        param: P,
        timeout: Option<Duration>,
    ) -> Result<LoadStatus, CoordinatorError> {
        self.load_with(
            LoadRequest::new(url, param)
                .on_complete_boxed(on_complete)
                .timeout_opt(timeout),
        )
    }

    /// POST `body` to `url`.
    pub fn load_post(
        &self,
        url: &str,
        on_complete: Option<CompletionCallback<P>>,
        body: Vec<u8>,
        param: P,
        timeout: Option<Duration>,
    ) -> Result<LoadStatus, CoordinatorError> {
        self.load_with(
            LoadRequest::new(url, param)
                .on_complete_boxed(on_complete)
                .body(body)
                .timeout_opt(timeout),
        )
    }

    /// Registers interest in `request.url`.
    ///
    /// If a request for the same URL is already pending, the callbacks are queued on it and no
    /// new transport call is made; the body, headers and timeout of this request are ignored in
    /// that case. Never blocks.
    pub fn load_with(&self, request: LoadRequest<P>) -> Result<LoadStatus, CoordinatorError> {
        if request.url.is_empty() {
            log::error!("[http] URL is empty, request ignored");
            return Err(CoordinatorError::InvalidRequest("URL is empty".into()));
        }

        let timeout = self.inner.config.effective_timeout(request.timeout);
        let LoadRequest {
            url,
            param,
            on_complete,
            on_progress,
            body,
            form,
            headers,
            ..
        } = request;

        let waiter = Waiter {
            callback: on_complete.unwrap_or_else(|| completion_callback(|_| Ok(()))),
            param,
        };

        let mut registry = self.lock_registry();

        if let Some(entry) = registry.lookup_mut(&url) {
            entry.attach(waiter, on_progress);
            let (id, waiters) = (entry.id(), entry.waiters());
            drop(registry);

            log::debug!("[http] {} already in flight, {} waiting", url, waiters);
            self.inner.events.publish(CoordinatorEvent::RequestAttached { id, url, waiters });
            return Ok(LoadStatus::Attached { id, waiters });
        }

        // Started while holding the registry so two callers can never both issue the same URL.
        let handle = self
            .inner
            .transport
            .start(Request::from_parts(url.clone(), body, form, headers));
        let entry = PendingRequest::new(url.clone(), handle, waiter, on_progress, self.inner.clock.now(), timeout);
        let id = entry.id();
        if registry.insert(entry).is_err() {
            // lookup_mut above saw no entry and we still hold the lock
            return Err(CoordinatorError::InvalidRequest(format!("{url} registered twice")));
        }
        drop(registry);

        log::debug!("[http] issued {} ({}), timeout {:?}", url, id, timeout);
        self.inner.events.publish(CoordinatorEvent::RequestIssued { id, url });
        Ok(LoadStatus::Issued { id })
    }

    /// True while a request for `url` is in flight.
    pub fn is_pending(&self, url: &str) -> bool {
        self.lock_registry().lookup(url).is_some()
    }

    /// Number of completion callbacks waiting on `url`
    pub fn waiters(&self, url: &str) -> Option<usize> {
        self.lock_registry().lookup(url).map(|e| e.waiters())
    }

    pub fn pending_count(&self) -> usize {
        self.lock_registry().len()
    }

    /// Advances every pending request by one step.
    ///
    /// Entries whose transport is done have their completion callbacks drained in registration
    /// order. Entries older than their timeout are drained with [`Completion::TimedOut`]. Every
    /// other entry notifies each of its progress callbacks once. Callback errors and panics are
    /// logged and do not stop the drain.
    ///
    /// A `tick()` issued from inside a callback does nothing. A `tick()` from another thread
    /// waits until the running one has finished.
    pub fn tick(&self) -> TickResult {
        let me = thread::current().id();
        if *relock(&self.inner.ticker) == Some(me) {
            log::warn!("[http] tick() called from within a tick, ignored");
            return TickResult::default();
        }
        let _serial = relock(&self.inner.tick_lock);
        let _guard = TickGuard::enter(&self.inner.ticker, me);

        let now = self.inner.clock.now();
        let (resolved, in_flight) = self.partition(now);
        if resolved.is_empty() && in_flight.is_empty() {
            return TickResult::default();
        }

        let mut summary = TickResult::default();
        for resolution in resolved {
            match resolution {
                Resolution::Completed(entry) => self.drain_completed(entry, &mut summary),
                Resolution::TimedOut(entry) => self.drain_timed_out(entry, &mut summary),
            }
        }

        let in_flight = in_flight
            .into_iter()
            .map(|flight| self.notify_progress(flight, &mut summary))
            .collect::<Vec<_>>();

        let mut registry = self.lock_registry();
        for flight in in_flight {
            match registry.lookup_mut(&flight.url) {
                Some(entry) if entry.id() == flight.id => entry.restore_progress(flight.progress),
                _ => log::trace!("[http] {} vanished during tick", flight.url),
            }
        }
        summary.in_flight = registry.len();

        summary
    }

    /// Spawnable loop that ticks every `period` until `cancel` fires.
    pub async fn run(self, period: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let res = self.tick();
                    if !res.is_idle() {
                        log::trace!("[http] tick: {:?}", res);
                    }
                }
            }
        }
    }

    // Splits the registry into resolved entries (removed) and in-flight entries (progress lent).
    fn partition(&self, now: Instant) -> (Vec<Resolution<P>>, Vec<InFlight>) {
        let mut registry = self.lock_registry();
        let mut resolved = Vec::new();
        let mut in_flight = Vec::new();

        for url in registry.urls() {
            let Some(entry) = registry.lookup_mut(&url) else {
                continue;
            };

            if entry.transport().is_done() {
                resolved.extend(registry.remove(&url).map(Resolution::Completed));
            } else if entry.is_expired(now) {
                resolved.extend(registry.remove(&url).map(Resolution::TimedOut));
            } else {
                in_flight.push(InFlight {
                    id: entry.id(),
                    handle: entry.transport().clone(),
                    progress: entry.take_progress(),
                    url,
                });
            }
        }

        (resolved, in_flight)
    }

    fn drain_completed(&self, entry: PendingRequest<P>, summary: &mut TickResult) {
        let (id, url, handle, waiters) = entry.into_waiters();

        let missing;
        let result = match handle.result() {
            Some(result) => result,
            None => {
                missing = TransportResult::connection_error("transport finished without a result");
                &missing
            }
        };

        if result.status.is_error() {
            let err = CoordinatorError::Transport {
                url: url.clone(),
                message: result
                    .error
                    .clone()
                    .unwrap_or_else(|| result.status.to_string()),
            };
            log::error!("[http] {}", err);
        }

        self.drain(id, &url, waiters, summary, |param| Completion::Finished { result, param });
        summary.completed += 1;

        self.inner.events.publish(CoordinatorEvent::RequestCompleted {
            id,
            url,
            status: result.status,
        });
    }

    fn drain_timed_out(&self, entry: PendingRequest<P>, summary: &mut TickResult) {
        let timeout = entry.timeout();
        let (id, url, _handle, waiters) = entry.into_waiters();

        log::warn!(
            "[http] {}",
            CoordinatorError::Timeout {
                url: url.clone(),
                timeout
            }
        );

        self.drain(id, &url, waiters, summary, |_param| Completion::TimedOut { url: &url });
        summary.timed_out += 1;

        self.inner.events.publish(CoordinatorEvent::RequestTimedOut { id, url });
    }

    // Invokes every waiter in FIFO order. A failing callback never stops the drain.
    fn drain<'a>(
        &self,
        id: RequestId,
        url: &str,
        waiters: VecDeque<Waiter<P>>,
        summary: &mut TickResult,
        completion: impl Fn(P) -> Completion<'a, P>,
    ) {
        for Waiter { callback, param } in waiters {
            let outcome = completion(param);
            summary.callbacks_invoked += 1;
            if let Err(message) = guarded(move || callback(outcome)) {
                self.callback_fault(id, url, message, summary);
            }
        }
    }

    fn notify_progress(&self, mut flight: InFlight, summary: &mut TickResult) -> InFlight {
        for cb in flight.progress.iter_mut() {
            let handle = flight.handle.as_ref();
            if let Err(message) = guarded(|| cb(handle)) {
                self.callback_fault(flight.id, &flight.url, message, summary);
            }
        }
        flight
    }

    fn callback_fault(&self, id: RequestId, url: &str, message: String, summary: &mut TickResult) {
        let error = CoordinatorError::CallbackFault {
            url: url.to_string(),
            message,
        };
        log::error!("[http] {}", error);
        summary.callback_faults += 1;
        self.inner.events.publish(CoordinatorEvent::CallbackFailed { id, error });
    }

    fn lock_registry(&self) -> MutexGuard<'_, RequestRegistry<P>> {
        // Callbacks never run under this lock, so a poisoned registry is still consistent.
        relock(&self.inner.registry)
    }
}

/// Callback panics are caught before they can unwind through a guard, so poisoning carries no
/// broken state here.
fn relock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Marks the current thread as the one ticking until dropped.
struct TickGuard<'a>(&'a Mutex<Option<ThreadId>>);

impl<'a> TickGuard<'a> {
    fn enter(ticker: &'a Mutex<Option<ThreadId>>, id: ThreadId) -> Self {
        *relock(ticker) = Some(id);
        Self(ticker)
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        *relock(self.0) = None;
    }
}

/// Runs a callback, turning both errors and panics into a message.
fn guarded(f: impl FnOnce() -> anyhow::Result<()>) -> Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(format!("{e:#}")),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
