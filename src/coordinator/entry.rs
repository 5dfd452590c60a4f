use crate::net::{TransportHandle, TransportResult};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Identifies one transport call issued by the coordinator.
///
/// URLs identify entries while they are pending. Once an entry is resolved the same URL may be
/// loaded again, which yields a fresh `RequestId`. Treat it as an opaque handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a completion callback is told when its request resolves.
#[derive(Debug)]
pub enum Completion<'a, P> {
    /// The transport finished. `result` may still describe a connection or protocol error.
    Finished { result: &'a TransportResult, param: P },
    /// The request did not finish in time. The caller's parameter is dropped and replaced by
    /// the URL of the request.
    TimedOut { url: &'a str },
}

impl<'a, P> Completion<'a, P> {
    /// The transport result, `None` on timeout
    pub fn result(&self) -> Option<&'a TransportResult> {
        match self {
            Completion::Finished { result, .. } => Some(result),
            Completion::TimedOut { .. } => None,
        }
    }

    pub fn param(&self) -> Option<&P> {
        match self {
            Completion::Finished { param, .. } => Some(param),
            Completion::TimedOut { .. } => None,
        }
    }

    pub fn into_param(self) -> Option<P> {
        match self {
            Completion::Finished { param, .. } => Some(param),
            Completion::TimedOut { .. } => None,
        }
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Completion::TimedOut { .. })
    }
}

/// Called exactly once when a request resolves, either by completion or by timeout.
pub type CompletionCallback<P> =
    Box<dyn for<'a> FnOnce(Completion<'a, P>) -> anyhow::Result<()> + Send>;

/// Called once per tick with the live transport handle while the request is in flight.
pub type ProgressCallback = Box<dyn FnMut(&dyn TransportHandle) -> anyhow::Result<()> + Send>;

/// Boxes a closure as a [`CompletionCallback`].
pub fn completion_callback<P, F>(f: F) -> CompletionCallback<P>
where
    F: for<'a> FnOnce(Completion<'a, P>) -> anyhow::Result<()> + Send + 'static,
{
    Box::new(f)
}

/// Boxes a closure as a [`ProgressCallback`].
pub fn progress_callback<F>(f: F) -> ProgressCallback
where
    F: FnMut(&dyn TransportHandle) -> anyhow::Result<()> + Send + 'static,
{
    Box::new(f)
}

/// A queued completion callback together with the parameter it is handed back.
pub(crate) struct Waiter<P> {
    pub callback: CompletionCallback<P>,
    pub param: P,
}

/// The coordinator's record for one in-flight URL.
pub struct PendingRequest<P> {
    id: RequestId,
    url: String,
    transport: Arc<dyn TransportHandle>,
    completion_queue: VecDeque<Waiter<P>>,
    progress_queue: Vec<ProgressCallback>,
    issued_at: Instant,
    timeout: Duration,
}

impl<P> fmt::Debug for PendingRequest<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("waiters", &self.completion_queue.len())
            .field("progress_subscribers", &self.progress_queue.len())
            .field("issued_at", &self.issued_at)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<P> PendingRequest<P> {
    /// Creates an entry seeded with its first waiter.
    pub(crate) fn new(
        url: String,
        transport: Arc<dyn TransportHandle>,
        first: Waiter<P>,
        progress: Option<ProgressCallback>,
        issued_at: Instant,
        timeout: Duration,
    ) -> Self {
        let mut completion_queue = VecDeque::with_capacity(1);
        completion_queue.push_back(first);

        Self {
            id: RequestId::new(),
            url,
            transport,
            completion_queue,
            progress_queue: progress.into_iter().collect(),
            issued_at,
            timeout,
        }
    }

    /// Joins another caller to this request.
    pub(crate) fn attach(&mut self, waiter: Waiter<P>, progress: Option<ProgressCallback>) {
        self.completion_queue.push_back(waiter);
        self.progress_queue.extend(progress);
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn transport(&self) -> &Arc<dyn TransportHandle> {
        &self.transport
    }

    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of queued completion callbacks
    pub fn waiters(&self) -> usize {
        self.completion_queue.len()
    }

    pub fn progress_subscribers(&self) -> usize {
        self.progress_queue.len()
    }

    /// True once strictly more than `timeout` has passed since the entry was issued.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.issued_at) > self.timeout
    }

    /// Lends the progress callbacks out so they can be invoked without holding the registry.
    pub(crate) fn take_progress(&mut self) -> Vec<ProgressCallback> {
        std::mem::take(&mut self.progress_queue)
    }

    /// Puts lent progress callbacks back in front of any that were attached meanwhile.
    pub(crate) fn restore_progress(&mut self, mut lent: Vec<ProgressCallback>) {
        lent.append(&mut self.progress_queue);
        self.progress_queue = lent;
    }

    /// Consumes the entry, yielding its waiters in registration order.
    pub(crate) fn into_waiters(self) -> (RequestId, String, Arc<dyn TransportHandle>, VecDeque<Waiter<P>>) {
        (self.id, self.url, self.transport, self.completion_queue)
    }
}
