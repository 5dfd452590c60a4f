//! reqwest-backed [`Transport`].
//!
//! Every request runs as its own task on a tokio runtime. The task publishes its progress
//! through atomics and its outcome through a `OnceLock`, so the handle can be polled from the
//! coordinator's tick without ever awaiting. Dropping the last handle cancels the task.

use crate::config::CoordinatorConfig;
use crate::net::{fetch, FetchError, Progress, Request, Transport, TransportHandle, TransportResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tokio_util::sync::{CancellationToken, DropGuard};

const UNKNOWN_TOTAL: u64 = u64::MAX;

/// Transport that performs real HTTP requests with a shared [`reqwest::Client`].
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    runtime: Handle,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Creates a transport from the coordinator configuration. Request tasks are spawned on
    /// `runtime`.
    pub fn new(config: &CoordinatorConfig, runtime: Handle) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ua) = &config.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self::with_client(builder.build()?, runtime))
    }

    /// Same as [`HttpTransport::new`], using the runtime we are currently running in.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn from_current(config: &CoordinatorConfig) -> Result<Self, FetchError> {
        Self::new(config, Handle::current())
    }

    pub fn with_client(client: reqwest::Client, runtime: Handle) -> Self {
        Self { client, runtime }
    }
}

impl Transport for HttpTransport {
    fn start(&self, request: Request) -> Arc<dyn TransportHandle> {
        let shared = Arc::new(Shared::default());
        let cancel = CancellationToken::new();

        let client = self.client.clone();
        let task_shared = shared.clone();
        let token = cancel.clone();
        self.runtime.spawn(async move {
            let res = tokio::select! {
                _ = token.cancelled() => Err(FetchError::Canceled),
                r = fetch(&client, &request, |p| task_shared.record(p)) => r,
            };

            let outcome = match res {
                Ok(resp) => TransportResult::from_response(resp),
                Err(FetchError::Canceled) => {
                    log::trace!("[http] request for {} canceled", request.url);
                    return;
                }
                Err(e) => TransportResult::connection_error(e.to_string()),
            };
            let _ = task_shared.result.set(outcome);
        });

        Arc::new(HttpHandle {
            shared,
            _cancel: cancel.drop_guard(),
        })
    }
}

struct Shared {
    result: OnceLock<TransportResult>,
    downloaded: AtomicU64,
    total: AtomicU64,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            result: OnceLock::new(),
            downloaded: AtomicU64::new(0),
            total: AtomicU64::new(UNKNOWN_TOTAL),
        }
    }
}

impl Shared {
    fn record(&self, progress: Progress) {
        self.total.store(progress.total.unwrap_or(UNKNOWN_TOTAL), Ordering::Relaxed);
        self.downloaded.store(progress.downloaded, Ordering::Relaxed);
    }
}

struct HttpHandle {
    shared: Arc<Shared>,
    _cancel: DropGuard,
}

impl TransportHandle for HttpHandle {
    fn is_done(&self) -> bool {
        self.shared.result.get().is_some()
    }

    fn result(&self) -> Option<&TransportResult> {
        self.shared.result.get()
    }

    fn progress(&self) -> Progress {
        let total = self.shared.total.load(Ordering::Relaxed);
        Progress {
            downloaded: self.shared.downloaded.load(Ordering::Relaxed),
            total: (total != UNKNOWN_TOTAL).then_some(total),
        }
    }
}
