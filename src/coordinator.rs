//! Request coordination.
//!
//! The [`HttpCoordinator`] is the single point through which URL fetches are issued. It keeps
//! a [`RequestRegistry`] with at most one [`PendingRequest`] per URL: a second `load` of a URL
//! that is still in flight is attached to the existing entry instead of starting another
//! transport call, and every caller receives the outcome of that one call.
//!
//! # Lifecycle of an entry
//!
//! ```text
//! load() ──► InFlight ──tick: transport done──► Completed ──► removed
//!               │
//!               └──────tick: timeout exceeded─► TimedOut  ──► removed
//! ```
//!
//! State only changes inside [`HttpCoordinator::tick`]. While an entry is in flight, each tick
//! invokes every progress callback once. On resolution the completion callbacks are drained in
//! the order they were registered and the entry is gone. There is no retry: a caller who wants
//! one calls `load` again.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gosub_http::config::CoordinatorConfig;
//! use gosub_http::coordinator::{completion_callback, HttpCoordinator};
//! use gosub_http::net::HttpTransport;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoordinatorConfig::default();
//! let transport = Arc::new(HttpTransport::from_current(&config)?);
//! let http: HttpCoordinator<&'static str> = HttpCoordinator::new(config, transport);
//!
//! http.load(
//!     "https://example.com/manifest.json",
//!     Some(completion_callback(|c| {
//!         match c.result() {
//!             Some(res) => println!("{}: {:?}", c.param().unwrap(), res.status),
//!             None => println!("timed out"),
//!         }
//!         Ok(())
//!     })),
//!     "manifest",
//!     None,
//! )?;
//!
//! // The host drives the coordinator, e.g. once per frame
//! loop {
//!     http.tick();
//!     if http.pending_count() == 0 {
//!         break;
//!     }
//!     tokio::time::sleep(std::time::Duration::from_millis(16)).await;
//! }
//! # Ok(()) }
//! ```

mod coordinator;
mod entry;
mod options;
mod registry;

pub use coordinator::{HttpCoordinator, LoadStatus};
pub use entry::{
    completion_callback, progress_callback, Completion, CompletionCallback, PendingRequest,
    ProgressCallback, RequestId,
};
pub use options::LoadRequest;
pub use registry::RequestRegistry;
