//! Network layer used by the coordinator.
//!
//! The coordinator never touches sockets. It talks to a [`Transport`], which starts a request
//! and hands back a [`TransportHandle`] that can be polled for completion. [`HttpTransport`]
//! is the reqwest-backed implementation; hosts and tests may plug in their own.

mod client;
mod fetch;
mod request;
mod response;
mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use client::HttpTransport;
pub use fetch::{fetch, FetchError};
pub use request::{Request, RequestBody};
pub use response::Response;
pub use transport::{Progress, Transport, TransportHandle, TransportResult, TransportStatus};
