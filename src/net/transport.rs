use super::{Request, Response};
use std::fmt;
use std::sync::Arc;

/// Classification of a finished transport operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    /// A response with a non-error status code was received
    Success,
    /// The request never produced a response (DNS, connect, TLS, I/O, ...)
    ConnectionError,
    /// A response was received but its status code signals an error (>= 400)
    ProtocolError,
}

impl TransportStatus {
    pub fn is_error(&self) -> bool {
        !matches!(self, TransportStatus::Success)
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportStatus::Success => write!(f, "success"),
            TransportStatus::ConnectionError => write!(f, "connection error"),
            TransportStatus::ProtocolError => write!(f, "protocol error"),
        }
    }
}

/// Outcome of a transport operation as seen by completion callbacks.
///
/// A protocol error keeps its `response`, so callers can still inspect the body of a 404 or a 500.
#[derive(Debug, Clone)]
pub struct TransportResult {
    pub status: TransportStatus,
    pub response: Option<Response>,
    pub error: Option<String>,
}

impl TransportResult {
    /// Classifies a received response by its status code.
    pub fn from_response(response: Response) -> Self {
        if response.status >= 400 {
            Self {
                status: TransportStatus::ProtocolError,
                error: Some(format!("HTTP {} {}", response.status, response.status_text)),
                response: Some(response),
            }
        } else {
            Self {
                status: TransportStatus::Success,
                response: Some(response),
                error: None,
            }
        }
    }

    pub fn connection_error(message: impl Into<String>) -> Self {
        Self {
            status: TransportStatus::ConnectionError,
            response: None,
            error: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TransportStatus::Success
    }
}

/// Snapshot of how far a transport operation has progressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Body bytes received so far
    pub downloaded: u64,
    /// Expected body size, when the server announced one
    pub total: Option<u64>,
}

impl Progress {
    /// Fraction in `0.0..=1.0`, if the total size is known.
    pub fn fraction(&self) -> Option<f32> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.downloaded as f64 / total as f64).min(1.0) as f32),
            None => None,
        }
    }
}

/// Handle to a single in-flight network operation.
///
/// All methods must return immediately. The coordinator polls `is_done()` once per tick and
/// reads `result()` only after it returned true.
pub trait TransportHandle: Send + Sync {
    fn is_done(&self) -> bool;

    /// The outcome, once done. `None` while the operation is still running.
    fn result(&self) -> Option<&TransportResult>;

    fn progress(&self) -> Progress;
}

/// Starts network operations on behalf of the coordinator.
pub trait Transport: Send + Sync {
    /// Starts `request` and returns a handle to poll. Must not block.
    fn start(&self, request: Request) -> Arc<dyn TransportHandle>;
}
