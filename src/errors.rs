use std::time::Duration;

/// Errors surfaced by the [`HttpCoordinator`](crate::coordinator::HttpCoordinator).
///
/// Only `InvalidRequest` is ever returned to a caller of `load`. The other variants describe
/// failures that happen during a `tick()`; they are logged and published on the event bus but
/// never propagated out of the tick.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request for {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Request for {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("Callback for {url} failed: {message}")]
    CallbackFault { url: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_url() {
        let err = CoordinatorError::Timeout {
            url: "http://a/y".into(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "Request for http://a/y timed out after 5s");

        let err = CoordinatorError::CallbackFault {
            url: "http://a/x".into(),
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Callback for http://a/x failed: boom");
    }
}
