use super::entry::{Completion, CompletionCallback, ProgressCallback};
use crate::net::TransportHandle;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Everything a caller can pass to [`HttpCoordinator::load_with`](super::HttpCoordinator::load_with).
///
/// ```
/// # use gosub_http::coordinator::LoadRequest;
/// # use std::time::Duration;
/// let req = LoadRequest::new("https://example.com/scores", 7u32)
///     .form([("player", "ada"), ("score", "1200")])
///     .timeout(Duration::from_secs(5))
///     .on_complete(|c| {
///         if let Some(res) = c.result() {
///             println!("stored: {:?}", res.status);
///         }
///         Ok(())
///     });
/// ```
pub struct LoadRequest<P> {
    pub(crate) url: String,
    pub(crate) param: P,
    pub(crate) on_complete: Option<CompletionCallback<P>>,
    pub(crate) on_progress: Option<ProgressCallback>,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) form: Option<Vec<(String, String)>>,
    pub(crate) headers: HeaderMap,
    pub(crate) timeout: Option<Duration>,
}

impl<P> LoadRequest<P> {
    /// GET request for `url`. `param` is handed back to the completion callback.
    pub fn new(url: impl Into<String>, param: P) -> Self {
        Self {
            url: url.into(),
            param,
            on_complete: None,
            on_progress: None,
            body: None,
            form: None,
            headers: HeaderMap::new(),
            timeout: None,
        }
    }

    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: for<'a> FnOnce(Completion<'a, P>) -> anyhow::Result<()> + Send + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub(crate) fn on_complete_boxed(mut self, f: Option<CompletionCallback<P>>) -> Self {
        self.on_complete = f;
        self
    }

    pub fn on_progress<F>(mut self, f: F) -> Self
    where
        F: FnMut(&dyn TransportHandle) -> anyhow::Result<()> + Send + 'static,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Raw POST body. Takes precedence over [`LoadRequest::form`].
    pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(bytes.into());
        self
    }

    /// Form-encoded POST payload
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.form = Some(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Zero means "use the configured default".
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn timeout_opt(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}
