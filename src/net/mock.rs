//! Scripted transport for tests. Requests never finish until the test completes them.

use crate::net::{Progress, Request, Response, Transport, TransportHandle, TransportResult};
use http::HeaderMap;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

#[derive(Default)]
pub(crate) struct MockHandle {
    result: OnceLock<TransportResult>,
    progress: Mutex<Progress>,
}

impl TransportHandle for MockHandle {
    fn is_done(&self) -> bool {
        self.result.get().is_some()
    }

    fn result(&self) -> Option<&TransportResult> {
        self.result.get()
    }

    fn progress(&self) -> Progress {
        *self.progress.lock().unwrap()
    }
}

#[derive(Default)]
struct MockState {
    requests: Vec<Request>,
    // Latest handle started for each URL
    handles: HashMap<String, Arc<MockHandle>>,
}

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times a request for `url` was started
    pub fn starts(&self, url: &str) -> usize {
        self.state.lock().unwrap().requests.iter().filter(|r| r.url == url).count()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn complete(&self, url: &str, result: TransportResult) {
        let handle = self.handle(url);
        assert!(handle.result.set(result).is_ok(), "{url} completed twice");
    }

    pub fn succeed(&self, url: &str, body: &str) {
        self.respond(url, 200, body);
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) {
        self.complete(
            url,
            TransportResult::from_response(Response {
                url: url::Url::parse(url).unwrap(),
                status,
                status_text: "Mock".into(),
                headers: HeaderMap::new(),
                body: body.as_bytes().to_vec(),
            }),
        );
    }

    pub fn set_progress(&self, url: &str, progress: Progress) {
        *self.handle(url).progress.lock().unwrap() = progress;
    }

    fn handle(&self, url: &str) -> Arc<MockHandle> {
        self.state
            .lock()
            .unwrap()
            .handles
            .get(url)
            .cloned()
            .unwrap_or_else(|| panic!("no request started for {url}"))
    }
}

impl Transport for MockTransport {
    fn start(&self, request: Request) -> Arc<dyn TransportHandle> {
        let handle = Arc::new(MockHandle::default());
        let mut state = self.state.lock().unwrap();
        state.handles.insert(request.url.clone(), handle.clone());
        state.requests.push(request);
        handle
    }
}
