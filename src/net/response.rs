//! Minimal HTTP response model.
//!
//! This struct represents a **fully buffered** HTTP response returned by the
//! network layer. It contains the final URL (after redirects, if the client
//! follows them), status code + reason, response headers, and the raw body bytes.
//!
//! ## Notes
//! - `headers` is an `http::HeaderMap`, which is **case-insensitive** for
//!   header names.
//! - `status_text` is derived from the status code’s canonical reason phrase
//!   and may be `"Unknown"` for non-standard codes.
//!
use http::HeaderMap;
use serde::de::DeserializeOwned;

/// Simple structure for HTTP responses.
#[derive(Debug, Clone)]
pub struct Response {
    /// Final URL of the response (after redirects, if any).
    pub url: url::Url,

    /// Numeric HTTP status code (e.g., `200`, `404`).
    pub status: u16,

    /// Human-readable reason phrase (e.g., `"OK"`, `"Not Found"`).
    pub status_text: String,

    /// Response headers as a case-insensitive map.
    pub headers: HeaderMap,

    /// Raw response body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// True for 2xx status codes
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8. Invalid sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn response(status: u16, body: &[u8]) -> Response {
        Response {
            url: url::Url::parse("http://example.com/data").unwrap(),
            status,
            status_text: "OK".into(),
            headers: HeaderMap::new(),
            body: body.to_vec(),
        }
    }

    #[test]
    fn json_body_is_parsed() {
        #[derive(Deserialize)]
        struct Level {
            name: String,
            size: u32,
        }

        let resp = response(200, br#"{"name":"forest","size":3}"#);
        let level: Level = resp.json().unwrap();
        assert_eq!(level.name, "forest");
        assert_eq!(level.size, 3);
        assert!(resp.is_success());
    }

    #[test]
    fn text_is_lossy() {
        let resp = response(404, b"not \xff found");
        assert_eq!(resp.text(), "not \u{fffd} found");
        assert!(!resp.is_success());
    }
}
