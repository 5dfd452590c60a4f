use http::{HeaderMap, Method};

/// Payload of an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Raw bytes, sent as-is
    Raw(Vec<u8>),
    /// Key/value pairs, sent as `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
}

/// Description of a single request handed to a [`Transport`](super::Transport).
#[derive(Debug, Clone)]
pub struct Request {
    pub url: String,
    pub body: Option<RequestBody>,
    pub headers: HeaderMap,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Builds a request from the optional payloads a caller may pass. A raw body takes
    /// precedence over a form when both are given.
    pub fn from_parts(
        url: impl Into<String>,
        raw: Option<Vec<u8>>,
        form: Option<Vec<(String, String)>>,
        headers: HeaderMap,
    ) -> Self {
        let body = match (raw, form) {
            (Some(raw), _) => Some(RequestBody::Raw(raw)),
            (None, Some(form)) => Some(RequestBody::Form(form)),
            (None, None) => None,
        };

        Self {
            url: url.into(),
            body,
            headers,
        }
    }

    /// GET without a body, POST otherwise
    pub fn method(&self) -> Method {
        match self.body {
            Some(_) => Method::POST,
            None => Method::GET,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_body_wins_over_form() {
        let req = Request::from_parts(
            "http://a/x",
            Some(b"raw".to_vec()),
            Some(vec![("k".into(), "v".into())]),
            HeaderMap::new(),
        );
        assert_eq!(req.body, Some(RequestBody::Raw(b"raw".to_vec())));
        assert_eq!(req.method(), Method::POST);
    }

    #[test]
    fn form_only_is_post_and_nothing_is_get() {
        let req = Request::from_parts("http://a/x", None, Some(vec![("k".into(), "v".into())]), HeaderMap::new());
        assert_eq!(req.method(), Method::POST);
        assert!(matches!(req.body, Some(RequestBody::Form(_))));

        let req = Request::get("http://a/x");
        assert_eq!(req.method(), Method::GET);
        assert!(req.body.is_none());
    }
}
