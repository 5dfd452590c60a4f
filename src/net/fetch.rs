use crate::net::{Progress, Request, RequestBody, Response};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request canceled")]
    Canceled,
    #[error(transparent)]
    Net(#[from] reqwest::Error),
}

// Sends the request and buffers the response body. `on_progress` is called after every
// received chunk.
pub async fn fetch(
    client: &reqwest::Client,
    request: &Request,
    mut on_progress: impl FnMut(Progress),
) -> Result<Response, FetchError> {
    let url = Url::parse(&request.url)?;

    let mut builder = client
        .request(request.method(), url)
        .headers(request.headers.clone());
    builder = match &request.body {
        Some(RequestBody::Raw(bytes)) => builder.body(bytes.clone()),
        Some(RequestBody::Form(pairs)) => builder.form(pairs),
        None => builder,
    };

    let mut res = builder.send().await?;

    // Fetch results
    let final_url = res.url().clone();
    let status = res.status().as_u16();
    let status_text = res.status().canonical_reason().unwrap_or("Unknown").to_string();
    let headers = res.headers().clone();
    let total = res.content_length();

    let mut body = Vec::with_capacity(total.unwrap_or(0).min(1 << 20) as usize);
    on_progress(Progress { downloaded: 0, total });
    while let Some(chunk) = res.chunk().await? {
        body.extend_from_slice(&chunk);
        on_progress(Progress {
            downloaded: body.len() as u64,
            total,
        });
    }

    Ok(Response {
        url: final_url,
        status,
        status_text,
        headers,
        body,
    })
}
