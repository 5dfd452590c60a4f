use gosub_http::coordinator::{completion_callback, LoadRequest};
use gosub_http::events::CoordinatorEvent;
use gosub_http::net::HttpTransport;
use gosub_http::{Completion, CoordinatorConfig, HttpCoordinator};
use std::sync::Arc;
use std::time::Duration;

// Fetches a few URLs (the same one twice) and drives the coordinator at ~60Hz until everything
// resolved. Run with `RUST_LOG=debug` to see the coordinator logging.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = CoordinatorConfig::builder()
        .default_timeout(Duration::from_secs(10))
        .user_agent("Gosub/1.0 tick_loop")
        .build()?;
    let transport = Arc::new(HttpTransport::from_current(&config)?);
    let http: HttpCoordinator<&'static str> = HttpCoordinator::new(config, transport);

    let mut events = http.subscribe();
    tokio::spawn(async move {
        while let Ok(ev) = events.recv().await {
            if let CoordinatorEvent::RequestAttached { url, waiters, .. } = &ev {
                println!("[event] {url} now has {waiters} waiters");
            }
        }
    });

    let report = |c: Completion<'_, &'static str>| -> anyhow::Result<()> {
        match c {
            Completion::Finished { result, param } => match &result.response {
                Some(resp) => println!("{param}: {} ({} bytes)", resp.status, resp.body.len()),
                None => println!("{param}: {:?} {:?}", result.status, result.error),
            },
            Completion::TimedOut { url } => println!("{url}: timed out"),
        }
        Ok(())
    };

    let urls = ["https://example.com/", "https://example.com/", "https://www.rust-lang.org/"];
    for (i, url) in urls.into_iter().enumerate() {
        let name = ["first", "second", "third"][i];
        http.load(url, Some(completion_callback(report)), name, None)?;
    }

    http.load_with(
        LoadRequest::new("https://httpbin.org/post", "form")
            .form([("engine", "gosub")])
            .on_progress(|h| {
                println!("form: {:?}", h.progress());
                Ok(())
            })
            .on_complete(report),
    )?;

    let mut ticker = tokio::time::interval(Duration::from_millis(16));
    while http.pending_count() > 0 {
        ticker.tick().await;
        http.tick();
    }

    Ok(())
}
