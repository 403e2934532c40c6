// HTTP Fetcher
// One GET per call, no retries; the body is streamed straight to the caller

use async_trait::async_trait;
use futures::TryStreamExt;
use pprofit_core::port::{ByteStream, FetchError, Fetcher};
use reqwest::{Client, Url};
use std::io;
use std::time::Duration;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};

/// Upper bound on a whole fetch, including the body (30s)
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<ByteStream, FetchError> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        debug!(url = %url, "Fetching profile");
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Profile source returned an error status");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes_stream().map_err(io::Error::other);
        Ok(Box::pin(StreamReader::new(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_streams_body() {
        let base = serve(Router::new().route("/debug/pprof/heap", get(|| async { "heap bytes" }))).await;
        let fetcher = HttpFetcher::new(DEFAULT_FETCH_TIMEOUT).unwrap();

        let mut body = fetcher
            .fetch(&format!("{}/debug/pprof/heap", base))
            .await
            .unwrap();
        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes).await.unwrap();

        assert_eq!(bytes, b"heap bytes");
    }

    #[tokio::test]
    async fn test_error_status_is_a_fetch_failure() {
        let base = serve(Router::new().route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "nope") }),
        ))
        .await;
        let fetcher = HttpFetcher::new(DEFAULT_FETCH_TIMEOUT).unwrap();

        let err = fetcher.fetch(&format!("{}/missing", base)).await.err().unwrap();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));

        let err = fetcher.fetch(&format!("{}/broken", base)).await.err().unwrap();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected_before_request() {
        let fetcher = HttpFetcher::new(DEFAULT_FETCH_TIMEOUT).unwrap();

        let err = fetcher.fetch("not a url").await.err().unwrap();

        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();

        let err = fetcher.fetch(&format!("http://{}/", addr)).await.err().unwrap();

        assert!(matches!(err, FetchError::Request(_)));
    }
}
