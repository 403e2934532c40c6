// Fetcher Port
// Single-attempt retrieval of profile bytes from a URL

use super::artifact_store::ByteStream;
use async_trait::async_trait;
use thiserror::Error;

/// Fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url `{0}`")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("response body failed: {0}")]
    Body(String),
}

/// Fetcher trait
///
/// Implementations:
/// - HttpFetcher: plain HTTP(S) GET, no retries
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Start retrieving `url`, returning the response body as a stream
    async fn fetch(&self, url: &str) -> Result<ByteStream, FetchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Serves the same body for every URL, or fails every call
    pub struct MockFetcher {
        body: Result<Vec<u8>, String>,
        requested: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub fn with_body(body: impl Into<Vec<u8>>) -> Self {
            Self {
                body: Ok(body.into()),
                requested: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                body: Err(message.into()),
                requested: Mutex::new(Vec::new()),
            }
        }

        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<ByteStream, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            match &self.body {
                Ok(body) => Ok(Box::pin(Cursor::new(body.clone()))),
                Err(msg) => Err(FetchError::Request(msg.clone())),
            }
        }
    }
}
