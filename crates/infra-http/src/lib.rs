// pprofit Infrastructure - HTTP Adapters
// Implements: Fetcher

pub mod fetcher;

pub use fetcher::{HttpFetcher, DEFAULT_FETCH_TIMEOUT};
