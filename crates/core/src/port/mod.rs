// Port Layer - Interfaces for external dependencies

pub mod artifact_store;
pub mod fetcher;
pub mod process_launcher;
pub mod time_provider;

// Re-exports
pub use artifact_store::{ArtifactStore, ByteStream};
pub use fetcher::{FetchError, Fetcher};
pub use process_launcher::{ExecutionError, LaunchedProcess, ProcessExit, ProcessLauncher};
pub use time_provider::TimeProvider;
