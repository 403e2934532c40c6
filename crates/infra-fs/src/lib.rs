// pprofit Infrastructure - Filesystem Adapters
// Implements: ArtifactStore

pub mod artifact_store;
pub mod layout;

pub use artifact_store::FsArtifactStore;
pub use layout::{ensure_dir, DataLayout};
