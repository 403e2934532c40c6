// Artifact Store Port
// Append-only storage of profile snapshots, keyed by artifact name

use crate::domain::{Artifact, ProfileType};
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Profile bytes on their way into the store
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

/// Artifact Store trait
///
/// Implementations:
/// - FsArtifactStore: one file per artifact under a root directory
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// List every stored artifact, in no particular order
    ///
    /// # Errors
    /// - AppError::Io if the store cannot be enumerated
    async fn list(&self) -> Result<Vec<Artifact>>;

    /// Persist `data` as a new `<type>-<unixSeconds>` artifact
    ///
    /// A save of the same type within the same second overwrites the earlier one.
    /// Nothing becomes visible to `list` unless the whole stream was written.
    ///
    /// # Errors
    /// - AppError::Fetch if reading `data` fails partway
    /// - AppError::Io if the artifact cannot be written
    async fn save(&self, profile_type: ProfileType, data: ByteStream) -> Result<Artifact>;

    /// Location a viewer should be pointed at for `name`
    ///
    /// The artifact is not required to exist.
    fn path_of(&self, name: &str) -> PathBuf;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::artifact_name;
    use crate::port::{FetchError, TimeProvider};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::io::AsyncReadExt;

    /// In-memory store keyed by artifact name
    pub struct InMemoryArtifactStore {
        time_provider: Arc<dyn TimeProvider>,
        artifacts: Mutex<HashMap<String, (Vec<u8>, i64)>>,
    }

    impl InMemoryArtifactStore {
        pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
            Self {
                time_provider,
                artifacts: Mutex::new(HashMap::new()),
            }
        }

        pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
            self.artifacts
                .lock()
                .unwrap()
                .get(name)
                .map(|(bytes, _)| bytes.clone())
        }
    }

    #[async_trait]
    impl ArtifactStore for InMemoryArtifactStore {
        async fn list(&self) -> Result<Vec<Artifact>> {
            Ok(self
                .artifacts
                .lock()
                .unwrap()
                .iter()
                .map(|(name, (_, created_at))| Artifact::new(name.clone(), *created_at))
                .collect())
        }

        async fn save(&self, profile_type: ProfileType, mut data: ByteStream) -> Result<Artifact> {
            let now = self.time_provider.now_secs();
            let name = artifact_name(profile_type, now);
            let mut bytes = Vec::new();
            data.read_to_end(&mut bytes)
                .await
                .map_err(|e| FetchError::Body(e.to_string()))?;
            self.artifacts
                .lock()
                .unwrap()
                .insert(name.clone(), (bytes, now));
            Ok(Artifact::new(name, now))
        }

        fn path_of(&self, name: &str) -> PathBuf {
            PathBuf::from("/mock/profiles").join(name)
        }
    }
}
