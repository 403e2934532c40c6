// Profile Service - list and fetch-and-save use cases

use crate::domain::{Artifact, ProfileType};
use crate::error::{AppError, Result};
use crate::port::{ArtifactStore, Fetcher};
use std::sync::Arc;
use tracing::info;

pub struct ProfileService {
    store: Arc<dyn ArtifactStore>,
    fetcher: Arc<dyn Fetcher>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ArtifactStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { store, fetcher }
    }

    /// Every stored artifact, in directory order
    pub async fn list(&self) -> Result<Vec<Artifact>> {
        self.store.list().await
    }

    /// Fetch `url` once and store the body as a new artifact of `profile_type`
    ///
    /// # Errors
    /// - AppError::Validation / AppError::Domain for missing or unknown fields
    /// - AppError::Fetch if the URL cannot be retrieved
    /// - AppError::Io if the artifact cannot be written
    pub async fn save(&self, url: &str, profile_type: &str) -> Result<Artifact> {
        if url.is_empty() {
            return Err(AppError::Validation("missing `url`".to_string()));
        }
        if profile_type.is_empty() {
            return Err(AppError::Validation("missing `type`".to_string()));
        }
        let profile_type: ProfileType = profile_type.parse()?;

        let body = self.fetcher.fetch(url).await?;
        let artifact = self.store.save(profile_type, body).await?;

        info!(url = %url, name = %artifact.name, "Saved profile");
        Ok(artifact)
    }
}
