// Filesystem ArtifactStore
// One file per artifact; the directory listing is the only index

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pprofit_core::domain::{artifact_name, Artifact, ProfileType};
use pprofit_core::error::Result;
use pprofit_core::port::{ArtifactStore, ByteStream, FetchError, TimeProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

pub struct FsArtifactStore {
    root: PathBuf,
    time_provider: Arc<dyn TimeProvider>,
}

impl FsArtifactStore {
    /// `root` must already exist (see `DataLayout::create`)
    pub fn new(root: impl Into<PathBuf>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            root: root.into(),
            time_provider,
        }
    }

    /// In-progress writes are dot-prefixed so `list` never sees them
    fn partial_path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!(".{}.partial", name))
    }
}

/// Copy `data` into a new file at `path`, returning the byte count
///
/// Read failures belong to the source and surface as fetch errors.
async fn write_stream(path: &Path, data: &mut ByteStream) -> Result<u64> {
    let mut file = File::create(path).await?;
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let n = data
            .read(&mut buf)
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).await?;
        written += n as u64;
    }

    file.flush().await?;
    Ok(written)
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn list(&self) -> Result<Vec<Artifact>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut artifacts = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            if !metadata.is_file() {
                debug!(name = %name, "Skipping non-file entry in profiles directory");
                continue;
            }

            let modified: DateTime<Utc> = metadata.modified()?.into();
            artifacts.push(Artifact::new(name, modified.timestamp()));
        }

        Ok(artifacts)
    }

    async fn save(&self, profile_type: ProfileType, mut data: ByteStream) -> Result<Artifact> {
        let now = self.time_provider.now_secs();
        let name = artifact_name(profile_type, now);
        let path = self.root.join(&name);

        let partial = self.partial_path_of(&name);
        let written = match write_stream(&partial, &mut data).await {
            Ok(written) => written,
            Err(e) => {
                match fs::remove_file(&partial).await {
                    Err(cleanup) if cleanup.kind() != std::io::ErrorKind::NotFound => {
                        warn!(path = %partial.display(), error = %cleanup, "Failed to remove partial profile");
                    }
                    _ => {}
                }
                return Err(e);
            }
        };

        // Same type within the same second: last writer wins
        fs::rename(&partial, &path).await?;

        info!(name = %name, bytes = written, "Wrote profile");
        Ok(Artifact::new(name, now))
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pprofit_core::port::time_provider::mocks::FixedTimeProvider;
    use pprofit_core::port::time_provider::SystemTimeProvider;
    use pprofit_core::AppError;
    use std::io::{self, Cursor};
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    fn stream(bytes: &'static [u8]) -> ByteStream {
        Box::pin(Cursor::new(bytes))
    }

    /// Source whose connection drops on the first read
    struct ResetSource;

    impl AsyncRead for ResetSource {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            )))
        }
    }

    #[tokio::test]
    async fn test_save_writes_named_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(tmp.path(), Arc::new(FixedTimeProvider::at_secs(1234)));

        let artifact = store
            .save(ProfileType::Heap, stream(b"0123456789abcdefg"))
            .await
            .unwrap();

        assert_eq!(artifact.name, "heap-1234");
        assert_eq!(artifact.profile_type, "heap");
        assert_eq!(artifact.created_at, 1234);
        let on_disk = std::fs::read(tmp.path().join("heap-1234")).unwrap();
        assert_eq!(on_disk.len(), 17);
        assert_eq!(store.path_of("heap-1234"), tmp.path().join("heap-1234"));
    }

    #[tokio::test]
    async fn test_list_reads_back_saves() {
        let tmp = tempfile::tempdir().unwrap();
        let clock = Arc::new(FixedTimeProvider::at_secs(1000));
        let store = FsArtifactStore::new(tmp.path(), clock.clone());

        for t in [ProfileType::Heap, ProfileType::Goroutine, ProfileType::Trace] {
            store.save(t, stream(b"data")).await.unwrap();
            clock.advance_secs(1);
        }

        let mut artifacts = store.list().await.unwrap();
        artifacts.sort_by(|a, b| a.name.cmp(&b.name));

        let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["goroutine-1001", "heap-1000", "trace-1002"]);
        for artifact in &artifacts {
            assert!(artifact.name.starts_with(&format!("{}-", artifact.profile_type)));
        }
    }

    #[tokio::test]
    async fn test_created_at_comes_from_mtime() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(tmp.path(), Arc::new(SystemTimeProvider));

        let before = SystemTimeProvider.now_secs();
        let saved = store.save(ProfileType::Heap, stream(b"x")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, saved.name);
        assert!((listed[0].created_at - before).abs() <= 2);
    }

    #[tokio::test]
    async fn test_same_second_save_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(tmp.path(), Arc::new(FixedTimeProvider::at_secs(7)));

        store.save(ProfileType::Heap, stream(b"first")).await.unwrap();
        store.save(ProfileType::Heap, stream(b"second")).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(std::fs::read(tmp.path().join("heap-7")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_list_skips_directories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("nested")).unwrap();
        std::fs::write(tmp.path().join("mutex-5"), b"m").unwrap();
        let store = FsArtifactStore::new(tmp.path(), Arc::new(SystemTimeProvider));

        let artifacts = store.list().await.unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].profile_type, "mutex");
    }

    #[tokio::test]
    async fn test_source_failing_midway_leaves_nothing_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(tmp.path(), Arc::new(FixedTimeProvider::at_secs(5)));
        let truncated: ByteStream = Box::pin(Cursor::new(b"partial-bytes").chain(ResetSource));

        let err = store.save(ProfileType::Heap, truncated).await.unwrap_err();

        assert!(matches!(err, AppError::Fetch(FetchError::Body(_))));
        assert!(err.to_string().starts_with("failed to get profile"));
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_earlier_artifact_intact() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(tmp.path(), Arc::new(FixedTimeProvider::at_secs(5)));
        store.save(ProfileType::Heap, stream(b"complete")).await.unwrap();

        let truncated: ByteStream = Box::pin(Cursor::new(b"par").chain(ResetSource));
        assert!(store.save(ProfileType::Heap, truncated).await.is_err());

        assert_eq!(std::fs::read(tmp.path().join("heap-5")).unwrap(), b"complete");
    }

    #[tokio::test]
    async fn test_list_skips_in_progress_writes() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".heap-9.partial"), b"half").unwrap();
        std::fs::write(tmp.path().join("heap-8"), b"whole").unwrap();
        let store = FsArtifactStore::new(tmp.path(), Arc::new(SystemTimeProvider));

        let artifacts = store.list().await.unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].name, "heap-8");
    }

    #[tokio::test]
    async fn test_list_missing_root_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(tmp.path().join("gone"), Arc::new(SystemTimeProvider));

        let err = store.list().await.unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
