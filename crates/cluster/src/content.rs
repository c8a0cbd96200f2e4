//! Content store abstraction.
//!
//! Callers (an upload front end, the cluster server) only need to read and
//! write `(object_id, filename)` pairs. `RoutingClient` provides that over
//! the cluster; `LocalContentStore` provides it from one local directory.

use std::path::Path;

use async_trait::async_trait;
use corelib::ObjectKey;
use storage::{FsStore, StorageError};
use tracing::{debug, info};

use crate::error::{ClusterError, ClusterResult};

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Bytes stored for the pair. `ClusterError::NotFound` if absent.
    async fn read(&self, object_id: &str, filename: &str) -> ClusterResult<Vec<u8>>;

    /// Store bytes for the pair, replacing any previous content.
    async fn write(&self, object_id: &str, filename: &str, data: Vec<u8>) -> ClusterResult<()>;

    /// Remove the pair. Removing a missing pair succeeds.
    async fn delete(&self, object_id: &str, filename: &str) -> ClusterResult<()>;
}

/// Single-directory store, for running without a cluster.
#[derive(Clone, Debug)]
pub struct LocalContentStore {
    store: FsStore,
}

impl LocalContentStore {
    pub async fn open(root: impl AsRef<Path>) -> ClusterResult<Self> {
        Ok(Self {
            store: FsStore::open(root.as_ref()).await?,
        })
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn read(&self, object_id: &str, filename: &str) -> ClusterResult<Vec<u8>> {
        let key = ObjectKey::new(object_id, filename)?.encoded();
        match self.store.read(&key).await {
            Err(StorageError::NotFound(key)) => Err(ClusterError::NotFound { key }),
            other => Ok(other?),
        }
    }

    async fn write(&self, object_id: &str, filename: &str, data: Vec<u8>) -> ClusterResult<()> {
        let key = ObjectKey::new(object_id, filename)?.encoded();
        Ok(self.store.write(&key, &data).await?)
    }

    async fn delete(&self, object_id: &str, filename: &str) -> ClusterResult<()> {
        let key = ObjectKey::new(object_id, filename)?.encoded();
        self.store.delete(&key).await?;
        Ok(())
    }
}

/// Store every regular file in `dir` under `object_id`.
///
/// This is how transcoder output (a manifest plus its segments) enters the
/// store. Subdirectories and `.mp4` source files are skipped. Returns the
/// stored filenames in the order they were written.
pub async fn upload_dir(
    store: &dyn ContentStore,
    object_id: &str,
    dir: impl AsRef<Path>,
) -> ClusterResult<Vec<String>> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if name.ends_with(".mp4") {
            continue;
        }
        names.push(name);
    }
    names.sort();

    for name in &names {
        let data = tokio::fs::read(dir.join(name)).await?;
        debug!(object_id, filename = %name, bytes = data.len(), "uploading");
        store.write(object_id, name, data).await?;
    }
    info!(object_id, files = names.len(), dir = %dir.display(), "uploaded directory");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalContentStore::open(dir.path()).await.unwrap();

        store.write("video", "manifest.mpd", b"mpd".to_vec()).await.unwrap();
        assert_eq!(store.read("video", "manifest.mpd").await.unwrap(), b"mpd");

        store.delete("video", "manifest.mpd").await.unwrap();
        store.delete("video", "manifest.mpd").await.unwrap();
        assert!(matches!(
            store.read("video", "manifest.mpd").await,
            Err(ClusterError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn local_store_rejects_bad_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalContentStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.write("..", "x", vec![]).await,
            Err(ClusterError::Ring(corelib::Error::InvalidKey(_)))
        ));
    }

    #[tokio::test]
    async fn upload_dir_skips_sources_and_subdirs() {
        let out = tempfile::tempdir().unwrap();
        tokio::fs::write(out.path().join("manifest.mpd"), b"mpd").await.unwrap();
        tokio::fs::write(out.path().join("init-0.m4s"), b"init").await.unwrap();
        tokio::fs::write(out.path().join("source.mp4"), b"raw").await.unwrap();
        tokio::fs::create_dir(out.path().join("tmp")).await.unwrap();

        let root = tempfile::tempdir().unwrap();
        let store = LocalContentStore::open(root.path()).await.unwrap();
        let names = upload_dir(&store, "video", out.path()).await.unwrap();

        assert_eq!(names, vec!["init-0.m4s", "manifest.mpd"]);
        assert_eq!(store.read("video", "init-0.m4s").await.unwrap(), b"init");
        assert!(store.read("video", "source.mp4").await.is_err());
    }
}
