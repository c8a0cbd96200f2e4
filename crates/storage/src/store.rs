//! Filesystem object store.
//!
//! Layout: `<base_dir>/<object_id>/<filename>`, one file per object. There
//! is no locking: concurrent writes to the same key race at the filesystem
//! and the last writer wins.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use corelib::ObjectKey;
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};

#[derive(Clone, Debug)]
pub struct FsStore {
    base_dir: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed.
    pub async fn open(base_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_dir = base_dir.into();
        tokio::fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| StorageError::io(&base_dir, e))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_of(&self, key: &ObjectKey) -> PathBuf {
        self.base_dir.join(key.object_id()).join(key.filename())
    }

    /// Store `data` under `key`, replacing any previous content.
    pub async fn write(&self, key: &str, data: &[u8]) -> StorageResult<()> {
        let key = ObjectKey::parse(key)?;
        let dir = self.base_dir.join(key.object_id());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::io(&dir, e))?;
        let path = self.path_of(&key);
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| StorageError::io(&path, e))?;
        debug!(%key, bytes = data.len(), "wrote object");
        Ok(())
    }

    /// Exact bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// `StorageError::NotFound` if nothing is stored there; an empty object
    /// reads back as an empty vector.
    pub async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        let parsed = ObjectKey::parse(key)?;
        let path = self.path_of(&parsed);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(key.to_string())),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    /// Remove the object at `key`. Returns whether it existed; a missing
    /// key is not an error.
    pub async fn delete(&self, key: &str) -> StorageResult<bool> {
        let parsed = ObjectKey::parse(key)?;
        let path = self.path_of(&parsed);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    /// Every key currently on disk, rebuilt from the two-level layout.
    ///
    /// Not a snapshot: a concurrent write may or may not be reflected. Object
    /// directories that cannot be read are skipped so the rest stays listable.
    pub async fn list_keys(&self) -> StorageResult<BTreeSet<String>> {
        let mut keys = BTreeSet::new();
        let mut objects = tokio::fs::read_dir(&self.base_dir)
            .await
            .map_err(|e| StorageError::io(&self.base_dir, e))?;
        while let Some(object) = objects
            .next_entry()
            .await
            .map_err(|e| StorageError::io(&self.base_dir, e))?
        {
            if !is_dir(&object).await {
                continue;
            }
            let Some(object_id) = object.file_name().to_str().map(str::to_owned) else {
                warn!(path = %object.path().display(), "skipping non UTF-8 directory");
                continue;
            };
            match list_object(&object_id, &object.path(), &mut keys).await {
                Ok(()) => {}
                // Removed between the two listings.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %object.path().display(), error = %e, "skipping unreadable object directory")
                }
            }
        }
        Ok(keys)
    }
}

async fn list_object(object_id: &str, dir: &Path, keys: &mut BTreeSet<String>) -> std::io::Result<()> {
    let mut files = tokio::fs::read_dir(dir).await?;
    while let Some(file) = files.next_entry().await? {
        if is_dir(&file).await {
            continue;
        }
        match file.file_name().to_str().map(|name| ObjectKey::new(object_id, name)) {
            Some(Ok(key)) => {
                keys.insert(key.encoded());
            }
            _ => warn!(path = %file.path().display(), "skipping entry that is not a valid key"),
        }
    }
    Ok(())
}

async fn is_dir(entry: &tokio::fs::DirEntry) -> bool {
    entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> (tempfile::TempDir, FsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path().join("node")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn write_then_read() {
        let (_dir, store) = store().await;
        store.write("video-1/manifest.mpd", b"<MPD/>").await.unwrap();
        assert_eq!(store.read("video-1/manifest.mpd").await.unwrap(), b"<MPD/>");
        assert!(store.base_dir().join("video-1").join("manifest.mpd").is_file());
    }

    #[tokio::test]
    async fn write_overwrites_and_is_idempotent() {
        let (_dir, store) = store().await;
        store.write("v/seg.m4s", b"old").await.unwrap();
        store.write("v/seg.m4s", b"new").await.unwrap();
        store.write("v/seg.m4s", b"new").await.unwrap();
        assert_eq!(store.read("v/seg.m4s").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn empty_object_is_distinct_from_missing() {
        let (_dir, store) = store().await;
        store.write("v/empty", b"").await.unwrap();
        assert_eq!(store.read("v/empty").await.unwrap(), Vec::<u8>::new());
        assert!(matches!(store.read("v/missing").await, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = store().await;
        store.write("v/a", b"1").await.unwrap();
        assert!(store.delete("v/a").await.unwrap());
        assert!(!store.delete("v/a").await.unwrap());
        assert!(!store.delete("never/written").await.unwrap());
        assert!(matches!(store.read("v/a").await, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_keys_walks_two_levels() {
        let (_dir, store) = store().await;
        store.write("v1/a", b"1").await.unwrap();
        store.write("v1/b", b"2").await.unwrap();
        store.write("v2/a", b"3").await.unwrap();
        // Stray entries outside the layout are ignored.
        tokio::fs::write(store.base_dir().join("loose-file"), b"x").await.unwrap();
        tokio::fs::create_dir_all(store.base_dir().join("v2").join("nested")).await.unwrap();

        let keys: Vec<String> = store.list_keys().await.unwrap().into_iter().collect();
        assert_eq!(keys, vec!["v1/a", "v1/b", "v2/a"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn list_keys_skips_unreadable_object_dir() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = store().await;
        store.write("v1/a", b"1").await.unwrap();
        store.write("locked/b", b"2").await.unwrap();
        let locked = store.base_dir().join("locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        let listed = store.list_keys().await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        // Privileged users read the directory anyway; either way the listing succeeds.
        assert!(listed.unwrap().contains("v1/a"));
    }

    #[tokio::test]
    async fn rejects_keys_escaping_base_dir() {
        let (_dir, store) = store().await;
        assert!(matches!(
            store.write("../escape", b"x").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(store.read("a/b/c").await, Err(StorageError::InvalidKey(_))));
    }
}
