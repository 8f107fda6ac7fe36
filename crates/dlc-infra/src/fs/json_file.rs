//! Single-document JSON store shared by the parameter repositories and the
//! job queue.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// One JSON document on disk.
///
/// A missing or empty file reads as `T::default()`. Writes go through a
/// temporary file and a rename, so a crash leaves either the old or the new
/// document. All access is serialised by an internal lock, which makes
/// [`JsonFileStore::update`] an atomic read-modify-write within the process.
pub struct JsonFileStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default + Send + Sync,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<T> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    pub async fn save(&self, value: &T) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.atomic_write(value).await
    }

    /// Read, apply `f`, write back. Returns the written value.
    pub async fn update<F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut T) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut value = self.read().await?;
        f(&mut value);
        self.atomic_write(&value).await?;
        Ok(value)
    }

    /// Delete the document. A missing file is not an error.
    pub async fn remove(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove failed: {}", self.path.display())),
        }
    }

    async fn read(&self) -> Result<T> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("read failed: {}", self.path.display()))
            }
        };

        if content.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("parse failed: {}", self.path.display()))
    }

    async fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create dir failed: {}", dir.display()))?;
        }
        Ok(())
    }

    async fn atomic_write(&self, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value).context("serialize failed")?;
        self.ensure_parent_dir().await?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp file failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, &self.path).await.with_context(|| {
            format!(
                "rename temp file to target failed: {} -> {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        value: u32,
    }

    #[tokio::test]
    async fn test_load_returns_default_when_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::<Counter>::new(temp_dir.path().join("missing.json"));

        assert_eq!(store.load().await.unwrap(), Counter::default());
    }

    #[tokio::test]
    async fn test_load_returns_default_when_file_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.json");
        std::fs::write(&path, "  \n").unwrap();
        let store = JsonFileStore::<Counter>::new(path);

        assert_eq!(store.load().await.unwrap(), Counter::default());
    }

    #[tokio::test]
    async fn test_save_creates_parent_dir_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("counter.json");
        let store = JsonFileStore::<Counter>::new(&path);

        store.save(&Counter { value: 7 }).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load().await.unwrap().value, 7);
    }

    #[tokio::test]
    async fn test_update_reads_modifies_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.json");
        let store = JsonFileStore::<Counter>::new(&path);

        store.update(|c| c.value += 1).await.unwrap();
        let written = store.update(|c| c.value += 1).await.unwrap();

        assert_eq!(written.value, 2);
        let reopened = JsonFileStore::<Counter>::new(&path);
        assert_eq!(reopened.load().await.unwrap().value, 2);
    }

    #[tokio::test]
    async fn test_load_fails_on_corrupt_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("corrupt.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::<Counter>::new(path);

        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counter.json");
        let store = JsonFileStore::<Counter>::new(&path);
        store.save(&Counter { value: 1 }).await.unwrap();

        store.remove().await.unwrap();
        store.remove().await.unwrap();

        assert!(!path.exists());
    }
}
