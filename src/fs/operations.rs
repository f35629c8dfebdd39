use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, trace};

/// Delay between attempts to take a writer lock that is held by another process.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// Replaces the content of `path` with `contents`. The data goes into a temporary file in the same
/// directory first and is then renamed over the target, so a reader either sees the previous
/// document or the new one, never a half written file.
pub async fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = sibling_path(path, &format!(".tmp.{}", std::process::id()));
    let result = write_then_rename(&temp_path, path, contents).await;
    if result.is_err() {
        // The target is untouched at this point, only the temp file has to go.
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    result
}

async fn write_then_rename(temp_path: &Path, path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = File::create(temp_path)
        .await
        .with_context(|| format!("Failed to create temporary file {temp_path:?}"))?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(temp_path, path)
        .await
        .with_context(|| format!("Failed to move {temp_path:?} over {path:?}"))?;
    debug!("Replaced {path:?}");
    Ok(())
}

/// Reads a whole file, mapping a missing file to `None`.
pub async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {path:?}")),
    }
}

/// Exclusive advisory lock on a `<file>.lock` sidecar. Writers hold it for a whole
/// read-modify-write cycle. The data file itself can't carry the lock because every write
/// renames a new inode over it.
pub struct WriterLock {
    file: File,
    path: PathBuf,
}

impl WriterLock {
    pub async fn acquire(target: &Path) -> Result<Self> {
        let path = sibling_path(target, ".lock");
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open lock file {path:?}"))?;

        // Blocking on the lock would stall the current thread runtime, so poll instead.
        loop {
            match file.try_lock_exclusive() {
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    trace!("{path:?} is held by another writer");
                    tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to lock {path:?}"));
                }
            }
        }
        trace!("Acquired {path:?}");

        Ok(Self { file, path })
    }

    pub async fn release(self) -> Result<()> {
        self.file.unlock_async().await?;
        trace!("Released {:?}", self.path);
        Ok(())
    }
}

/// `data/tasks.json` + `.lock` -> `data/tasks.json.lock`
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;
    use tempfile::tempdir;

    use super::{read_optional, replace_file, sibling_path, WriterLock};

    #[tokio::test]
    async fn test_replace_file_creates_and_overwrites() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("store.json");

        replace_file(&path, b"first").await?;
        assert_eq!(tokio::fs::read(&path).await?, b"first");

        replace_file(&path, b"second").await?;
        assert_eq!(tokio::fs::read(&path).await?, b"second");

        // Only the target remains, the temp file was renamed away.
        let names = std::fs::read_dir(dir.path())?
            .map(|v| v.map(|v| v.file_name()))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(names, vec!["store.json"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_file_missing_directory() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("missing").join("store.json");

        assert!(replace_file(&path, b"{}").await.is_err());
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_read_optional() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("value.json");
        assert_eq!(read_optional(&path).await?, None);

        std::fs::write(&path, "[]")?;
        assert_eq!(read_optional(&path).await?, Some(b"[]".to_vec()));
        Ok(())
    }

    #[tokio::test]
    async fn test_writer_lock_is_exclusive() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("store.json");

        let first = WriterLock::acquire(&path).await?;
        assert!(dir.path().join("store.json.lock").exists());

        let second = tokio::spawn({
            let path = path.clone();
            async move { WriterLock::acquire(&path).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!second.is_finished());

        first.release().await?;
        second.await??.release().await?;
        Ok(())
    }

    #[test]
    fn test_sibling_path() {
        let path = std::path::Path::new("data/tasks.json");
        assert_eq!(
            sibling_path(path, ".lock"),
            std::path::PathBuf::from("data/tasks.json.lock")
        );
    }
}
