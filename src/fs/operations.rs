use std::path::{Path, PathBuf};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{self, AsyncReadExt, AsyncWriteExt},
};
use tracing::debug;

/// Sibling path used while a file is being replaced.
pub fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replaces the contents of `path` with `content`. Data is written into a temporary file first and
/// then renamed over the original, so a crash leaves either the old or the new file behind.
pub async fn write_atomically(path: &Path, content: &[u8]) -> Result<(), io::Error> {
    let temporary = temporary_path(path);
    debug!("Writing {} bytes into {temporary:?}", content.len());

    let mut file = File::create(&temporary).await?;
    let written = async {
        file.lock_exclusive()?;
        let result = async {
            file.write_all(content).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        file.unlock_async().await?;
        result
    }
    .await;
    drop(file);

    let result = match written {
        Ok(()) => tokio::fs::rename(&temporary, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        debug!("Removing {temporary:?} after failed write: {e}");
        let _ = tokio::fs::remove_file(&temporary).await;
    }
    result
}

/// Reads the whole file while holding a shared lock on it. The content is returned as is, without
/// any assumptions about its encoding.
pub async fn read_locked(path: &Path) -> Result<Vec<u8>, io::Error> {
    let mut file = File::open(path).await?;
    file.lock_shared()?;
    let mut content = vec![];
    let result = file.read_to_end(&mut content).await;
    file.unlock_async().await?;
    result?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use anyhow::Result;
    use tempfile::tempdir;

    use super::{read_locked, temporary_path, write_atomically};

    #[test]
    fn test_temporary_path_is_sibling() {
        let path = temporary_path(Path::new("/tmp/data/routine.csv"));
        assert_eq!(path, Path::new("/tmp/data/routine.csv.tmp"));
    }

    #[tokio::test]
    async fn test_write_atomically_creates_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("routine.csv");

        write_atomically(&path, b"hello\n").await?;

        assert_eq!(read_locked(&path).await?, b"hello\n");
        assert!(!temporary_path(&path).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_write_atomically_overwrites() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("routine.csv");
        std::fs::write(&path, "a much longer previous content\n")?;

        write_atomically(&path, b"short\n").await?;

        assert_eq!(read_locked(&path).await?, b"short\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_write_atomically_missing_directory() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("missing").join("routine.csv");

        assert!(write_atomically(&path, b"data").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_write_atomically_cleans_up_after_failure() -> Result<()> {
        let dir = tempdir()?;
        // Renaming over a non-empty directory fails once the temporary file is already written.
        let path = dir.path().join("routine.csv");
        std::fs::create_dir(&path)?;
        std::fs::write(path.join("inner"), "keep")?;

        assert!(write_atomically(&path, b"data").await.is_err());
        assert!(path.join("inner").exists());
        assert!(!temporary_path(&path).exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_read_locked_keeps_raw_bytes() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("routine.csv");
        std::fs::write(&path, b"Caf\xE9\n")?;

        assert_eq!(read_locked(&path).await?, b"Caf\xE9\n");
        Ok(())
    }

    #[tokio::test]
    async fn test_read_locked_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let error = read_locked(&dir.path().join("nope.csv")).await.unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
        Ok(())
    }
}
