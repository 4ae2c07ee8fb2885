//! Resume checkpoint persisted next to the output file.
//!
//! The checkpoint holds a single decimal integer: the index of the next
//! segment to fetch. It is rewritten after every segment and removed once
//! the download completes.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::error::{Error, Result};

/// An open resume checkpoint file.
#[derive(Debug)]
pub struct ResumeCheckpoint {
    path: PathBuf,
    file: File,
}

impl ResumeCheckpoint {
    /// Read the next segment index from an existing checkpoint.
    pub async fn read(path: &Path) -> Result<usize> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::ResumeStateUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        content
            .trim()
            .parse::<usize>()
            .map_err(|e| Error::ResumeStateUnreadable {
                path: path.to_path_buf(),
                reason: format!("invalid segment index {:?}: {}", content.trim(), e),
            })
    }

    /// Create or truncate the checkpoint and write `next_index` to it.
    pub async fn create(path: PathBuf, next_index: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await?;

        let mut checkpoint = Self { path, file };
        checkpoint.store(next_index).await?;
        Ok(checkpoint)
    }

    /// Overwrite the stored index. Returns once the data reached the disk.
    pub async fn store(&mut self, next_index: usize) -> Result<()> {
        self.file.set_len(0).await?;
        self.file.seek(SeekFrom::Start(0)).await?;
        self.file.write_all(next_index.to_string().as_bytes()).await?;
        self.file.flush().await?;
        self.file.sync_data().await?;

        tracing::debug!("Checkpoint {} -> {}", self.path.display(), next_index);
        Ok(())
    }

    /// Close and delete the checkpoint file.
    pub async fn remove(self) -> Result<()> {
        let Self { path, file } = self;
        drop(file);
        fs::remove_file(&path).await?;
        Ok(())
    }
}
