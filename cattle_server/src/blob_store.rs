//! Storage for uploaded photos and documents (NF-e, GTA).
//!
//! Uploads are stored under a fresh random name, keeping only the extension of the name the client supplied. The
//! stored name is what listings refer to, and what clients use to fetch the file again.
use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::*;
use thiserror::Error;
use tokio::fs;

const MAX_EXTENSION_LENGTH: usize = 10;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    #[error("Could not access the file store. {0}")]
    Io(#[from] std::io::Error),
}

#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// Stores `data` and returns the name it was stored under.
    async fn store(&self, original_name: &str, data: Bytes) -> Result<String, BlobStoreError>;

    /// Fetches a stored file. Returns `None` if nothing is stored under `name`.
    async fn fetch(&self, name: &str) -> Result<Option<Bytes>, BlobStoreError>;
}

#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    pub async fn new<P: AsRef<Path>>(root: P) -> Result<Self, BlobStoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        info!("💻️ Uploads will be stored in {}", root.display());
        Ok(Self { root })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, BlobStoreError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(BlobStoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

/// A fresh name for an upload, keeping the extension of `original_name` if it looks sane.
pub fn stored_name(original_name: &str) -> String {
    let id = uuid::Uuid::new_v4();
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= MAX_EXTENSION_LENGTH && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase());
    match ext {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

impl BlobStore for FileBlobStore {
    async fn store(&self, original_name: &str, data: Bytes) -> Result<String, BlobStoreError> {
        let name = stored_name(original_name);
        let path = self.path_for(&name)?;
        fs::write(&path, &data).await?;
        debug!("💻️ Stored {} bytes as {name}", data.len());
        Ok(name)
    }

    async fn fetch(&self, name: &str) -> Result<Option<Bytes>, BlobStoreError> {
        let path = self.path_for(name)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
