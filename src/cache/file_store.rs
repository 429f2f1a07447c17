//! File-backed persistent tier
//!
//! Stores one JSON file per record in a cache directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::warn;

use crate::cache::PersistentStore;
use crate::error::Result;

const RECORD_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// Suffix source for temp files, unique per write within the process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// On-disk layout of a record. The key is kept inside the file because the
/// file name is a digest.
#[derive(Debug, Serialize, Deserialize)]
struct FileRecord {
    key: String,
    value: String,
}

fn digest(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

// == File Store ==
/// Persistent-tier backend writing records under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    // == Constructor ==
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{RECORD_EXTENSION}", digest(key)))
    }

    /// A temp path no other in-flight write to this directory uses.
    fn temp_path(&self, key: &str) -> PathBuf {
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            "{}.{}-{seq}.{TEMP_EXTENSION}",
            digest(key),
            std::process::id()
        ))
    }

    async fn read_record(path: &Path) -> Result<Option<FileRecord>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PersistentStore for FileStore {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let record = Self::read_record(&self.record_path(key)).await?;
        // A digest collision would surface as a foreign key
        Ok(record.filter(|r| r.key == key).map(|r| r.value))
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.record_path(key);
        let tmp = self.temp_path(key);
        let record = FileRecord {
            key: key.to_string(),
            value: value.to_string(),
        };

        fs::write(&tmp, serde_json::to_vec(&record)?).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.record_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut dir = fs::read_dir(&self.dir).await?;

        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            match Self::read_record(&path).await {
                Ok(Some(record)) => keys.push(record.key),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable cache record {}: {}", path.display(), e),
            }
        }

        Ok(keys)
    }
}
