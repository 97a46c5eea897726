use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};

use super::{Document, StoreResult};

/// Raw byte storage for whole JSON documents.
///
/// A backend never sees partial documents: `save` replaces the previous
/// contents in one step and `load` returns `None` when nothing was saved yet.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn load(&self, document: Document) -> StoreResult<Option<Vec<u8>>>;
    async fn save(&self, document: Document, bytes: Vec<u8>) -> StoreResult<()>;
}

/// Documents as files in a data directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, document: Document) -> PathBuf {
        self.dir.join(document.file_name())
    }
}

#[async_trait]
impl DocumentBackend for FileBackend {
    async fn load(&self, document: Document) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(self.path(document)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, document: Document, bytes: Vec<u8>) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).await?;
        let target = self.path(document);
        // Write beside the target and rename over it so readers never observe
        // a truncated document.
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &target).await?;
        Ok(())
    }
}

/// Process-local documents, used by tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<Document, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn load(&self, document: Document) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.documents.read().await.get(&document).cloned())
    }

    async fn save(&self, document: Document, bytes: Vec<u8>) -> StoreResult<()> {
        self.documents.write().await.insert(document, bytes);
        Ok(())
    }
}
