//! Flat-file JSON record store.
//!
//! Every operation loads a whole document, works on the decoded collection and
//! writes the whole document back. Writers to the same document are serialized
//! by a per-document mutex, which keeps the file intact but does not make two
//! separate calls transactional: a caller that reads, awaits something else and
//! then writes can still overwrite a concurrent change.

use std::{path::PathBuf, sync::Arc};

use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{Order, OrderStatus};

mod backend;
mod record;

pub use backend::{DocumentBackend, FileBackend, MemoryBackend};
pub use record::Record;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("document {0} has an unexpected shape")]
    Corrupt(&'static str),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One physical document. Users and orders share a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Main,
    Reviews,
    Products,
}

impl Document {
    pub fn file_name(self) -> &'static str {
        match self {
            Document::Main => "db.json",
            Document::Reviews => "reviews.json",
            Document::Products => "products.json",
        }
    }

    fn empty(self) -> Value {
        match self {
            Document::Main => json!({ "users": [], "orders": [] }),
            Document::Reviews | Document::Products => json!([]),
        }
    }

    fn index(self) -> usize {
        match self {
            Document::Main => 0,
            Document::Reviews => 1,
            Document::Products => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Orders,
    Reviews,
    Products,
}

impl Collection {
    pub fn document(self) -> Document {
        match self {
            Collection::Users | Collection::Orders => Document::Main,
            Collection::Reviews => Document::Reviews,
            Collection::Products => Document::Products,
        }
    }

    /// Key of the collection inside its document; `None` when the document is
    /// the bare array.
    fn key(self) -> Option<&'static str> {
        match self {
            Collection::Users => Some("users"),
            Collection::Orders => Some("orders"),
            Collection::Reviews | Collection::Products => None,
        }
    }
}

pub struct JsonStore {
    backend: Arc<dyn DocumentBackend>,
    locks: [Mutex<()>; 3],
}

impl JsonStore {
    pub fn with_backend(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            locks: [Mutex::new(()), Mutex::new(()), Mutex::new(())],
        }
    }

    /// Store backed by JSON files in `dir`. Missing files read as empty.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self::with_backend(Arc::new(FileBackend::new(dir)))
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    /// Fails when the main document cannot be loaded and decoded.
    pub async fn ping(&self) -> StoreResult<()> {
        self.read_document(Document::Main).await.map(|_| ())
    }

    async fn read_document(&self, document: Document) -> StoreResult<Value> {
        match self.backend.load(document).await? {
            Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
                Ok(serde_json::from_slice(&bytes)?)
            }
            _ => Ok(document.empty()),
        }
    }

    async fn write_document(&self, document: Document, value: &Value) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.backend.save(document, bytes).await
    }

    fn extract<T: Record>(doc: &Value) -> StoreResult<Vec<T>> {
        let slot = match T::COLLECTION.key() {
            Some(key) => match doc {
                Value::Object(map) => map.get(key),
                _ => return Err(StoreError::Corrupt(T::COLLECTION.document().file_name())),
            },
            None => Some(doc),
        };
        match slot {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value.clone())?),
        }
    }

    fn embed<T: Record>(doc: &mut Value, records: &[T]) -> StoreResult<()> {
        let encoded = serde_json::to_value(records)?;
        match T::COLLECTION.key() {
            Some(key) => match doc {
                Value::Object(map) => {
                    map.insert(key.to_string(), encoded);
                    Ok(())
                }
                _ => Err(StoreError::Corrupt(T::COLLECTION.document().file_name())),
            },
            None => {
                *doc = encoded;
                Ok(())
            }
        }
    }

    /// All records of a collection in insertion order.
    ///
    /// An unreadable document is reported in the log and treated as empty.
    pub async fn list<T: Record>(&self) -> Vec<T> {
        let document = T::COLLECTION.document();
        let loaded = match self.read_document(document).await {
            Ok(doc) => Self::extract::<T>(&doc),
            Err(err) => Err(err),
        };
        match loaded {
            Ok(records) => records,
            Err(err) => {
                tracing::warn!(error = %err, document = document.file_name(), "reading store document failed");
                Vec::new()
            }
        }
    }

    pub async fn get<T: Record>(&self, id: &str) -> Option<T> {
        self.list::<T>().await.into_iter().find(|r| r.record_id() == id)
    }

    /// Runs one read-modify-write cycle on the collection under the document
    /// lock. The document is written back only when `f` returns `Some`.
    pub async fn modify<T, R, F>(&self, f: F) -> StoreResult<Option<R>>
    where
        T: Record,
        F: FnOnce(&mut Vec<T>) -> Option<R>,
    {
        let document = T::COLLECTION.document();
        let _guard = self.locks[document.index()].lock().await;

        let mut doc = self.read_document(document).await?;
        let mut records = Self::extract::<T>(&doc)?;
        let outcome = f(&mut records);
        if outcome.is_some() {
            Self::embed(&mut doc, &records)?;
            self.write_document(document, &doc).await?;
        }
        Ok(outcome)
    }

    pub async fn insert<T: Record>(&self, mut record: T) -> StoreResult<T> {
        let inserted = self
            .modify(|records: &mut Vec<T>| {
                record.prepare_insert(records);
                records.push(record.clone());
                Some(record)
            })
            .await?;
        inserted.ok_or(StoreError::Corrupt(T::COLLECTION.document().file_name()))
    }

    /// Applies `f` to the record with `id`. `Ok(None)` when no such record.
    pub async fn update<T, F>(&self, id: &str, f: F) -> StoreResult<Option<T>>
    where
        T: Record,
        F: FnOnce(&mut T),
    {
        self.modify(|records: &mut Vec<T>| {
            let record = records.iter_mut().find(|r| r.record_id() == id)?;
            f(record);
            Some(record.clone())
        })
        .await
    }

    pub async fn remove<T: Record>(&self, id: &str) -> StoreResult<bool> {
        let removed = self
            .modify(|records: &mut Vec<T>| {
                let pos = records.iter().position(|r| r.record_id() == id)?;
                records.remove(pos);
                Some(())
            })
            .await?;
        Ok(removed.is_some())
    }

    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<Option<Order>> {
        self.update(order_id, |order: &mut Order| order.status = status)
            .await
    }
}
