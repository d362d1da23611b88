//! File-backed record store for the CLI.
//!
//! Same semantics as [`super::MemoryStore`], persisted to a JSON file after
//! each mutation so separate command invocations share one collection.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::memory::{insert_unique, set_status};
use super::RecordSink;
use crate::error::StoreError;
use crate::models::{InvoiceRecord, InvoiceStatus, NewInvoice};

/// Record store persisted as a JSON array on disk.
pub struct JsonStore {
    path: PathBuf,
    records: Mutex<Vec<InvoiceRecord>>,
}

impl JsonStore {
    /// Open a store, loading existing records. A missing file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    async fn persist(&self, records: &[InvoiceRecord]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for JsonStore {
    async fn list_all(&self) -> Result<Vec<InvoiceRecord>, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn save(
        &self,
        invoice: NewInvoice,
        status: InvoiceStatus,
    ) -> Result<InvoiceRecord, StoreError> {
        // The lock spans check, insert and persist; concurrent saves of the
        // same invoice number serialize here.
        let mut records = self.records.lock().await;
        let record = insert_unique(&mut records, invoice, status)?;
        self.persist(&records).await?;
        Ok(record)
    }

    async fn update_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<InvoiceRecord, StoreError> {
        let mut records = self.records.lock().await;
        let record = set_status(&mut records, id, status)?;
        self.persist(&records).await?;
        Ok(record)
    }
}
