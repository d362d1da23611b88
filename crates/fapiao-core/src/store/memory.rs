//! In-memory record store.

use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use super::RecordSink;
use crate::error::StoreError;
use crate::models::{InvoiceRecord, InvoiceStatus, NewInvoice};

/// Process-local record store backed by a mutex-guarded vector.
///
/// The duplicate check and the insert happen under one guard, so two
/// concurrent saves of the same invoice number cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<InvoiceRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records, preserving their order.
    pub fn with_records(records: Vec<InvoiceRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

pub(super) fn insert_unique(
    records: &mut Vec<InvoiceRecord>,
    invoice: NewInvoice,
    status: InvoiceStatus,
) -> Result<InvoiceRecord, StoreError> {
    if records
        .iter()
        .any(|r| r.invoice.invoice_number == invoice.invoice_number)
    {
        return Err(StoreError::Duplicate {
            invoice_number: invoice.invoice_number,
        });
    }

    let record = InvoiceRecord {
        id: Uuid::new_v4().to_string(),
        invoice,
        status,
    };
    records.push(record.clone());
    Ok(record)
}

pub(super) fn set_status(
    records: &mut [InvoiceRecord],
    id: &str,
    status: InvoiceStatus,
) -> Result<InvoiceRecord, StoreError> {
    let record = records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;
    record.status = status;
    Ok(record.clone())
}

#[async_trait]
impl RecordSink for MemoryStore {
    async fn list_all(&self) -> Result<Vec<InvoiceRecord>, StoreError> {
        Ok(self.records.lock().expect("store lock poisoned").clone())
    }

    async fn save(
        &self,
        invoice: NewInvoice,
        status: InvoiceStatus,
    ) -> Result<InvoiceRecord, StoreError> {
        let mut records = self.records.lock().expect("store lock poisoned");
        insert_unique(&mut records, invoice, status)
    }

    async fn update_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<InvoiceRecord, StoreError> {
        let mut records = self.records.lock().expect("store lock poisoned");
        set_status(&mut records, id, status)
    }
}
