//! Record store boundary.
//!
//! The pipeline never touches storage state directly; it talks to an
//! injected [`RecordSink`]. Uniqueness of the invoice number is the sink's
//! responsibility and must be enforced atomically with the insert.

mod json;
mod memory;

pub use json::JsonStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{InvoiceRecord, InvoiceStatus, NewInvoice};

/// External persistence collaborator holding invoice records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// All stored records, in insertion order.
    async fn list_all(&self) -> Result<Vec<InvoiceRecord>, StoreError>;

    /// Persist a normalized invoice, assigning a fresh identity.
    ///
    /// Fails with [`StoreError::Duplicate`] when the invoice number is
    /// already stored; the check and the insert are one atomic step.
    async fn save(
        &self,
        invoice: NewInvoice,
        status: InvoiceStatus,
    ) -> Result<InvoiceRecord, StoreError>;

    /// Update the status of the record with the given id.
    async fn update_status(
        &self,
        id: &str,
        status: InvoiceStatus,
    ) -> Result<InvoiceRecord, StoreError>;
}
