//! Data models for invoices and configuration.

pub mod config;
pub mod invoice;

pub use config::{FapiaoConfig, GeminiConfig, StoreConfig};
pub use invoice::{InvoiceRecord, InvoiceStatus, NewInvoice};
