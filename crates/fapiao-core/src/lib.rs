//! Core library for invoice document ingestion.
//!
//! This crate provides:
//! - File admission (type/size validation of uploaded documents)
//! - Batch orchestration (concurrent per-file extraction pipelines)
//! - An extraction-service boundary with a Gemini adapter
//! - Field normalization of untrusted extraction output
//! - A record store boundary with in-memory and file-backed sinks

pub mod admission;
pub mod batch;
pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod store;

pub use admission::{admit, AdmittedFile, Admission, FileCandidate, MimeKind, MAX_FILE_BYTES};
pub use batch::{BatchOrchestrator, BatchOutcome, BatchProgress, FileProcessingState, FileStatus};
pub use error::{
    AdmissionError, ExtractionError, FapiaoError, Result, StoreError, ValidationError,
};
pub use extract::{ExtractionClient, ExtractionRequest, GeminiClient};
pub use models::{FapiaoConfig, InvoiceRecord, InvoiceStatus, NewInvoice};
pub use store::{JsonStore, MemoryStore, RecordSink};
