//! Error types for the fapiao-core library.

use thiserror::Error;

/// Main error type for the fapiao library.
#[derive(Error, Debug)]
pub enum FapiaoError {
    /// File admission error.
    #[error("admission error: {0}")]
    Admission(#[from] AdmissionError),

    /// Extraction service error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Field validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Record store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Reasons a candidate file is rejected at admission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// Mime type is neither image/* nor application/pdf.
    #[error("{name}: unsupported file type")]
    UnsupportedType { name: String },

    /// File exceeds the per-file size limit.
    #[error("{name}: file exceeds size limit")]
    TooLarge { name: String },

    /// Another file in the same submission already uses this name.
    #[error("{name}: duplicate file name in submission")]
    DuplicateName { name: String },
}

/// Errors from the extraction capability.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Transport or service-level failure.
    #[error("extraction request failed: {0}")]
    Request(String),

    /// The service answered without any text payload.
    #[error("extraction service returned no content")]
    EmptyResponse,

    /// The text payload is not valid JSON.
    #[error("unable to parse extraction result")]
    Parse,
}

/// Errors from normalizing a raw extraction result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required fields are absent or empty, listed in fixed field order.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Errors from the record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An invoice with this number already exists.
    #[error("invoice number already exists: {invoice_number}")]
    Duplicate { invoice_number: String },

    /// No record with this id.
    #[error("invoice not found: {id}")]
    NotFound { id: String },

    /// Persistence I/O failure (file-backed stores).
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persistence encoding failure (file-backed stores).
    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for the fapiao library.
pub type Result<T> = std::result::Result<T, FapiaoError>;
