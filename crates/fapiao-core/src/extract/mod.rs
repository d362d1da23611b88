//! Extraction capability boundary.
//!
//! The extraction service is an opaque document-understanding capability:
//! given file bytes, a mime type and an instruction, it returns a text
//! payload expected to contain JSON-encoded invoice fields. Everything it
//! returns is untrusted until it passes through [`crate::normalize`].

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::admission::MimeKind;
use crate::error::ExtractionError;

/// One extraction request.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// Raw document bytes.
    pub content: &'a [u8],

    /// Declared mime type of the document.
    pub mime_type: &'a str,

    /// Natural-language instruction describing the fields to extract.
    pub instruction: &'a str,
}

/// Opaque external document-understanding capability.
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Run one extraction and return the raw text payload.
    async fn extract(&self, request: ExtractionRequest<'_>) -> Result<String, ExtractionError>;
}

const PDF_INSTRUCTION: &str = "Analyze the invoice in this PDF document and extract the \
following fields: invoice number, invoice type, issue date, total amount, vendor name. \
Return JSON with exactly these keys: invoiceNumber, type, date, amount, vendor";

const IMAGE_INSTRUCTION: &str = "Extract the following fields from this invoice image: \
invoice number, invoice type, issue date, total amount, vendor name. \
Return JSON with exactly these keys: invoiceNumber, type, date, amount, vendor";

/// Instruction text appropriate for the document kind.
pub fn instruction_for(kind: MimeKind) -> &'static str {
    match kind {
        MimeKind::Pdf => PDF_INSTRUCTION,
        MimeKind::Image => IMAGE_INSTRUCTION,
    }
}

/// Parse the service's text payload into a raw extraction result.
///
/// The payload may be a single JSON object or a sequence; only the first
/// element of a sequence is authoritative, the rest is discarded. An empty
/// sequence yields `Value::Null`, which fails normalization with every
/// field missing.
pub fn parse_payload(text: &str) -> Result<Value, ExtractionError> {
    let value: Value = serde_json::from_str(text).map_err(|_| ExtractionError::Parse)?;

    match value {
        Value::Array(mut elements) => {
            if elements.len() > 1 {
                warn!(
                    discarded = elements.len() - 1,
                    "extraction returned multiple objects, keeping only the first"
                );
            }
            if elements.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(elements.swap_remove(0))
            }
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_single_object() {
        let value = parse_payload(r#"{"invoiceNumber":"INV1","amount":"100.50"}"#).unwrap();
        assert_eq!(value["invoiceNumber"], "INV1");
    }

    #[test]
    fn takes_first_element_of_sequence() {
        let value =
            parse_payload(r#"[{"invoiceNumber":"INV1"},{"invoiceNumber":"INV2"}]"#).unwrap();
        assert_eq!(value, json!({"invoiceNumber": "INV1"}));
    }

    #[test]
    fn empty_sequence_becomes_null() {
        assert_eq!(parse_payload("[]").unwrap(), Value::Null);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_payload("the invoice looks fine to me").unwrap_err();
        assert!(matches!(err, ExtractionError::Parse));
    }

    #[test]
    fn instructions_name_the_wire_keys() {
        for kind in [MimeKind::Image, MimeKind::Pdf] {
            let instruction = instruction_for(kind);
            for key in ["invoiceNumber", "type", "date", "amount", "vendor"] {
                assert!(instruction.contains(key), "{kind:?} instruction misses {key}");
            }
        }
    }
}
