//! Invoice data models shared by the pipeline, the store and the HTTP facade.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Workflow status of a stored invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Reviewed and approved.
    Approved,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceStatus::Pending => write!(f, "pending"),
            InvoiceStatus::Approved => write!(f, "approved"),
        }
    }
}

/// A normalized invoice before the store has assigned identity.
///
/// Field names on the wire match the extraction contract:
/// `invoiceNumber`, `type`, `date`, `amount`, `vendor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    /// Invoice number, unique across the record store.
    #[serde(rename = "invoiceNumber")]
    pub invoice_number: String,

    /// Invoice type as printed on the document (free-form).
    #[serde(rename = "type")]
    pub invoice_type: String,

    /// Issue date as extracted; free-form text, never parsed.
    pub date: String,

    /// Invoice amount.
    pub amount: Decimal,

    /// Vendor (supplier) name.
    pub vendor: String,
}

/// A stored invoice with identity and status assigned at save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Store-assigned identity.
    pub id: String,

    /// Invoice content fields.
    #[serde(flatten)]
    pub invoice: NewInvoice,

    /// Workflow status.
    pub status: InvoiceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_invoice_uses_wire_field_names() {
        let invoice = NewInvoice {
            invoice_number: "INV123456".to_string(),
            invoice_type: "增值税专用发票".to_string(),
            date: "2025-03-15".to_string(),
            amount: Decimal::new(1250000, 2),
            vendor: "优质供应商A".to_string(),
        };

        let json = serde_json::to_value(&invoice).unwrap();
        assert_eq!(json["invoiceNumber"], "INV123456");
        assert_eq!(json["type"], "增值税专用发票");
        assert_eq!(json["date"], "2025-03-15");
        assert_eq!(json["vendor"], "优质供应商A");
    }

    #[test]
    fn record_flattens_invoice_fields() {
        let record = InvoiceRecord {
            id: "1".to_string(),
            invoice: NewInvoice {
                invoice_number: "INV1".to_string(),
                invoice_type: "普通发票".to_string(),
                date: "2025-01-01".to_string(),
                amount: Decimal::new(10050, 2),
                vendor: "X".to_string(),
            },
            status: InvoiceStatus::Pending,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["invoiceNumber"], "INV1");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(InvoiceStatus::Approved).unwrap(), "approved");
        assert_eq!(
            serde_json::from_value::<InvoiceStatus>(serde_json::Value::String("pending".into()))
                .unwrap(),
            InvoiceStatus::Pending
        );
    }
}
