//! Field normalization: raw extraction results into typed invoices.
//!
//! The raw result comes from an untrusted boundary, so every field is
//! validated here before it enters typed domain logic.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::models::NewInvoice;

/// Required fields, in the fixed order used for error messages.
pub const REQUIRED_FIELDS: [&str; 5] = ["invoiceNumber", "type", "date", "amount", "vendor"];

/// A field counts as present when it exists and is not empty/falsy:
/// null, `false`, numeric zero and the empty string are all treated as
/// missing (the extraction contract predates stricter typing).
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Which of the required fields are missing from a raw result, in fixed
/// field order. A non-object value is missing all of them.
pub fn missing_fields(raw: &Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| !raw.get(**field).is_some_and(is_present))
        .copied()
        .collect()
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Parse an amount from its string or numeric form.
///
/// Mirrors `parseFloat`: the longest leading numeric prefix is parsed, and
/// an unparseable value yields zero rather than failing validation (the
/// presence check has already passed by the time this runs). Negative
/// parses clamp to zero so stored amounts stay non-negative.
fn coerce_amount(value: &Value) -> Decimal {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Decimal::ZERO,
    };

    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        let ok = match c {
            '0'..='9' => true,
            '+' | '-' => i == 0,
            '.' if !seen_dot => {
                seen_dot = true;
                true
            }
            _ => false,
        };
        if !ok {
            break;
        }
        end = i + c.len_utf8();
    }

    let amount = Decimal::from_str(&text[..end]).unwrap_or(Decimal::ZERO);
    amount.max(Decimal::ZERO)
}

/// Convert a raw extraction result into a typed invoice, validating that
/// every required field is present.
pub fn normalize(raw: &Value) -> Result<NewInvoice, ValidationError> {
    let missing = missing_fields(raw);
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    Ok(NewInvoice {
        invoice_number: coerce_string(&raw["invoiceNumber"]),
        invoice_type: coerce_string(&raw["type"]),
        date: coerce_string(&raw["date"]),
        amount: coerce_amount(&raw["amount"]),
        vendor: coerce_string(&raw["vendor"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn valid_raw() -> Value {
        json!({
            "invoiceNumber": "INV1",
            "type": "普通发票",
            "date": "2025-01-01",
            "amount": "100.50",
            "vendor": "X"
        })
    }

    #[test]
    fn normalizes_a_valid_result() {
        // A string amount coerces to a numeric record.
        let invoice = normalize(&valid_raw()).unwrap();
        assert_eq!(invoice.invoice_number, "INV1");
        assert_eq!(invoice.invoice_type, "普通发票");
        assert_eq!(invoice.date, "2025-01-01");
        assert_eq!(invoice.amount, Decimal::new(10050, 2));
        assert_eq!(invoice.vendor, "X");
    }

    #[test]
    fn numeric_amount_is_accepted() {
        let mut raw = valid_raw();
        raw["amount"] = json!(100.5);
        let invoice = normalize(&raw).unwrap();
        assert_eq!(invoice.amount, Decimal::new(1005, 1));
    }

    #[test]
    fn missing_vendor_is_named() {
        let mut raw = valid_raw();
        raw.as_object_mut().unwrap().remove("vendor");
        let err = normalize(&raw).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["vendor"]));
        assert_eq!(err.to_string(), "missing required fields: vendor");
    }

    #[test]
    fn missing_fields_follow_fixed_order() {
        let raw = json!({"date": "2025-01-01", "amount": "5"});
        let err = normalize(&raw).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["invoiceNumber", "type", "vendor"])
        );
    }

    #[test]
    fn empty_and_falsy_values_count_as_missing() {
        let mut raw = valid_raw();
        raw["vendor"] = json!("");
        raw["amount"] = json!(0);
        let err = normalize(&raw).unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec!["amount", "vendor"]));
    }

    #[test]
    fn non_object_is_missing_everything() {
        let err = normalize(&Value::Null).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(REQUIRED_FIELDS.to_vec())
        );
    }

    #[test]
    fn unparseable_amount_defaults_to_zero() {
        // Present-but-unparseable amount still yields a valid record.
        let mut raw = valid_raw();
        raw["amount"] = json!("about a hundred");
        let invoice = normalize(&raw).unwrap();
        assert_eq!(invoice.amount, Decimal::ZERO);
    }

    #[test]
    fn amount_parses_leading_numeric_prefix() {
        let mut raw = valid_raw();
        raw["amount"] = json!("100.50元");
        let invoice = normalize(&raw).unwrap();
        assert_eq!(invoice.amount, Decimal::new(10050, 2));
    }

    #[test]
    fn negative_amount_clamps_to_zero() {
        let mut raw = valid_raw();
        raw["amount"] = json!("-12.00");
        let invoice = normalize(&raw).unwrap();
        assert_eq!(invoice.amount, Decimal::ZERO);
    }

    #[test]
    fn numeric_invoice_number_coerces_to_string() {
        let mut raw = valid_raw();
        raw["invoiceNumber"] = json!(123456);
        let invoice = normalize(&raw).unwrap();
        assert_eq!(invoice.invoice_number, "123456");
    }
}
