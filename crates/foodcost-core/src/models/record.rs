//! Purchasing record models produced by invoice extraction.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pack::PackSize;

lazy_static! {
    /// Tolerance for money cross-checks. Invoice text goes through OCR and
    /// rounding, so arithmetic is verified to the nearest two cents rather
    /// than exactly.
    pub static ref MONEY_TOLERANCE: Decimal = Decimal::new(2, 2);
}

/// Raw text handed to extraction, with optional provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDocument {
    /// Free-form invoice text (OCR output, pasted email body, etc.).
    pub text: String,

    /// Overall OCR confidence (0-100), when the text came from OCR.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Caller-supplied identifier (file name, email id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl RawDocument {
    /// Wrap bare text with no provenance.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            source_id: None,
        }
    }

    /// Attach a source identifier.
    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.source_id = Some(id.into());
        self
    }

    /// Attach an OCR confidence score.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Known foodservice distributors.
///
/// Identification happens by alias scan over the document text; this enum is
/// the canonical identity those aliases resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Distributor {
    #[serde(rename = "SYSCO")]
    Sysco,

    #[serde(rename = "SHAMROCK")]
    Shamrock,

    #[serde(rename = "US FOODS")]
    UsFoods,

    #[serde(rename = "PERFORMANCE FOOD")]
    PerformanceFood,

    #[serde(rename = "RESTAURANT DEPOT")]
    RestaurantDepot,

    /// No alias matched.
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl Distributor {
    /// Canonical tag, as used in exports and config files.
    pub fn tag(&self) -> &'static str {
        match self {
            Distributor::Sysco => "SYSCO",
            Distributor::Shamrock => "SHAMROCK",
            Distributor::UsFoods => "US FOODS",
            Distributor::PerformanceFood => "PERFORMANCE FOOD",
            Distributor::RestaurantDepot => "RESTAURANT DEPOT",
            Distributor::Unknown => "UNKNOWN",
        }
    }

    /// Parse a canonical tag back into a distributor.
    pub fn from_tag(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SYSCO" => Some(Distributor::Sysco),
            "SHAMROCK" => Some(Distributor::Shamrock),
            "US FOODS" => Some(Distributor::UsFoods),
            "PERFORMANCE FOOD" => Some(Distributor::PerformanceFood),
            "RESTAURANT DEPOT" => Some(Distributor::RestaurantDepot),
            "UNKNOWN" => Some(Distributor::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for Distributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Header-level fields pulled from the document.
///
/// Every field except the distributor is optional: a field the rules cannot
/// find stays `None` and is reported through warnings, never as an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Identified distributor, `Unknown` when no alias matched.
    #[serde(default)]
    pub distributor: Distributor,

    /// Invoice number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    /// Purchase order number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,

    /// Date the invoice was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// Date the goods were delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,

    /// Pre-tax amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Decimal>,

    /// Tax amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,

    /// Final invoice amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

/// A single purchased product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Vendor product code.
    pub item_code: String,

    /// Product description as printed.
    pub description: String,

    /// Pack-size token as printed (may be empty).
    #[serde(default)]
    pub pack_size: String,

    /// Quantity of cases/units ordered.
    pub quantity: Decimal,

    /// Price per case/unit.
    pub unit_price: Decimal,

    /// Extended price for the row.
    pub total_price: Decimal,

    /// Canonical form of `pack_size`.
    pub normalized_pack: PackSize,

    /// Unit price divided by case weight, for weight-convertible packs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_pound: Option<Decimal>,
}

/// Where a record came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMeta {
    /// Caller-supplied identifier (file name, email id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    /// Overall OCR confidence of the source text, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f32>,
}

/// The structured result of processing one invoice document.
///
/// Extraction always succeeds: anything that could not be read is a `None`
/// field or a skipped row, with the reason recorded in `warnings`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Header-level fields.
    pub fields: ExtractedFields,

    /// Parsed product rows, in document order.
    #[serde(default)]
    pub items: Vec<LineItem>,

    /// Human-readable notes on everything that went wrong or looked off.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Provenance of the source document.
    #[serde(default)]
    pub source: SourceMeta,
}

impl InvoiceRecord {
    /// Warnings for key fields that could not be found.
    pub fn missing_field_warnings(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.fields.invoice_number.is_none() {
            issues.push("Missing invoice number".to_string());
        }

        if self.fields.invoice_date.is_none() {
            issues.push("Missing invoice date".to_string());
        }

        if self.fields.total.is_none() {
            issues.push("Missing invoice total".to_string());
        }

        if self.fields.distributor == Distributor::Unknown {
            issues.push("Distributor not identified".to_string());
        }

        if self.items.is_empty() {
            issues.push("No line items found".to_string());
        }

        issues
    }

    /// Warnings for money arithmetic off by more than
    /// [`struct@MONEY_TOLERANCE`].
    pub fn arithmetic_warnings(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if let (Some(subtotal), Some(tax), Some(total)) =
            (self.fields.subtotal, self.fields.tax, self.fields.total)
        {
            let diff = (subtotal + tax - total).abs();
            if diff > *MONEY_TOLERANCE {
                issues.push(format!(
                    "Subtotal ({}) + tax ({}) differs from total ({}) by {}",
                    subtotal, tax, total, diff
                ));
            }
        }

        for item in &self.items {
            let extended = item.quantity * item.unit_price;
            let diff = (extended - item.total_price).abs();
            if diff > *MONEY_TOLERANCE {
                issues.push(format!(
                    "Line {}: quantity x unit price ({}) differs from total ({})",
                    item.item_code, extended, item.total_price
                ));
            }
        }

        issues
    }

    /// All advisory consistency checks, returned as warning strings.
    ///
    /// Nothing here is fatal and nothing is discarded; callers append these
    /// to the record's own warning list.
    pub fn check(&self) -> Vec<String> {
        let mut issues = self.missing_field_warnings();
        issues.extend(self.arithmetic_warnings());
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::parse_pack_size;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(code: &str, qty: &str, unit: &str, total: &str) -> LineItem {
        LineItem {
            item_code: code.to_string(),
            description: "TEST PRODUCT".to_string(),
            pack_size: "6/1#".to_string(),
            quantity: dec(qty),
            unit_price: dec(unit),
            total_price: dec(total),
            normalized_pack: parse_pack_size("6/1#"),
            price_per_pound: None,
        }
    }

    #[test]
    fn test_distributor_tag_round_trip() {
        for d in [
            Distributor::Sysco,
            Distributor::Shamrock,
            Distributor::UsFoods,
            Distributor::PerformanceFood,
            Distributor::RestaurantDepot,
            Distributor::Unknown,
        ] {
            assert_eq!(Distributor::from_tag(d.tag()), Some(d));
        }
        assert_eq!(Distributor::from_tag("us foods"), Some(Distributor::UsFoods));
        assert_eq!(Distributor::from_tag("ACME PRODUCE"), None);
    }

    #[test]
    fn test_check_flags_missing_fields() {
        let record = InvoiceRecord::default();
        let issues = record.check();
        assert!(issues.iter().any(|w| w.contains("invoice number")));
        assert!(issues.iter().any(|w| w.contains("invoice date")));
        assert!(issues.iter().any(|w| w.contains("invoice total")));
        assert!(issues.iter().any(|w| w.contains("Distributor")));
        assert!(issues.iter().any(|w| w.contains("line items")));
    }

    #[test]
    fn test_check_total_within_tolerance() {
        let mut record = InvoiceRecord::default();
        record.fields.subtotal = Some(dec("100.00"));
        record.fields.tax = Some(dec("8.10"));
        record.fields.total = Some(dec("108.11"));
        assert!(!record.check().iter().any(|w| w.contains("differs from total")));

        record.fields.total = Some(dec("108.20"));
        assert!(record.check().iter().any(|w| w.contains("differs from total")));
    }

    #[test]
    fn test_check_line_arithmetic() {
        let mut record = InvoiceRecord::default();
        record.items.push(item("100", "2", "4.20", "8.40"));
        assert!(!record.check().iter().any(|w| w.starts_with("Line")));

        record.items.push(item("200", "2", "4.20", "9.00"));
        let issues = record.check();
        assert!(issues.iter().any(|w| w.starts_with("Line 200")));
    }
}
