//! Rule-driven purchasing record extraction.

use tracing::{debug, info};

use crate::models::{
    ExtractedFields, FoodcostConfig, InvoiceRecord, RawDocument, SourceMeta,
};
use crate::pack::CanSizeTable;

use super::distributor::DistributorScanner;
use super::line_items::LineItemScanner;
use super::rules::{
    amounts::extract_amounts,
    dates::extract_dates,
    identifiers::{extract_invoice_number, extract_order_number},
};
use super::RecordExtractor;

/// Extracts structured purchasing records from invoice text.
///
/// Every field extractor runs over the whole document and records what it
/// finds; nothing short of empty input is an error, so the output is always
/// a full [`InvoiceRecord`] whose gaps are visible as `None` fields and
/// warning strings.
pub struct InvoiceExtractor {
    scanner: DistributorScanner,
    items: LineItemScanner,
    warn_missing_fields: bool,
    check_arithmetic: bool,
    low_confidence_threshold: f32,
}

impl InvoiceExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            scanner: DistributorScanner::new(),
            items: LineItemScanner::new(),
            warn_missing_fields: true,
            check_arithmetic: true,
            low_confidence_threshold: 50.0,
        }
    }

    /// Build an extractor from a loaded configuration.
    pub fn from_config(config: &FoodcostConfig) -> Self {
        let mut cans = CanSizeTable::builtin();
        for size in &config.pack.can_sizes {
            cans = cans.with_size(&size.code, size.ounces);
        }

        Self {
            scanner: DistributorScanner::from_config(&config.vendors),
            items: LineItemScanner::new().with_can_table(cans),
            warn_missing_fields: config.extraction.warn_missing_fields,
            check_arithmetic: config.extraction.check_arithmetic,
            low_confidence_threshold: config.extraction.low_confidence_threshold,
        }
    }

    /// Set missing-field warnings.
    pub fn with_missing_field_warnings(mut self, warn: bool) -> Self {
        self.warn_missing_fields = warn;
        self
    }

    /// Set money arithmetic cross-checks.
    pub fn with_arithmetic_checks(mut self, check: bool) -> Self {
        self.check_arithmetic = check;
        self
    }

    /// Add a distributor alias ahead of the built-ins.
    pub fn with_alias(
        mut self,
        alias: impl Into<String>,
        distributor: crate::models::Distributor,
    ) -> Self {
        self.scanner = self.scanner.with_alias(alias, distributor);
        self
    }

    /// Use a custom can-size table for pack normalization.
    pub fn with_can_table(mut self, cans: CanSizeTable) -> Self {
        self.items = self.items.with_can_table(cans);
        self
    }
}

impl Default for InvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordExtractor for InvoiceExtractor {
    fn extract(&self, document: &RawDocument) -> InvoiceRecord {
        let mut record = self.extract_from_text(&document.text);

        record.source = SourceMeta {
            source_id: document.source_id.clone(),
            ocr_confidence: document.confidence,
        };

        if let Some(confidence) = document.confidence {
            if confidence < self.low_confidence_threshold {
                record
                    .warnings
                    .push(format!("Low OCR confidence: {:.2}", confidence));
            }
        }

        record
    }

    fn extract_from_text(&self, text: &str) -> InvoiceRecord {
        info!("Extracting purchasing record from {} characters of text", text.len());

        let mut warnings = Vec::new();

        let distributor = self.scanner.identify(text);
        let invoice_number = extract_invoice_number(text).map(|m| m.value.trim().to_string());
        let order_number = extract_order_number(text).map(|m| m.value.trim().to_string());
        let dates = extract_dates(text);
        let amounts = extract_amounts(text);

        let scanned = self.items.scan(text);
        warnings.extend(scanned.warnings);

        let mut record = InvoiceRecord {
            fields: ExtractedFields {
                distributor,
                invoice_number,
                order_number,
                invoice_date: dates.invoice_date.map(|m| m.value),
                delivery_date: dates.delivery_date.map(|m| m.value),
                subtotal: amounts.subtotal.map(|m| m.value),
                tax: amounts.tax.map(|m| m.value),
                total: amounts.total.map(|m| m.value),
            },
            items: scanned.items,
            warnings,
            source: SourceMeta::default(),
        };

        if self.warn_missing_fields {
            let issues = record.missing_field_warnings();
            record.warnings.extend(issues);
        }
        if self.check_arithmetic {
            let issues = record.arithmetic_warnings();
            record.warnings.extend(issues);
        }

        debug!(
            distributor = %record.fields.distributor,
            items = record.items.len(),
            warnings = record.warnings.len(),
            "extraction complete"
        );

        record
    }
}

/// Extract a record from plain text with default settings.
pub fn extract_record(text: &str) -> InvoiceRecord {
    InvoiceExtractor::new().extract_from_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanSize, Distributor, VendorAlias};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const SYSCO_INVOICE: &str = "\
SYSCO DENVER #052
INVOICE NUMBER: 447799
ORDER NUMBER: 758-441
INVOICE DATE: 10/02/2024
DELIVERY DATE: 10/03/2024

ITEM#    DESCRIPTION                  PACK      QTY   PRICE     AMOUNT
4532187  PEPPER BLACK GROUND          6/1#      1     298.95    298.95
5501992  LEMONS FRESH CHOICE          1         22.18 22.18
7781123  OIL SALAD CLEAR FRY          6/1 GAL   2     4.20      8.40
8812445  BEANS GREEN CUT              6/#10     1     2.37      2.37

SUBTOTAL: 331.90
TAX: 18.81
TOTAL: $350.71
";

    #[test]
    fn test_extract_complete_invoice() {
        let record = extract_record(SYSCO_INVOICE);

        assert_eq!(record.fields.distributor, Distributor::Sysco);
        assert_eq!(record.fields.invoice_number.as_deref(), Some("447799"));
        assert_eq!(record.fields.order_number.as_deref(), Some("758-441"));
        assert_eq!(
            record.fields.invoice_date,
            NaiveDate::from_ymd_opt(2024, 10, 2)
        );
        assert_eq!(
            record.fields.delivery_date,
            NaiveDate::from_ymd_opt(2024, 10, 3)
        );
        assert_eq!(record.fields.subtotal, Some(dec("331.90")));
        assert_eq!(record.fields.tax, Some(dec("18.81")));
        assert_eq!(record.fields.total, Some(dec("350.71")));

        assert_eq!(record.items.len(), 4);
        assert!(record.warnings.is_empty(), "{:?}", record.warnings);
    }

    #[test]
    fn test_price_per_pound_flows_into_items() {
        let record = extract_record(SYSCO_INVOICE);

        let pepper = &record.items[0];
        let ppp = pepper.price_per_pound.unwrap();
        assert!((ppp - dec("49.825")).abs() < dec("0.01"));

        // gallons and unpacked rows have no per-pound price
        assert_eq!(record.items[1].price_per_pound, None);
        assert_eq!(record.items[2].price_per_pound, None);
    }

    #[test]
    fn test_degraded_email_text() {
        let text = "\
From: orders@shamrockfoods.com
Subject: Your delivery

Your order has been delivered. Thanks for your business!
";
        let record = extract_record(text);

        assert_eq!(record.fields.distributor, Distributor::Shamrock);
        assert_eq!(record.fields.invoice_number, None);
        assert!(record.items.is_empty());
        assert!(record.warnings.iter().any(|w| w.contains("invoice number")));
        assert!(record.warnings.iter().any(|w| w.contains("invoice total")));
        assert!(record.warnings.iter().any(|w| w.contains("line items")));
    }

    #[test]
    fn test_empty_input() {
        let record = extract_record("");
        assert_eq!(record.fields.distributor, Distributor::Unknown);
        assert!(record.items.is_empty());
        assert!(!record.warnings.is_empty());
    }

    #[test]
    fn test_arithmetic_mismatch_warns() {
        let text = "\
SYSCO
ITEM# DESCRIPTION QTY PRICE AMOUNT
4532187 PEPPER BLACK GROUND 6/1# 2 298.95 300.00
SUBTOTAL: 300.00
TAX: 0.00
TOTAL: 300.00
";
        let record = extract_record(text);
        assert_eq!(record.items.len(), 1);
        assert!(record
            .warnings
            .iter()
            .any(|w| w.contains("quantity x unit price")));
    }

    #[test]
    fn test_warnings_can_be_disabled() {
        let extractor = InvoiceExtractor::new()
            .with_missing_field_warnings(false)
            .with_arithmetic_checks(false);
        let record = extractor.extract_from_text("nothing useful here");
        assert!(record.warnings.is_empty());
    }

    #[test]
    fn test_low_confidence_document() {
        let document = RawDocument::from_text(SYSCO_INVOICE)
            .with_source_id("scan-001.txt")
            .with_confidence(31.0);
        let record = InvoiceExtractor::new().extract(&document);

        assert_eq!(record.source.source_id.as_deref(), Some("scan-001.txt"));
        assert!(record
            .warnings
            .iter()
            .any(|w| w.contains("Low OCR confidence")));
    }

    #[test]
    fn test_from_config_applies_overrides() {
        let mut config = FoodcostConfig::default();
        config.vendors.aliases.push(VendorAlias {
            alias: "CHENEY BROS".to_string(),
            tag: "US FOODS".to_string(),
        });
        config.pack.can_sizes.push(CanSize {
            code: "603".to_string(),
            ounces: dec("138"),
        });

        let extractor = InvoiceExtractor::from_config(&config);
        let text = "\
CHENEY BROS INC
ITEM# DESCRIPTION QTY PRICE AMOUNT
7710 TOMATOES CRUSHED 6/#603 1 28.50 28.50
TOTAL: 28.50
";
        let record = extractor.extract_from_text(text);
        assert_eq!(record.fields.distributor, Distributor::UsFoods);
        assert_eq!(
            record.items[0].normalized_pack.total_ounces,
            Some(dec("828"))
        );
    }
}
