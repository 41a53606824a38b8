//! Invoice and order number extraction.

use super::patterns::{INVOICE_NUMBER, ORDER_NUMBER};
use super::{ExtractionMatch, FieldExtractor};

/// Invoice number extractor.
///
/// Labels vary by distributor ("INVOICE #", "INV NO.", bare "INVOICE"); the
/// captured reference must contain at least one digit, which keeps label
/// words like DATE or TOTAL from being mistaken for a number.
pub struct InvoiceNumberExtractor;

impl InvoiceNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        INVOICE_NUMBER
            .captures_iter(text)
            .map(|caps| {
                let full_match = caps.get(0).unwrap();
                ExtractionMatch::new(caps[1].to_string(), 0.9, full_match.as_str())
                    .with_position(full_match.start(), full_match.end())
            })
            .collect()
    }
}

/// Purchase order number extractor.
pub struct OrderNumberExtractor;

impl OrderNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OrderNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for OrderNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        ORDER_NUMBER
            .captures_iter(text)
            .map(|caps| {
                let full_match = caps.get(0).unwrap();
                ExtractionMatch::new(caps[1].to_string(), 0.9, full_match.as_str())
                    .with_position(full_match.start(), full_match.end())
            })
            .collect()
    }
}

/// Extract the invoice number from invoice text.
pub fn extract_invoice_number(text: &str) -> Option<ExtractionMatch<String>> {
    InvoiceNumberExtractor::new().extract(text)
}

/// Extract the purchase order number from invoice text.
pub fn extract_order_number(text: &str) -> Option<ExtractionMatch<String>> {
    OrderNumberExtractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_labels() {
        assert_eq!(
            extract_invoice_number("INVOICE #: 447799").unwrap().value,
            "447799"
        );
        assert_eq!(
            extract_invoice_number("INV NO. 52241").unwrap().value,
            "52241"
        );
        assert_eq!(
            extract_invoice_number("Invoice Number 58-22191").unwrap().value,
            "58-22191"
        );
    }

    #[test]
    fn test_invoice_number_skips_other_labels() {
        assert!(extract_invoice_number("INVOICE DATE: 10/02/2024").is_none());
        assert!(extract_invoice_number("INVOICE TOTAL: $350.71").is_none());
    }

    #[test]
    fn test_invoice_number_first_match_wins() {
        let text = "INVOICE DATE: 10/02/2024\nINVOICE NUMBER: 447799\nINVOICE: 999";
        assert_eq!(extract_invoice_number(text).unwrap().value, "447799");
    }

    #[test]
    fn test_order_number_labels() {
        assert_eq!(extract_order_number("PO# 884512").unwrap().value, "884512");
        assert_eq!(
            extract_order_number("P.O. NUMBER: 4417").unwrap().value,
            "4417"
        );
        assert_eq!(
            extract_order_number("ORDER #758-441").unwrap().value,
            "758-441"
        );
    }

    #[test]
    fn test_order_number_skips_order_date() {
        assert!(extract_order_number("ORDER DATE: 10/02/2024").is_none());
    }
}
