//! Purchasing record extraction module.

mod parser;
pub mod distributor;
pub mod line_items;
pub mod rules;

pub use distributor::{identify_distributor, DistributorScanner};
pub use line_items::{scan_line_items, LineItemScanner, ScannedItems};
pub use parser::{extract_record, InvoiceExtractor};

use crate::models::{InvoiceRecord, RawDocument};

/// Trait for purchasing record extractors.
///
/// Extraction never fails: degraded input produces a record with `None`
/// fields and warnings instead of an error.
pub trait RecordExtractor {
    /// Extract a record from a document with provenance.
    fn extract(&self, document: &RawDocument) -> InvoiceRecord;

    /// Extract a record from plain text.
    fn extract_from_text(&self, text: &str) -> InvoiceRecord;
}
