//! Core library for foodservice invoice cost tracking.
//!
//! This crate provides:
//! - Purchasing record extraction from free-form invoice text (OCR output,
//!   vendor emails)
//! - Distributor identification, reference numbers, dates, and summary
//!   amounts via ordered rule tables
//! - Pack-size normalization ("6/1#", "3/6LB", "6/#10", "4/1 GAL") and
//!   price-per-pound derivation
//! - Vendor price comparison on matched products

pub mod compare;
pub mod error;
pub mod extract;
pub mod models;
pub mod pack;

pub use compare::{
    compare_many, compare_vendors, compare_vendors_filtered, CompareBasis, ComparisonReport,
    ComparisonResult, VendorItems,
};
pub use error::{FoodcostError, Result};
pub use extract::{extract_record, InvoiceExtractor, RecordExtractor};
pub use models::{
    Distributor, ExtractedFields, FoodcostConfig, InvoiceRecord, LineItem, RawDocument,
    SourceMeta, MONEY_TOLERANCE,
};
pub use pack::{parse_pack_size, price_per_pound, CanSizeTable, PackSize, PackUnit};
