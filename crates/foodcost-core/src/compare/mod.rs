//! Vendor price comparison.
//!
//! Items from two vendors are matched by exact normalized description
//! (case-folded, whitespace-collapsed); there is no fuzzy matching, so a
//! reported match is always the same catalog wording. Matched pairs are
//! priced per pound when both sides can be weighed, per case otherwise,
//! and the two bases are never mixed in one number.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::models::{InvoiceRecord, LineItem};

/// How two prices were compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareBasis {
    /// Both sides priced per pound.
    PerPound,
    /// Case/unit prices compared directly.
    PerCase,
}

impl std::fmt::Display for CompareBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompareBasis::PerPound => "per_pound",
            CompareBasis::PerCase => "per_case",
        };
        write!(f, "{}", s)
    }
}

/// A labeled set of items offered by one vendor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorItems {
    /// Display label, e.g. the distributor tag or a file name.
    pub label: String,

    /// The vendor's item rows.
    pub items: Vec<LineItem>,
}

impl VendorItems {
    pub fn new(label: impl Into<String>, items: Vec<LineItem>) -> Self {
        Self {
            label: label.into(),
            items,
        }
    }

    /// Take the items of an extracted record.
    pub fn from_record(label: impl Into<String>, record: &InvoiceRecord) -> Self {
        Self {
            label: label.into(),
            items: record.items.clone(),
        }
    }
}

/// One product matched across two vendors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Normalized product description both vendors share.
    pub product_name: String,

    /// First vendor's price on the comparison basis.
    pub price_a: Decimal,

    /// Second vendor's price on the comparison basis.
    pub price_b: Decimal,

    /// `price_a - price_b`; positive when the second vendor is cheaper.
    pub savings: Decimal,

    /// Savings as a percentage of `price_a`; zero when `price_a` is zero.
    pub savings_percent: Decimal,

    /// Label of the cheaper vendor; ties go to the first.
    pub preferred_source: String,

    /// Basis the prices are on.
    pub category: CompareBasis,
}

/// Full comparison of two vendors' items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Label of the first vendor.
    pub source_a: String,

    /// Label of the second vendor.
    pub source_b: String,

    /// Matched products, sorted by savings descending then name.
    pub matches: Vec<ComparisonResult>,

    /// Number of matched products.
    pub matched_count: usize,

    /// Normalized descriptions only the first vendor carries.
    pub only_in_a: Vec<String>,

    /// Normalized descriptions only the second vendor carries.
    pub only_in_b: Vec<String>,

    /// Sum of positive per-pound savings (dollars per pound).
    pub total_per_pound_savings: Decimal,

    /// Sum of positive per-case savings (dollars per case).
    pub total_per_case_savings: Decimal,
}

/// Fold a description into its matching key.
pub fn normalize_description(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Compare two vendors' items.
///
/// When a vendor lists the same normalized description more than once, the
/// first occurrence is used. The savings totals count only matches where
/// the second vendor is cheaper: they answer what switching from A to B
/// would save, per basis.
pub fn compare_vendors(a: &VendorItems, b: &VendorItems) -> ComparisonReport {
    compare_vendors_filtered(a, b, Decimal::ZERO)
}

/// Compare two vendors' items, dropping matches with absolute savings
/// below `min_savings`.
pub fn compare_vendors_filtered(
    a: &VendorItems,
    b: &VendorItems,
    min_savings: Decimal,
) -> ComparisonReport {
    let mut b_by_key: HashMap<String, &LineItem> = HashMap::new();
    let mut b_order: Vec<String> = Vec::new();
    for item in &b.items {
        let key = normalize_description(&item.description);
        if !b_by_key.contains_key(&key) {
            b_order.push(key.clone());
            b_by_key.insert(key, item);
        }
    }

    let mut matches = Vec::new();
    let mut only_in_a = Vec::new();
    let mut matched_keys: Vec<String> = Vec::new();
    let mut seen_a: Vec<String> = Vec::new();

    for item_a in &a.items {
        let key = normalize_description(&item_a.description);
        if seen_a.contains(&key) {
            continue;
        }
        seen_a.push(key.clone());

        let item_b = match b_by_key.get(&key) {
            Some(item) => *item,
            None => {
                only_in_a.push(key);
                continue;
            }
        };
        matched_keys.push(key.clone());

        let (price_a, price_b, category) =
            match (item_a.price_per_pound, item_b.price_per_pound) {
                (Some(ppp_a), Some(ppp_b)) => (ppp_a, ppp_b, CompareBasis::PerPound),
                _ => (item_a.unit_price, item_b.unit_price, CompareBasis::PerCase),
            };

        let savings = price_a - price_b;
        if savings.abs() < min_savings {
            continue;
        }

        let savings_percent = if price_a.is_zero() {
            Decimal::ZERO
        } else {
            savings / price_a * Decimal::from(100)
        };

        let preferred_source = if savings > Decimal::ZERO {
            b.label.clone()
        } else {
            a.label.clone()
        };

        matches.push(ComparisonResult {
            product_name: key,
            price_a,
            price_b,
            savings,
            savings_percent,
            preferred_source,
            category,
        });
    }

    let only_in_b: Vec<String> = b_order
        .into_iter()
        .filter(|key| !matched_keys.contains(key))
        .collect();

    matches.sort_by(|x, y| {
        y.savings
            .cmp(&x.savings)
            .then_with(|| x.product_name.cmp(&y.product_name))
    });

    let total_per_pound_savings = matches
        .iter()
        .filter(|m| m.category == CompareBasis::PerPound && m.savings > Decimal::ZERO)
        .map(|m| m.savings)
        .sum();
    let total_per_case_savings = matches
        .iter()
        .filter(|m| m.category == CompareBasis::PerCase && m.savings > Decimal::ZERO)
        .map(|m| m.savings)
        .sum();

    debug!(
        source_a = %a.label,
        source_b = %b.label,
        matched = matches.len(),
        "vendor comparison complete"
    );

    ComparisonReport {
        source_a: a.label.clone(),
        source_b: b.label.clone(),
        matched_count: matches.len(),
        matches,
        only_in_a,
        only_in_b,
        total_per_pound_savings,
        total_per_case_savings,
    }
}

/// Compare every pair of vendors, in the order given.
pub fn compare_many(vendors: &[VendorItems], min_savings: Decimal) -> Vec<ComparisonReport> {
    let mut reports = Vec::new();
    for i in 0..vendors.len() {
        for j in (i + 1)..vendors.len() {
            reports.push(compare_vendors_filtered(&vendors[i], &vendors[j], min_savings));
        }
    }
    reports
}
