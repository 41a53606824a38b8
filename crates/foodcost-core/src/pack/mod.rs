//! Pack-size normalization.
//!
//! Foodservice vendors describe packaging with short, inconsistent tokens:
//! `6/1#` (six one-pound units), `3/6LB`, `6/#10` (six number-10 cans),
//! `4/1 GAL`, `12/CASE`. This module parses those tokens into a canonical
//! [`PackSize`] and derives price-per-pound from a case price, which is what
//! makes prices comparable across vendors with different catalog
//! conventions.
//!
//! Anything the grammar does not recognize becomes the UNKNOWN sentinel with
//! the original token preserved verbatim; the normalizer never fails and
//! never divides by zero.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Fluid ounces per U.S. gallon.
const OUNCES_PER_GALLON: u32 = 128;

lazy_static! {
    // "6/10#", "3/6LB", "4/2.5 LBS"
    static ref COUNT_WEIGHT: Regex =
        Regex::new(r"(?i)^(\d+)\s*/\s*(\d+(?:\.\d+)?)\s*(?:#|LBS?\.?)$").unwrap();

    // "25 LB", "50#"
    static ref BARE_WEIGHT: Regex =
        Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(?:#|LBS?\.?)$").unwrap();

    // "6/#10", "12/#2.5"
    static ref COUNT_CAN: Regex =
        Regex::new(r"^(\d+)\s*/\s*#\s*(\d+(?:\.\d+)?)$").unwrap();

    // "4/1 GAL", "1 GAL"
    static ref COUNT_GALLON: Regex =
        Regex::new(r"(?i)^(?:(\d+)\s*/\s*)?(\d+(?:\.\d+)?)\s*GAL(?:LON)?S?\.?$").unwrap();

    // "12/16 OZ", "32 OZ"
    static ref COUNT_OUNCE: Regex =
        Regex::new(r"(?i)^(?:(\d+)\s*/\s*)?(\d+(?:\.\d+)?)\s*OZ\.?$").unwrap();

    // "12/CASE", "6/CS", "24/EA", "EACH"
    static ref COUNT_CASE_EACH: Regex =
        Regex::new(r"(?i)^(?:(\d+)\s*/\s*)?(CASE|CS\.?|EACH|EA\.?)$").unwrap();
}

/// Canonical packaging unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PackUnit {
    /// Pounds; the only unit that converts to price-per-pound.
    Lb,
    /// Ounces (can codes, straight ounce packs).
    Oz,
    /// U.S. gallons, carried as fluid ounces.
    Gal,
    /// Sold by the case, no weight information.
    Case,
    /// Sold by the unit, no weight information.
    Each,
    /// Not recognized by the grammar.
    #[default]
    Unknown,
}

impl std::fmt::Display for PackUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PackUnit::Lb => "LB",
            PackUnit::Oz => "OZ",
            PackUnit::Gal => "GAL",
            PackUnit::Case => "CASE",
            PackUnit::Each => "EACH",
            PackUnit::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// A pack-size token parsed into canonical form.
///
/// Immutable once built. `total_pounds` is present only for
/// weight-convertible packs; ounce-based packs (cans, fluid gallons) carry
/// `total_ounces` and are deliberately never coerced to pounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackSize {
    /// The token as it appeared on the invoice.
    pub original: String,

    /// Number of inner units in the case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Canonical unit classification.
    pub unit: PackUnit,

    /// Total case weight in pounds, when the unit is weight-convertible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pounds: Option<Decimal>,

    /// Total case volume/weight in ounces, for can and fluid packs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ounces: Option<Decimal>,
}

impl PackSize {
    /// The sentinel for tokens the grammar does not recognize.
    pub fn unknown(original: &str) -> Self {
        Self {
            original: original.to_string(),
            count: None,
            unit: PackUnit::Unknown,
            total_pounds: None,
            total_ounces: None,
        }
    }

    /// Whether this pack can be priced per pound.
    pub fn is_weight_convertible(&self) -> bool {
        self.total_pounds.is_some()
    }

    /// Price per pound for a case bought at `case_price`.
    ///
    /// Returns `None` when the pack carries no pound weight (OZ, GAL, CASE,
    /// EACH, UNKNOWN) and zero for a zero-priced case. A zero or missing
    /// weight is routed to the `None` branch before any division happens.
    pub fn price_per_pound(&self, case_price: Decimal) -> Option<Decimal> {
        let pounds = self.total_pounds?;
        if pounds <= Decimal::ZERO {
            return None;
        }
        if case_price.is_zero() {
            return Some(Decimal::ZERO);
        }
        Some(case_price / pounds)
    }
}

/// Ounce equivalents for standardized can codes.
///
/// The built-in table covers the common U.S. trade sizes; it is not
/// exhaustive, and unknown codes fall through to the UNKNOWN sentinel.
/// Extra codes can be layered on top (they take precedence).
#[derive(Debug, Clone)]
pub struct CanSizeTable {
    sizes: Vec<(String, Decimal)>,
}

/// Built-in can codes: number-10 through number-2, ounces per can.
const BUILTIN_CAN_SIZES: &[(&str, u32)] = &[
    ("10", 109),
    ("5", 56),
    ("303", 16),
    ("300", 15),
    ("2.5", 29),
    ("2", 20),
];

impl CanSizeTable {
    /// Table with only the built-in trade sizes.
    pub fn builtin() -> Self {
        Self {
            sizes: BUILTIN_CAN_SIZES
                .iter()
                .map(|(code, oz)| (code.to_string(), Decimal::from(*oz)))
                .collect(),
        }
    }

    /// Add or override a can code; later entries win over built-ins.
    pub fn with_size(mut self, code: impl Into<String>, ounces: Decimal) -> Self {
        self.sizes.insert(0, (code.into(), ounces));
        self
    }

    /// Ounces for a can code, if known.
    pub fn ounces(&self, code: &str) -> Option<Decimal> {
        self.sizes
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, oz)| *oz)
    }
}

impl Default for CanSizeTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Parse a pack-size token using the built-in can table.
pub fn parse_pack_size(input: &str) -> PackSize {
    parse_pack_size_with(input, &CanSizeTable::builtin())
}

/// Parse a pack-size token against a caller-supplied can table.
///
/// The grammar is ordered and the first matching rule wins:
/// count/weight, bare weight, can code, gallons, ounces, case/each,
/// then the UNKNOWN sentinel. A zero count or size in any rule also
/// yields the sentinel rather than a zero-weight pack.
pub fn parse_pack_size_with(input: &str, cans: &CanSizeTable) -> PackSize {
    let token = input.trim();
    if token.is_empty() {
        return PackSize::unknown(input);
    }

    // Rule 1: <count>/<size># or <count>/<size>LB
    if let Some(caps) = COUNT_WEIGHT.captures(token) {
        if let (Some(count), Some(size)) = (parse_count(&caps[1]), parse_size(&caps[2])) {
            return PackSize {
                original: input.to_string(),
                count: Some(count),
                unit: PackUnit::Lb,
                total_pounds: Some(Decimal::from(count) * size),
                total_ounces: None,
            };
        }
        return PackSize::unknown(input);
    }

    // Rule 2: <size> LB with an implied count of one
    if let Some(caps) = BARE_WEIGHT.captures(token) {
        if let Some(size) = parse_size(&caps[1]) {
            return PackSize {
                original: input.to_string(),
                count: Some(1),
                unit: PackUnit::Lb,
                total_pounds: Some(size),
                total_ounces: None,
            };
        }
        return PackSize::unknown(input);
    }

    // Rule 3: <count>/#<can-code>, ounces from the can table
    if let Some(caps) = COUNT_CAN.captures(token) {
        if let (Some(count), Some(ounces)) = (parse_count(&caps[1]), cans.ounces(&caps[2])) {
            return PackSize {
                original: input.to_string(),
                count: Some(count),
                unit: PackUnit::Oz,
                total_pounds: None,
                total_ounces: Some(Decimal::from(count) * ounces),
            };
        }
        return PackSize::unknown(input);
    }

    // Rule 4: gallons, carried as fluid ounces and never as pounds
    if let Some(caps) = COUNT_GALLON.captures(token) {
        let count = match caps.get(1) {
            Some(m) => parse_count(m.as_str()),
            None => Some(1),
        };
        if let (Some(count), Some(gallons)) = (count, parse_size(&caps[2])) {
            return PackSize {
                original: input.to_string(),
                count: Some(count),
                unit: PackUnit::Gal,
                total_pounds: None,
                total_ounces: Some(
                    Decimal::from(count) * gallons * Decimal::from(OUNCES_PER_GALLON),
                ),
            };
        }
        return PackSize::unknown(input);
    }

    // Rule 5: straight ounce packs, same no-pounds boundary as cans
    if let Some(caps) = COUNT_OUNCE.captures(token) {
        let count = match caps.get(1) {
            Some(m) => parse_count(m.as_str()),
            None => Some(1),
        };
        if let (Some(count), Some(ounces)) = (count, parse_size(&caps[2])) {
            return PackSize {
                original: input.to_string(),
                count: Some(count),
                unit: PackUnit::Oz,
                total_pounds: None,
                total_ounces: Some(Decimal::from(count) * ounces),
            };
        }
        return PackSize::unknown(input);
    }

    // Rule 6: case/each counts with no weight information
    if let Some(caps) = COUNT_CASE_EACH.captures(token) {
        let count = match caps.get(1) {
            Some(m) => parse_count(m.as_str()),
            None => Some(1),
        };
        if let Some(count) = count {
            let unit = if caps[2].to_ascii_uppercase().starts_with('C') {
                PackUnit::Case
            } else {
                PackUnit::Each
            };
            return PackSize {
                original: input.to_string(),
                count: Some(count),
                unit,
                total_pounds: None,
                total_ounces: None,
            };
        }
        return PackSize::unknown(input);
    }

    PackSize::unknown(input)
}

/// Price per pound for a pack token bought at `case_price`.
///
/// Convenience over [`parse_pack_size`] + [`PackSize::price_per_pound`]:
/// `None` for anything that cannot be priced by weight, zero for a free
/// case, otherwise `case_price / total_pounds`.
pub fn price_per_pound(pack: &str, case_price: Decimal) -> Option<Decimal> {
    parse_pack_size(pack).price_per_pound(case_price)
}

fn parse_count(s: &str) -> Option<u32> {
    s.parse::<u32>().ok().filter(|&n| n > 0)
}

fn parse_size(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).ok().filter(|d| !d.is_zero())
}
