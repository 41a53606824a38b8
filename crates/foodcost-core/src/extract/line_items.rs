//! Line-item table scanning.
//!
//! Invoice bodies carry a table of purchased products ending at the summary
//! block (SUBTOTAL/TAX/TOTAL). The table is entered at a column header
//! ("ITEM# DESCRIPTION ... AMOUNT") or, when OCR ate the header, at the
//! first line shaped like a row. Rows are free-form text, so parsing is
//! anchored from the right: the last three tokens must be quantity, unit
//! price and extended price, the first token the item code, and whatever
//! sits between them is description plus an optional pack-size token. Rows
//! that do not fit are skipped and recorded, never fatal.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::rules::patterns::{
    ITEM_CODE_TOKEN, MONEY_TOKEN, PACK_SHAPED, QUANTITY_TOKEN, SUMMARY_BREAK, TABLE_HEADER,
};
use super::rules::parse_money;
use crate::models::LineItem;
use crate::pack::{parse_pack_size_with, CanSizeTable, PackUnit};

/// Result of scanning one document for item rows.
#[derive(Debug, Clone, Default)]
pub struct ScannedItems {
    /// Parsed rows, in document order.
    pub items: Vec<LineItem>,
    /// One entry per skipped row, with its 1-based document line number.
    pub warnings: Vec<String>,
}

enum ScanState {
    Seeking,
    InTable,
}

/// Scans invoice text for the line-item table.
#[derive(Debug, Clone, Default)]
pub struct LineItemScanner {
    cans: CanSizeTable,
}

impl LineItemScanner {
    pub fn new() -> Self {
        Self {
            cans: CanSizeTable::builtin(),
        }
    }

    /// Use a custom can-size table for pack normalization.
    pub fn with_can_table(mut self, cans: CanSizeTable) -> Self {
        self.cans = cans;
        self
    }

    /// Scan the document for item rows.
    ///
    /// Blank lines inside the table are skipped silently; a summary label
    /// at the start of a line ends the table. Lines before the table never
    /// produce warnings.
    pub fn scan(&self, text: &str) -> ScannedItems {
        let mut result = ScannedItems::default();
        let mut state = ScanState::Seeking;

        for (idx, line) in text.lines().enumerate() {
            match state {
                ScanState::Seeking => {
                    if TABLE_HEADER.is_match(line) {
                        debug!(line = idx + 1, "line item table header found");
                        state = ScanState::InTable;
                    } else if let Some(item) = self.parse_row(line) {
                        debug!(line = idx + 1, "line item table entered on row shape");
                        result.items.push(item);
                        state = ScanState::InTable;
                    }
                }
                ScanState::InTable => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if SUMMARY_BREAK.is_match(line) {
                        debug!(line = idx + 1, "summary block reached");
                        break;
                    }
                    match self.parse_row(line) {
                        Some(item) => result.items.push(item),
                        None => result.warnings.push(format!(
                            "Skipped unparseable item row at line {}: \"{}\"",
                            idx + 1,
                            line.trim()
                        )),
                    }
                }
            }
        }

        debug!(
            items = result.items.len(),
            skipped = result.warnings.len(),
            "line item scan complete"
        );
        result
    }

    /// Parse one table row, `None` when it does not fit the row shape.
    fn parse_row(&self, line: &str) -> Option<LineItem> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return None;
        }

        let n = tokens.len();
        if !MONEY_TOKEN.is_match(tokens[n - 1]) || !MONEY_TOKEN.is_match(tokens[n - 2]) {
            return None;
        }
        let total_price = parse_money(tokens[n - 1])?;
        let unit_price = parse_money(tokens[n - 2])?;

        if !QUANTITY_TOKEN.is_match(tokens[n - 3]) {
            return None;
        }
        let quantity = Decimal::from_str(tokens[n - 3]).ok()?;

        let item_code = tokens[0];
        if !ITEM_CODE_TOKEN.is_match(item_code) {
            return None;
        }

        let middle = &tokens[1..n - 3];
        let (description, pack_size) = split_description_and_pack(middle, &self.cans);

        let normalized_pack = parse_pack_size_with(&pack_size, &self.cans);
        let price_per_pound = normalized_pack.price_per_pound(unit_price);

        Some(LineItem {
            item_code: item_code.to_string(),
            description,
            pack_size,
            quantity,
            unit_price,
            total_price,
            normalized_pack,
            price_per_pound,
        })
    }
}

/// Split the middle tokens of a row into description and pack-size token.
///
/// The pack may span two tokens ("6/1 GAL", "25 LB") or one ("6/1#",
/// "12/CASE"). A two-token pack is only taken when it normalizes to a known
/// unit; a single trailing token is also taken when it merely looks
/// pack-shaped, so unrecognized tokens like "6/#99" stay in the pack column
/// rather than polluting the description.
fn split_description_and_pack(middle: &[&str], cans: &CanSizeTable) -> (String, String) {
    if middle.len() >= 2 {
        let joined = format!("{} {}", middle[middle.len() - 2], middle[middle.len() - 1]);
        if parse_pack_size_with(&joined, cans).unit != PackUnit::Unknown {
            return (middle[..middle.len() - 2].join(" "), joined);
        }
    }

    if let Some(last) = middle.last() {
        let known = parse_pack_size_with(last, cans).unit != PackUnit::Unknown;
        if known || PACK_SHAPED.is_match(last) {
            return (middle[..middle.len() - 1].join(" "), last.to_string());
        }
    }

    (middle.join(" "), String::new())
}

/// Scan with the built-in can table.
pub fn scan_line_items(text: &str) -> ScannedItems {
    LineItemScanner::new().scan(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const SYSCO_BODY: &str = "\
SYSCO DENVER #052
INVOICE NUMBER: 447799

ITEM#    DESCRIPTION                  PACK      QTY    PRICE     AMOUNT
4532187  PEPPER BLACK GROUND          6/1#      1      298.95    298.95
5501992  LEMONS FRESH CHOICE          1         22.18
7781123  OIL CANOLA CLEAR FRY         6/1 GAL   2      4.20      8.40
8812445  BEANS GREEN CUT              6/#10     1      2.37      2.37

SUBTOTAL: 331.90
TAX: 18.81
TOTAL: $350.71
";

    #[test]
    fn test_scan_full_table() {
        let result = scan_line_items(SYSCO_BODY);
        assert_eq!(result.items.len(), 3);

        let pepper = &result.items[0];
        assert_eq!(pepper.item_code, "4532187");
        assert_eq!(pepper.description, "PEPPER BLACK GROUND");
        assert_eq!(pepper.pack_size, "6/1#");
        assert_eq!(pepper.quantity, dec("1"));
        assert_eq!(pepper.unit_price, dec("298.95"));
        assert_eq!(pepper.total_price, dec("298.95"));
        assert_eq!(pepper.normalized_pack.total_pounds, Some(dec("6")));
        assert!(pepper.price_per_pound.is_some());
    }

    #[test]
    fn test_malformed_row_recorded() {
        // The lemons row is missing its unit price; it must be skipped
        // with a 1-based line number, and scanning must continue.
        let result = scan_line_items(SYSCO_BODY);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("line 6"), "{}", result.warnings[0]);
        assert!(result.warnings[0].contains("LEMONS"));
    }

    #[test]
    fn test_two_token_pack() {
        let text = "\
ITEM# DESCRIPTION QTY PRICE AMOUNT
7781123 OIL CANOLA CLEAR 6/1 GAL 2 42.50 85.00
9912001 FLOUR H&R BLEACHED 25 LB 2 12.85 25.70
TOTAL: 110.70
";
        let result = scan_line_items(text);
        assert_eq!(result.items.len(), 2);
        assert_eq!(result.items[0].pack_size, "6/1 GAL");
        assert_eq!(result.items[0].description, "OIL CANOLA CLEAR");
        assert_eq!(result.items[0].price_per_pound, None);
        assert_eq!(result.items[1].pack_size, "25 LB");
        assert_eq!(result.items[1].price_per_pound, Some(dec("0.514")));
    }

    #[test]
    fn test_row_without_pack() {
        let text = "\
ITEM# DESCRIPTION QTY PRICE AMOUNT
5501992 LEMONS FRESH CHOICE 1 22.18 22.18
TOTAL: 22.18
";
        let result = scan_line_items(text);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].description, "LEMONS FRESH CHOICE");
        assert_eq!(result.items[0].pack_size, "");
        assert_eq!(result.items[0].normalized_pack.unit, PackUnit::Unknown);
    }

    #[test]
    fn test_trailing_number_stays_in_description() {
        let text = "\
ITEM# DESCRIPTION QTY PRICE AMOUNT
6610 CHEESE AMERICAN 120 2 45.00 90.00
TOTAL: 90.00
";
        let result = scan_line_items(text);
        assert_eq!(result.items[0].description, "CHEESE AMERICAN 120");
        assert_eq!(result.items[0].pack_size, "");
    }

    #[test]
    fn test_unrecognized_pack_kept_raw() {
        let text = "\
ITEM# DESCRIPTION QTY PRICE AMOUNT
8812445 BEANS GREEN CUT 6/#99 1 30.00 30.00
TOTAL: 30.00
";
        let result = scan_line_items(text);
        assert_eq!(result.items[0].pack_size, "6/#99");
        assert_eq!(result.items[0].normalized_pack.unit, PackUnit::Unknown);
        assert_eq!(result.items[0].description, "BEANS GREEN CUT");
    }

    #[test]
    fn test_credit_row_skipped() {
        let text = "\
ITEM# DESCRIPTION QTY PRICE AMOUNT
4532187 PEPPER BLACK GROUND 6/1# 1 298.95 298.95
8871002 CREDIT RETURN LEMONS 1 -22.18 -22.18
TOTAL: 276.77
";
        let result = scan_line_items(text);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("CREDIT RETURN"));
    }

    #[test]
    fn test_headerless_table_entered_on_row_shape() {
        let text = "\
SYSCO DENVER #052
INVOICE NUMBER: 447799
4532187 PEPPER BLACK GROUND 6/1# 1 298.95 298.95
8812445 BEANS GREEN CUT 6/#10 1 2.37 2.37
TOTAL: 301.32
";
        let result = scan_line_items(text);
        assert_eq!(result.items.len(), 2);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_no_table_no_items() {
        let text = "Thanks for your order!\nWe appreciate your business.\n";
        let result = scan_line_items(text);
        assert!(result.items.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_summary_line_before_table_ignored() {
        // A stray balance block above the table must not end the scan early.
        let text = "\
PREVIOUS BALANCE: 120.00
ITEM# DESCRIPTION QTY PRICE AMOUNT
4532187 PEPPER BLACK GROUND 6/1# 1 298.95 298.95
TOTAL: 298.95
";
        let result = scan_line_items(text);
        assert_eq!(result.items.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_summary_ends_table() {
        let text = "\
ITEM# DESCRIPTION QTY PRICE AMOUNT
4532187 PEPPER BLACK GROUND 6/1# 1 298.95 298.95
SUBTOTAL: 298.95
9999999 PHANTOM ROW 6/1# 1 1.00 1.00
";
        let result = scan_line_items(text);
        assert_eq!(result.items.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_custom_can_table() {
        let scanner = LineItemScanner::new()
            .with_can_table(CanSizeTable::builtin().with_size("603", dec("138")));
        let text = "\
ITEM# DESCRIPTION QTY PRICE AMOUNT
7710 TOMATOES CRUSHED 6/#603 1 28.50 28.50
TOTAL: 28.50
";
        let result = scanner.scan(text);
        assert_eq!(result.items[0].normalized_pack.total_ounces, Some(dec("828")));
    }
}
