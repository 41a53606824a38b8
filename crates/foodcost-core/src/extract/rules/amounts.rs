//! Money amount extraction for foodservice invoices.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_PATTERN, SUBTOTAL, TAX, TOTAL_DUE, TOTAL_LABELED, TOTAL_LINE};
use super::{ExtractionMatch, FieldExtractor};

/// Amount field extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for caps in AMOUNT_PATTERN.captures_iter(text) {
            if let Some(amount) = parse_money(&caps[1]) {
                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(amount, 0.8, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Extracted summary amounts from an invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceAmounts {
    /// Pre-tax amount.
    pub subtotal: Option<ExtractionMatch<Decimal>>,
    /// Tax amount.
    pub tax: Option<ExtractionMatch<Decimal>>,
    /// Final invoice amount.
    pub total: Option<ExtractionMatch<Decimal>>,
    /// All detected amounts.
    pub all_amounts: Vec<ExtractionMatch<Decimal>>,
}

/// Extract summary amounts from invoice text.
///
/// The total is resolved by an ordered rule list: an explicit "INVOICE
/// TOTAL" label wins, then "TOTAL DUE"/"AMOUNT DUE", then a line that
/// starts with bare "TOTAL". The line anchor on the last rule keeps
/// SUBTOTAL lines from being read as the total. There is no
/// largest-amount fallback; a total the rules cannot find stays `None`.
pub fn extract_amounts(text: &str) -> InvoiceAmounts {
    let mut result = InvoiceAmounts::default();
    let extractor = AmountExtractor::new();

    result.all_amounts = extractor.extract_all(text);

    if let Some(caps) = SUBTOTAL.captures(text) {
        if let Some(amount) = parse_money(&caps[1]) {
            result.subtotal = Some(ExtractionMatch::new(amount, 0.95, &caps[0]));
        }
    }

    if let Some(caps) = TAX.captures(text) {
        if let Some(amount) = parse_money(&caps[1]) {
            result.tax = Some(ExtractionMatch::new(amount, 0.95, &caps[0]));
        }
    }

    for (pattern, confidence) in [(&*TOTAL_LABELED, 0.95), (&*TOTAL_DUE, 0.95), (&*TOTAL_LINE, 0.9)]
    {
        if let Some(caps) = pattern.captures(text) {
            if let Some(amount) = parse_money(&caps[1]) {
                result.total = Some(ExtractionMatch::new(amount, confidence, &caps[0]));
                break;
            }
        }
    }

    // If we have subtotal and total but not tax, calculate it
    if result.tax.is_none() {
        if let (Some(subtotal), Some(total)) = (&result.subtotal, &result.total) {
            let tax = total.value - subtotal.value;
            if tax >= Decimal::ZERO {
                result.tax = Some(ExtractionMatch::new(tax, 0.8, "calculated"));
            }
        }
    }

    // If we have tax and total but not subtotal, calculate it
    if result.subtotal.is_none() {
        if let (Some(tax), Some(total)) = (&result.tax, &result.total) {
            let subtotal = total.value - tax.value;
            if subtotal >= Decimal::ZERO {
                result.subtotal = Some(ExtractionMatch::new(subtotal, 0.8, "calculated"));
            }
        }
    }

    result
}

/// Parse a US-formatted amount (e.g., "$1,234.56" or "1234.56").
pub fn parse_money(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned).ok()
}

/// Format an amount with thousand separators (1,234.56).
pub fn format_money(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (sign, s) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", &s[..]),
    };
    let parts: Vec<&str> = s.split('.').collect();

    if parts.len() != 2 {
        return s.to_string();
    }

    let integer_part = parts[0];
    let decimal_part = parts[1];

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{}{}.{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("$1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_money("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_money("350.71"), Some(dec("350.71")));
        assert_eq!(parse_money(""), None);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec("1234.56")), "1,234.56");
        assert_eq!(format_money(dec("350.7")), "350.70");
        assert_eq!(format_money(dec("12345678.9")), "12,345,678.90");
    }

    #[test]
    fn test_extract_summary_amounts() {
        let text = r#"
            SUBTOTAL: 331.90
            TAX: 18.81
            TOTAL: $350.71
        "#;

        let amounts = extract_amounts(text);

        assert_eq!(amounts.subtotal.unwrap().value, dec("331.90"));
        assert_eq!(amounts.tax.unwrap().value, dec("18.81"));
        assert_eq!(amounts.total.unwrap().value, dec("350.71"));
    }

    #[test]
    fn test_total_rule_order() {
        let text = "TOTAL: $100.00\nINVOICE TOTAL: $350.71";
        let amounts = extract_amounts(text);
        assert_eq!(amounts.total.unwrap().value, dec("350.71"));
    }

    #[test]
    fn test_subtotal_not_read_as_total() {
        let amounts = extract_amounts("SUBTOTAL: 331.90\n");
        assert_eq!(amounts.subtotal.as_ref().unwrap().value, dec("331.90"));
        assert!(amounts.total.is_none());
    }

    #[test]
    fn test_tax_calculated_from_subtotal_and_total() {
        let amounts = extract_amounts("SUBTOTAL: 100.00\nAMOUNT DUE: 108.10");
        let tax = amounts.tax.unwrap();
        assert_eq!(tax.value, dec("8.10"));
        assert_eq!(tax.source, "calculated");
    }

    #[test]
    fn test_extract_all_amounts() {
        let extractor = AmountExtractor::new();
        let text = "CASE PRICE: $298.95, EXTENDED: $597.90";

        let results = extractor.extract_all(text);
        assert_eq!(results.len(), 2);
    }
}
