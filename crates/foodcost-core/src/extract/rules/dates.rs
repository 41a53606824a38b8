//! Date extraction for U.S. foodservice invoices.

use chrono::NaiveDate;

use super::patterns::{DATE_MDY, DATE_WRITTEN, DATE_YMD, DELIVERY_DATE, INVOICE_DATE};
use super::{ExtractionMatch, FieldExtractor};

/// Date field extractor.
///
/// Numeric dates are read month-first (US convention), so 10/02/2024 is
/// October 2nd, not February 10th.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = ExtractionMatch<NaiveDate>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        // MM/DD/YYYY or MM-DD-YY
        for caps in DATE_MDY.captures_iter(text) {
            let month: u32 = caps[1].parse().unwrap_or(0);
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = parse_year(&caps[3]);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(date, 0.9, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        // YYYY-MM-DD or YYYY/MM/DD
        for caps in DATE_YMD.captures_iter(text) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let day: u32 = caps[3].parse().unwrap_or(0);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                // Skip if already found
                if results.iter().any(|r| r.value == date) {
                    continue;
                }

                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(date, 0.9, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        // Written month: "October 2, 2024"
        for caps in DATE_WRITTEN.captures_iter(text) {
            let month = month_to_number(&caps[1]);
            let day: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                // Skip if already found
                if results.iter().any(|r| r.value == date) {
                    continue;
                }

                let full_match = caps.get(0).unwrap();
                results.push(
                    ExtractionMatch::new(date, 0.95, full_match.as_str())
                        .with_position(full_match.start(), full_match.end()),
                );
            }
        }

        results
    }
}

/// Extracted dates from an invoice.
#[derive(Debug, Clone, Default)]
pub struct InvoiceDates {
    /// Date the invoice was issued.
    pub invoice_date: Option<ExtractionMatch<NaiveDate>>,
    /// Date the goods were delivered.
    pub delivery_date: Option<ExtractionMatch<NaiveDate>>,
}

/// Extract labeled dates from invoice text.
///
/// The invoice date falls back to the first date found anywhere when no
/// label matched; the delivery date is only taken from a labeled line.
pub fn extract_dates(text: &str) -> InvoiceDates {
    let mut result = InvoiceDates::default();
    let date_extractor = DateExtractor::new();

    if let Some(caps) = INVOICE_DATE.captures(text) {
        let date_text = &caps[1];
        if let Some(date) = date_extractor.extract(date_text) {
            result.invoice_date = Some(ExtractionMatch::new(date.value, 0.95, date_text));
        }
    }

    if let Some(caps) = DELIVERY_DATE.captures(text) {
        let date_text = &caps[1];
        if let Some(date) = date_extractor.extract(date_text) {
            result.delivery_date = Some(ExtractionMatch::new(date.value, 0.95, date_text));
        }
    }

    // If no labeled invoice date was found, take the first date anywhere
    if result.invoice_date.is_none() {
        let all_dates = date_extractor.extract_all(text);
        if let Some(first) = all_dates.into_iter().next() {
            result.invoice_date = Some(first);
        }
    }

    result
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

fn month_to_number(month: &str) -> u32 {
    match month.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_date_mdy() {
        let extractor = DateExtractor::new();

        let result = extractor.extract("10/02/2024");
        assert!(result.is_some());
        assert_eq!(result.unwrap().value, NaiveDate::from_ymd_opt(2024, 10, 2).unwrap());
    }

    #[test]
    fn test_extract_date_ymd() {
        let extractor = DateExtractor::new();

        let result = extractor.extract("2024-10-02");
        assert!(result.is_some());
        assert_eq!(result.unwrap().value, NaiveDate::from_ymd_opt(2024, 10, 2).unwrap());
    }

    #[test]
    fn test_extract_date_written() {
        let extractor = DateExtractor::new();

        let result = extractor.extract("October 2, 2024");
        assert!(result.is_some());
        assert_eq!(result.unwrap().value, NaiveDate::from_ymd_opt(2024, 10, 2).unwrap());

        let result = extractor.extract("Mar 3 2024");
        assert_eq!(result.unwrap().value, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
    }

    #[test]
    fn test_two_digit_year() {
        let extractor = DateExtractor::new();

        let result = extractor.extract("10/02/24");
        assert!(result.is_some());
        assert_eq!(result.unwrap().value, NaiveDate::from_ymd_opt(2024, 10, 2).unwrap());
    }

    #[test]
    fn test_invalid_date_skipped() {
        let extractor = DateExtractor::new();
        assert!(extractor.extract("13/45/2024").is_none());
    }

    #[test]
    fn test_extract_labeled_dates() {
        let text = r#"
            SYSCO DENVER
            INVOICE DATE: 10/02/2024
            DELIVERY DATE: 10/03/2024
        "#;

        let dates = extract_dates(text);

        assert!(dates.invoice_date.is_some());
        assert_eq!(
            dates.invoice_date.unwrap().value,
            NaiveDate::from_ymd_opt(2024, 10, 2).unwrap()
        );

        assert!(dates.delivery_date.is_some());
        assert_eq!(
            dates.delivery_date.unwrap().value,
            NaiveDate::from_ymd_opt(2024, 10, 3).unwrap()
        );
    }

    #[test]
    fn test_unlabeled_date_falls_back() {
        let dates = extract_dates("Statement as of 10/02/2024 for account 4417");
        assert!(dates.invoice_date.is_some());
        assert!(dates.delivery_date.is_none());
    }
}
