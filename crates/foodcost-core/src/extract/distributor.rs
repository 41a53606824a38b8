//! Distributor identification by alias scan.

use tracing::warn;

use super::rules::{ExtractionMatch, FieldExtractor};
use crate::models::{Distributor, VendorConfig};

/// Built-in alias table, scanned in order; the first alias found in the
/// document wins, so more specific spellings come before short ones.
const BUILTIN_ALIASES: &[(&str, Distributor)] = &[
    ("SYSCO", Distributor::Sysco),
    ("SHAMROCK FOODS", Distributor::Shamrock),
    ("SHAMROCK", Distributor::Shamrock),
    ("U.S. FOODS", Distributor::UsFoods),
    ("US FOODS", Distributor::UsFoods),
    ("USFOODS", Distributor::UsFoods),
    ("US FOODSERVICE", Distributor::UsFoods),
    ("PERFORMANCE FOODSERVICE", Distributor::PerformanceFood),
    ("PERFORMANCE FOOD", Distributor::PerformanceFood),
    ("PFG", Distributor::PerformanceFood),
    ("RESTAURANT DEPOT", Distributor::RestaurantDepot),
    ("JETRO", Distributor::RestaurantDepot),
];

/// Scans document text for known distributor names.
#[derive(Debug, Clone)]
pub struct DistributorScanner {
    aliases: Vec<(String, Distributor)>,
}

impl DistributorScanner {
    /// Scanner with the built-in alias table.
    pub fn new() -> Self {
        Self {
            aliases: BUILTIN_ALIASES
                .iter()
                .map(|(alias, d)| (alias.to_string(), *d))
                .collect(),
        }
    }

    /// Add an alias ahead of the built-ins.
    pub fn with_alias(mut self, alias: impl Into<String>, distributor: Distributor) -> Self {
        self.aliases
            .insert(0, (alias.into().to_ascii_uppercase(), distributor));
        self
    }

    /// Scanner with config aliases layered ahead of the built-ins.
    ///
    /// Aliases whose tag is not a known distributor are skipped with a
    /// warning rather than failing the whole config.
    pub fn from_config(vendors: &VendorConfig) -> Self {
        let mut scanner = Self::new();
        for entry in vendors.aliases.iter().rev() {
            match Distributor::from_tag(&entry.tag) {
                Some(distributor) => {
                    scanner = scanner.with_alias(&entry.alias, distributor);
                }
                None => {
                    warn!(
                        alias = %entry.alias,
                        tag = %entry.tag,
                        "ignoring alias with unknown distributor tag"
                    );
                }
            }
        }
        scanner
    }

    /// Identify the distributor, `Unknown` when no alias is present.
    pub fn identify(&self, text: &str) -> Distributor {
        self.extract(text)
            .map(|m| m.value)
            .unwrap_or(Distributor::Unknown)
    }
}

impl Default for DistributorScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DistributorScanner {
    type Output = ExtractionMatch<Distributor>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let haystack = text.to_ascii_uppercase();
        for (alias, distributor) in &self.aliases {
            if let Some(start) = haystack.find(alias.as_str()) {
                return Some(
                    ExtractionMatch::new(*distributor, 0.95, alias.as_str())
                        .with_position(start, start + alias.len()),
                );
            }
        }
        None
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let haystack = text.to_ascii_uppercase();
        let mut results: Vec<Self::Output> = Vec::new();
        for (alias, distributor) in &self.aliases {
            if results.iter().any(|m| m.value == *distributor) {
                continue;
            }
            if let Some(start) = haystack.find(alias.as_str()) {
                results.push(
                    ExtractionMatch::new(*distributor, 0.95, alias.as_str())
                        .with_position(start, start + alias.len()),
                );
            }
        }
        results
    }
}

/// Identify the distributor using the built-in alias table.
pub fn identify_distributor(text: &str) -> Distributor {
    DistributorScanner::new().identify(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VendorAlias;

    #[test]
    fn test_builtin_aliases() {
        assert_eq!(identify_distributor("SYSCO DENVER #052"), Distributor::Sysco);
        assert_eq!(
            identify_distributor("Shamrock Foods Company"),
            Distributor::Shamrock
        );
        assert_eq!(
            identify_distributor("U.S. Foods, Inc. Remit to:"),
            Distributor::UsFoods
        );
        assert_eq!(
            identify_distributor("PERFORMANCE FOODSERVICE - DENVER"),
            Distributor::PerformanceFood
        );
        assert_eq!(
            identify_distributor("restaurant depot receipt"),
            Distributor::RestaurantDepot
        );
    }

    #[test]
    fn test_no_alias_is_unknown() {
        assert_eq!(identify_distributor("ACME PRODUCE CO"), Distributor::Unknown);
        assert_eq!(identify_distributor(""), Distributor::Unknown);
    }

    #[test]
    fn test_table_order_wins() {
        // US FOODS appears first in the text, SYSCO first in the table
        let text = "US FOODS bid attached, SYSCO invoice follows";
        assert_eq!(identify_distributor(text), Distributor::Sysco);
    }

    #[test]
    fn test_config_alias_layered_first() {
        let vendors = VendorConfig {
            aliases: vec![VendorAlias {
                alias: "CHENEY BROS".to_string(),
                tag: "US FOODS".to_string(),
            }],
        };
        let scanner = DistributorScanner::from_config(&vendors);
        assert_eq!(scanner.identify("CHENEY BROS INC"), Distributor::UsFoods);
        // built-ins still present
        assert_eq!(scanner.identify("SYSCO"), Distributor::Sysco);
    }

    #[test]
    fn test_unknown_config_tag_skipped() {
        let vendors = VendorConfig {
            aliases: vec![VendorAlias {
                alias: "MYSTERY CO".to_string(),
                tag: "NOT A VENDOR".to_string(),
            }],
        };
        let scanner = DistributorScanner::from_config(&vendors);
        assert_eq!(scanner.identify("MYSTERY CO"), Distributor::Unknown);
    }

    #[test]
    fn test_extract_all_dedupes() {
        let scanner = DistributorScanner::new();
        let matches = scanner.extract_all("SYSCO and SHAMROCK and SYSCO again");
        assert_eq!(matches.len(), 2);
    }
}
