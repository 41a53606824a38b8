//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main configuration for the foodcost pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodcostConfig {
    /// Extraction behavior.
    pub extraction: ExtractionConfig,

    /// Distributor alias overrides.
    pub vendors: VendorConfig,

    /// Pack-size parsing overrides.
    pub pack: PackConfig,

    /// Price comparison behavior.
    pub comparison: ComparisonConfig,
}

impl Default for FoodcostConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            vendors: VendorConfig::default(),
            pack: PackConfig::default(),
            comparison: ComparisonConfig::default(),
        }
    }
}

/// Extraction behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Emit warnings for key fields that could not be found.
    pub warn_missing_fields: bool,

    /// Cross-check subtotal/tax/total and per-row arithmetic.
    pub check_arithmetic: bool,

    /// Warn when the source OCR confidence falls below this (0-100).
    pub low_confidence_threshold: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            warn_missing_fields: true,
            check_arithmetic: true,
            low_confidence_threshold: 50.0,
        }
    }
}

/// Extra distributor aliases layered on top of the built-in table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    /// Custom aliases; earlier entries win over built-ins.
    pub aliases: Vec<VendorAlias>,
}

/// A single alias -> distributor mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorAlias {
    /// Text to look for in the document (case-insensitive).
    pub alias: String,

    /// Canonical distributor tag, e.g. "SYSCO" or "US FOODS".
    pub tag: String,
}

/// Pack-size parsing overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Extra can codes layered on top of the built-in trade sizes.
    pub can_sizes: Vec<CanSize>,
}

/// A single can-code -> ounces mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanSize {
    /// Can code as printed after the `#`, e.g. "10" or "2.5".
    pub code: String,

    /// Ounces per can.
    pub ounces: Decimal,
}

/// Price comparison configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Drop matches whose absolute savings fall below this amount.
    pub min_savings: Decimal,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            min_savings: Decimal::ZERO,
        }
    }
}

impl FoodcostConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trip() {
        let config = FoodcostConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: FoodcostConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.extraction.warn_missing_fields,
            config.extraction.warn_missing_fields
        );
        assert_eq!(parsed.comparison.min_savings, config.comparison.min_savings);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{"vendors": {"aliases": [{"alias": "CHENEY BROS", "tag": "UNKNOWN"}]}}"#;
        let config: FoodcostConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.vendors.aliases.len(), 1);
        assert!(config.extraction.warn_missing_fields);
        assert!(config.pack.can_sizes.is_empty());
    }
}
