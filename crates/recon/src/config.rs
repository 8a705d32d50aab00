use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration. Every section is optional; the defaults reproduce the
/// historical tagging behavior.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconConfig {
    #[serde(default)]
    pub columns: InputColumns,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub operator: OperatorConfig,
    #[serde(default)]
    pub well_name: WellNameConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Input table column names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputColumns {
    pub property: String,
    pub operator: String,
    pub county: String,
    pub state: String,
    pub registry_number: String,
}

impl Default for InputColumns {
    fn default() -> Self {
        Self {
            property: "Property".into(),
            operator: "Operator".into(),
            county: "County".into(),
            state: "State".into(),
            registry_number: "RRC".into(),
        }
    }
}

impl InputColumns {
    fn names(&self) -> [(&'static str, &str); 5] {
        [
            ("property", &self.property),
            ("operator", &self.operator),
            ("county", &self.county),
            ("state", &self.state),
            ("registry_number", &self.registry_number),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// SQLite table holding the registry.
    pub table: String,
    pub columns: RegistryColumns,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            table: "wells".into(),
            columns: RegistryColumns::default(),
        }
    }
}

/// Registry column names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryColumns {
    pub well_id: String,
    pub api10: String,
    pub api14: String,
    pub registry_number: String,
    pub well_name: String,
    pub well_number: String,
    pub lease_name: String,
    pub operator: String,
    pub county: String,
    pub state: String,
    pub status: String,
}

impl Default for RegistryColumns {
    fn default() -> Self {
        Self {
            well_id: "id".into(),
            api10: "api10".into(),
            api14: "api14".into(),
            registry_number: "rrc".into(),
            well_name: "well_name".into(),
            well_number: "well_number".into(),
            lease_name: "lease_name".into(),
            operator: "operator".into(),
            county: "county".into(),
            state: "state".into(),
            status: "well_status".into(),
        }
    }
}

impl RegistryColumns {
    fn names(&self) -> [(&'static str, &str); 11] {
        [
            ("well_id", &self.well_id),
            ("api10", &self.api10),
            ("api14", &self.api14),
            ("registry_number", &self.registry_number),
            ("well_name", &self.well_name),
            ("well_number", &self.well_number),
            ("lease_name", &self.lease_name),
            ("operator", &self.operator),
            ("county", &self.county),
            ("state", &self.state),
            ("status", &self.status),
        ]
    }
}

// ---------------------------------------------------------------------------
// Normalization + similarity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Replacement {
    pub from: String,
    pub to: String,
}

impl Replacement {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Insertion/deletion distance ratio (`2 * LCS / (len_a + len_b)`).
    Indel,
    Levenshtein,
    JaroWinkler,
}

impl Default for SimilarityMetric {
    fn default() -> Self {
        Self::Indel
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperatorConfig {
    /// Scores at or above this (and below `exact_threshold`) are a close match.
    pub close_threshold: f64,
    /// Scores at or above this are an exact match.
    pub exact_threshold: f64,
    pub metric: SimilarityMetric,
    pub replacements: Vec<Replacement>,
    pub strip_chars: String,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            close_threshold: 80.0,
            exact_threshold: 100.0,
            metric: SimilarityMetric::Indel,
            replacements: vec![Replacement::new("PRODUCTION", "PROD")],
            strip_chars: ".,".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WellNameConfig {
    pub replacements: Vec<Replacement>,
    pub strip_chars: String,
}

impl Default for WellNameConfig {
    fn default() -> Self {
        Self {
            replacements: vec![Replacement::new("GAS UNIT", "GU")],
            strip_chars: ".,\"".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Prepended to the input file name to form the output file name.
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_prefix: "(With Tagging) ".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        let op = &self.operator;
        if !(0.0..=100.0).contains(&op.close_threshold)
            || !(0.0..=100.0).contains(&op.exact_threshold)
        {
            return Err(ReconError::ConfigValidation(
                "operator thresholds must be within 0..=100".into(),
            ));
        }
        if op.close_threshold > op.exact_threshold {
            return Err(ReconError::ConfigValidation(format!(
                "operator close_threshold ({}) exceeds exact_threshold ({})",
                op.close_threshold, op.exact_threshold
            )));
        }

        for (field, name) in self.columns.names() {
            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "columns.{field} must not be empty"
                )));
            }
        }
        for (field, name) in self.registry.columns.names() {
            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "registry.columns.{field} must not be empty"
                )));
            }
        }
        if self.registry.table.trim().is_empty() {
            return Err(ReconError::ConfigValidation("registry.table must not be empty".into()));
        }

        let mut replacements = op.replacements.iter().chain(&self.well_name.replacements);
        if replacements.any(|r| r.from.is_empty()) {
            return Err(ReconError::ConfigValidation(
                "replacement 'from' must not be empty".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
