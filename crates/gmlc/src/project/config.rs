//! Analysis settings

use crate::common::{AnalysisError, AnalysisResult};
use crate::sema::Severity;
use crate::types::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for one project. Every field has a default, so a config file
/// only needs the settings it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Report global functions that are never referenced
    pub report_unused: bool,
    /// Recursion bound for narrowing, equality and generic binding
    pub max_generic_depth: usize,
    /// Severity of undeclared variable and global references
    pub undeclared_severity: Severity,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            report_unused: true,
            max_generic_depth: DEFAULT_MAX_DEPTH,
            undeclared_severity: Severity::Warning,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json(text: &str) -> AnalysisResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| AnalysisError::config(e.to_string()))?;
        if config.undeclared_severity == Severity::Info {
            return Err(AnalysisError::config("undeclared_severity must be \"warning\" or \"error\""));
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = AnalysisConfig::from_json(r#"{ "report_unused": false }"#).unwrap();
        assert_eq!(
            config,
            AnalysisConfig {
                report_unused: false,
                ..AnalysisConfig::default()
            }
        );
    }

    #[test]
    fn test_severity_names() {
        let config = AnalysisConfig::from_json(r#"{ "undeclared_severity": "error" }"#).unwrap();
        assert_eq!(config.undeclared_severity, Severity::Error);
        assert!(AnalysisConfig::from_json(r#"{ "undeclared_severity": "info" }"#).is_err());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = AnalysisConfig::from_json(r#"{ "colour": true }"#).unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
    }
}
