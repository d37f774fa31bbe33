//! Configuration for conversions

use crate::error::{ConvertError, Result};
use crate::pivot::{DEFAULT_METHODS, MethodSet};
use crate::reader::ColumnSchema;
use crate::writer::WriterOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Main converter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Recognized methods, in output column order
    pub methods: Vec<String>,
    pub columns: ColumnSchema,
    pub output: OutputConfig,
    /// Worksheet to read; the first one when unset
    pub input_sheet: Option<String>,
}

/// Output document settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Appended to the input file stem to name the output
    pub suffix: String,
    /// Text of the top-left header cell
    pub corner_label: String,
    pub sheet_name: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            methods: DEFAULT_METHODS.iter().map(|m| m.to_string()).collect(),
            columns: ColumnSchema::default(),
            output: OutputConfig::default(),
            input_sheet: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: "_converted".to_string(),
            corner_label: "Method".to_string(),
            sheet_name: "Sheet".to_string(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConvertError::Config(e.to_string()))
    }

    pub fn method_set(&self) -> MethodSet {
        MethodSet::new(self.methods.iter().cloned())
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            sheet_name: self.output.sheet_name.clone(),
            corner_label: self.output.corner_label.clone(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(ConvertError::Config(
                "at least one method must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for method in &self.methods {
            if method.trim().is_empty() {
                return Err(ConvertError::Config("method names must not be blank".to_string()));
            }
            if !seen.insert(method.as_str()) {
                return Err(ConvertError::Config(format!(
                    "method '{}' is listed more than once",
                    method
                )));
            }
        }

        let columns = [
            ("model", &self.columns.model),
            ("method", &self.columns.method),
            ("score", &self.columns.score),
        ];
        for (role, name) in &columns {
            if name.trim().is_empty() {
                return Err(ConvertError::Config(format!(
                    "{} column name must not be blank",
                    role
                )));
            }
        }
        let distinct: HashSet<&str> = columns.iter().map(|(_, name)| name.as_str()).collect();
        if distinct.len() != columns.len() {
            return Err(ConvertError::Config(
                "model, method and score columns must be distinct".to_string(),
            ));
        }

        if self.output.suffix.is_empty() {
            return Err(ConvertError::Config("output suffix must not be empty".to_string()));
        }
        if self.output.sheet_name.trim().is_empty() {
            return Err(ConvertError::Config("output sheet name must not be blank".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ConverterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.method_set().len(), 5);
        assert_eq!(config.columns.score, "R2 Score");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConverterConfig::from_toml(
            r#"
methods = ["Stacking", "Voting"]

[columns]
score = "Accuracy"
"#,
        )
        .unwrap();

        assert_eq!(config.methods, vec!["Stacking", "Voting"]);
        assert_eq!(config.columns.model, "Models");
        assert_eq!(config.columns.score, "Accuracy");
        assert_eq!(config.output.suffix, "_converted");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_section() {
        let config = ConverterConfig::from_toml(
            r#"
input_sheet = "Results"

[output]
suffix = "_wide"
corner_label = "Models"
"#,
        )
        .unwrap();
        assert_eq!(config.input_sheet.as_deref(), Some("Results"));
        assert_eq!(config.writer_options().corner_label, "Models");
        assert_eq!(config.output.sheet_name, "Sheet");
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config =
            ConverterConfig::from_toml(include_str!("../../sheetpivot.example.toml")).unwrap();
        assert_eq!(config, ConverterConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = ConverterConfig::from_toml("methods = 3").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }

    #[test]
    fn test_validate_rejects_bad_methods() {
        let mut config = ConverterConfig::default();
        config.methods = vec![];
        assert!(config.validate().is_err());

        config.methods = vec!["Voting".to_string(), "Voting".to_string()];
        assert!(config.validate().is_err());

        config.methods = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_clashing_columns() {
        let mut config = ConverterConfig::default();
        config.columns.score = "Method".to_string();
        assert!(config.validate().is_err());
    }
}
