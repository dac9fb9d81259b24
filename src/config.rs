//! Configuration management for the converter
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (structure.toml)
//! - Environment variables (STRUCTURE__*)
//!
//! ## Example config file (structure.toml):
//! ```toml
//! [output]
//! emit_envelope_columns = true
//!
//! [iceberg]
//! format = "arrow"
//!
//! [xsd]
//! target_namespace = "urn:example:orders"
//!
//! [decimal]
//! precision = 38
//! scale = 18
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::structure::{DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE};
use crate::targets::IcebergFormat;
use crate::translate::TranslateOptions;

/// Main configuration for the converter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Settings shared by all targets
    #[serde(default)]
    pub output: OutputConfig,

    /// Iceberg target settings
    #[serde(default)]
    pub iceberg: IcebergConfig,

    /// XSD target settings
    #[serde(default)]
    pub xsd: XsdConfig,

    /// Defaults for `decimal` without parameters
    #[serde(default)]
    pub decimal: DecimalConfig,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Append the CloudEvents envelope columns to every root record
    #[serde(default)]
    pub emit_envelope_columns: bool,
}

/// Iceberg configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IcebergConfig {
    /// Physical encoding (json or arrow)
    #[serde(default)]
    pub format: IcebergFormat,
}

/// XSD configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XsdConfig {
    /// Target namespace URI of the generated schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
}

/// Decimal defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecimalConfig {
    #[serde(default = "default_precision")]
    pub precision: u32,

    #[serde(default = "default_scale")]
    pub scale: u32,
}

fn default_precision() -> u32 {
    DEFAULT_DECIMAL_PRECISION
}

fn default_scale() -> u32 {
    DEFAULT_DECIMAL_SCALE
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            scale: default_scale(),
        }
    }
}

impl ConverterConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "structure.toml",
            ".structure.toml",
            "config/structure.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "structure") {
            let xdg_config = config_dir.config_dir().join("structure.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // STRUCTURE__SECTION__KEY
        builder = builder.add_source(
            Environment::with_prefix("STRUCTURE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Translation options implied by this configuration
    pub fn translate_options(&self) -> TranslateOptions {
        TranslateOptions {
            decimal_precision: self.decimal.precision,
            decimal_scale: self.decimal.scale,
            envelope_columns: self.output.emit_envelope_columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert!(!config.output.emit_envelope_columns);
        assert_eq!(config.iceberg.format, IcebergFormat::Json);
        assert_eq!(config.decimal.precision, 38);
        assert_eq!(config.decimal.scale, 18);
    }

    #[test]
    fn test_serialize_config() {
        let config = ConverterConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("[decimal]"));
        assert!(toml_str.contains("format = \"json\""));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[iceberg]\nformat = \"arrow\"\n\n[xsd]\ntarget_namespace = \"urn:orders\"\n\n[decimal]\nscale = 4\n",
        )
        .unwrap();

        let config = ConverterConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.iceberg.format, IcebergFormat::Arrow);
        assert_eq!(config.xsd.target_namespace.as_deref(), Some("urn:orders"));
        assert_eq!(config.decimal.precision, 38);
        assert_eq!(config.decimal.scale, 4);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(ConverterConfig::load_from(path.to_str()).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = ConverterConfig::default();
        config.output.emit_envelope_columns = true;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = ConverterConfig::load_from(path.to_str()).unwrap();
        assert!(loaded.output.emit_envelope_columns);
        assert!(loaded.translate_options().envelope_columns);
    }
}
