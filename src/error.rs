//! Error types for schema conversion

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Why a pointer failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// A `#/a/b` path step did not name a key of a mapping
    SegmentNotFound,
    /// No registered `$id` matches the pointer
    UnknownId,
    /// The fragment is not a JSON pointer
    InvalidPointer,
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SegmentNotFound => write!(f, "segment not found"),
            Self::UnknownId => write!(f, "unknown id"),
            Self::InvalidPointer => write!(f, "invalid pointer"),
        }
    }
}

/// Conversion errors. Every variant is fatal for the current conversion.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot resolve reference '{pointer}': {reason}")]
    Resolution {
        pointer: String,
        reason: ResolutionFailure,
    },

    #[error("Reference cycle detected at '{pointer}' ({})", chain.join(" -> "))]
    Cycle { pointer: String, chain: Vec<String> },

    #[error("Record type not found: {name}{}", format_suggestions(suggestions))]
    RootNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("No root type: document has no object root, no $root, and no record type was given")]
    NoRoot,

    #[error("Root type '{name}' is not an object")]
    RootNotRecord { name: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl ConvertError {
    pub(crate) fn resolution(pointer: impl Into<String>, reason: ResolutionFailure) -> Self {
        Self::Resolution {
            pointer: pointer.into(),
            reason,
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_message() {
        let err = ConvertError::resolution("#/definitions/Missing", ResolutionFailure::SegmentNotFound);
        assert_eq!(
            err.to_string(),
            "Cannot resolve reference '#/definitions/Missing': segment not found"
        );
    }

    #[test]
    fn test_root_not_found_suggestions() {
        let err = ConvertError::RootNotFound {
            name: "Ordr".to_string(),
            suggestions: vec!["Order".to_string(), "OrderLine".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Record type not found: Ordr (did you mean: Order, OrderLine?)"
        );
    }
}
