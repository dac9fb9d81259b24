//! End-to-End Conversion
//!
//! Load, index, select the root, translate, encode, write. Encoding is
//! finished in memory before the destination is touched.

use std::path::PathBuf;

use crate::checksum::Checksum;
use crate::error::Result;
use crate::structure::{select_root, Diagnostics, DocumentSet, NamedTypeCache, SchemaResolver};
use crate::targets::{self, iceberg, parquet, xsd, Emitted, IcebergFormat};
use crate::translate::{translate, TargetSystem, TranslateOptions, Translation};

/// Output target and its target-specific settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Iceberg { format: IcebergFormat },
    Parquet,
    Xsd { target_namespace: Option<String> },
}

impl Target {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Iceberg { .. } => "iceberg",
            Self::Parquet => "parquet",
            Self::Xsd { .. } => "xsd",
        }
    }
}

/// One conversion job
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub input: PathBuf,
    pub includes: Vec<PathBuf>,
    pub output: PathBuf,
    pub record_type: Option<String>,
    pub target: Target,
    pub options: TranslateOptions,
}

/// An encoded conversion that has not been written anywhere
#[derive(Debug)]
pub struct Conversion {
    pub bytes: Vec<u8>,
    /// Fully-qualified name of the root record
    pub record: String,
    /// Top-level field count, envelope columns included
    pub fields: usize,
    /// Field IDs issued across the whole tree
    pub field_ids: usize,
    pub diagnostics: Diagnostics,
}

impl Conversion {
    fn from_translation<T: TargetSystem>(translation: &Translation<T>, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            record: translation.root.fullname(),
            fields: translation.root.fields.len(),
            field_ids: translation.field_ids,
            diagnostics: translation.diagnostics.clone(),
        }
    }

    pub fn checksum(&self) -> Checksum {
        Checksum::from_bytes(&self.bytes)
    }
}

/// Outcome of a conversion written to disk
#[derive(Debug)]
pub struct ConvertReport {
    pub output: Emitted,
    pub record: String,
    pub fields: usize,
    pub field_ids: usize,
    pub diagnostics: Diagnostics,
}

/// Convert an already loaded document set into encoded target bytes
pub fn convert_documents(
    documents: &DocumentSet,
    record_type: Option<&str>,
    target: &Target,
    options: TranslateOptions,
) -> Result<Conversion> {
    let mut resolver = SchemaResolver::new();
    let mut named = NamedTypeCache::new();
    for document in documents.documents() {
        resolver.register(document);
        named.cache(document);
    }
    tracing::debug!(
        documents = resolver.documents().len(),
        ids = resolver.id_count(),
        named_types = named.len(),
        "indexed schema documents"
    );

    let root = select_root(&documents.primary, &resolver, &named, record_type)?;

    let conversion = match target {
        Target::Iceberg { format } => {
            let translation = translate(&resolver, &named, &root, iceberg::IcebergTarget::new(), options)?;
            let bytes = iceberg::encode(&translation.root, *format)?;
            Conversion::from_translation(&translation, bytes)
        }
        Target::Parquet => {
            let translation = translate(&resolver, &named, &root, parquet::ParquetTarget::new(), options)?;
            let bytes = parquet::encode(&translation.root)?;
            Conversion::from_translation(&translation, bytes)
        }
        Target::Xsd { target_namespace } => {
            let translation = translate(
                &resolver,
                &named,
                &root,
                xsd::XsdTarget::new(target_namespace.clone()),
                options,
            )?;
            let bytes = xsd::encode(&translation.root, &translation.target);
            Conversion::from_translation(&translation, bytes)
        }
    };

    tracing::debug!(
        record = %conversion.record,
        warnings = conversion.diagnostics.warnings().count(),
        bytes = conversion.bytes.len(),
        "encoded {}",
        target.name()
    );

    Ok(conversion)
}

/// Load, convert and atomically write one schema
pub fn convert(request: &ConvertRequest) -> Result<ConvertReport> {
    tracing::info!(
        input = %request.input.display(),
        target = request.target.name(),
        "converting schema"
    );

    let documents = DocumentSet::load(&request.input, &request.includes)?;
    let conversion = convert_documents(
        &documents,
        request.record_type.as_deref(),
        &request.target,
        request.options,
    )?;

    let output = targets::write_atomic(&request.output, &conversion.bytes)?;
    tracing::info!(
        output = %output.path.display(),
        record = %conversion.record,
        fields = conversion.fields,
        checksum = %output.checksum,
        "conversion finished"
    );

    Ok(ConvertReport {
        output,
        record: conversion.record,
        fields: conversion.fields,
        field_ids: conversion.field_ids,
        diagnostics: conversion.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertError;
    use crate::structure::DiagnosticCode;
    use serde_json::json;
    use std::fs;

    fn order_schema() -> serde_json::Value {
        json!({
            "type": "object",
            "name": "Order",
            "namespace": "shop",
            "properties": {
                "id": {"type": "string"},
                "total": {"type": "decimal", "precision": 10, "scale": 2},
                "lines": {"type": "array", "items": {"type": "int32"}}
            },
            "required": ["id"]
        })
    }

    #[test]
    fn test_convert_documents_iceberg_json() {
        let documents = DocumentSet::from_value(order_schema());
        let target = Target::Iceberg { format: IcebergFormat::Json };
        let conversion = convert_documents(&documents, None, &target, TranslateOptions::default()).unwrap();

        assert_eq!(conversion.record, "shop.Order");
        assert_eq!(conversion.fields, 3);
        // Three fields plus the list element
        assert_eq!(conversion.field_ids, 4);

        let schema: serde_json::Value = serde_json::from_slice(&conversion.bytes).unwrap();
        assert_eq!(schema["type"], "struct");
        assert_eq!(schema["fields"][1]["type"], "decimal(10, 2)");
    }

    #[test]
    fn test_convert_documents_envelope() {
        let documents = DocumentSet::from_value(order_schema());
        let options = TranslateOptions {
            envelope_columns: true,
            ..TranslateOptions::default()
        };
        let conversion = convert_documents(&documents, None, &Target::Parquet, options).unwrap();
        assert_eq!(conversion.fields, 8);
        assert_eq!(&conversion.bytes[..4], b"PAR1");
    }

    #[test]
    fn test_convert_documents_xsd_namespace() {
        let documents = DocumentSet::from_value(order_schema());
        let target = Target::Xsd {
            target_namespace: Some("urn:shop".to_string()),
        };
        let conversion = convert_documents(&documents, None, &target, TranslateOptions::default()).unwrap();
        let text = String::from_utf8(conversion.bytes).unwrap();
        assert!(text.contains("targetNamespace=\"urn:shop\""));
        assert!(text.contains("<xs:element name=\"Order\""));
    }

    #[test]
    fn test_convert_documents_record_type_from_include() {
        let primary = json!({
            "definitions": {
                "Order": {
                    "type": "object",
                    "properties": {"customer": {"type": {"$ref": "https://example.com/customer"}}}
                }
            }
        });
        let include = json!({
            "$id": "https://example.com/customer",
            "type": "object",
            "name": "Customer",
            "properties": {"name": {"type": "string"}}
        });
        let documents = DocumentSet::from_value(primary).with_include("customer.json", include);

        let conversion = convert_documents(
            &documents,
            Some("Order"),
            &Target::Iceberg { format: IcebergFormat::Json },
            TranslateOptions::default(),
        )
        .unwrap();
        let schema: serde_json::Value = serde_json::from_slice(&conversion.bytes).unwrap();
        assert_eq!(schema["fields"][0]["type"]["type"], "struct");
        assert_eq!(schema["fields"][0]["type"]["fields"][0]["name"], "name");
    }

    #[test]
    fn test_convert_documents_warnings_survive() {
        let documents = DocumentSet::from_value(json!({
            "type": "object",
            "name": "Loose",
            "properties": {"payload": {"type": "Unknown"}}
        }));
        let conversion = convert_documents(&documents, None, &Target::Parquet, TranslateOptions::default()).unwrap();
        assert!(conversion.diagnostics.has_code(DiagnosticCode::UnresolvedName));
    }

    #[test]
    fn test_convert_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("order.json");
        fs::write(&input, serde_json::to_string(&order_schema()).unwrap()).unwrap();

        let request = ConvertRequest {
            input,
            includes: Vec::new(),
            output: dir.path().join("out/order.iceberg.json"),
            record_type: None,
            target: Target::Iceberg { format: IcebergFormat::Json },
            options: TranslateOptions::default(),
        };
        let report = convert(&request).unwrap();

        let written = fs::read(&report.output.path).unwrap();
        assert!(report.output.checksum.verify(&written));
        assert_eq!(report.record, "shop.Order");
    }

    #[test]
    fn test_convert_failure_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.json");
        fs::write(
            &input,
            r##"{"type": "object", "properties": {"a": {"type": {"$ref": "#/definitions/Missing"}}}}"##,
        )
        .unwrap();
        let output = dir.path().join("broken.xsd");

        let request = ConvertRequest {
            input,
            includes: Vec::new(),
            output: output.clone(),
            record_type: None,
            target: Target::Xsd { target_namespace: None },
            options: TranslateOptions::default(),
        };
        let err = convert(&request).unwrap_err();
        assert!(matches!(err, ConvertError::Resolution { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_convert_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let request = ConvertRequest {
            input: dir.path().join("absent.json"),
            includes: Vec::new(),
            output: dir.path().join("absent.parquet"),
            record_type: None,
            target: Target::Parquet,
            options: TranslateOptions::default(),
        };
        assert!(matches!(convert(&request).unwrap_err(), ConvertError::Io { .. }));
    }
}
