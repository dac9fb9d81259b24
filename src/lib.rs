//! Structure Schema Converter
//!
//! Translates JSON Structure schemas into the schema languages of systems
//! that have no native sum types or recursion: Apache Iceberg, Apache
//! Parquet and XML Schema.
//!
//! ## Pipeline
//!
//! ```text
//! schema.json ──► DocumentSet ──► SchemaResolver ($id, pointers)
//!                            └──► NamedTypeCache (bare type names)
//!                                        │
//!                      select_root ──► Translator<T: TargetSystem>
//!                                        │
//!                    ┌───────────────────┼───────────────────┐
//!                 iceberg             parquet               xsd
//!              (JSON | Arrow)      (zero-row file)     (named types)
//!                                        │
//!                                  write_atomic + sha256
//! ```
//!
//! Unions and choices become records with one optional field per
//! alternative. Reference cycles are rejected.

pub mod checksum;
pub mod config;
pub mod convert;
pub mod error;
pub mod structure;
pub mod targets;
pub mod translate;

pub use checksum::Checksum;
pub use config::ConverterConfig;
pub use convert::{convert, convert_documents, Conversion, ConvertReport, ConvertRequest, Target};
pub use error::{ConvertError, Result};
pub use structure::{Diagnostics, DocumentSet};
pub use targets::IcebergFormat;
pub use translate::TranslateOptions;
