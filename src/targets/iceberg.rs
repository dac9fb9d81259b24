//! Apache Iceberg Target
//!
//! Columnar table schema with per-field IDs. Two encodings of the same
//! tree: the Iceberg JSON schema form, and an Arrow IPC stream holding only
//! the schema, with field IDs carried in `PARQUET:field_id` metadata.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_ipc::writer::StreamWriter;
use arrow_schema::{DataType, Field, Fields, Schema, TimeUnit};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::structure::Scalar;
use crate::translate::{FieldId, RootRecord, Slot, TargetSystem};

/// Arrow field metadata key holding the Iceberg field ID
pub const FIELD_ID_KEY: &str = "PARQUET:field_id";

/// Iceberg decimals are at most 38 digits
const MAX_DECIMAL_PRECISION: u32 = 38;

// =============================================================================
// Type Tree
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum IcebergType {
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Decimal { precision: u32, scale: u32 },
    Date,
    Time,
    Timestamp,
    String,
    Fixed(u32),
    Binary,
    List(Box<ListType>),
    Map(Box<MapType>),
    Struct(StructType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListType {
    pub element_id: i32,
    pub element_required: bool,
    pub element: IcebergType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub key_id: i32,
    pub key: IcebergType,
    pub value_id: i32,
    pub value_required: bool,
    pub value: IcebergType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructType {
    pub fields: Vec<NestedField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedField {
    pub id: i32,
    pub name: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub field_type: IcebergType,
}

impl From<Slot<IcebergType>> for NestedField {
    fn from(slot: Slot<IcebergType>) -> Self {
        Self {
            id: slot.id.get(),
            name: slot.name,
            required: slot.required,
            field_type: slot.ty,
        }
    }
}

impl IcebergType {
    /// Primitive type string, `None` for nested types
    pub fn primitive_name(&self) -> Option<String> {
        let name = match self {
            Self::Boolean => "boolean".to_string(),
            Self::Int => "int".to_string(),
            Self::Long => "long".to_string(),
            Self::Float => "float".to_string(),
            Self::Double => "double".to_string(),
            Self::Decimal { precision, scale } => format!("decimal({}, {})", precision, scale),
            Self::Date => "date".to_string(),
            Self::Time => "time".to_string(),
            Self::Timestamp => "timestamp".to_string(),
            Self::String => "string".to_string(),
            Self::Fixed(length) => format!("fixed[{}]", length),
            Self::Binary => "binary".to_string(),
            Self::List(_) | Self::Map(_) | Self::Struct(_) => return None,
        };
        Some(name)
    }
}

impl Serialize for IcebergType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::List(list) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", "list")?;
                map.serialize_entry("element-id", &list.element_id)?;
                map.serialize_entry("element", &list.element)?;
                map.serialize_entry("element-required", &list.element_required)?;
                map.end()
            }
            Self::Map(entry) => {
                let mut map = serializer.serialize_map(Some(6))?;
                map.serialize_entry("type", "map")?;
                map.serialize_entry("key-id", &entry.key_id)?;
                map.serialize_entry("key", &entry.key)?;
                map.serialize_entry("value-id", &entry.value_id)?;
                map.serialize_entry("value", &entry.value)?;
                map.serialize_entry("value-required", &entry.value_required)?;
                map.end()
            }
            Self::Struct(fields) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "struct")?;
                map.serialize_entry("fields", &fields.fields)?;
                map.end()
            }
            primitive => serializer.serialize_str(&primitive.primitive_name().unwrap_or_default()),
        }
    }
}

/// Top-level Iceberg schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IcebergSchema {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "schema-id")]
    pub schema_id: i32,
    pub fields: Vec<NestedField>,
}

impl IcebergSchema {
    pub fn from_root(root: &RootRecord<IcebergType>) -> Self {
        Self {
            kind: "struct",
            schema_id: 0,
            fields: root.fields.iter().cloned().map(NestedField::from).collect(),
        }
    }
}

// =============================================================================
// Target System
// =============================================================================

/// Iceberg translation target
#[derive(Debug, Default)]
pub struct IcebergTarget;

impl IcebergTarget {
    pub fn new() -> Self {
        Self
    }
}

impl TargetSystem for IcebergTarget {
    type Type = IcebergType;

    fn scalar(&mut self, scalar: &Scalar) -> IcebergType {
        match *scalar {
            Scalar::Null => IcebergType::String,
            Scalar::Boolean => IcebergType::Boolean,
            Scalar::String => IcebergType::String,
            Scalar::Int8 => IcebergType::Int,
            Scalar::Int16 => IcebergType::Int,
            Scalar::Int32 => IcebergType::Int,
            Scalar::Int64 => IcebergType::Long,
            Scalar::Int128 => IcebergType::Decimal { precision: 38, scale: 0 },
            Scalar::UInt8 => IcebergType::Int,
            Scalar::UInt16 => IcebergType::Int,
            Scalar::UInt32 => IcebergType::Long,
            Scalar::UInt64 => IcebergType::Decimal { precision: 20, scale: 0 },
            Scalar::UInt128 => IcebergType::Decimal { precision: 38, scale: 0 },
            Scalar::Float8 => IcebergType::Float,
            Scalar::Float32 => IcebergType::Float,
            Scalar::Float64 => IcebergType::Double,
            Scalar::Decimal { precision, scale } => {
                let precision = precision.clamp(1, MAX_DECIMAL_PRECISION);
                IcebergType::Decimal {
                    precision,
                    scale: scale.min(precision),
                }
            }
            Scalar::Binary { length: Some(length) } => IcebergType::Fixed(length),
            Scalar::Binary { length: None } => IcebergType::Binary,
            Scalar::Date => IcebergType::Date,
            Scalar::Time => IcebergType::Time,
            Scalar::DateTime => IcebergType::Timestamp,
            Scalar::Timestamp => IcebergType::Timestamp,
            // Microseconds
            Scalar::Duration => IcebergType::Long,
            Scalar::Uuid => IcebergType::String,
            Scalar::Uri => IcebergType::String,
            Scalar::JsonPointer => IcebergType::String,
            Scalar::Any => IcebergType::String,
        }
    }

    fn list(&mut self, _name: &str, element: Slot<IcebergType>) -> IcebergType {
        IcebergType::List(Box::new(ListType {
            element_id: element.id.get(),
            element_required: element.required,
            element: element.ty,
        }))
    }

    fn map(&mut self, _name: &str, key: FieldId, value: Slot<IcebergType>) -> IcebergType {
        IcebergType::Map(Box::new(MapType {
            key_id: key.get(),
            key: IcebergType::String,
            value_id: value.id.get(),
            value_required: value.required,
            value: value.ty,
        }))
    }

    fn record(&mut self, _name: &str, fields: Vec<Slot<IcebergType>>) -> IcebergType {
        IcebergType::Struct(StructType {
            fields: fields.into_iter().map(NestedField::from).collect(),
        })
    }

    fn enumeration(&mut self, _name: &str, base: &Scalar, _symbols: &[String]) -> IcebergType {
        self.scalar(base)
    }
}

// =============================================================================
// Encodings
// =============================================================================

/// Physical encoding of the Iceberg schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IcebergFormat {
    /// Iceberg JSON schema
    #[default]
    Json,
    /// Arrow IPC stream carrying the schema only
    Arrow,
}

/// Encode the translated root in the requested format
pub fn encode(root: &RootRecord<IcebergType>, format: IcebergFormat) -> Result<Vec<u8>> {
    match format {
        IcebergFormat::Json => encode_json(root),
        IcebergFormat::Arrow => encode_arrow(root),
    }
}

pub fn encode_json(root: &RootRecord<IcebergType>) -> Result<Vec<u8>> {
    let schema = IcebergSchema::from_root(root);
    let mut bytes = serde_json::to_vec_pretty(&schema)?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn encode_arrow(root: &RootRecord<IcebergType>) -> Result<Vec<u8>> {
    let schema = arrow_schema(root);
    let mut writer = StreamWriter::try_new(Vec::new(), &schema)?;
    writer.finish()?;
    Ok(writer.into_inner()?)
}

/// Arrow view of the Iceberg tree
pub fn arrow_schema(root: &RootRecord<IcebergType>) -> Schema {
    let fields: Vec<Field> = root
        .fields
        .iter()
        .map(|slot| arrow_field(&slot.name, slot.id.get(), slot.required, &slot.ty))
        .collect();
    Schema::new(fields).with_metadata(HashMap::from([(
        "iceberg.schema-id".to_string(),
        "0".to_string(),
    )]))
}

fn arrow_field(name: &str, id: i32, required: bool, ty: &IcebergType) -> Field {
    Field::new(name, arrow_type(ty), !required)
        .with_metadata(HashMap::from([(FIELD_ID_KEY.to_string(), id.to_string())]))
}

fn arrow_type(ty: &IcebergType) -> DataType {
    match ty {
        IcebergType::Boolean => DataType::Boolean,
        IcebergType::Int => DataType::Int32,
        IcebergType::Long => DataType::Int64,
        IcebergType::Float => DataType::Float32,
        IcebergType::Double => DataType::Float64,
        IcebergType::Decimal { precision, scale } => DataType::Decimal128(*precision as u8, *scale as i8),
        IcebergType::Date => DataType::Date32,
        IcebergType::Time => DataType::Time64(TimeUnit::Microsecond),
        IcebergType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
        IcebergType::String => DataType::Utf8,
        IcebergType::Fixed(length) => DataType::FixedSizeBinary(*length as i32),
        IcebergType::Binary => DataType::Binary,
        IcebergType::List(list) => DataType::List(Arc::new(arrow_field(
            "element",
            list.element_id,
            list.element_required,
            &list.element,
        ))),
        IcebergType::Map(map) => {
            let entries = Fields::from(vec![
                arrow_field("key", map.key_id, true, &map.key),
                arrow_field("value", map.value_id, map.value_required, &map.value),
            ]);
            DataType::Map(
                Arc::new(Field::new("key_value", DataType::Struct(entries), false)),
                false,
            )
        }
        IcebergType::Struct(fields) => DataType::Struct(
            fields
                .fields
                .iter()
                .map(|f| arrow_field(&f.name, f.id, f.required, &f.field_type))
                .collect::<Vec<_>>()
                .into(),
        ),
    }
}
