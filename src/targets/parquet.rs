//! Apache Parquet Target
//!
//! The translated tree is an Arrow schema; the emitted artifact is a
//! zero-row Parquet file written through `ArrowWriter`, so the file footer
//! carries the physical schema.

use std::collections::HashMap;
use std::sync::Arc;

use arrow_schema::{DataType, Field, Fields, Schema, TimeUnit};
use parquet::arrow::ArrowWriter;

use crate::error::Result;
use crate::structure::Scalar;
use crate::translate::{FieldId, RootRecord, Slot, TargetSystem};

/// Largest precision of a 128-bit decimal
const DECIMAL128_MAX_PRECISION: u32 = 38;
/// Largest precision of a 256-bit decimal
const DECIMAL256_MAX_PRECISION: u32 = 76;

/// Parquet translation target
#[derive(Debug, Default)]
pub struct ParquetTarget;

impl ParquetTarget {
    pub fn new() -> Self {
        Self
    }
}

fn utc() -> Option<Arc<str>> {
    Some(Arc::from("UTC"))
}

fn decimal(precision: u32, scale: u32) -> DataType {
    let precision = precision.clamp(1, DECIMAL256_MAX_PRECISION);
    let scale = scale.min(precision) as i8;
    if precision <= DECIMAL128_MAX_PRECISION {
        DataType::Decimal128(precision as u8, scale)
    } else {
        DataType::Decimal256(precision as u8, scale)
    }
}

fn field(slot: Slot<DataType>) -> Field {
    Field::new(slot.name, slot.ty, !slot.required)
}

impl TargetSystem for ParquetTarget {
    type Type = DataType;

    fn scalar(&mut self, scalar: &Scalar) -> DataType {
        match *scalar {
            Scalar::Null => DataType::Utf8,
            Scalar::Boolean => DataType::Boolean,
            Scalar::String => DataType::Utf8,
            Scalar::Int8 => DataType::Int8,
            Scalar::Int16 => DataType::Int16,
            Scalar::Int32 => DataType::Int32,
            Scalar::Int64 => DataType::Int64,
            Scalar::Int128 => decimal(38, 0),
            Scalar::UInt8 => DataType::UInt8,
            Scalar::UInt16 => DataType::UInt16,
            Scalar::UInt32 => DataType::UInt32,
            Scalar::UInt64 => DataType::UInt64,
            Scalar::UInt128 => decimal(39, 0),
            Scalar::Float8 => DataType::Float32,
            Scalar::Float32 => DataType::Float32,
            Scalar::Float64 => DataType::Float64,
            Scalar::Decimal { precision, scale } => decimal(precision, scale),
            Scalar::Binary { length: Some(length) } => DataType::FixedSizeBinary(length as i32),
            Scalar::Binary { length: None } => DataType::Binary,
            Scalar::Date => DataType::Date32,
            Scalar::Time => DataType::Time64(TimeUnit::Microsecond),
            Scalar::DateTime => DataType::Timestamp(TimeUnit::Microsecond, utc()),
            Scalar::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, utc()),
            // Microseconds
            Scalar::Duration => DataType::Int64,
            Scalar::Uuid => DataType::Utf8,
            Scalar::Uri => DataType::Utf8,
            Scalar::JsonPointer => DataType::Utf8,
            Scalar::Any => DataType::Utf8,
        }
    }

    fn list(&mut self, _name: &str, element: Slot<DataType>) -> DataType {
        DataType::List(Arc::new(field(element)))
    }

    fn map(&mut self, _name: &str, _key: FieldId, value: Slot<DataType>) -> DataType {
        let entries = Fields::from(vec![Field::new("key", DataType::Utf8, false), field(value)]);
        DataType::Map(Arc::new(Field::new("key_value", DataType::Struct(entries), false)), false)
    }

    fn record(&mut self, _name: &str, fields: Vec<Slot<DataType>>) -> DataType {
        DataType::Struct(fields.into_iter().map(field).collect::<Vec<_>>().into())
    }

    fn enumeration(&mut self, _name: &str, base: &Scalar, _symbols: &[String]) -> DataType {
        self.scalar(base)
    }
}

/// Arrow schema of the root record
pub fn arrow_schema(root: &RootRecord<DataType>) -> Schema {
    let fields: Vec<Field> = root.fields.iter().cloned().map(field).collect();
    Schema::new(fields).with_metadata(HashMap::from([(
        "structure.record".to_string(),
        root.fullname(),
    )]))
}

/// Encode the root record as a zero-row Parquet file
pub fn encode(root: &RootRecord<DataType>) -> Result<Vec<u8>> {
    let schema = Arc::new(arrow_schema(root));
    let mut bytes = Vec::new();
    let writer = ArrowWriter::try_new(&mut bytes, schema, None)?;
    writer.close()?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use std::io::Write;

    fn slot(id: i32, name: &str, required: bool, ty: DataType) -> Slot<DataType> {
        Slot {
            id: FieldId(id),
            name: name.to_string(),
            required,
            ty,
        }
    }

    #[test]
    fn test_scalar_table() {
        let mut target = ParquetTarget::new();
        assert_eq!(target.scalar(&Scalar::UInt16), DataType::UInt16);
        assert_eq!(target.scalar(&Scalar::Int128), DataType::Decimal128(38, 0));
        assert_eq!(target.scalar(&Scalar::UInt128), DataType::Decimal256(39, 0));
        assert_eq!(
            target.scalar(&Scalar::Decimal { precision: 50, scale: 10 }),
            DataType::Decimal256(50, 10)
        );
        assert_eq!(
            target.scalar(&Scalar::Decimal { precision: 12, scale: 4 }),
            DataType::Decimal128(12, 4)
        );
        assert_eq!(target.scalar(&Scalar::Binary { length: Some(8) }), DataType::FixedSizeBinary(8));
        assert_eq!(target.scalar(&Scalar::Duration), DataType::Int64);
        assert_eq!(target.fallback(), DataType::Utf8);
    }

    #[test]
    fn test_map_and_list_shapes() {
        let mut target = ParquetTarget::new();
        let list = target.list("L", slot(2, "element", false, DataType::Int32));
        match &list {
            DataType::List(element) => {
                assert_eq!(element.name(), "element");
                assert!(element.is_nullable());
            }
            other => panic!("Expected list, got {:?}", other),
        }

        let map = target.map("M", FieldId(3), slot(4, "value", true, DataType::Float64));
        match &map {
            DataType::Map(entries, false) => match entries.data_type() {
                DataType::Struct(fields) => {
                    assert_eq!(fields[0].name(), "key");
                    assert!(!fields[0].is_nullable());
                    assert!(!fields[1].is_nullable());
                }
                other => panic!("Expected entries struct, got {:?}", other),
            },
            other => panic!("Expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_row_file() {
        let mut target = ParquetTarget::new();
        let point = target.record(
            "Point",
            vec![slot(3, "x", true, DataType::Float64), slot(4, "y", true, DataType::Float64)],
        );
        let root = RootRecord {
            name: "Shape".to_string(),
            namespace: "geo".to_string(),
            fields: vec![
                slot(1, "id", true, DataType::Utf8),
                slot(2, "origin", false, point),
            ],
        };

        let bytes = encode(&root).unwrap();
        assert_eq!(&bytes[..4], b"PAR1");

        let mut file = tempfile::tempfile().unwrap();
        file.write_all(&bytes).unwrap();
        let reader = SerializedFileReader::new(file).unwrap();
        let metadata = reader.metadata().file_metadata();
        assert_eq!(metadata.num_rows(), 0);
        // id, origin.x, origin.y
        assert_eq!(metadata.schema_descr().num_columns(), 3);
    }
}
