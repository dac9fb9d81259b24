//! Structure Schema Model
//!
//! JSON Structure documents overload plain JSON objects for every kind of
//! type. `StructureNode::classify` is the one place that inspects raw keys;
//! everything downstream matches on the closed `StructureNode` variant.
//!
//! Child schemas stay borrowed as `&Value` and are classified lazily when
//! the translator descends into them.

pub mod diagnostics;
pub mod loader;
pub mod named;
pub mod resolver;
pub mod root;

pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use loader::{load_document, DocumentSet};
pub use named::{NamedEntry, NamedTypeCache};
pub use resolver::{Resolved, SchemaResolver};
pub use root::{select_root, RootSelection};

use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Precision used for `decimal` when the schema does not declare one
pub const DEFAULT_DECIMAL_PRECISION: u32 = 38;
/// Scale used for `decimal` when the schema does not declare one
pub const DEFAULT_DECIMAL_SCALE: u32 = 18;

// =============================================================================
// Scalars
// =============================================================================

/// Scalar vocabulary of the Structure schema language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Null,
    Boolean,
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    UInt128,
    Float8,
    Float32,
    Float64,
    Decimal { precision: u32, scale: u32 },
    /// Binary data; `length` is set when the schema declares `byteLength`
    Binary { length: Option<u32> },
    Date,
    Time,
    DateTime,
    Timestamp,
    Duration,
    Uuid,
    Uri,
    JsonPointer,
    Any,
}

impl Scalar {
    /// Parse a scalar type name. `node` carries type parameters
    /// (`precision`, `scale`, `byteLength`) when the name came from a
    /// schema object rather than a bare string.
    pub fn parse(name: &str, node: Option<&Map<String, Value>>) -> Option<Self> {
        let scalar = match name {
            "null" => Self::Null,
            "boolean" => Self::Boolean,
            "string" => Self::String,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" | "integer" => Self::Int32,
            "int64" => Self::Int64,
            "int128" => Self::Int128,
            "uint8" => Self::UInt8,
            "uint16" => Self::UInt16,
            "uint32" => Self::UInt32,
            "uint64" => Self::UInt64,
            "uint128" => Self::UInt128,
            "float8" => Self::Float8,
            "float" | "float32" | "binary32" => Self::Float32,
            "double" | "float64" | "binary64" | "number" => Self::Float64,
            "decimal" => Self::Decimal {
                precision: node
                    .and_then(|n| numeric_param(n, "precision"))
                    .unwrap_or(DEFAULT_DECIMAL_PRECISION),
                scale: node
                    .and_then(|n| numeric_param(n, "scale"))
                    .unwrap_or(DEFAULT_DECIMAL_SCALE),
            },
            "binary" | "bytes" => Self::Binary {
                length: node.and_then(|n| numeric_param(n, "byteLength")),
            },
            "date" => Self::Date,
            "time" => Self::Time,
            "datetime" => Self::DateTime,
            "timestamp" => Self::Timestamp,
            "duration" => Self::Duration,
            "uuid" => Self::Uuid,
            "uri" => Self::Uri,
            "jsonpointer" => Self::JsonPointer,
            "any" => Self::Any,
            _ => return None,
        };
        Some(scalar)
    }

    /// Canonical vocabulary name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Int128 => "int128",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::UInt128 => "uint128",
            Self::Float8 => "float8",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Decimal { .. } => "decimal",
            Self::Binary { .. } => "binary",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
            Self::Duration => "duration",
            Self::Uuid => "uuid",
            Self::Uri => "uri",
            Self::JsonPointer => "jsonpointer",
            Self::Any => "any",
        }
    }
}

/// Precision/scale may be written as numbers or numeric strings
fn numeric_param(node: &Map<String, Value>, key: &str) -> Option<u32> {
    match node.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// =============================================================================
// References
// =============================================================================

/// A reference to another schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    /// `$ref` pointer: `#/definitions/X` or an `$id` URI
    Pointer(&'a str),
    /// Bare type name used in place of a pointer (legacy inputs)
    ByName(&'a str),
}

impl<'a> Reference<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Pointer(p) => p,
            Self::ByName(n) => n,
        }
    }
}

/// Namespace and local name of a type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeName {
    pub namespace: String,
    pub name: String,
}

impl TypeName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Split a dotted full name at its last dot
    pub fn from_fullname(fullname: &str) -> Self {
        match fullname.rsplit_once('.') {
            Some((ns, name)) => Self::new(ns, name),
            None => Self::new("", fullname),
        }
    }

    /// Derive a name from the pointer that reached a type:
    /// `#/definitions/shop/Order` gives `shop.Order`, a URI gives its last
    /// path segment without extension.
    pub fn from_pointer(pointer: &str) -> Option<Self> {
        let (base, fragment) = match pointer.split_once('#') {
            Some((base, fragment)) => (base, fragment),
            None => (pointer, ""),
        };

        if !fragment.is_empty() {
            let segments: Vec<String> = fragment
                .split('/')
                .filter(|s| !s.is_empty())
                .map(unescape_pointer_segment)
                .collect();
            let (name, parents) = segments.split_last()?;
            let namespace_start = parents
                .iter()
                .rposition(|s| s == "definitions" || s == "$defs")
                .map(|i| i + 1)
                .unwrap_or(parents.len());
            return Some(Self::new(parents[namespace_start..].join("."), name.clone()));
        }

        let last = base.trim_end_matches('/').rsplit('/').next()?;
        let stem = last.split('.').next().unwrap_or(last);
        if stem.is_empty() {
            None
        } else {
            Some(Self::new("", stem))
        }
    }

    /// `namespace.name`, or bare `name` when the namespace is empty
    pub fn fullname(&self) -> String {
        qualify(&self.namespace, &self.name)
    }
}

/// Join a namespace and a name into a fully-qualified name
pub fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

/// Decode `~1` and `~0` escapes of a JSON pointer segment
pub fn unescape_pointer_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

// =============================================================================
// Structure Node
// =============================================================================

/// Object (record) type
#[derive(Debug, Clone)]
pub struct ObjectNode<'a> {
    pub name: Option<&'a str>,
    pub namespace: Option<&'a str>,
    /// Properties in declaration order
    pub properties: Vec<(&'a str, &'a Value)>,
    pub required: BTreeSet<&'a str>,
    /// `$extends` pointers in inheritance order
    pub extends: Vec<&'a str>,
}

/// Tuple type
#[derive(Debug, Clone)]
pub struct TupleNode<'a> {
    pub name: Option<&'a str>,
    /// Slots in positional order
    pub slots: Vec<TupleSlot<'a>>,
    /// Names listed in `tuple` that have no property
    pub missing: Vec<&'a str>,
}

#[derive(Debug, Clone)]
pub struct TupleSlot<'a> {
    /// Declared slot name, absent for `items`-style tuples
    pub name: Option<&'a str>,
    pub schema: &'a Value,
}

/// Alternatives of a choice
#[derive(Debug, Clone)]
pub enum Choices<'a> {
    /// `choices: {tag: schema}` in declaration order
    Tagged(Vec<(&'a str, &'a Value)>),
    /// `choices: [schema, ...]`
    Untagged(Vec<&'a Value>),
}

#[derive(Debug, Clone)]
pub struct ChoiceNode<'a> {
    pub name: Option<&'a str>,
    pub namespace: Option<&'a str>,
    pub choices: Choices<'a>,
}

#[derive(Debug, Clone)]
pub struct EnumNode<'a> {
    pub name: Option<&'a str>,
    pub namespace: Option<&'a str>,
    /// Scalar type of the symbols (string unless declared otherwise)
    pub base: Scalar,
    pub symbols: Vec<String>,
}

/// Classified source schema node
#[derive(Debug, Clone)]
pub enum StructureNode<'a> {
    Scalar(Scalar),
    Object(ObjectNode<'a>),
    Array { items: Option<&'a Value> },
    Set { items: Option<&'a Value> },
    Map { values: Option<&'a Value> },
    Tuple(TupleNode<'a>),
    Choice(ChoiceNode<'a>),
    Enum(EnumNode<'a>),
    /// `["null", "string"]`-style array of types
    Union(Vec<&'a Value>),
    Reference(Reference<'a>),
    /// Anything the translator cannot interpret, with a short description
    Unknown(String),
}

impl<'a> StructureNode<'a> {
    /// Classify a raw JSON value into a `StructureNode`
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(type_name) => classify_type_name(type_name, None),
            Value::Array(members) => Self::Union(members.iter().collect()),
            Value::Object(map) => classify_object(map),
            other => Self::Unknown(format!("literal {}", other)),
        }
    }

    /// True for the `null` scalar, used to partition union members
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    /// Short kind label for diagnostics and synthesized names
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.name(),
            Self::Object(_) => "object",
            Self::Array { .. } => "array",
            Self::Set { .. } => "set",
            Self::Map { .. } => "map",
            Self::Tuple(_) => "tuple",
            Self::Choice(_) => "choice",
            Self::Enum(_) => "enum",
            Self::Union(_) => "union",
            Self::Reference(_) => "ref",
            Self::Unknown(_) => "unknown",
        }
    }
}

fn classify_type_name<'a>(type_name: &'a str, node: Option<&'a Map<String, Value>>) -> StructureNode<'a> {
    if let Some(map) = node {
        if let Some(symbols) = map.get("enum").and_then(|v| v.as_array()) {
            return StructureNode::Enum(enum_node(map, symbols, Scalar::parse(type_name, node)));
        }
        match type_name {
            "object" => return StructureNode::Object(object_node(map)),
            "array" => return StructureNode::Array { items: map.get("items") },
            "set" => return StructureNode::Set { items: map.get("items") },
            "map" => return StructureNode::Map { values: map.get("values") },
            "tuple" => return StructureNode::Tuple(tuple_node(map)),
            "choice" => {
                return match choice_node(map) {
                    Some(choice) => StructureNode::Choice(choice),
                    None => StructureNode::Unknown("choice without choices".to_string()),
                }
            }
            _ => {}
        }
    }

    if let Some(scalar) = Scalar::parse(type_name, node) {
        return StructureNode::Scalar(scalar);
    }

    match type_name {
        "object" | "array" | "set" | "map" | "tuple" | "choice" => {
            // Compound kinds named as bare strings carry no structure
            StructureNode::Unknown(format!("bare '{}' without a schema", type_name))
        }
        _ => StructureNode::Reference(Reference::ByName(type_name)),
    }
}

fn classify_object(map: &Map<String, Value>) -> StructureNode<'_> {
    if let Some(pointer) = map.get("$ref").and_then(|v| v.as_str()) {
        return StructureNode::Reference(Reference::Pointer(pointer));
    }

    match map.get("type") {
        Some(Value::String(type_name)) => classify_type_name(type_name, Some(map)),
        Some(Value::Array(members)) => StructureNode::Union(members.iter().collect()),
        Some(inner @ Value::Object(_)) => StructureNode::classify(inner),
        Some(other) => StructureNode::Unknown(format!("type {}", other)),
        None => {
            if let Some(symbols) = map.get("enum").and_then(|v| v.as_array()) {
                StructureNode::Enum(enum_node(map, symbols, None))
            } else if map.get("properties").map(|p| p.is_object()).unwrap_or(false) {
                StructureNode::Object(object_node(map))
            } else {
                StructureNode::Unknown("schema without type".to_string())
            }
        }
    }
}

fn str_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(|v| v.as_str())
}

fn object_node(map: &Map<String, Value>) -> ObjectNode<'_> {
    let properties = map
        .get("properties")
        .and_then(|v| v.as_object())
        .map(|props| props.iter().map(|(k, v)| (k.as_str(), v)).collect())
        .unwrap_or_default();

    // `required` is a list of names, or a list of alternative name lists
    let mut required = BTreeSet::new();
    if let Some(list) = map.get("required").and_then(|v| v.as_array()) {
        for entry in list {
            match entry {
                Value::String(name) => {
                    required.insert(name.as_str());
                }
                Value::Array(group) => {
                    required.extend(group.iter().filter_map(|v| v.as_str()));
                }
                _ => {}
            }
        }
    }

    let extends = match map.get("$extends") {
        Some(Value::String(pointer)) => vec![pointer.as_str()],
        Some(Value::Array(pointers)) => pointers.iter().filter_map(|v| v.as_str()).collect(),
        _ => Vec::new(),
    };

    ObjectNode {
        name: str_key(map, "name"),
        namespace: str_key(map, "namespace"),
        properties,
        required,
        extends,
    }
}

fn tuple_node(map: &Map<String, Value>) -> TupleNode<'_> {
    let properties = map.get("properties").and_then(|v| v.as_object());
    let mut slots = Vec::new();
    let mut missing = Vec::new();

    if let Some(order) = map.get("tuple").and_then(|v| v.as_array()) {
        for name in order.iter().filter_map(|v| v.as_str()) {
            match properties.and_then(|p| p.get(name)) {
                Some(schema) => slots.push(TupleSlot { name: Some(name), schema }),
                None => missing.push(name),
            }
        }
    } else if let Some(props) = properties {
        slots.extend(props.iter().map(|(k, v)| TupleSlot { name: Some(k.as_str()), schema: v }));
    } else if let Some(items) = map.get("items").and_then(|v| v.as_array()) {
        slots.extend(items.iter().map(|schema| TupleSlot { name: None, schema }));
    }

    TupleNode {
        name: str_key(map, "name"),
        slots,
        missing,
    }
}

fn choice_node(map: &Map<String, Value>) -> Option<ChoiceNode<'_>> {
    let choices = match map.get("choices")? {
        Value::Object(tagged) => Choices::Tagged(tagged.iter().map(|(k, v)| (k.as_str(), v)).collect()),
        Value::Array(untagged) => Choices::Untagged(untagged.iter().collect()),
        _ => return None,
    };
    Some(ChoiceNode {
        name: str_key(map, "name"),
        namespace: str_key(map, "namespace"),
        choices,
    })
}

fn enum_node<'a>(map: &'a Map<String, Value>, symbols: &'a [Value], base: Option<Scalar>) -> EnumNode<'a> {
    let symbols = symbols
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();
    EnumNode {
        name: str_key(map, "name"),
        namespace: str_key(map, "namespace"),
        base: base.unwrap_or(Scalar::String),
        symbols,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_scalars() {
        let v = json!("int32");
        assert!(matches!(StructureNode::classify(&v), StructureNode::Scalar(Scalar::Int32)));

        let v = json!({"type": "decimal", "precision": 10, "scale": "2"});
        match StructureNode::classify(&v) {
            StructureNode::Scalar(Scalar::Decimal { precision, scale }) => {
                assert_eq!((precision, scale), (10, 2));
            }
            other => panic!("Expected decimal, got {:?}", other),
        }

        let v = json!({"type": "decimal"});
        assert!(matches!(
            StructureNode::classify(&v),
            StructureNode::Scalar(Scalar::Decimal { precision: 38, scale: 18 })
        ));

        let v = json!({"type": "binary", "byteLength": 16});
        assert!(matches!(
            StructureNode::classify(&v),
            StructureNode::Scalar(Scalar::Binary { length: Some(16) })
        ));
    }

    #[test]
    fn test_classify_object_preserves_order() {
        let v = json!({
            "type": "object",
            "name": "T",
            "properties": {"z": {"type": "string"}, "a": {"type": "int32"}, "m": {"type": "boolean"}},
            "required": ["z", ["a", "m"]],
            "$extends": "#/definitions/Base"
        });
        match StructureNode::classify(&v) {
            StructureNode::Object(obj) => {
                let names: Vec<_> = obj.properties.iter().map(|(k, _)| *k).collect();
                assert_eq!(names, vec!["z", "a", "m"]);
                assert_eq!(obj.required.len(), 3);
                assert_eq!(obj.extends, vec!["#/definitions/Base"]);
                assert_eq!(obj.name, Some("T"));
            }
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_references() {
        let v = json!({"$ref": "#/definitions/A"});
        assert!(matches!(
            StructureNode::classify(&v),
            StructureNode::Reference(Reference::Pointer("#/definitions/A"))
        ));

        let v = json!({"type": {"$ref": "#/definitions/A"}});
        assert!(matches!(
            StructureNode::classify(&v),
            StructureNode::Reference(Reference::Pointer("#/definitions/A"))
        ));

        let v = json!("shop.Customer");
        assert!(matches!(
            StructureNode::classify(&v),
            StructureNode::Reference(Reference::ByName("shop.Customer"))
        ));
    }

    #[test]
    fn test_classify_unions_and_choices() {
        let v = json!({"type": ["null", "string"]});
        match StructureNode::classify(&v) {
            StructureNode::Union(members) => {
                assert_eq!(members.len(), 2);
                assert!(StructureNode::classify(members[0]).is_null());
            }
            other => panic!("Expected union, got {:?}", other),
        }

        let v = json!({"type": "choice", "choices": {"card": {"type": "string"}, "cash": {"type": "int32"}}});
        match StructureNode::classify(&v) {
            StructureNode::Choice(ChoiceNode { choices: Choices::Tagged(tags), .. }) => {
                let tags: Vec<_> = tags.iter().map(|(t, _)| *t).collect();
                assert_eq!(tags, vec!["card", "cash"]);
            }
            other => panic!("Expected tagged choice, got {:?}", other),
        }

        let v = json!({"type": "choice"});
        assert!(matches!(StructureNode::classify(&v), StructureNode::Unknown(_)));
    }

    #[test]
    fn test_classify_enum_and_tuple() {
        let v = json!({"type": "string", "enum": ["a", "b"], "name": "Letter"});
        match StructureNode::classify(&v) {
            StructureNode::Enum(e) => {
                assert_eq!(e.symbols, vec!["a", "b"]);
                assert_eq!(e.base, Scalar::String);
                assert_eq!(e.name, Some("Letter"));
            }
            other => panic!("Expected enum, got {:?}", other),
        }

        let v = json!({
            "type": "tuple",
            "properties": {"y": {"type": "double"}, "x": {"type": "double"}},
            "tuple": ["x", "y", "z"]
        });
        match StructureNode::classify(&v) {
            StructureNode::Tuple(t) => {
                let names: Vec<_> = t.slots.iter().map(|s| s.name.unwrap()).collect();
                assert_eq!(names, vec!["x", "y"]);
                assert_eq!(t.missing, vec!["z"]);
            }
            other => panic!("Expected tuple, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_unknown() {
        assert!(matches!(StructureNode::classify(&json!(42)), StructureNode::Unknown(_)));
        assert!(matches!(StructureNode::classify(&json!({"description": "x"})), StructureNode::Unknown(_)));
        assert!(matches!(StructureNode::classify(&json!("array")), StructureNode::Unknown(_)));
    }

    #[test]
    fn test_type_name_from_pointer() {
        assert_eq!(
            TypeName::from_pointer("#/definitions/shop/orders/Order"),
            Some(TypeName::new("shop.orders", "Order"))
        );
        assert_eq!(TypeName::from_pointer("#/definitions/Order"), Some(TypeName::new("", "Order")));
        assert_eq!(
            TypeName::from_pointer("https://example.com/schemas/Address.struct.json"),
            Some(TypeName::new("", "Address"))
        );
        assert_eq!(TypeName::from_fullname("a.b.C").fullname(), "a.b.C");
        assert_eq!(qualify("", "C"), "C");
    }
}
