//! XML Schema Target
//!
//! Every record, list wrapper, map wrapper and restricted scalar becomes a
//! named global type; elements refer to types by name. Named records are
//! shared, so a type used in several places is emitted once.

use indexmap::IndexMap;
use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::structure::Scalar;
use crate::translate::{FieldId, RootRecord, Slot, TargetSystem};

const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
const UUID_PATTERN: &str = "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

static INVALID_NAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_.\-]").unwrap());

/// Make `name` a valid XML NCName
pub fn sanitize_name(name: &str) -> String {
    let mut sanitized = INVALID_NAME_CHARS.replace_all(name, "_").into_owned();
    let starts_ok = sanitized
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if !starts_ok {
        sanitized.insert(0, '_');
    }
    sanitized
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// =============================================================================
// Definitions
// =============================================================================

/// Reference to a built-in (`xs:`) or a named type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XsdType(pub String);

impl XsdType {
    fn builtin(name: &str) -> Self {
        Self(format!("xs:{}", name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_builtin(&self) -> bool {
        self.0.starts_with("xs:")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Facet {
    Enumeration(String),
    TotalDigits(u32),
    FractionDigits(u32),
    Length(u32),
    Pattern(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XsdElement {
    pub name: String,
    pub type_ref: XsdType,
    pub min_occurs: u32,
    /// `None` is `unbounded`
    pub max_occurs: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XsdAttribute {
    pub name: String,
    pub type_ref: XsdType,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XsdDefinition {
    Simple {
        base: XsdType,
        facets: Vec<Facet>,
    },
    Complex {
        sequence: Vec<XsdElement>,
        attributes: Vec<XsdAttribute>,
    },
}

// =============================================================================
// Target System
// =============================================================================

/// XSD translation target; collects named types as they are created
#[derive(Debug, Default)]
pub struct XsdTarget {
    target_namespace: Option<String>,
    types: IndexMap<String, XsdDefinition>,
    /// Scalar restrictions already defined, by restriction key
    restrictions: HashMap<String, XsdType>,
}

impl XsdTarget {
    pub fn new(target_namespace: Option<String>) -> Self {
        Self {
            target_namespace,
            types: IndexMap::new(),
            restrictions: HashMap::new(),
        }
    }

    /// Named types in creation order
    pub fn types(&self) -> &IndexMap<String, XsdDefinition> {
        &self.types
    }

    /// Register a new named type under a free, sanitized name
    fn define(&mut self, name: &str, definition: XsdDefinition) -> XsdType {
        let base = sanitize_name(name);
        let mut candidate = base.clone();
        let mut ordinal = 2;
        while self.types.contains_key(&candidate) {
            candidate = format!("{}_{}", base, ordinal);
            ordinal += 1;
        }
        self.types.insert(candidate.clone(), definition);
        XsdType(candidate)
    }

    /// Register a scalar restriction once; later uses share the definition
    fn restriction(&mut self, name: &str, base: &str, facets: Vec<Facet>) -> XsdType {
        if let Some(existing) = self.restrictions.get(name) {
            return existing.clone();
        }
        let defined = self.define(
            name,
            XsdDefinition::Simple {
                base: XsdType::builtin(base),
                facets,
            },
        );
        self.restrictions.insert(name.to_string(), defined.clone());
        defined
    }

    fn element(slot: Slot<XsdType>) -> XsdElement {
        XsdElement {
            name: sanitize_name(&slot.name),
            min_occurs: u32::from(slot.required),
            max_occurs: Some(1),
            type_ref: slot.ty,
        }
    }
}

impl TargetSystem for XsdTarget {
    type Type = XsdType;

    fn scalar(&mut self, scalar: &Scalar) -> XsdType {
        match *scalar {
            Scalar::Null => XsdType::builtin("string"),
            Scalar::Boolean => XsdType::builtin("boolean"),
            Scalar::String => XsdType::builtin("string"),
            Scalar::Int8 => XsdType::builtin("byte"),
            Scalar::Int16 => XsdType::builtin("short"),
            Scalar::Int32 => XsdType::builtin("int"),
            Scalar::Int64 => XsdType::builtin("long"),
            Scalar::Int128 => XsdType::builtin("integer"),
            Scalar::UInt8 => XsdType::builtin("unsignedByte"),
            Scalar::UInt16 => XsdType::builtin("unsignedShort"),
            Scalar::UInt32 => XsdType::builtin("unsignedInt"),
            Scalar::UInt64 => XsdType::builtin("unsignedLong"),
            Scalar::UInt128 => XsdType::builtin("nonNegativeInteger"),
            Scalar::Float8 => XsdType::builtin("float"),
            Scalar::Float32 => XsdType::builtin("float"),
            Scalar::Float64 => XsdType::builtin("double"),
            Scalar::Decimal { precision, scale } => {
                let precision = precision.max(1);
                let scale = scale.min(precision);
                self.restriction(
                    &format!("decimal_{}_{}", precision, scale),
                    "decimal",
                    vec![Facet::TotalDigits(precision), Facet::FractionDigits(scale)],
                )
            }
            Scalar::Binary { length: Some(length) } => {
                self.restriction(&format!("binary{}", length), "base64Binary", vec![Facet::Length(length)])
            }
            Scalar::Binary { length: None } => XsdType::builtin("base64Binary"),
            Scalar::Date => XsdType::builtin("date"),
            Scalar::Time => XsdType::builtin("time"),
            Scalar::DateTime => XsdType::builtin("dateTime"),
            Scalar::Timestamp => XsdType::builtin("dateTime"),
            Scalar::Duration => XsdType::builtin("duration"),
            Scalar::Uuid => self.restriction("uuid", "string", vec![Facet::Pattern(UUID_PATTERN.to_string())]),
            Scalar::Uri => XsdType::builtin("anyURI"),
            Scalar::JsonPointer => XsdType::builtin("string"),
            Scalar::Any => XsdType::builtin("anyType"),
        }
    }

    fn list(&mut self, name: &str, element: Slot<XsdType>) -> XsdType {
        let item = XsdElement {
            name: "item".to_string(),
            type_ref: element.ty,
            min_occurs: 0,
            max_occurs: None,
        };
        self.define(
            name,
            XsdDefinition::Complex {
                sequence: vec![item],
                attributes: Vec::new(),
            },
        )
    }

    fn map(&mut self, name: &str, _key: FieldId, value: Slot<XsdType>) -> XsdType {
        let entry = self.define(
            &format!("{}Entry", name),
            XsdDefinition::Complex {
                sequence: vec![XsdElement {
                    name: "value".to_string(),
                    min_occurs: u32::from(value.required),
                    max_occurs: Some(1),
                    type_ref: value.ty,
                }],
                attributes: vec![XsdAttribute {
                    name: "key".to_string(),
                    type_ref: XsdType::builtin("string"),
                    required: true,
                }],
            },
        );
        self.define(
            name,
            XsdDefinition::Complex {
                sequence: vec![XsdElement {
                    name: "entry".to_string(),
                    type_ref: entry,
                    min_occurs: 0,
                    max_occurs: None,
                }],
                attributes: Vec::new(),
            },
        )
    }

    fn record(&mut self, name: &str, fields: Vec<Slot<XsdType>>) -> XsdType {
        self.define(
            name,
            XsdDefinition::Complex {
                sequence: fields.into_iter().map(Self::element).collect(),
                attributes: Vec::new(),
            },
        )
    }

    fn enumeration(&mut self, name: &str, base: &Scalar, symbols: &[String]) -> XsdType {
        // Restricted scalars enumerate over their builtin base
        let base = match *base {
            Scalar::Decimal { .. } => XsdType::builtin("decimal"),
            Scalar::Binary { .. } => XsdType::builtin("base64Binary"),
            Scalar::Uuid => XsdType::builtin("string"),
            ref other => match self.scalar(other) {
                builtin if builtin.is_builtin() => builtin,
                _ => XsdType::builtin("string"),
            },
        };
        self.define(
            name,
            XsdDefinition::Simple {
                base,
                facets: symbols.iter().cloned().map(Facet::Enumeration).collect(),
            },
        )
    }

    fn shares_named_types(&self) -> bool {
        true
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Render the schema document: root element, root type, then every named
/// type in creation order.
pub fn render(root: &RootRecord<XsdType>, target: &XsdTarget) -> String {
    let mut output = String::new();
    output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    output.push_str(&format!("<xs:schema xmlns:xs=\"{}\"", XS_NAMESPACE));
    if let Some(ns) = &target.target_namespace {
        let ns = escape_attr(ns);
        output.push_str(&format!(" targetNamespace=\"{}\" xmlns=\"{}\"", ns, ns));
        output.push_str(" elementFormDefault=\"qualified\"");
    }
    output.push_str(">\n");

    let root_name = sanitize_name(&root.name);
    let mut root_type_name = root_name.clone();
    while target.types.contains_key(&root_type_name) {
        root_type_name.push_str("Root");
    }
    output.push_str(&format!(
        "  <xs:element name=\"{}\" type=\"{}\"/>\n",
        root_name, root_type_name
    ));

    let root_type = XsdDefinition::Complex {
        sequence: root.fields.iter().cloned().map(XsdTarget::element).collect(),
        attributes: Vec::new(),
    };
    render_definition(&mut output, &root_type_name, &root_type);
    for (name, definition) in &target.types {
        render_definition(&mut output, name, definition);
    }

    output.push_str("</xs:schema>\n");
    output
}

fn render_definition(output: &mut String, name: &str, definition: &XsdDefinition) {
    match definition {
        XsdDefinition::Simple { base, facets } => {
            output.push_str(&format!("  <xs:simpleType name=\"{}\">\n", name));
            output.push_str(&format!("    <xs:restriction base=\"{}\">\n", base.as_str()));
            for facet in facets {
                let (tag, value) = match facet {
                    Facet::Enumeration(symbol) => ("enumeration", escape_attr(symbol)),
                    Facet::TotalDigits(digits) => ("totalDigits", digits.to_string()),
                    Facet::FractionDigits(digits) => ("fractionDigits", digits.to_string()),
                    Facet::Length(length) => ("length", length.to_string()),
                    Facet::Pattern(pattern) => ("pattern", escape_attr(pattern)),
                };
                output.push_str(&format!("      <xs:{} value=\"{}\"/>\n", tag, value));
            }
            output.push_str("    </xs:restriction>\n");
            output.push_str("  </xs:simpleType>\n");
        }
        XsdDefinition::Complex { sequence, attributes } => {
            output.push_str(&format!("  <xs:complexType name=\"{}\">\n", name));
            output.push_str("    <xs:sequence>\n");
            for element in sequence {
                let max = match element.max_occurs {
                    Some(max) => max.to_string(),
                    None => "unbounded".to_string(),
                };
                output.push_str(&format!(
                    "      <xs:element name=\"{}\" type=\"{}\" minOccurs=\"{}\" maxOccurs=\"{}\"/>\n",
                    element.name,
                    element.type_ref.as_str(),
                    element.min_occurs,
                    max
                ));
            }
            output.push_str("    </xs:sequence>\n");
            for attribute in attributes {
                let usage = if attribute.required { "required" } else { "optional" };
                output.push_str(&format!(
                    "    <xs:attribute name=\"{}\" type=\"{}\" use=\"{}\"/>\n",
                    attribute.name,
                    attribute.type_ref.as_str(),
                    usage
                ));
            }
            output.push_str("  </xs:complexType>\n");
        }
    }
}

/// Render and return UTF-8 bytes
pub fn encode(root: &RootRecord<XsdType>, target: &XsdTarget) -> Vec<u8> {
    render(root, target).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: i32, name: &str, required: bool, ty: XsdType) -> Slot<XsdType> {
        Slot {
            id: FieldId(id),
            name: name.to_string(),
            required,
            ty,
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Order"), "Order");
        assert_eq!(sanitize_name("line items"), "line_items");
        assert_eq!(sanitize_name("1st"), "_1st");
        assert_eq!(sanitize_name("a:b"), "a_b");
    }

    #[test]
    fn test_scalar_restrictions_are_defined_once() {
        let mut target = XsdTarget::new(None);
        let a = target.scalar(&Scalar::Decimal { precision: 10, scale: 2 });
        let b = target.scalar(&Scalar::Decimal { precision: 10, scale: 2 });
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "decimal_10_2");
        target.scalar(&Scalar::Uuid);
        target.scalar(&Scalar::Uuid);
        assert_eq!(target.types().len(), 2);
        assert_eq!(target.scalar(&Scalar::Duration).as_str(), "xs:duration");
    }

    #[test]
    fn test_restriction_does_not_alias_record() {
        let mut target = XsdTarget::new(None);
        let record = target.record("uuid", vec![slot(1, "x", true, XsdType::builtin("int"))]);
        let uuid = target.scalar(&Scalar::Uuid);
        assert_ne!(record, uuid);
        assert_eq!(uuid.as_str(), "uuid_2");
    }

    #[test]
    fn test_define_dedupes_sanitized_names() {
        let mut target = XsdTarget::new(None);
        let a = target.record("a b", vec![slot(1, "x", true, XsdType::builtin("int"))]);
        let b = target.record("a_b", vec![slot(2, "y", true, XsdType::builtin("int"))]);
        assert_eq!(a.as_str(), "a_b");
        assert_eq!(b.as_str(), "a_b_2");
    }

    #[test]
    fn test_enumeration_uses_builtin_base() {
        let mut target = XsdTarget::new(None);
        let symbols = ["1.5".to_string(), "2.5".to_string()];
        let rates = target.enumeration("Rate", &Scalar::Decimal { precision: 4, scale: 1 }, &symbols);
        assert_eq!(rates.as_str(), "Rate");
        assert_eq!(target.types().len(), 1);
        match &target.types()["Rate"] {
            XsdDefinition::Simple { base, facets } => {
                assert_eq!(base.as_str(), "xs:decimal");
                assert_eq!(facets.len(), 2);
            }
            other => panic!("Expected simple type, got {:?}", other),
        }
    }

    #[test]
    fn test_root_type_avoids_named_type() {
        let mut target = XsdTarget::new(None);
        target.record("Order", vec![slot(2, "x", true, XsdType::builtin("int"))]);
        let root = RootRecord {
            name: "Order".to_string(),
            namespace: String::new(),
            fields: vec![slot(1, "id", true, XsdType::builtin("string"))],
        };
        let xsd = render(&root, &target);
        assert!(xsd.contains("<xs:element name=\"Order\" type=\"OrderRoot\"/>"));
        assert_eq!(xsd.matches("<xs:complexType name=\"Order\">").count(), 1);
    }

    #[test]
    fn test_render_document() {
        let mut target = XsdTarget::new(Some("urn:example:shop".to_string()));
        let tags = target.list("OrderTagsList", slot(3, "element", true, XsdType::builtin("string")));
        let attrs = target.map("OrderAttrsMap", FieldId(5), slot(6, "value", false, XsdType::builtin("double")));
        let status = target.enumeration("Status", &Scalar::String, &["open".to_string(), "a&b".to_string()]);
        let root = RootRecord {
            name: "Order".to_string(),
            namespace: "shop".to_string(),
            fields: vec![
                slot(1, "id", true, XsdType::builtin("string")),
                slot(2, "tags", true, tags),
                slot(4, "attrs", false, attrs),
                slot(7, "status", false, status),
            ],
        };

        let xsd = render(&root, &target);
        assert!(xsd.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n"));
        assert!(xsd.contains("targetNamespace=\"urn:example:shop\" xmlns=\"urn:example:shop\""));
        assert!(xsd.contains("<xs:element name=\"Order\" type=\"Order\"/>"));
        assert!(xsd.contains("<xs:element name=\"id\" type=\"xs:string\" minOccurs=\"1\" maxOccurs=\"1\"/>"));
        assert!(xsd.contains("<xs:element name=\"item\" type=\"xs:string\" minOccurs=\"0\" maxOccurs=\"unbounded\"/>"));
        assert!(xsd.contains("<xs:complexType name=\"OrderAttrsMapEntry\">"));
        assert!(xsd.contains("<xs:attribute name=\"key\" type=\"xs:string\" use=\"required\"/>"));
        assert!(xsd.contains("<xs:enumeration value=\"a&amp;b\"/>"));
        assert!(xsd.ends_with("</xs:schema>\n"));

        // Root type first, then named types in creation order
        let order = xsd.find("complexType name=\"Order\"").unwrap();
        let list = xsd.find("complexType name=\"OrderTagsList\"").unwrap();
        let entry = xsd.find("complexType name=\"OrderAttrsMapEntry\"").unwrap();
        assert!(order < list && list < entry);
    }
}
