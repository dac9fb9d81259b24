//! Named-Type Cache
//!
//! One recursive pass records every named type under its fully-qualified
//! name so bare type-name strings can be resolved. `definitions` entries
//! that are not types themselves are namespaces and are flattened into
//! dotted prefixes.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::qualify;

/// A cached named type and the document it lives in
#[derive(Debug, Clone, Copy)]
pub struct NamedEntry<'a> {
    pub node: &'a Value,
    pub document: &'a Value,
}

/// Fully-qualified name → schema node
#[derive(Debug, Default)]
pub struct NamedTypeCache<'a> {
    types: IndexMap<String, NamedEntry<'a>>,
}

impl<'a> NamedTypeCache<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record all named types of a document. Re-registering a name keeps
    /// the last node seen.
    pub fn cache(&mut self, document: &'a Value) {
        self.walk(document, "", document);
    }

    /// Exact lookup by fully-qualified name
    pub fn lookup(&self, fullname: &str) -> Option<&NamedEntry<'a>> {
        self.types.get(fullname)
    }

    /// Resolve a bare name as written inside `namespace`: first relative to
    /// the namespace and its parents, then as an absolute name. Returns the
    /// fully-qualified name that matched.
    pub fn resolve_name(&self, name: &str, namespace: &str) -> Option<(&str, &NamedEntry<'a>)> {
        let mut scope = namespace;
        while !scope.is_empty() {
            if let Some((fullname, entry)) = self.types.get_key_value(&qualify(scope, name)) {
                return Some((fullname.as_str(), entry));
            }
            scope = scope.rsplit_once('.').map(|(parent, _)| parent).unwrap_or("");
        }
        self.types
            .get_key_value(name)
            .map(|(fullname, entry)| (fullname.as_str(), entry))
    }

    /// Registered names in discovery order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    fn record(&mut self, fullname: String, node: &'a Value, document: &'a Value) {
        tracing::trace!(name = %fullname, "cached named type");
        self.types.insert(fullname, NamedEntry { node, document });
    }

    fn walk(&mut self, node: &'a Value, namespace: &str, document: &'a Value) {
        let map = match node {
            Value::Object(map) => map,
            Value::Array(items) => {
                // Top-level list of schema documents, or a union of types
                for item in items {
                    let doc = if std::ptr::eq(node, document) { item } else { document };
                    self.walk(item, namespace, doc);
                }
                return;
            }
            _ => return,
        };

        let namespace = map
            .get("namespace")
            .and_then(|v| v.as_str())
            .unwrap_or(namespace)
            .to_string();

        if let Some(name) = map.get("name").and_then(|v| v.as_str()) {
            self.record(qualify(&namespace, name), node, document);
        }

        if let Some(defs) = map.get("definitions").and_then(|v| v.as_object()) {
            self.walk_definitions(defs, &namespace, document);
        }
        if let Some(props) = map.get("properties").and_then(|v| v.as_object()) {
            for prop in props.values() {
                self.walk(prop, &namespace, document);
            }
        }
        for key in ["items", "values", "elements", "type"] {
            if let Some(child) = map.get(key) {
                self.walk(child, &namespace, document);
            }
        }
        match map.get("choices") {
            Some(Value::Object(choices)) => {
                for choice in choices.values() {
                    self.walk(choice, &namespace, document);
                }
            }
            Some(choices @ Value::Array(_)) => self.walk(choices, &namespace, document),
            _ => {}
        }
    }

    fn walk_definitions(&mut self, defs: &'a Map<String, Value>, namespace: &str, document: &'a Value) {
        for (key, entry) in defs {
            let Some(entry_map) = entry.as_object() else {
                continue;
            };
            if is_type_definition(entry_map) {
                let name = entry_map.get("name").and_then(|v| v.as_str()).unwrap_or(key);
                let ns = entry_map
                    .get("namespace")
                    .and_then(|v| v.as_str())
                    .unwrap_or(namespace);
                self.record(qualify(ns, name), entry, document);
                self.walk(entry, namespace, document);
            } else {
                self.walk_definitions(entry_map, &qualify(namespace, key), document);
            }
        }
    }
}

/// A `definitions` entry is a type when it says what it is; otherwise it
/// is a namespace container.
fn is_type_definition(entry: &Map<String, Value>) -> bool {
    ["type", "oneOf", "allOf", "$ref"].iter().any(|k| entry.contains_key(*k))
}
