//! Reference Resolution
//!
//! Indexes every `$id`-tagged node of the registered documents and resolves
//! `$ref`, `$root` and `$extends` pointers to schema nodes. Resolution never
//! touches the network or the file system: a pointer that names nothing
//! registered fails with `unknown id`.

use serde_json::Value;
use std::collections::HashMap;
use url::Url;

use super::unescape_pointer_segment;
use crate::error::{ConvertError, ResolutionFailure, Result};

/// A resolved pointer: the node plus the document that owns it.
///
/// Local `#/` pointers found inside `node` resolve against `document`.
#[derive(Debug, Clone, Copy)]
pub struct Resolved<'a> {
    pub node: &'a Value,
    pub document: &'a Value,
}

/// Registry of `$id`-addressed nodes across one or more documents
#[derive(Debug, Default)]
pub struct SchemaResolver<'a> {
    documents: Vec<&'a Value>,
    registry: HashMap<String, Resolved<'a>>,
    root_base: Option<Url>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document. The first registered document is the root
    /// document used for local pointers without context.
    pub fn register(&mut self, document: &'a Value) {
        if self.documents.is_empty() {
            self.root_base = document
                .get("$id")
                .and_then(|v| v.as_str())
                .and_then(|id| Url::parse(id).ok());
        }
        self.documents.push(document);
        self.walk(document, document, None);
    }

    /// The first registered document
    pub fn root_document(&self) -> Option<&'a Value> {
        self.documents.first().copied()
    }

    /// All registered documents in registration order
    pub fn documents(&self) -> &[&'a Value] {
        &self.documents
    }

    /// Number of registered `$id`s
    pub fn id_count(&self) -> usize {
        self.registry.len()
    }

    /// Resolve a pointer.
    ///
    /// `#/a/b` walks `context` (or the root document); anything else is
    /// looked up in the `$id` registry, with an optional `#/...` fragment
    /// walked inside the identified node.
    pub fn resolve(&self, pointer: &str, context: Option<&'a Value>) -> Result<Resolved<'a>> {
        if let Some(fragment) = pointer.strip_prefix('#') {
            let document = context
                .or_else(|| self.root_document())
                .ok_or_else(|| ConvertError::resolution(pointer, ResolutionFailure::UnknownId))?;
            let node = walk_fragment(document, fragment, pointer)?;
            tracing::debug!(pointer, "resolved local pointer");
            return Ok(Resolved { node, document });
        }

        let (base, fragment) = match pointer.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment)),
            None => (pointer, None),
        };

        let entry = self
            .lookup_id(base)
            .ok_or_else(|| ConvertError::resolution(pointer, ResolutionFailure::UnknownId))?;

        let node = match fragment {
            Some(fragment) => walk_fragment(entry.node, fragment, pointer)?,
            None => entry.node,
        };
        tracing::debug!(pointer, "resolved registry pointer");
        Ok(Resolved {
            node,
            document: entry.document,
        })
    }

    fn lookup_id(&self, id: &str) -> Option<Resolved<'a>> {
        if let Some(entry) = self.registry.get(id) {
            return Some(*entry);
        }
        // Normalized absolute form, then relative to the root document's $id
        if let Ok(url) = Url::parse(id) {
            if let Some(entry) = self.registry.get(url.as_str()) {
                return Some(*entry);
            }
        }
        let joined = self.root_base.as_ref()?.join(id).ok()?;
        self.registry.get(joined.as_str()).copied()
    }

    fn walk(&mut self, node: &'a Value, document: &'a Value, base: Option<&Url>) {
        match node {
            Value::Object(map) => {
                let mut scoped_base = base.cloned();
                if let Some(id) = map.get("$id").and_then(|v| v.as_str()) {
                    let absolute = match base {
                        Some(base) => base.join(id).ok(),
                        None => Url::parse(id).ok(),
                    };
                    let key = match &absolute {
                        Some(url) => url.as_str().to_string(),
                        None => id.to_string(),
                    };
                    if self.registry.insert(key.clone(), Resolved { node, document }).is_some() {
                        tracing::debug!(id = %key, "duplicate $id, keeping last registration");
                    }
                    if absolute.is_some() {
                        scoped_base = absolute;
                    }
                }
                for (key, child) in map {
                    if matches!(key.as_str(), "enum" | "const" | "default" | "examples") {
                        continue;
                    }
                    self.walk(child, document, scoped_base.as_ref());
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.walk(item, document, base);
                }
            }
            _ => {}
        }
    }
}

/// Walk a `/a/b/c` fragment through nested mappings
fn walk_fragment<'a>(document: &'a Value, fragment: &str, pointer: &str) -> Result<&'a Value> {
    if fragment.is_empty() {
        return Ok(document);
    }
    let path = fragment
        .strip_prefix('/')
        .ok_or_else(|| ConvertError::resolution(pointer, ResolutionFailure::InvalidPointer))?;

    let mut current = document;
    for raw in path.split('/') {
        let segment = unescape_pointer_segment(raw);
        current = current
            .as_object()
            .and_then(|map| map.get(&segment))
            .ok_or_else(|| ConvertError::resolution(pointer, ResolutionFailure::SegmentNotFound))?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reason(err: ConvertError) -> ResolutionFailure {
        match err {
            ConvertError::Resolution { reason, .. } => reason,
            other => panic!("Expected resolution error, got {:?}", other),
        }
    }

    #[test]
    fn test_local_pointer() {
        let doc = json!({"definitions": {"shop": {"Order": {"type": "object"}}}});
        let mut resolver = SchemaResolver::new();
        resolver.register(&doc);

        let resolved = resolver.resolve("#/definitions/shop/Order", None).unwrap();
        assert_eq!(resolved.node, &json!({"type": "object"}));
        assert!(std::ptr::eq(resolved.document, &doc));

        let root = resolver.resolve("#", None).unwrap();
        assert!(std::ptr::eq(root.node, &doc));
    }

    #[test]
    fn test_local_pointer_failures() {
        let doc = json!({"definitions": {"A": {"type": "string"}, "list": [1, 2]}});
        let mut resolver = SchemaResolver::new();
        resolver.register(&doc);

        let err = resolver.resolve("#/definitions/B", None).unwrap_err();
        assert_eq!(reason(err), ResolutionFailure::SegmentNotFound);

        // Arrays are not mappings
        let err = resolver.resolve("#/definitions/list/0", None).unwrap_err();
        assert_eq!(reason(err), ResolutionFailure::SegmentNotFound);

        let err = resolver.resolve("#definitions", None).unwrap_err();
        assert_eq!(reason(err), ResolutionFailure::InvalidPointer);
    }

    #[test]
    fn test_escaped_segments() {
        let doc = json!({"definitions": {"a/b": {"type": "string"}, "c~d": {"type": "int32"}}});
        let mut resolver = SchemaResolver::new();
        resolver.register(&doc);

        assert_eq!(resolver.resolve("#/definitions/a~1b", None).unwrap().node, &json!({"type": "string"}));
        assert_eq!(resolver.resolve("#/definitions/c~0d", None).unwrap().node, &json!({"type": "int32"}));
    }

    #[test]
    fn test_nested_ids_resolve_against_enclosing_base() {
        let doc = json!({
            "$id": "https://example.com/schemas/root.json",
            "definitions": {
                "Address": {
                    "$id": "address.json",
                    "type": "object",
                    "definitions": {
                        "Street": {"$id": "street", "type": "string"}
                    }
                }
            }
        });
        let mut resolver = SchemaResolver::new();
        resolver.register(&doc);

        assert_eq!(resolver.id_count(), 3);
        let address = resolver.resolve("https://example.com/schemas/address.json", None).unwrap();
        assert_eq!(address.node["type"], "object");

        let street = resolver.resolve("https://example.com/schemas/street", None).unwrap();
        assert_eq!(street.node["type"], "string");

        // Relative pointer joined against the root document's $id
        let relative = resolver.resolve("address.json", None).unwrap();
        assert!(std::ptr::eq(relative.node, address.node));

        // Fragment inside an identified resource
        let fragment = resolver
            .resolve("https://example.com/schemas/address.json#/definitions/Street", None)
            .unwrap();
        assert!(std::ptr::eq(fragment.node, street.node));
    }

    #[test]
    fn test_unknown_and_external_ids() {
        let doc = json!({"type": "object"});
        let mut resolver = SchemaResolver::new();
        resolver.register(&doc);

        let err = resolver.resolve("https://elsewhere.example/schema.json", None).unwrap_err();
        assert_eq!(reason(err), ResolutionFailure::UnknownId);
    }

    #[test]
    fn test_cross_document_context() {
        let main = json!({"type": "object", "properties": {}});
        let common = json!({
            "$id": "urn:example:common",
            "definitions": {"Money": {"type": "decimal"}}
        });
        let mut resolver = SchemaResolver::new();
        resolver.register(&main);
        resolver.register(&common);

        let resolved = resolver.resolve("urn:example:common", None).unwrap();
        assert!(std::ptr::eq(resolved.document, &common));

        // Local pointer in the context of the included document
        let money = resolver.resolve("#/definitions/Money", Some(resolved.document)).unwrap();
        assert_eq!(money.node["type"], "decimal");

        // Same pointer against the root document fails
        assert!(resolver.resolve("#/definitions/Money", None).is_err());
    }
}
