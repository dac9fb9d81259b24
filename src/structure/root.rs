//! Root Type Selection
//!
//! Picks the node a conversion starts from: an object document root, a
//! `$root` pointer, or a named record type looked up by the caller.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde_json::Value;

use super::{NamedTypeCache, Reference, SchemaResolver, StructureNode};
use crate::error::{ConvertError, Result};

const MAX_SUGGESTIONS: usize = 3;

/// The selected root node
#[derive(Debug, Clone)]
pub struct RootSelection<'a> {
    pub node: &'a Value,
    pub document: &'a Value,
    /// Name the root was selected by (pointer or record type), if any
    pub selected_as: Option<String>,
}

/// Select the root type of a conversion
pub fn select_root<'a>(
    document: &'a Value,
    resolver: &SchemaResolver<'a>,
    named: &NamedTypeCache<'a>,
    record_type: Option<&str>,
) -> Result<RootSelection<'a>> {
    if document.get("type").and_then(|v| v.as_str()) == Some("object") {
        tracing::debug!("using document root object");
        return Ok(RootSelection {
            node: document,
            document,
            selected_as: None,
        });
    }

    if let Some(pointer) = document.get("$root").and_then(|v| v.as_str()) {
        tracing::debug!(pointer, "using $root");
        return follow_aliases(resolver, pointer, document);
    }

    let Some(name) = record_type else {
        return Err(ConvertError::NoRoot);
    };

    if let Some(entry) = named.lookup(name) {
        tracing::debug!(record_type = name, "using named record type");
        return Ok(RootSelection {
            node: entry.node,
            document: entry.document,
            selected_as: Some(name.to_string()),
        });
    }

    // Top-level list of documents: match on the bare name as well
    if let Value::Array(items) = document {
        for item in items {
            if item.get("name").and_then(|v| v.as_str()) == Some(name) {
                return Ok(RootSelection {
                    node: item,
                    document: item,
                    selected_as: Some(name.to_string()),
                });
            }
        }
    }

    Err(ConvertError::RootNotFound {
        name: name.to_string(),
        suggestions: suggest(named, name),
    })
}

/// Resolve `pointer`, then keep following while the target is itself a
/// bare `$ref`. The selection is named after the last pointer.
fn follow_aliases<'a>(
    resolver: &SchemaResolver<'a>,
    pointer: &str,
    document: &'a Value,
) -> Result<RootSelection<'a>> {
    let mut chain = vec![pointer.to_string()];
    let mut visited = vec![document as *const Value];
    let mut resolved = resolver.resolve(pointer, Some(document))?;

    while let StructureNode::Reference(Reference::Pointer(next)) = StructureNode::classify(resolved.node) {
        chain.push(next.to_string());
        visited.push(resolved.node as *const Value);
        let target = resolver.resolve(next, Some(resolved.document))?;
        if visited.contains(&(target.node as *const Value)) {
            return Err(ConvertError::Cycle {
                pointer: next.to_string(),
                chain,
            });
        }
        tracing::debug!(pointer = next, "following $root alias");
        resolved = target;
    }

    Ok(RootSelection {
        node: resolved.node,
        document: resolved.document,
        selected_as: chain.pop(),
    })
}

/// Closest known type names for an unknown record type
fn suggest(named: &NamedTypeCache<'_>, query: &str) -> Vec<String> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &str)> = named
        .names()
        .filter_map(|candidate| {
            let bare = candidate.rsplit('.').next().unwrap_or(candidate);
            matcher
                .fuzzy_match(candidate, query)
                .or_else(|| matcher.fuzzy_match(query, bare))
                .map(|score| (score, candidate))
        })
        .collect();

    // Stable for equal scores: discovery order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}
