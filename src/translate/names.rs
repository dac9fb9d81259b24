//! Identity and Name Allocation
//!
//! Field IDs come from a single counter that lives for one conversion run.
//! Names for anonymous constructs are a deterministic function of the
//! enclosing record, the field and a kind suffix; collisions are resolved
//! with an ordinal suffix in allocation order.

use std::collections::{HashMap, HashSet};

// =============================================================================
// Field IDs
// =============================================================================

/// Identifier of one emitted field, list element, map key or map value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(pub i32);

impl FieldId {
    pub fn get(self) -> i32 {
        self.0
    }
}

/// Monotonic field-ID counter, starting at 1
#[derive(Debug)]
pub struct FieldIdAllocator {
    next: i32,
}

impl Default for FieldIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl FieldIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> FieldId {
        let id = FieldId(self.next);
        self.next += 1;
        id
    }

    /// Number of IDs issued so far
    pub fn issued(&self) -> usize {
        (self.next - 1) as usize
    }
}

// =============================================================================
// Type Names
// =============================================================================

/// Hands out type names that are unique within one conversion run
#[derive(Debug, Default)]
pub struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `candidate`, or the first free `candidate_N` (N ≥ 2)
    pub fn claim(&mut self, candidate: &str) -> String {
        let base = if candidate.is_empty() { "Type" } else { candidate };
        if self.used.insert(base.to_string()) {
            return base.to_string();
        }
        let mut ordinal = 2;
        loop {
            let name = format!("{}_{}", base, ordinal);
            if self.used.insert(name.clone()) {
                return name;
            }
            ordinal += 1;
        }
    }
}

/// Slot names inside one materialized container
#[derive(Debug, Default)]
pub struct SlotNamer {
    seen: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl SlotNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// First use keeps the label; repeats get `_2`, `_3`, ... skipping
    /// any name already issued in this container
    pub fn name(&mut self, label: &str) -> String {
        let count = self.seen.entry(label.to_string()).or_insert(0);
        loop {
            *count += 1;
            let name = if *count == 1 {
                label.to_string()
            } else {
                format!("{}_{}", label, count)
            };
            if self.issued.insert(name.clone()) {
                return name;
            }
        }
    }
}

/// Name for an anonymous construct: `Enclosing` + `Field` + `Suffix`
pub fn synthesize(enclosing: &str, field: &str, suffix: &str) -> String {
    let mut name = to_pascal_case(enclosing);
    name.push_str(&to_pascal_case(field));
    name.push_str(suffix);
    name
}

/// Convert to PascalCase, treating `_`, `-`, `.` and spaces as word breaks
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.chars() {
        if c == '_' || c == '-' || c == '.' || c == ' ' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_ids_are_monotonic() {
        let mut ids = FieldIdAllocator::new();
        assert_eq!(ids.next_id(), FieldId(1));
        assert_eq!(ids.next_id(), FieldId(2));
        assert_eq!(ids.next_id().get(), 3);
        assert_eq!(ids.issued(), 3);
    }

    #[test]
    fn test_name_allocator_disambiguates() {
        let mut names = NameAllocator::new();
        assert_eq!(names.claim("Order"), "Order");
        assert_eq!(names.claim("Order"), "Order_2");
        assert_eq!(names.claim("Order"), "Order_3");
        assert_eq!(names.claim(""), "Type");
    }

    #[test]
    fn test_slot_namer() {
        let mut namer = SlotNamer::new();
        assert_eq!(namer.name("string"), "string");
        assert_eq!(namer.name("int32"), "int32");
        assert_eq!(namer.name("string"), "string_2");
    }

    #[test]
    fn test_slot_namer_skips_issued_ordinals() {
        let mut namer = SlotNamer::new();
        let slots = vec![
            namer.name("string"),
            namer.name("string_2"),
            namer.name("string"),
            namer.name("string_2"),
        ];
        assert_eq!(slots, vec!["string", "string_2", "string_3", "string_2_2"]);
    }

    #[test]
    fn test_synthesize() {
        assert_eq!(synthesize("Order", "line_items", "List"), "OrderLineItemsList");
        assert_eq!(synthesize("shop.Order", "payment", "Union"), "ShopOrderPaymentUnion");
        assert_eq!(to_pascal_case("already-kebab case"), "AlreadyKebabCase");
    }
}
