//! Type Translator
//!
//! One recursive engine turns a Structure record into a target type tree.
//! The structural policy (references, unions, inheritance, collections) is
//! the same for every target; a `TargetSystem` only supplies leaf mappings
//! and container constructors.
//!
//! Per-run state (field IDs, claimed names, memoized named types and the
//! reference stack used for cycle detection) is owned by one `Translator`
//! and dropped with it.

pub mod envelope;
pub mod names;

pub use names::{FieldId, FieldIdAllocator, NameAllocator};

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Debug;

use crate::error::{ConvertError, Result};
use crate::structure::{
    ChoiceNode, Choices, DiagnosticCode, Diagnostics, EnumNode, NamedTypeCache, ObjectNode, Reference,
    RootSelection, Scalar, SchemaResolver, StructureNode, TupleNode, TypeName, DEFAULT_DECIMAL_PRECISION,
    DEFAULT_DECIMAL_SCALE,
};
use names::{synthesize, SlotNamer};

// =============================================================================
// Target Interface
// =============================================================================

/// One named, identified member of a record, list or map
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<T> {
    pub id: FieldId,
    pub name: String,
    pub required: bool,
    pub ty: T,
}

/// The translated root record
#[derive(Debug, Clone, PartialEq)]
pub struct RootRecord<T> {
    pub name: String,
    pub namespace: String,
    pub fields: Vec<Slot<T>>,
}

impl<T> RootRecord<T> {
    pub fn fullname(&self) -> String {
        crate::structure::qualify(&self.namespace, &self.name)
    }
}

/// A target type system the engine can build trees for
pub trait TargetSystem {
    type Type: Clone + Debug;

    /// Leaf mapping for one scalar of the vocabulary
    fn scalar(&mut self, scalar: &Scalar) -> Self::Type;

    /// Lossy default used wherever a construct cannot be translated
    fn fallback(&mut self) -> Self::Type {
        self.scalar(&Scalar::String)
    }

    fn list(&mut self, name: &str, element: Slot<Self::Type>) -> Self::Type;

    /// String-keyed map; `key` is the ID allocated for the key column
    fn map(&mut self, name: &str, key: FieldId, value: Slot<Self::Type>) -> Self::Type;

    /// Structural container: objects, materialized unions and choices, tuples
    fn record(&mut self, name: &str, fields: Vec<Slot<Self::Type>>) -> Self::Type;

    fn enumeration(&mut self, name: &str, base: &Scalar, symbols: &[String]) -> Self::Type;

    /// Targets with a global type namespace emit a named record once and
    /// refer to it afterwards.
    fn shares_named_types(&self) -> bool {
        false
    }
}

/// Translation settings
#[derive(Debug, Clone, Copy)]
pub struct TranslateOptions {
    /// Precision for `decimal` without a `precision` key
    pub decimal_precision: u32,
    /// Scale for `decimal` without a `scale` key
    pub decimal_scale: u32,
    /// Append the CloudEvents envelope columns to the root record
    pub envelope_columns: bool,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            decimal_precision: DEFAULT_DECIMAL_PRECISION,
            decimal_scale: DEFAULT_DECIMAL_SCALE,
            envelope_columns: false,
        }
    }
}

/// Result of one successful translation run
pub struct Translation<T: TargetSystem> {
    pub root: RootRecord<T::Type>,
    /// The target, carrying whatever side tables it built (named types)
    pub target: T,
    pub diagnostics: Diagnostics,
    /// Number of field IDs issued
    pub field_ids: usize,
}

/// Translate the selected root record into `target`
pub fn translate<'a, T: TargetSystem>(
    resolver: &SchemaResolver<'a>,
    named: &NamedTypeCache<'a>,
    root: &RootSelection<'a>,
    target: T,
    options: TranslateOptions,
) -> Result<Translation<T>> {
    let mut translator = Translator::new(resolver, named, target, options);
    let mut record = translator.translate_root(root)?;
    if options.envelope_columns {
        translator.append_envelope(&mut record);
    }
    Ok(translator.finish(record))
}

// =============================================================================
// Translator
// =============================================================================

/// A translated node plus the field-level flags it implies
#[derive(Debug)]
struct Translated<T> {
    ty: T,
    /// Null was part of the source type
    nullable: bool,
    /// Array, set or map; an absent collection reads as empty
    collection: bool,
}

impl<T> Translated<T> {
    fn plain(ty: T) -> Self {
        Self {
            ty,
            nullable: false,
            collection: false,
        }
    }

    fn collection(ty: T) -> Self {
        Self {
            ty,
            nullable: false,
            collection: true,
        }
    }
}

/// Where in the source the translator currently is
#[derive(Debug, Clone)]
struct Scope<'a> {
    /// Document local `#/` pointers resolve against
    document: &'a Value,
    /// Namespace bare type names resolve against
    namespace: String,
    /// Name of the enclosing record
    enclosing: String,
    /// Field being translated
    field: String,
    /// Name derived from the reference that reached the current node
    reference: Option<TypeName>,
    /// Diagnostic location
    path: String,
}

impl<'a> Scope<'a> {
    fn field(&self, name: &str, document: &'a Value) -> Self {
        Self {
            document,
            namespace: self.namespace.clone(),
            enclosing: self.enclosing.clone(),
            field: name.to_string(),
            reference: None,
            path: format!("{}.{}", self.path, name),
        }
    }

    fn nested(&self, segment: &str) -> Self {
        Self {
            reference: None,
            path: format!("{}.{}", self.path, segment),
            ..self.clone()
        }
    }

    fn record(&self, name: &str, namespace: String) -> Self {
        Self {
            document: self.document,
            namespace,
            enclosing: name.to_string(),
            field: String::new(),
            reference: None,
            path: self.path.clone(),
        }
    }
}

/// Property collected from an object and its `$extends` bases
#[derive(Debug, Clone, Copy)]
struct Property<'a> {
    name: &'a str,
    schema: &'a Value,
    document: &'a Value,
}

/// Per-run translation context
pub struct Translator<'r, 'a, T: TargetSystem> {
    resolver: &'r SchemaResolver<'a>,
    named: &'r NamedTypeCache<'a>,
    target: T,
    options: TranslateOptions,
    ids: FieldIdAllocator,
    names: NameAllocator,
    known_types: HashMap<String, T::Type>,
    /// Nodes currently being translated through a reference, with the
    /// pointer that reached each
    resolving: Vec<(usize, String)>,
    diagnostics: Diagnostics,
}

impl<'r, 'a, T: TargetSystem> Translator<'r, 'a, T> {
    pub fn new(
        resolver: &'r SchemaResolver<'a>,
        named: &'r NamedTypeCache<'a>,
        target: T,
        options: TranslateOptions,
    ) -> Self {
        Self {
            resolver,
            named,
            target,
            options,
            ids: FieldIdAllocator::new(),
            names: NameAllocator::new(),
            known_types: HashMap::new(),
            resolving: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn finish(self, root: RootRecord<T::Type>) -> Translation<T> {
        Translation {
            root,
            target: self.target,
            field_ids: self.ids.issued(),
            diagnostics: self.diagnostics,
        }
    }

    /// Translate the selected root, which must be an object
    pub fn translate_root(&mut self, root: &RootSelection<'a>) -> Result<RootRecord<T::Type>> {
        let obj = match StructureNode::classify(root.node) {
            StructureNode::Object(obj) => obj,
            _ => {
                return Err(ConvertError::RootNotRecord {
                    name: root.selected_as.clone().unwrap_or_else(|| "<document>".to_string()),
                })
            }
        };

        let derived = root.selected_as.as_deref().and_then(derived_name);
        let name = obj
            .name
            .map(str::to_string)
            .or_else(|| derived.as_ref().map(|n| n.name.clone()))
            .unwrap_or_else(|| "Root".to_string());
        let namespace = obj
            .namespace
            .map(str::to_string)
            .or_else(|| derived.map(|n| n.namespace))
            .unwrap_or_default();

        let record_name = self.names.claim(&name);
        let scope = Scope {
            document: root.document,
            namespace: namespace.clone(),
            enclosing: record_name.clone(),
            field: String::new(),
            reference: None,
            path: record_name.clone(),
        };

        self.enter(root.node, root.selected_as.as_deref().unwrap_or("#"))?;
        let fields = self.object_fields(&obj, &scope)?;
        self.leave();

        if fields.is_empty() {
            self.diagnostics.warning(
                &scope.path,
                DiagnosticCode::EmptyObject,
                format!("root record '{}' has no properties", record_name),
            );
        }
        tracing::info!(record = %record_name, fields = fields.len(), "translated root record");

        Ok(RootRecord {
            name: record_name,
            namespace,
            fields,
        })
    }

    /// Append the envelope columns after the translated fields. A property
    /// that already uses a column name is renamed with an ordinal suffix.
    pub fn append_envelope(&mut self, root: &mut RootRecord<T::Type>) {
        for (name, scalar) in envelope::ENVELOPE_COLUMNS {
            if let Some(index) = root.fields.iter().position(|field| field.name == name) {
                let renamed = (2..)
                    .map(|ordinal| format!("{}_{}", name, ordinal))
                    .find(|candidate| {
                        !root.fields.iter().any(|field| field.name == *candidate)
                            && !envelope::ENVELOPE_COLUMNS.iter().any(|(column, _)| *column == candidate.as_str())
                    })
                    .unwrap_or_else(|| name.to_string());
                self.diagnostics.warning(
                    &root.name,
                    DiagnosticCode::UnsupportedConstruct,
                    format!("property '{}' collides with an envelope column, renamed to '{}'", name, renamed),
                );
                root.fields[index].name = renamed;
            }
            let id = self.ids.next_id();
            let ty = self.target.scalar(&scalar);
            root.fields.push(Slot {
                id,
                name: name.to_string(),
                required: false,
                ty,
            });
        }
    }

    // -------------------------------------------------------------------------
    // Cycle detection
    // -------------------------------------------------------------------------

    fn enter(&mut self, node: &Value, pointer: &str) -> Result<()> {
        let address = node as *const Value as usize;
        if self.resolving.iter().any(|(seen, _)| *seen == address) {
            let mut chain: Vec<String> = self.resolving.iter().map(|(_, p)| p.clone()).collect();
            chain.push(pointer.to_string());
            return Err(ConvertError::Cycle {
                pointer: pointer.to_string(),
                chain,
            });
        }
        self.resolving.push((address, pointer.to_string()));
        Ok(())
    }

    fn leave(&mut self) {
        self.resolving.pop();
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    fn translate(&mut self, value: &'a Value, scope: &Scope<'a>) -> Result<Translated<T::Type>> {
        match StructureNode::classify(value) {
            StructureNode::Scalar(Scalar::Null) => Ok(self.null_only(scope)),
            StructureNode::Scalar(scalar) => Ok(Translated::plain(self.scalar(scalar, value))),
            StructureNode::Object(obj) => self.translate_object(&obj, scope),
            StructureNode::Array { items } | StructureNode::Set { items } => self.translate_list(items, scope),
            StructureNode::Map { values } => self.translate_map(values, scope),
            StructureNode::Tuple(tuple) => self.translate_tuple(&tuple, scope),
            StructureNode::Choice(choice) => self.translate_choice(&choice, scope),
            StructureNode::Enum(node) => Ok(self.translate_enum(&node, scope)),
            StructureNode::Union(members) => self.translate_union(&members, scope),
            StructureNode::Reference(reference) => self.translate_reference(reference, scope),
            StructureNode::Unknown(what) => {
                self.diagnostics.unsupported(&scope.path, &what);
                Ok(Translated::plain(self.target.fallback()))
            }
        }
    }

    fn scalar(&mut self, scalar: Scalar, value: &Value) -> T::Type {
        let scalar = match scalar {
            Scalar::Decimal { precision, scale } => Scalar::Decimal {
                precision: if value.get("precision").is_some() {
                    precision
                } else {
                    self.options.decimal_precision
                },
                scale: if value.get("scale").is_some() {
                    scale
                } else {
                    self.options.decimal_scale
                },
            },
            other => other,
        };
        self.target.scalar(&scalar)
    }

    fn null_only(&mut self, scope: &Scope<'a>) -> Translated<T::Type> {
        self.diagnostics.warning(
            &scope.path,
            DiagnosticCode::NullOnlyUnion,
            "type admits only null, using fallback type",
        );
        Translated {
            ty: self.target.fallback(),
            nullable: true,
            collection: false,
        }
    }

    // -------------------------------------------------------------------------
    // References
    // -------------------------------------------------------------------------

    fn translate_reference(&mut self, reference: Reference<'a>, scope: &Scope<'a>) -> Result<Translated<T::Type>> {
        let (node, document, type_name) = match reference {
            Reference::Pointer(pointer) => {
                let resolved = self.resolver.resolve(pointer, Some(scope.document))?;
                (resolved.node, resolved.document, TypeName::from_pointer(pointer))
            }
            Reference::ByName(name) => match self.named.resolve_name(name, &scope.namespace) {
                Some((fullname, entry)) => (entry.node, entry.document, Some(TypeName::from_fullname(fullname))),
                None => {
                    self.diagnostics.unresolved_name(&scope.path, name, &scope.namespace);
                    return Ok(Translated::plain(self.target.fallback()));
                }
            },
        };

        self.enter(node, reference.as_str())?;
        let mut inner = scope.clone();
        inner.document = document;
        // Names inside the target resolve where it is defined, not where it is used
        if let Some(name) = &type_name {
            inner.namespace = name.namespace.clone();
        }
        inner.reference = type_name;
        let translated = self.translate(node, &inner)?;
        self.leave();
        Ok(translated)
    }

    // -------------------------------------------------------------------------
    // Objects
    // -------------------------------------------------------------------------

    fn translate_object(&mut self, obj: &ObjectNode<'a>, scope: &Scope<'a>) -> Result<Translated<T::Type>> {
        let type_name = type_name(obj.name, obj.namespace, scope);
        let shared_key = type_name
            .as_ref()
            .filter(|_| self.target.shares_named_types())
            .map(TypeName::fullname);
        if let Some(ty) = shared_key.as_ref().and_then(|key| self.known_types.get(key)) {
            return Ok(Translated::plain(ty.clone()));
        }

        let record_name = self.claim_name(type_name.as_ref(), scope, "");
        let namespace = type_name
            .as_ref()
            .map(|n| n.namespace.clone())
            .unwrap_or_else(|| scope.namespace.clone());
        let fields = self.object_fields(obj, &scope.record(&record_name, namespace))?;

        if fields.is_empty() {
            self.diagnostics.warning(
                &scope.path,
                DiagnosticCode::EmptyObject,
                format!("object '{}' has no properties, using fallback type", record_name),
            );
            return Ok(Translated::plain(self.target.fallback()));
        }

        let ty = self.target.record(&record_name, fields);
        if let Some(key) = shared_key {
            self.known_types.insert(key, ty.clone());
        }
        Ok(Translated::plain(ty))
    }

    fn object_fields(&mut self, obj: &ObjectNode<'a>, scope: &Scope<'a>) -> Result<Vec<Slot<T::Type>>> {
        let mut properties = Vec::new();
        let mut required = BTreeSet::new();
        self.collect_properties(obj, scope.document, scope, &mut properties, &mut required)?;

        let mut fields = Vec::with_capacity(properties.len());
        for property in properties {
            let listed = required.contains(property.name);
            fields.push(self.field(property, listed, scope)?);
        }
        Ok(fields)
    }

    /// Bases first, in `$extends` order; an own property replaces an
    /// inherited one of the same name in place.
    fn collect_properties(
        &mut self,
        obj: &ObjectNode<'a>,
        document: &'a Value,
        scope: &Scope<'a>,
        properties: &mut Vec<Property<'a>>,
        required: &mut BTreeSet<&'a str>,
    ) -> Result<()> {
        for &pointer in &obj.extends {
            let resolved = self.resolver.resolve(pointer, Some(document))?;
            self.enter(resolved.node, pointer)?;
            match StructureNode::classify(resolved.node) {
                StructureNode::Object(base) => {
                    self.collect_properties(&base, resolved.document, scope, properties, required)?;
                }
                other => self.diagnostics.warning(
                    &scope.path,
                    DiagnosticCode::InvalidExtends,
                    format!("$extends '{}' is a {}, not an object", pointer, other.kind()),
                ),
            }
            self.leave();
        }

        for &(name, schema) in &obj.properties {
            let property = Property { name, schema, document };
            match properties.iter_mut().find(|p| p.name == name) {
                Some(existing) => *existing = property,
                None => properties.push(property),
            }
        }
        required.extend(obj.required.iter().copied());
        Ok(())
    }

    fn field(&mut self, property: Property<'a>, listed_required: bool, scope: &Scope<'a>) -> Result<Slot<T::Type>> {
        let id = self.ids.next_id();
        let translated = self.translate(property.schema, &scope.field(property.name, property.document))?;
        Ok(Slot {
            id,
            name: property.name.to_string(),
            required: !translated.nullable && (listed_required || translated.collection),
            ty: translated.ty,
        })
    }

    // -------------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------------

    fn translate_list(&mut self, items: Option<&'a Value>, scope: &Scope<'a>) -> Result<Translated<T::Type>> {
        let element_id = self.ids.next_id();
        let name = self.names.claim(&synthesize(&scope.enclosing, &scope.field, "List"));
        let element = self.element(items, element_id, "element", &scope.nested("item"))?;
        Ok(Translated::collection(self.target.list(&name, element)))
    }

    fn translate_map(&mut self, values: Option<&'a Value>, scope: &Scope<'a>) -> Result<Translated<T::Type>> {
        let key_id = self.ids.next_id();
        let value_id = self.ids.next_id();
        let name = self.names.claim(&synthesize(&scope.enclosing, &scope.field, "Map"));
        let value = self.element(values, value_id, "value", &scope.nested("value"))?;
        Ok(Translated::collection(self.target.map(&name, key_id, value)))
    }

    fn element(
        &mut self,
        schema: Option<&'a Value>,
        id: FieldId,
        name: &str,
        scope: &Scope<'a>,
    ) -> Result<Slot<T::Type>> {
        let translated = match schema {
            Some(schema) => self.translate(schema, scope)?,
            None => {
                self.diagnostics.warning(
                    &scope.path,
                    DiagnosticCode::MissingItems,
                    "collection without element schema, using fallback type",
                );
                Translated::plain(self.target.fallback())
            }
        };
        Ok(Slot {
            id,
            name: name.to_string(),
            required: !translated.nullable,
            ty: translated.ty,
        })
    }

    fn translate_tuple(&mut self, tuple: &TupleNode<'a>, scope: &Scope<'a>) -> Result<Translated<T::Type>> {
        for missing in &tuple.missing {
            self.diagnostics.warning(
                &scope.path,
                DiagnosticCode::MissingTupleSlot,
                format!("tuple order names '{}' which has no property", missing),
            );
        }
        if tuple.slots.is_empty() {
            self.diagnostics.unsupported(&scope.path, "tuple without elements");
            return Ok(Translated::plain(self.target.fallback()));
        }

        let type_name = type_name(tuple.name, None, scope);
        let name = self.claim_name(type_name.as_ref(), scope, "Tuple");
        let inner = scope.record(&name, scope.namespace.clone());

        let mut slots = Vec::with_capacity(tuple.slots.len());
        for (index, slot) in tuple.slots.iter().enumerate() {
            let id = self.ids.next_id();
            let slot_name = slot
                .name
                .map(str::to_string)
                .unwrap_or_else(|| format!("item_{}", index));
            let translated = self.translate(slot.schema, &inner.field(&slot_name, scope.document))?;
            slots.push(Slot {
                id,
                name: slot_name,
                required: true,
                ty: translated.ty,
            });
        }
        Ok(Translated::plain(self.target.record(&name, slots)))
    }

    // -------------------------------------------------------------------------
    // Unions and choices
    // -------------------------------------------------------------------------

    fn translate_union(&mut self, members: &[&'a Value], scope: &Scope<'a>) -> Result<Translated<T::Type>> {
        let mut nullable = false;
        let mut non_null = Vec::with_capacity(members.len());
        for &member in members {
            if StructureNode::classify(member).is_null() {
                nullable = true;
            } else {
                non_null.push((None, member));
            }
        }

        match non_null.as_slice() {
            [] => Ok(self.null_only(scope)),
            [(_, single)] => {
                let single = *single;
                let mut translated = self.translate(single, scope)?;
                translated.nullable |= nullable;
                Ok(translated)
            }
            _ => {
                let name = self.names.claim(&synthesize(&scope.enclosing, &scope.field, "Union"));
                let ty = self.materialize(&name, &non_null, scope)?;
                Ok(Translated {
                    ty,
                    nullable,
                    collection: false,
                })
            }
        }
    }

    fn translate_choice(&mut self, choice: &ChoiceNode<'a>, scope: &Scope<'a>) -> Result<Translated<T::Type>> {
        let type_name = type_name(choice.name, choice.namespace, scope);
        let shared_key = type_name
            .as_ref()
            .filter(|_| self.target.shares_named_types())
            .map(TypeName::fullname);
        if let Some(ty) = shared_key.as_ref().and_then(|key| self.known_types.get(key)) {
            return Ok(Translated::plain(ty.clone()));
        }

        let members: Vec<(Option<&'a str>, &'a Value)> = match &choice.choices {
            Choices::Tagged(tagged) => tagged.iter().map(|&(tag, schema)| (Some(tag), schema)).collect(),
            Choices::Untagged(untagged) => untagged.iter().map(|&schema| (None, schema)).collect(),
        };
        if members.is_empty() {
            self.diagnostics.unsupported(&scope.path, "choice without alternatives");
            return Ok(Translated::plain(self.target.fallback()));
        }

        let name = self.claim_name(type_name.as_ref(), scope, "Choice");
        let ty = self.materialize(&name, &members, scope)?;
        if let Some(key) = shared_key {
            self.known_types.insert(key, ty.clone());
        }
        Ok(Translated::plain(ty))
    }

    /// One optional slot per alternative, named by tag or member type
    fn materialize(
        &mut self,
        name: &str,
        members: &[(Option<&'a str>, &'a Value)],
        scope: &Scope<'a>,
    ) -> Result<T::Type> {
        let inner = scope.record(name, scope.namespace.clone());
        let mut namer = SlotNamer::new();
        let mut slots = Vec::with_capacity(members.len());

        for &(tag, member) in members {
            let id = self.ids.next_id();
            let label = match tag {
                Some(tag) => tag.to_string(),
                None => member_label(member),
            };
            let slot_name = namer.name(&label);
            let translated = self.translate(member, &inner.field(&slot_name, scope.document))?;
            slots.push(Slot {
                id,
                name: slot_name,
                required: false,
                ty: translated.ty,
            });
        }
        Ok(self.target.record(name, slots))
    }

    // -------------------------------------------------------------------------
    // Enums
    // -------------------------------------------------------------------------

    fn translate_enum(&mut self, node: &EnumNode<'a>, scope: &Scope<'a>) -> Translated<T::Type> {
        let type_name = type_name(node.name, node.namespace, scope);
        let key = type_name.as_ref().map(TypeName::fullname);
        if let Some(ty) = key.as_ref().and_then(|key| self.known_types.get(key)) {
            return Translated::plain(ty.clone());
        }

        let name = self.claim_name(type_name.as_ref(), scope, "Enum");
        let ty = self.target.enumeration(&name, &node.base, &node.symbols);
        if let Some(key) = key {
            self.known_types.insert(key, ty.clone());
        }
        Translated::plain(ty)
    }

    fn claim_name(&mut self, type_name: Option<&TypeName>, scope: &Scope<'a>, suffix: &str) -> String {
        match type_name {
            Some(type_name) => self.names.claim(&type_name.name),
            None => self.names.claim(&synthesize(&scope.enclosing, &scope.field, suffix)),
        }
    }
}

/// Explicit `name`/`namespace`, else the name of the reference that got here
fn type_name(name: Option<&str>, namespace: Option<&str>, scope: &Scope<'_>) -> Option<TypeName> {
    match name {
        Some(name) => Some(TypeName::new(namespace.unwrap_or(&scope.namespace), name)),
        None => scope.reference.clone(),
    }
}

/// Name for a root picked by pointer or by record-type name
fn derived_name(selected_as: &str) -> Option<TypeName> {
    if selected_as.contains('#') || selected_as.contains('/') {
        TypeName::from_pointer(selected_as)
    } else {
        Some(TypeName::from_fullname(selected_as))
    }
}

/// Slot label for an untagged union or choice member
fn member_label(member: &Value) -> String {
    match StructureNode::classify(member) {
        StructureNode::Scalar(scalar) => scalar.name().to_string(),
        StructureNode::Reference(Reference::Pointer(pointer)) => TypeName::from_pointer(pointer)
            .map(|n| n.name)
            .unwrap_or_else(|| "ref".to_string()),
        StructureNode::Reference(Reference::ByName(name)) => TypeName::from_fullname(name).name,
        StructureNode::Object(ObjectNode { name: Some(name), .. })
        | StructureNode::Choice(ChoiceNode { name: Some(name), .. })
        | StructureNode::Enum(EnumNode { name: Some(name), .. }) => name.to_string(),
        other => other.kind().to_string(),
    }
}
