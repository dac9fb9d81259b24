//! Diagnostics
//!
//! Collects non-fatal warnings raised while translating a schema. Every
//! warning marks a place where the output degraded to a fallback instead
//! of aborting the conversion.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Construct the translator does not recognize
    UnsupportedConstruct,
    /// Object with no properties (after inheritance)
    EmptyObject,
    /// Union with only `null` members
    NullOnlyUnion,
    /// Bare type name not found in the named-type cache
    UnresolvedName,
    /// Array, set or map without an element schema
    MissingItems,
    /// `$extends` target that is not an object
    InvalidExtends,
    /// Tuple order names a property that does not exist
    MissingTupleSlot,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedConstruct => "W001",
            Self::EmptyObject => "W002",
            Self::NullOnlyUnion => "W003",
            Self::UnresolvedName => "W004",
            Self::MissingItems => "W005",
            Self::InvalidExtends => "W006",
            Self::MissingTupleSlot => "W007",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingItems => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Field path inside the translated record (e.g. `Order.lines.item`)
    pub location: String,
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(location: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.location
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one conversion run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item, logging it as it arrives
    pub fn push(&mut self, item: DiagnosticItem) {
        match item.severity() {
            Severity::Info => tracing::debug!(code = %item.code, location = %item.location, "{}", item.message),
            Severity::Warning => tracing::warn!(code = %item.code, location = %item.location, "{}", item.message),
        }
        self.items.push(item);
    }

    /// Add a warning
    pub fn warning(
        &mut self,
        location: impl Into<String>,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) {
        self.push(DiagnosticItem::new(location, code, message));
    }

    /// Add diagnostic for a construct degraded to the fallback scalar
    pub fn unsupported(&mut self, location: impl Into<String>, what: &str) {
        self.push(
            DiagnosticItem::new(
                location,
                DiagnosticCode::UnsupportedConstruct,
                format!("unsupported construct {}, using fallback type", what),
            ),
        );
    }

    /// Add diagnostic for a bare type name missing from the named-type cache
    pub fn unresolved_name(&mut self, location: impl Into<String>, name: &str, namespace: &str) {
        let mut item = DiagnosticItem::new(
            location,
            DiagnosticCode::UnresolvedName,
            format!("type name '{}' is not defined, using fallback type", name),
        );
        if !namespace.is_empty() {
            item = item.with_context(format!("searched namespace: {}", namespace));
        }
        self.push(item);
    }

    pub fn items(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|d| d.severity() == Severity::Warning)
    }

    pub fn has_code(&self, code: DiagnosticCode) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}
