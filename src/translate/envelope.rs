//! Synthetic envelope columns
//!
//! CloudEvents metadata appended after translation. The columns never
//! depend on the source schema.

use crate::structure::Scalar;

/// `(column name, scalar type)` in emission order; every column is optional
pub const ENVELOPE_COLUMNS: [(&str, Scalar); 5] = [
    ("___type", Scalar::String),
    ("___source", Scalar::String),
    ("___id", Scalar::String),
    ("___time", Scalar::Timestamp),
    ("___subject", Scalar::String),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_columns() {
        let names: Vec<_> = ENVELOPE_COLUMNS.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["___type", "___source", "___id", "___time", "___subject"]);
        assert_eq!(ENVELOPE_COLUMNS[3].1, Scalar::Timestamp);
    }
}
