//! Schema Loading
//!
//! Reads the primary Structure document plus any include documents. Include
//! paths may be files or directories; directories are walked recursively
//! for `.json` files.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ConvertError, Result};

/// The documents one conversion reads
#[derive(Debug, Clone)]
pub struct DocumentSet {
    /// Document the root type is selected from
    pub primary: Value,
    /// Where the primary document came from, if it was loaded from disk
    pub primary_path: Option<PathBuf>,
    /// Additional documents registered for `$id` and name lookups
    pub includes: Vec<(PathBuf, Value)>,
}

impl DocumentSet {
    /// Wrap an in-memory document
    pub fn from_value(primary: Value) -> Self {
        Self {
            primary,
            primary_path: None,
            includes: Vec::new(),
        }
    }

    /// Load the primary document and all include paths
    pub fn load(primary: &Path, includes: &[PathBuf]) -> Result<Self> {
        let document = load_document(primary)?;
        let mut set = Self {
            primary: document,
            primary_path: Some(primary.to_path_buf()),
            includes: Vec::new(),
        };
        for include in includes {
            set.add_include_path(include)?;
        }
        Ok(set)
    }

    /// Add an in-memory include document
    pub fn with_include(mut self, name: impl Into<PathBuf>, document: Value) -> Self {
        self.includes.push((name.into(), document));
        self
    }

    /// Add a file, or every `.json` file below a directory
    pub fn add_include_path(&mut self, path: &Path) -> Result<()> {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| e.path().extension().map(|ext| ext == "json").unwrap_or(false))
                .map(|e| e.into_path())
                .collect();
            // Walk order is filesystem dependent
            files.sort();
            for file in files {
                if self.is_primary(&file) {
                    continue;
                }
                let document = load_document(&file)?;
                self.includes.push((file, document));
            }
        } else {
            let document = load_document(path)?;
            self.includes.push((path.to_path_buf(), document));
        }
        Ok(())
    }

    /// All documents, primary first
    pub fn documents(&self) -> impl Iterator<Item = &Value> {
        std::iter::once(&self.primary).chain(self.includes.iter().map(|(_, doc)| doc))
    }

    fn is_primary(&self, path: &Path) -> bool {
        match &self.primary_path {
            Some(primary) => same_file(primary, path),
            None => false,
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Load and parse one JSON document
pub fn load_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = content.len(), "loaded schema document");

    serde_json::from_str(&content).map_err(|source| ConvertError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_missing_file() {
        let err = load_document(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"type\": ").unwrap();

        let err = load_document(&path).unwrap_err();
        assert!(matches!(err, ConvertError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_include_directory_skips_primary() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("main.json");
        fs::write(&primary, json!({"type": "object", "properties": {}}).to_string()).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let set = DocumentSet::load(&primary, &[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = set
            .includes
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
        assert_eq!(set.documents().count(), 3);
    }
}
