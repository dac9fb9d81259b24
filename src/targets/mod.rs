//! Target Emitters
//!
//! Each target supplies a `TargetSystem` for the translator plus an encoder
//! that turns the finished tree into bytes. Encoding happens fully in
//! memory; `write_atomic` then moves the bytes into place so a failed run
//! never leaves a partial file behind.

pub mod iceberg;
pub mod parquet;
pub mod xsd;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::checksum::Checksum;
use crate::error::{ConvertError, Result};

pub use self::iceberg::{IcebergFormat, IcebergTarget, IcebergType};
pub use self::parquet::ParquetTarget;
pub use self::xsd::XsdTarget;

/// What an emitter wrote
#[derive(Debug, Clone)]
pub struct Emitted {
    pub path: PathBuf,
    pub checksum: Checksum,
    pub bytes: usize,
}

/// Write `bytes` to a temporary file next to `path`, then rename it over
/// `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<Emitted> {
    let write_error = |source: std::io::Error| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_error)?;

    let mut file = NamedTempFile::new_in(parent).map_err(write_error)?;
    file.write_all(bytes).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;

    let checksum = Checksum::from_bytes(bytes);
    tracing::debug!(path = %path.display(), bytes = bytes.len(), checksum = checksum.short(), "wrote output");

    Ok(Emitted {
        path: path.to_path_buf(),
        checksum,
        bytes: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/schema.json");

        let emitted = write_atomic(&path, b"{}\n").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}\n");
        assert_eq!(emitted.bytes, 3);
        assert!(emitted.checksum.verify(b"{}\n"));

        // Only the final file remains
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.xsd");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_atomic_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        // A regular file cannot be used as a directory
        let err = write_atomic(&blocker.join("schema.json"), b"{}").unwrap_err();
        assert!(matches!(err, ConvertError::Write { .. }));
    }
}
