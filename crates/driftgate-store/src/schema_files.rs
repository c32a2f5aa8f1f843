//! File-based canonical schema storage
//!
//! One canonical JSON file per endpoint-key (`<key>.json`, unversioned),
//! overwritten in place on promotion. Historical drafts live next to it as
//! `<key>_v<N>.json`; N is assigned by scanning existing files at write
//! time, so it is monotonically increasing per key but can race between
//! concurrent writers.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::{io_error, schema_missing, serde_error, Result};

/// Directory holding canonical expected schemas and their draft snapshots
#[derive(Debug, Clone)]
pub struct SchemaDir {
    root: PathBuf,
}

impl SchemaDir {
    /// Open a schema directory, creating it if needed
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        fs::create_dir_all(root.as_ref()).map_err(|e| io_error("schema_dir_open", e))?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }

    /// Path of the canonical (unversioned) schema file for a key
    pub fn canonical_path(&self, schema_ref: &str) -> PathBuf {
        self.root.join(format!("{}.json", schema_ref))
    }

    /// Read the canonical expected schema for a reference
    ///
    /// # Errors
    ///
    /// Returns `DgErrorKind::SchemaMissing` if the file is absent or
    /// unreadable, `DgErrorKind::Serialization` if it is not valid JSON.
    pub fn read_expected(&self, schema_ref: &str) -> Result<Value> {
        let path = self.canonical_path(schema_ref);
        let text = fs::read_to_string(&path).map_err(|_| schema_missing(schema_ref))?;
        serde_json::from_str(&text).map_err(|e| serde_error("read_expected_schema", e))
    }

    /// True if the canonical schema file exists
    pub fn has_expected(&self, schema_ref: &str) -> bool {
        self.canonical_path(schema_ref).is_file()
    }

    /// Overwrite the canonical expected schema in place (promotion path)
    pub fn write_canonical(&self, schema_ref: &str, shape: &Value) -> Result<()> {
        let encoded = serde_json::to_string_pretty(shape)
            .map_err(|e| serde_error("write_canonical_schema", e))?;
        fs::write(self.canonical_path(schema_ref), encoded)
            .map_err(|e| io_error("write_canonical_schema", e))
    }

    /// Next draft number for a key: max existing `_v<N>` plus one
    pub fn next_draft_version(&self, schema_ref: &str) -> Result<u32> {
        let prefix = format!("{}_v", schema_ref);
        let mut max_seen = 0u32;

        let entries = fs::read_dir(&self.root).map_err(|e| io_error("scan_drafts", e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_error("scan_drafts", e))?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(".json") else {
                continue;
            };
            if let Some(version_text) = stem.strip_prefix(&prefix) {
                if let Ok(version) = version_text.parse::<u32>() {
                    max_seen = max_seen.max(version);
                }
            }
        }
        Ok(max_seen + 1)
    }

    /// Write a numbered draft snapshot, returning the version assigned
    ///
    /// The version is computed by scanning at write time; two concurrent
    /// writers can observe the same maximum and collide.
    pub fn write_draft(&self, schema_ref: &str, shape: &Value) -> Result<u32> {
        let version = self.next_draft_version(schema_ref)?;
        let encoded =
            serde_json::to_string_pretty(shape).map_err(|e| serde_error("write_draft", e))?;
        let path = self.root.join(format!("{}_v{}.json", schema_ref, version));
        fs::write(path, encoded).map_err(|e| io_error("write_draft", e))?;
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_dir() -> (TempDir, SchemaDir) {
        let tmp = TempDir::new().unwrap();
        let dir = SchemaDir::open(tmp.path()).unwrap();
        (tmp, dir)
    }

    #[test]
    fn test_canonical_round_trip() {
        let (_tmp, dir) = test_dir();
        let shape = json!({"a": "string"});
        dir.write_canonical("Get_Balance", &shape).unwrap();
        assert!(dir.has_expected("Get_Balance"));
        assert_eq!(dir.read_expected("Get_Balance").unwrap(), shape);
    }

    #[test]
    fn test_missing_schema_is_schema_missing_kind() {
        use driftgate_core::errors::DgErrorKind;
        let (_tmp, dir) = test_dir();
        let err = dir.read_expected("nope").unwrap_err();
        assert_eq!(err.kind(), DgErrorKind::SchemaMissing);
    }

    #[test]
    fn test_canonical_overwrites_in_place() {
        let (_tmp, dir) = test_dir();
        dir.write_canonical("k", &json!({"a": "string"})).unwrap();
        dir.write_canonical("k", &json!({"a": "number"})).unwrap();
        assert_eq!(dir.read_expected("k").unwrap(), json!({"a": "number"}));
    }

    #[test]
    fn test_draft_versions_are_monotonic() {
        let (_tmp, dir) = test_dir();
        assert_eq!(dir.write_draft("k", &json!(1)).unwrap(), 1);
        assert_eq!(dir.write_draft("k", &json!(2)).unwrap(), 2);
        assert_eq!(dir.write_draft("k", &json!(3)).unwrap(), 3);
    }

    #[test]
    fn test_draft_scan_survives_gaps() {
        let (_tmp, dir) = test_dir();
        dir.write_draft("k", &json!(1)).unwrap();
        // Simulate an externally created later draft.
        std::fs::write(dir.canonical_path("k_v7"), "{}").unwrap();
        assert_eq!(dir.next_draft_version("k").unwrap(), 8);
    }

    #[test]
    fn test_drafts_do_not_touch_canonical() {
        let (_tmp, dir) = test_dir();
        dir.write_canonical("k", &json!({"a": "string"})).unwrap();
        dir.write_draft("k", &json!({"a": "number"})).unwrap();
        assert_eq!(dir.read_expected("k").unwrap(), json!({"a": "string"}));
    }

    #[test]
    fn test_draft_versions_are_per_key() {
        let (_tmp, dir) = test_dir();
        assert_eq!(dir.write_draft("a", &json!(1)).unwrap(), 1);
        assert_eq!(dir.write_draft("b", &json!(1)).unwrap(), 1);
    }
}
