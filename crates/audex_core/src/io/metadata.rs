//! Optional JSON metadata loading.
//!
//! Metadata is a sidecar JSON object next to the audio (transcript,
//! title, and similar fields). A missing file is not an error, since
//! metadata is optional; a present but malformed file is.

use std::path::Path;

use serde_json::{Map, Value};

use super::{LoadError, LoadResult};

/// Load a metadata object from a JSON file.
///
/// Returns `Ok(None)` when the file does not exist. Fails when the
/// file exists but is not valid JSON or not a JSON object.
pub fn load_metadata(path: impl AsRef<Path>) -> LoadResult<Option<Map<String, Value>>> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(None);
    }

    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value =
        serde_json::from_str(&text).map_err(|source| LoadError::MetadataParse {
            path: path.to_path_buf(),
            source,
        })?;

    match value {
        Value::Object(map) => Ok(Some(map)),
        _ => Err(LoadError::MetadataNotObject {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_none() {
        let result = load_metadata("/nonexistent/meta.json").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn valid_object_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.json");
        std::fs::write(&path, r#"{"transcript": "hello", "year": 2024}"#).unwrap();

        let map = load_metadata(&path).unwrap().unwrap();
        assert_eq!(map.get("transcript").and_then(|v| v.as_str()), Some("hello"));
        assert_eq!(map.get("year").and_then(|v| v.as_i64()), Some(2024));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            load_metadata(&path),
            Err(LoadError::MetadataParse { .. })
        ));
    }

    #[test]
    fn non_object_json_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("array.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        assert!(matches!(
            load_metadata(&path),
            Err(LoadError::MetadataNotObject { .. })
        ));
    }
}
