//! Synthesis response decoding.
//!
//! The service has returned its file set in two equivalent shapes across
//! contract revisions: an ordered list of `{path, content}` records
//! (optionally wrapped in a `files` object) or a direct path -> content
//! mapping. Both decode into one tagged union here and normalize through
//! a single conversion into the canonical [`FileSet`].

use protolab_core::FileSet;
use serde::Deserialize;
use std::collections::BTreeMap;

/// One `{path, content}` record from the list-shaped response.
///
/// Both fields are optional at the wire level; records missing either one
/// are dropped during normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// The accepted response shapes, tried in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SynthesisResponse {
    /// `{ "files": [{path, content}, ...] }` - the declared output schema
    Wrapped { files: Vec<FileRecord> },
    /// Bare `[{path, content}, ...]`
    Records(Vec<FileRecord>),
    /// Direct `{ "<path>": "<content>", ... }`
    Mapping(BTreeMap<String, String>),
}

impl SynthesisResponse {
    /// Normalizes any accepted shape into the canonical file set.
    ///
    /// List records with a missing or empty path, or missing content, are
    /// dropped; when a path occurs twice the later record wins.
    pub fn into_file_set(self) -> FileSet {
        match self {
            Self::Wrapped { files } | Self::Records(files) => {
                let mut set = FileSet::new();
                for record in files {
                    if let (Some(path), Some(content)) = (record.path, record.content) {
                        set.insert(&path, content);
                    }
                }
                set
            }
            Self::Mapping(map) => map.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> FileSet {
        serde_json::from_str::<SynthesisResponse>(json)
            .unwrap()
            .into_file_set()
    }

    #[test]
    fn test_wrapped_shape_decodes() {
        let files = decode(r#"{"files": [{"path": "src/app/page.tsx", "content": "X"}]}"#);

        assert_eq!(files.len(), 1);
        assert_eq!(files.get("src/app/page.tsx"), Some("X"));
    }

    #[test]
    fn test_record_list_last_write_wins() {
        let files = decode(
            r#"[{"path": "src/app/page.tsx", "content": "X"},
                {"path": "src/app/page.tsx", "content": "Y"}]"#,
        );

        assert_eq!(files.len(), 1);
        assert_eq!(files.get("src/app/page.tsx"), Some("Y"));
    }

    #[test]
    fn test_mapping_shape_matches_record_shape() {
        let from_map = decode(r#"{"src/app/page.tsx": "X"}"#);
        let from_records = decode(r#"[{"path": "src/app/page.tsx", "content": "X"}]"#);

        assert_eq!(from_map, from_records);
    }

    #[test]
    fn test_incomplete_records_are_dropped() {
        let files = decode(
            r#"[{"path": "kept.ts", "content": "1"},
                {"path": "", "content": "no path"},
                {"content": "also no path"},
                {"path": "no-content.ts"}]"#,
        );

        assert_eq!(files.len(), 1);
        assert_eq!(files.get("kept.ts"), Some("1"));
    }

    #[test]
    fn test_unrecognized_shape_is_an_error() {
        assert!(serde_json::from_str::<SynthesisResponse>(r#""just a string""#).is_err());
        assert!(serde_json::from_str::<SynthesisResponse>(r#"{"files": 42}"#).is_err());
    }

    #[test]
    fn test_mapping_with_files_key_is_still_a_mapping() {
        // A map that happens to contain a file literally named "files"
        let files = decode(r#"{"files": "content of a file named files"}"#);

        assert_eq!(files.get("files"), Some("content of a file named files"));
    }
}
