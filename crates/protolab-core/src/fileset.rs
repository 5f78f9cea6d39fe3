//! Canonical generated-codebase representation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A canonical path -> content mapping representing a generated codebase.
///
/// Keys are non-empty relative paths with forward-slash separators. Key
/// order carries no meaning; a `BTreeMap` is used so iteration (and the
/// packaged archive) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSet {
    files: BTreeMap<String, String>,
}

impl FileSet {
    /// Creates an empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes a raw service-supplied path into canonical form.
    ///
    /// Backslashes become forward slashes; empty, `.` and duplicate
    /// separators collapse; a leading slash is stripped. Returns `None`
    /// when nothing usable remains or the path tries to escape upwards.
    pub fn normalize_path(path: &str) -> Option<String> {
        let cleaned = path.trim().replace('\\', "/");

        let mut components = Vec::new();
        for component in cleaned.split('/') {
            match component {
                "" | "." => continue,
                ".." => return None,
                other => components.push(other),
            }
        }

        if components.is_empty() {
            None
        } else {
            Some(components.join("/"))
        }
    }

    /// Inserts one file under its normalized path.
    ///
    /// Returns `false` when the path normalizes to nothing and the entry
    /// is dropped. Inserting an existing path replaces the previous
    /// content (last write wins).
    pub fn insert(&mut self, path: &str, content: impl Into<String>) -> bool {
        match Self::normalize_path(path) {
            Some(normalized) => {
                self.files.insert(normalized, content.into());
                true
            }
            None => false,
        }
    }

    /// Returns the content stored under an already-normalized path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Iterates entries in deterministic (sorted) path order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.files.iter()
    }

    /// Iterates the stored paths in deterministic order.
    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.files.keys()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<(String, String)> for FileSet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut files = FileSet::new();
        for (path, content) in iter {
            files.insert(&path, content);
        }
        files
    }
}

/// The outcome of one successful synthesis invocation.
///
/// Exists only between a successful invocation and the next invocation, a
/// clear action, or session teardown. Always replaced wholesale, never
/// merged with a previous result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPrototype {
    /// The generated codebase
    pub files: FileSet,
    /// How many screens the codebase was generated from
    pub screen_count: usize,
    /// Timestamp of the invocation that produced this result (ISO 8601)
    pub generated_at: String,
}

impl GeneratedPrototype {
    /// Wraps a freshly normalized file set.
    pub fn new(files: FileSet, screen_count: usize) -> Self {
        Self {
            files,
            screen_count,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
