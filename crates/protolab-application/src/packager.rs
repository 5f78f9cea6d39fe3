//! Archive packaging.
//!
//! Turns a generated [`FileSet`] into a single downloadable zip archive,
//! fully materialized in memory. Entry paths and contents mirror the
//! file set exactly; no manifest or metadata entry is added.

use protolab_core::{FileSet, ProtolabError, Result};
use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Fixed name of the downloadable artifact.
pub const ARCHIVE_FILE_NAME: &str = "prototype-codebase.zip";

/// A fully materialized downloadable archive.
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeArchive {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Packages a file set into a zip archive.
///
/// Every path becomes one entry with its content written verbatim as
/// text; intermediate directory entries implied by the path components
/// are created exactly once (`a/b/c.ts` implies `a/` and `a/b/`).
///
/// # Errors
///
/// An empty file set is a caller error and is rejected with a validation
/// error before any bytes are produced.
pub fn package(files: &FileSet) -> Result<PrototypeArchive> {
    if files.is_empty() {
        return Err(ProtolabError::validation(
            "There is no generated code to package",
        ));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut directories = BTreeSet::new();

    for (path, content) in files.iter() {
        if let Some((parents, _)) = path.rsplit_once('/') {
            let mut prefix = String::new();
            for component in parents.split('/') {
                prefix.push_str(component);
                prefix.push('/');
                if directories.insert(prefix.clone()) {
                    writer
                        .add_directory(prefix.as_str(), options)
                        .map_err(|err| ProtolabError::archive(err.to_string()))?;
                }
            }
        }

        writer
            .start_file(path.as_str(), options)
            .map_err(|err| ProtolabError::archive(err.to_string()))?;
        writer.write_all(content.as_bytes())?;
    }

    let cursor = writer
        .finish()
        .map_err(|err| ProtolabError::archive(err.to_string()))?;

    tracing::debug!(target: "packager", files = files.len(), "Packaged prototype archive");

    Ok(PrototypeArchive {
        file_name: ARCHIVE_FILE_NAME.to_string(),
        bytes: cursor.into_inner(),
    })
}
