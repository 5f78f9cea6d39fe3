//! Screen ingestion.
//!
//! Converts user-supplied uploads (raster images and zip archives of
//! raster images) into an ordered batch of [`ScreenImage`] values. The
//! collector never touches the sequence itself; the use-case layer
//! appends its output.

use protolab_core::{ProtolabError, Result, ScreenImage};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const IMAGE_MIME_PREFIX: &str = "image/";
const ZIP_MIME_TYPE: &str = "application/zip";

/// A user-selected file as handed over by the upload surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Original file name, for display and error reporting
    pub name: String,
    /// Declared media type
    pub mime_type: String,
    /// Raw file content
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// One input that could not be ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestFailure {
    /// Name of the offending input
    pub input: String,
    /// Human-readable reason
    pub message: String,
}

/// The outcome of one ingestion batch.
///
/// `screens` holds the new entries in their deterministic order: inputs
/// in supplied order, each archive's contribution name-sorted. Failures
/// are per-input; a bad archive never suppresses screens from the other
/// inputs of the same batch.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub screens: Vec<ScreenImage>,
    pub failures: Vec<IngestFailure>,
}

/// Turns upload batches into screen batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenCollector;

impl ScreenCollector {
    pub fn new() -> Self {
        Self
    }

    /// Collects screens from a batch of uploads.
    ///
    /// Classification is by declared media type: `image/*` inputs become
    /// one screen each, `application/zip` inputs contribute their image
    /// entries in name order, anything else is silently skipped. Inputs
    /// are processed one after another so the batch keeps its supplied
    /// order no matter how long an individual archive takes.
    pub async fn collect(&self, inputs: Vec<UploadedFile>) -> IngestReport {
        let mut screens = Vec::new();
        let mut failures = Vec::new();

        for input in inputs {
            if input.mime_type.starts_with(IMAGE_MIME_PREFIX) {
                screens.push(ScreenImage::from_bytes(
                    input.name,
                    &input.mime_type,
                    &input.bytes,
                ));
            } else if input.mime_type == ZIP_MIME_TYPE {
                match collect_archive(input.bytes).await {
                    Ok(batch) => screens.extend(batch),
                    Err(err) => {
                        tracing::warn!(
                            target: "ingest",
                            input = %input.name,
                            error = %err,
                            "Skipping unreadable archive"
                        );
                        failures.push(IngestFailure {
                            input: input.name,
                            message: err.to_string(),
                        });
                    }
                }
            } else {
                tracing::debug!(
                    target: "ingest",
                    input = %input.name,
                    mime_type = %input.mime_type,
                    "Ignoring unsupported media type"
                );
            }
        }

        IngestReport { screens, failures }
    }
}

/// Extracts the image entries of one archive into screens.
///
/// Decompression is CPU-bound, so it runs on the blocking pool.
async fn collect_archive(bytes: Vec<u8>) -> Result<Vec<ScreenImage>> {
    let entries = tokio::task::spawn_blocking(move || extract_archive_images(&bytes))
        .await
        .map_err(|err| ProtolabError::internal(format!("Archive task failed: {err}")))??;

    Ok(entries
        .into_iter()
        .map(|(name, content)| {
            let mime_type = mime_for_entry(&name);
            ScreenImage::from_bytes(name, mime_type, &content)
        })
        .collect())
}

/// Reads the raster-image entries of a zip archive, name-sorted.
///
/// Entry names decide the contributed screen order; the archive's
/// physical order is irrelevant.
fn extract_archive_images(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| ProtolabError::archive(err.to_string()))?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| is_image_entry(name))
        .map(str::to_string)
        .collect();
    names.sort();

    let mut images = Vec::with_capacity(names.len());
    for name in names {
        let mut entry = archive
            .by_name(&name)
            .map_err(|err| ProtolabError::archive(err.to_string()))?;
        if entry.is_dir() {
            continue;
        }

        let mut content = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut content)?;
        images.push((name, content));
    }

    Ok(images)
}

fn is_image_entry(name: &str) -> bool {
    let lower = name.to_lowercase();
    !lower.ends_with('/')
        && (lower.ends_with(".png") || lower.ends_with(".jpg") || lower.ends_with(".jpeg"))
}

fn mime_for_entry(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}
