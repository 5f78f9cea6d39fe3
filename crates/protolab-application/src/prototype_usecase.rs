//! Prototype session use case.
//!
//! This is the session object that owns the screen sequence and the
//! latest generation result, and exposes the user-facing pipeline
//! operations: ingest, remove, reorder, clear, generate, download.
//! Every operation is all-or-nothing from the caller's perspective and
//! reports failure as a typed, human-readable error.

use crate::ingest::{IngestFailure, ScreenCollector, UploadedFile};
use crate::packager::{self, PrototypeArchive};
use protolab_core::{GeneratedPrototype, ProtolabError, Result, ScreenImage, ScreenSequence};
use protolab_interaction::SynthesisAgent;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// What an ingest call did, for the notification surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// Number of screens appended to the sequence
    pub added: usize,
    /// Per-input failures (the rest of the batch still went through)
    pub failures: Vec<IngestFailure>,
}

/// Owns one user's pipeline state for the lifetime of the page session.
///
/// The sequence and the held result are only mutated through these
/// methods, and generation is serialized by an in-flight guard, so no
/// state is ever observable mid-update.
pub struct PrototypeUseCase {
    /// Current screen sequence
    sequence: RwLock<ScreenSequence>,
    /// Result of the latest successful generation, if any
    prototype: RwLock<Option<GeneratedPrototype>>,
    /// Held while a synthesis call is in flight; at most one at a time
    generation_guard: Mutex<()>,
    collector: ScreenCollector,
    agent: Arc<dyn SynthesisAgent>,
}

impl PrototypeUseCase {
    /// Creates a fresh session around a synthesis agent.
    pub fn new(agent: Arc<dyn SynthesisAgent>) -> Self {
        Self {
            sequence: RwLock::new(ScreenSequence::new()),
            prototype: RwLock::new(None),
            generation_guard: Mutex::new(()),
            collector: ScreenCollector::new(),
            agent,
        }
    }

    /// Ingests a batch of uploads and appends the collected screens to
    /// the end of the sequence.
    ///
    /// Per-input failures (a corrupt archive) are reported in the outcome
    /// without aborting the rest of the batch.
    pub async fn ingest(&self, inputs: Vec<UploadedFile>) -> Result<IngestOutcome> {
        let report = self.collector.collect(inputs).await;
        let added = report.screens.len();

        if added > 0 {
            let mut sequence = self.sequence.write().await;
            sequence.append(report.screens)?;
        }

        tracing::info!(
            target: "prototype",
            added,
            failures = report.failures.len(),
            "Ingested upload batch"
        );

        Ok(IngestOutcome {
            added,
            failures: report.failures,
        })
    }

    /// Returns the current sequence for display.
    pub async fn screens(&self) -> Vec<ScreenImage> {
        self.sequence.read().await.screens().to_vec()
    }

    /// Removes one screen by id. Absent ids are a no-op.
    pub async fn remove_screen(&self, id: &str) -> bool {
        self.sequence.write().await.remove(id)
    }

    /// Moves the screen at `from` to position `to`.
    pub async fn reorder(&self, from: usize, to: usize) -> Result<()> {
        self.sequence.write().await.reorder(from, to)
    }

    /// Empties the sequence and discards any held generation result.
    pub async fn clear_all(&self) {
        self.sequence.write().await.clear();
        *self.prototype.write().await = None;
        tracing::info!(target: "prototype", "Cleared session state");
    }

    /// Returns the latest generation result, if one is held.
    pub async fn prototype(&self) -> Option<GeneratedPrototype> {
        self.prototype.read().await.clone()
    }

    /// Submits the current sequence to the synthesis service.
    ///
    /// Rejected locally, before any service call, when a generation is
    /// already in flight or the sequence is empty - in both cases any
    /// previously held result stays untouched. Once the call starts, the
    /// previous result is discarded, so a failed regeneration leaves the
    /// session with no result rather than a stale one. A successful call
    /// replaces the result wholesale.
    pub async fn generate(&self) -> Result<GeneratedPrototype> {
        let _in_flight = self
            .generation_guard
            .try_lock()
            .map_err(|_| ProtolabError::validation("A generation is already in progress"))?;

        let sources = {
            let sequence = self.sequence.read().await;
            if sequence.is_empty() {
                return Err(ProtolabError::validation(
                    "Add at least one screenshot before generating",
                ));
            }
            sequence.sources()
        };

        *self.prototype.write().await = None;

        tracing::info!(target: "prototype", screens = sources.len(), "Starting generation");
        let files = self.agent.generate(&sources).await?;

        let generated = GeneratedPrototype::new(files, sources.len());
        *self.prototype.write().await = Some(generated.clone());
        Ok(generated)
    }

    /// Packages the held result into a downloadable archive.
    ///
    /// The archive is rebuilt from the currently held file set on every
    /// call; nothing is cached.
    pub async fn download(&self) -> Result<PrototypeArchive> {
        let prototype = self.prototype.read().await;
        match prototype.as_ref() {
            Some(generated) => packager::package(&generated.files),
            None => Err(ProtolabError::validation(
                "Generate a prototype before downloading",
            )),
        }
    }
}
