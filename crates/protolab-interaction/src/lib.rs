pub mod gemini_synthesis_agent;
pub mod response;

pub use gemini_synthesis_agent::GeminiSynthesisAgent;
pub use response::{FileRecord, SynthesisResponse};

use async_trait::async_trait;
use protolab_core::{FileSet, Result};

/// The synthesis-service boundary.
///
/// An agent accepts the ordered screen payloads (data URIs, sequence
/// order = navigation order) and returns the generated codebase as a
/// canonical [`FileSet`]. Implementations are stateless; serialization of
/// concurrent invocations is the caller's concern.
#[async_trait]
pub trait SynthesisAgent: Send + Sync {
    /// Human-readable description of the backing service.
    fn describe(&self) -> &str;

    /// Generates a codebase from the ordered screen sequence.
    ///
    /// # Errors
    ///
    /// Returns a `Synthesis` error when the service cannot be reached or
    /// answers with a non-success status, and a `MalformedResponse` error
    /// when the answer cannot be decoded into a non-empty file set.
    async fn generate(&self, screens: &[String]) -> Result<FileSet>;
}
