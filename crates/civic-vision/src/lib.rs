//! Civic Vision: multimodal analysis of uploaded photos
//!
//! Sends an image and a fixed instructional prompt to a Gemini-style
//! inference endpoint and turns the free-text answer into a structured
//! [`AnalysisOutcome`]. A malformed model response degrades to "no
//! issues detected" rather than failing the request; only the network
//! call itself can error.

pub mod gemini;
pub mod parser;

pub use gemini::{GeminiConfig, GeminiVision};
pub use parser::{parse_model_output, AnalysisOutcome};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the vision call. Parse problems are not represented
/// here; they are absorbed by the parser.
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("CONFIG/{0}")]
    Config(String),

    #[error("UPSTREAM/{0}")]
    Upstream(String),
}

/// Seam between the HTTP surface and the concrete vision provider,
/// so handlers can be exercised with a stub analyzer.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Analyze one image. `mime_type` is the upload's content type
    /// (e.g. "image/jpeg").
    async fn analyze(&self, image: &[u8], mime_type: &str) -> Result<AnalysisOutcome, VisionError>;
}
