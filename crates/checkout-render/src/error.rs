//! # Render Error Types

use thiserror::Error;

/// Errors from QR and PDF rendering.
///
/// `DecodingUnavailable` and `CapabilityUnavailable` are not failures of
/// the input; the kiosk falls back to manual entry or skips the artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The payload could not be turned into a QR symbol (e.g. too long).
    #[error("QR encoding failed: {0}")]
    Encoding(String),

    /// This build cannot read codes from images.
    #[error("Code decoding is not available; enter the code manually")]
    DecodingUnavailable,

    /// This build cannot produce the named artifact.
    #[error("{0} is not available in this build")]
    CapabilityUnavailable(String),

    /// The image bytes could not be read or written.
    #[error("Image error: {0}")]
    Image(String),

    /// The PDF library rejected the document.
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;
