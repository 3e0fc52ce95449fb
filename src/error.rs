//! Error types for crossbeak organized by processing stage.

use ndarray::ShapeError;
use thiserror::Error;

/// Timestamp extraction error variants organized by processing stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration stage error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Extraction stage error
    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Configuration errors (alignment heads, filter width, time precision).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No alignment heads configured
    #[error("no alignment heads configured; timestamp extraction needs at least one (layer, head) pair")]
    MissingAlignmentHeads,

    /// Alignment head outside the model's layer/head ranges
    #[error(
        "alignment head (layer {layer}, head {head}) out of range for {decoder_layers} decoder layers and {decoder_attention_heads} heads"
    )]
    AlignmentHeadOutOfRange {
        layer: usize,
        head: usize,
        decoder_layers: usize,
        decoder_attention_heads: usize,
    },

    /// Invalid median filter window width
    #[error("invalid median filter width: {width} (must be a positive odd integer)")]
    InvalidMedianWidth { width: usize },

    /// Invalid seconds-per-frame value
    #[error("invalid time precision: {value}s (must be positive and finite)")]
    InvalidTimePrecision { value: f32 },

    /// IO error while reading a configuration file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed configuration JSON
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Extraction errors (aggregation, normalization, alignment).
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Cross-attention tensors absent from the decoder output
    #[error("no cross-attention data; run generation with attention outputs enabled")]
    MissingAttentionData,

    /// A decode chunk carried the wrong number of per-layer tensors
    #[error("cross-attention chunk {chunk} has {got} layers, expected {expected}")]
    LayerCountMismatch {
        chunk: usize,
        expected: usize,
        got: usize,
    },

    /// Token sequence length inconsistent with the attention output length
    #[error(
        "sequence length {sequence_length} does not fit attention output length {output_length} (expected output length + 1)"
    )]
    SequenceLengthMismatch {
        sequence_length: usize,
        output_length: usize,
    },

    /// Attention constant across the output axis, standardization undefined
    #[error(
        "attention for head {head} is constant across the output axis at input position {input_position}"
    )]
    DegenerateAttention { head: usize, input_position: usize },

    /// ndarray shape error
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Result type alias for crossbeak operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// std::io::Error → ConfigError → Error
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Config(ConfigError::Io(e))
    }
}

// serde_json::Error → ConfigError → Error
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(ConfigError::Json(e))
    }
}

// ShapeError → ExtractError → Error
impl From<ShapeError> for Error {
    fn from(e: ShapeError) -> Self {
        Error::Extract(ExtractError::Shape(e))
    }
}
