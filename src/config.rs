//! Extractor configuration mirroring the upstream model configuration JSON.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Default median filter window width
pub const DEFAULT_MEDIAN_FILTER_WIDTH: usize = 7;

/// Default seconds of audio covered by one encoder frame
pub const DEFAULT_TIME_PRECISION: f32 = 0.02;

/// A (decoder layer, attention head) pair whose cross-attention tracks token timing.
///
/// Deserializes from the two-element `[layer, head]` array form used in
/// generation configuration JSON.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(from = "(usize, usize)")]
pub struct AlignmentHead {
    /// Decoder layer index
    pub layer: usize,
    /// Attention head index within the layer
    pub head: usize,
}

impl AlignmentHead {
    /// Create an alignment head reference.
    pub fn new(layer: usize, head: usize) -> Self {
        Self { layer, head }
    }
}

impl From<(usize, usize)> for AlignmentHead {
    fn from((layer, head): (usize, usize)) -> Self {
        Self { layer, head }
    }
}

/// Generation task that produced the token sequences.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Tokens transcribe the source audio
    #[default]
    Transcribe,
    /// Tokens translate the source audio into another language
    Translate,
}

/// Configuration for token-level timestamp extraction.
///
/// Field names follow the upstream model and generation configuration JSON
/// keys, so the struct deserializes directly from that JSON (unknown fields
/// are ignored).
#[derive(Clone, Debug, Deserialize)]
pub struct ExtractorConfig {
    /// Number of decoder layers producing cross-attention
    pub decoder_layers: usize,

    /// Number of attention heads per decoder layer
    pub decoder_attention_heads: usize,

    /// Alignment heads contributing to timestamp estimation
    pub alignment_heads: Vec<AlignmentHead>,

    /// Median filter window width; [`DEFAULT_MEDIAN_FILTER_WIDTH`] applies
    /// when unset, with an advisory logged at construction
    #[serde(default)]
    pub median_filter_width: Option<usize>,

    /// Seconds of audio covered by one encoder frame
    #[serde(default = "default_time_precision")]
    pub time_precision: f32,

    /// Task that produced the token sequences
    #[serde(default)]
    pub task: Task,
}

fn default_time_precision() -> f32 {
    DEFAULT_TIME_PRECISION
}

impl ExtractorConfig {
    /// Create a configuration with defaults for the optional fields.
    pub fn new(
        decoder_layers: usize,
        decoder_attention_heads: usize,
        alignment_heads: Vec<AlignmentHead>,
    ) -> Self {
        Self {
            decoder_layers,
            decoder_attention_heads,
            alignment_heads,
            median_filter_width: None,
            time_precision: DEFAULT_TIME_PRECISION,
            task: Task::Transcribe,
        }
    }

    /// Parse a configuration from model configuration JSON content.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a model configuration JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check that the configuration can drive extraction.
    ///
    /// # Errors
    ///
    /// Fails when no alignment heads are configured, when an alignment head
    /// references a layer or head outside the declared decoder shape, when
    /// a configured median filter width is zero or even, or when the time
    /// precision is not a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.alignment_heads.is_empty() {
            return Err(ConfigError::MissingAlignmentHeads.into());
        }

        for head in &self.alignment_heads {
            if head.layer >= self.decoder_layers || head.head >= self.decoder_attention_heads {
                return Err(ConfigError::AlignmentHeadOutOfRange {
                    layer: head.layer,
                    head: head.head,
                    decoder_layers: self.decoder_layers,
                    decoder_attention_heads: self.decoder_attention_heads,
                }
                .into());
            }
        }

        if let Some(width) = self.median_filter_width
            && (width == 0 || width % 2 == 0)
        {
            return Err(ConfigError::InvalidMedianWidth { width }.into());
        }

        if !(self.time_precision.is_finite() && self.time_precision > 0.0) {
            return Err(ConfigError::InvalidTimePrecision {
                value: self.time_precision,
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn parses_generation_config_json() {
        let json = r#"{
            "decoder_layers": 4,
            "decoder_attention_heads": 6,
            "alignment_heads": [[2, 3], [3, 0]],
            "median_filter_width": 7,
            "max_length": 448,
            "suppress_tokens": [1, 2, 7]
        }"#;

        let config = ExtractorConfig::from_json_str(json).unwrap();

        assert_eq!(config.decoder_layers, 4);
        assert_eq!(config.decoder_attention_heads, 6);
        assert_eq!(
            config.alignment_heads,
            vec![AlignmentHead::new(2, 3), AlignmentHead::new(3, 0)]
        );
        assert_eq!(config.median_filter_width, Some(7));
        assert!((config.time_precision - DEFAULT_TIME_PRECISION).abs() < 1e-6);
        assert_eq!(config.task, Task::Transcribe);
        config.validate().unwrap();
    }

    #[test]
    fn parses_lowercase_task() {
        let json = r#"{
            "decoder_layers": 2,
            "decoder_attention_heads": 2,
            "alignment_heads": [[0, 0]],
            "task": "translate"
        }"#;

        let config = ExtractorConfig::from_json_str(json).unwrap();

        assert_eq!(config.task, Task::Translate);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let result = ExtractorConfig::from_json_str("{");

        assert!(matches!(result, Err(Error::Config(ConfigError::Json(_)))));
    }

    #[test]
    fn empty_alignment_heads_rejected() {
        let config = ExtractorConfig::new(4, 6, Vec::new());

        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::MissingAlignmentHeads))
        ));
    }

    #[test]
    fn out_of_range_alignment_head_rejected() {
        let config = ExtractorConfig::new(4, 6, vec![AlignmentHead::new(4, 0)]);

        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::AlignmentHeadOutOfRange {
                layer: 4,
                head: 0,
                decoder_layers: 4,
                decoder_attention_heads: 6,
            }))
        ));
    }

    #[test]
    fn even_median_width_rejected() {
        let mut config = ExtractorConfig::new(4, 6, vec![AlignmentHead::new(0, 0)]);
        config.median_filter_width = Some(4);

        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidMedianWidth { width: 4 }))
        ));
    }

    #[test]
    fn zero_median_width_rejected() {
        let mut config = ExtractorConfig::new(4, 6, vec![AlignmentHead::new(0, 0)]);
        config.median_filter_width = Some(0);

        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidMedianWidth { width: 0 }))
        ));
    }

    #[test]
    fn nonpositive_time_precision_rejected() {
        let mut config = ExtractorConfig::new(4, 6, vec![AlignmentHead::new(0, 0)]);
        config.time_precision = 0.0;

        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidTimePrecision { .. }))
        ));

        config.time_precision = f32::NAN;

        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::InvalidTimePrecision { .. }))
        ));
    }
}
