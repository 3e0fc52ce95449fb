//! Timestamp extraction pipeline: aggregate, standardize, smooth, align.

use ndarray::prelude::*;

use crate::attention::{self, CrossAttentionChunk};
use crate::config::{DEFAULT_MEDIAN_FILTER_WIDTH, ExtractorConfig, Task};
use crate::dtw::{self, AlignmentPath};
use crate::error::{ExtractError, Result};
use crate::median::median_filter;
use crate::normalize::standardize;

/// Extracts per-token start times from decoder cross-attention.
///
/// Built once per model from its [`ExtractorConfig`] and reused across
/// generation calls; extraction itself holds no mutable state.
#[derive(Clone, Debug)]
pub struct TimestampExtractor {
    config: ExtractorConfig,
    median_filter_width: usize,
}

impl TimestampExtractor {
    /// Validate `config` and build an extractor.
    ///
    /// When no median filter width is configured, the
    /// [`DEFAULT_MEDIAN_FILTER_WIDTH`] applies and an advisory is logged.
    /// A [`Task::Translate`] configuration logs a reliability advisory,
    /// since cross-attention tracks source-audio timing while translated
    /// tokens follow the target-language order.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;

        let median_filter_width = match config.median_filter_width {
            Some(width) => width,
            None => {
                tracing::warn!(
                    default = DEFAULT_MEDIAN_FILTER_WIDTH,
                    "median_filter_width not configured, falling back to the default"
                );
                DEFAULT_MEDIAN_FILTER_WIDTH
            }
        };

        if config.task == Task::Translate {
            tracing::warn!("token-level timestamps may be unreliable for the translate task");
        }

        Ok(Self {
            config,
            median_filter_width,
        })
    }

    /// The configuration the extractor was built from.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The effective median filter window width.
    pub fn median_filter_width(&self) -> usize {
        self.median_filter_width
    }

    /// Convert an encoder frame index to seconds.
    pub fn frame_to_secs(&self, frame: usize) -> f32 {
        frame as f32 * self.config.time_precision
    }

    /// Convert seconds to the nearest encoder frame index.
    pub fn secs_to_frame(&self, secs: f32) -> usize {
        (secs / self.config.time_precision).round() as usize
    }

    /// Extract token start times for every batch element of one decode.
    ///
    /// # Arguments
    /// * `chunks` - Cross-attention captured while decoding, one entry per
    ///   chunk, each ordered by decoder layer
    /// * `sequence_length` - Decoded sequence length including the
    ///   start-of-sequence position; must equal the attention output
    ///   length plus one
    /// * `num_frames` - Optional cap truncating the input-time axis to the
    ///   real audio length
    ///
    /// Returns `[batch, sequence_length]` start times in seconds. Index 0
    /// of each row stays at 0.0, the start-of-sequence convention; token k
    /// starts at row index k.
    ///
    /// # Errors
    ///
    /// Propagates the aggregation errors of
    /// [`attention::aggregate_alignment_heads`], fails with
    /// [`ExtractError::SequenceLengthMismatch`] when `sequence_length`
    /// disagrees with the attention tensors, and with
    /// [`ExtractError::DegenerateAttention`] when standardization meets a
    /// constant attention column.
    pub fn extract(
        &self,
        chunks: &[CrossAttentionChunk],
        sequence_length: usize,
        num_frames: Option<usize>,
    ) -> Result<Array2<f32>> {
        let weights = attention::aggregate_alignment_heads(
            chunks,
            &self.config.alignment_heads,
            self.config.decoder_layers,
            num_frames,
        )?;

        let (batch, heads, output_length, input_length) = weights.dim();
        if sequence_length != output_length + 1 {
            return Err(ExtractError::SequenceLengthMismatch {
                sequence_length,
                output_length,
            }
            .into());
        }

        tracing::debug!(
            batch,
            heads,
            output_length,
            input_length,
            "extracting token timestamps"
        );

        let mut timestamps = Array2::zeros((batch, sequence_length));

        // A decode that produced only the start token has nothing to align
        if output_length == 0 {
            return Ok(timestamps);
        }

        for element in 0..batch {
            let mut standardized = standardize(weights.index_axis(Axis(0), element))?;
            self.smooth_rows(&mut standardized)?;

            let merged = standardized.sum_axis(Axis(0)) / heads as f32;
            let cost_source = -merged;
            let path = dtw::dynamic_time_warping(cost_source.view());

            tracing::trace!(element, steps = path.len(), "aligned batch element");

            write_jump_times(
                &path,
                self.config.time_precision,
                &mut timestamps.row_mut(element),
            );
        }

        Ok(timestamps)
    }

    /// Median-smooth every (head, output row) lane along the input axis.
    fn smooth_rows(&self, weights: &mut Array3<f32>) -> Result<()> {
        let mut lane_buffer = Vec::with_capacity(weights.len_of(Axis(2)));

        for mut lane in weights.rows_mut() {
            lane_buffer.clear();
            lane_buffer.extend(lane.iter().copied());

            let filtered = median_filter(&lane_buffer, self.median_filter_width)?;
            for (slot, value) in lane.iter_mut().zip(filtered) {
                *slot = value;
            }
        }

        Ok(())
    }
}

/// Write one start time per decoded token into `row`, starting at index 1.
///
/// A token starts wherever the path's text index advances past its
/// predecessor; the frame index paired with that step, scaled by
/// `time_precision`, is the token's start in seconds.
fn write_jump_times(path: &AlignmentPath, time_precision: f32, row: &mut ArrayViewMut1<f32>) {
    let mut slot = 1;

    for (step, &text_index) in path.text_indices.iter().enumerate() {
        if step == 0 || text_index != path.text_indices[step - 1] {
            row[slot] = path.time_indices[step] as f32 * time_precision;
            slot += 1;
        }
    }
}
