//! Cross-attention aggregation: chunk concatenation and head selection.

use ndarray::prelude::*;

use crate::config::AlignmentHead;
use crate::error::{ConfigError, ExtractError, Result};

/// Cross-attention captured for one decode chunk, ordered by decoder layer.
///
/// Each tensor is `[batch, heads, chunk_output_length, input_length]`; a
/// chunked or streaming decode produces one entry per chunk, each covering
/// a slice of the full output-time axis.
pub type CrossAttentionChunk = Vec<Array4<f32>>;

/// Gather the alignment heads' attention into one
/// `[batch, heads, output_length, input_length]` stack.
///
/// Per decoder layer, the chunks' tensors are concatenated along the
/// output-time axis to reassemble the full decode; the configured heads are
/// then sliced out of their layers and stacked in configuration order. A
/// `num_frames` cap truncates the input-time axis to the real audio length;
/// caps at or beyond `input_length` change nothing.
///
/// # Errors
///
/// Fails with [`ExtractError::MissingAttentionData`] when `chunks` is
/// empty, [`ExtractError::LayerCountMismatch`] when a chunk does not carry
/// one tensor per decoder layer, [`ConfigError::AlignmentHeadOutOfRange`]
/// when a head references past the tensors' dimensions, and
/// [`ExtractError::Shape`] when tensor shapes disagree across chunks or
/// layers.
pub fn aggregate_alignment_heads(
    chunks: &[CrossAttentionChunk],
    alignment_heads: &[AlignmentHead],
    decoder_layers: usize,
    num_frames: Option<usize>,
) -> Result<Array4<f32>> {
    if chunks.is_empty() {
        return Err(ExtractError::MissingAttentionData.into());
    }
    if alignment_heads.is_empty() {
        return Err(ConfigError::MissingAlignmentHeads.into());
    }

    for (index, chunk) in chunks.iter().enumerate() {
        if chunk.len() != decoder_layers {
            return Err(ExtractError::LayerCountMismatch {
                chunk: index,
                expected: decoder_layers,
                got: chunk.len(),
            }
            .into());
        }
    }

    let mut per_layer = Vec::with_capacity(decoder_layers);
    for layer in 0..decoder_layers {
        let parts: Vec<_> = chunks.iter().map(|chunk| chunk[layer].view()).collect();
        per_layer.push(ndarray::concatenate(Axis(2), &parts)?);
    }

    let Some(first) = per_layer.first() else {
        return Err(ExtractError::MissingAttentionData.into());
    };
    let input_length = first.len_of(Axis(3));
    let frames = num_frames.map_or(input_length, |cap| cap.min(input_length));

    let mut selected = Vec::with_capacity(alignment_heads.len());
    for alignment_head in alignment_heads {
        let layer = per_layer.get(alignment_head.layer).ok_or_else(|| {
            ConfigError::AlignmentHeadOutOfRange {
                layer: alignment_head.layer,
                head: alignment_head.head,
                decoder_layers: per_layer.len(),
                decoder_attention_heads: first.len_of(Axis(1)),
            }
        })?;
        if alignment_head.head >= layer.len_of(Axis(1)) {
            return Err(ConfigError::AlignmentHeadOutOfRange {
                layer: alignment_head.layer,
                head: alignment_head.head,
                decoder_layers: per_layer.len(),
                decoder_attention_heads: layer.len_of(Axis(1)),
            }
            .into());
        }

        selected.push(layer.slice(s![.., alignment_head.head, .., ..frames]));
    }

    // [heads, batch, output, input] from the stack, batch leading for output
    let stacked = ndarray::stack(Axis(0), &selected)?;
    Ok(stacked.permuted_axes([1, 0, 2, 3]))
}
