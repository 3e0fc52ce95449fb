//! crossbeak: token-level timestamps from encoder-decoder cross-attention.
//!
//! Autoregressive speech models attend from each decoded token to the audio
//! frames behind it. This crate turns those cross-attention weights into
//! per-token start times: it gathers the model's alignment heads,
//! standardizes and median-smooths their weights, and aligns tokens to
//! frames with dynamic time warping.
//!
//! # Pipeline
//!
//! - [`attention`]: reassemble chunked decodes and gather alignment heads
//! - [`normalize`]: standardize weights across the output-time axis
//! - [`median`]: denoise each row along the audio-frame axis
//! - [`dtw`]: minimum-cost monotonic token-to-frame alignment
//! - [`extractor`]: orchestration and jump-time assembly
//!
//! # Quick Start
//!
//! ```ignore
//! use crossbeak::config::ExtractorConfig;
//! use crossbeak::extractor::TimestampExtractor;
//!
//! // Alignment heads ship in the model's generation configuration
//! let config = ExtractorConfig::from_json_file("generation_config.json")?;
//! let extractor = TimestampExtractor::new(config)?;
//!
//! // Cross-attention captured while decoding, one entry per chunk
//! let timestamps = extractor.extract(&chunks, sequence_length, Some(num_frames))?;
//! println!("token 1 starts at {:.2}s", timestamps[[0, 1]]);
//! ```

pub mod attention;
pub mod config;
pub mod dtw;
pub mod error;
pub mod extractor;
pub mod median;
pub mod normalize;
