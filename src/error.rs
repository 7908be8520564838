//! Error types for the batch pipeline.
//!
//! The taxonomy separates fatal configuration problems (bad input
//! directory, unwritable output location, degenerate parameters) from
//! per-image failures the batch recovers from (decode/segmentation
//! errors, artifact write errors).

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`Segmenter`](crate::segmentation::Segmenter)
/// implementation. These are recoverable at batch level: the affected
/// image is skipped and processing continues.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The input image has no pixels.
    #[error("empty image: nothing to segment")]
    EmptyImage,

    /// No color channel family is enabled, so no planes can be built.
    #[error("no color channels enabled")]
    NoChannels,

    /// A segmenter option has a degenerate value.
    #[error("invalid segmenter option: {0}")]
    InvalidOption(&'static str),
}

/// Errors surfaced by the batch controller.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invalid run configuration. Fatal: aborts before any image is
    /// processed.
    #[error("configuration error: {0}")]
    Config(String),

    /// One image failed to decode or segment. The controller skips the
    /// image's remaining stages and moves to the next image.
    #[error("segmentation failed for {}: {message}", .path.display())]
    Segmentation { path: PathBuf, message: String },

    /// One artifact failed to write. Non-fatal by default; promoted to
    /// batch-fatal when strict writes are requested.
    #[error("failed to write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}

/// Convenience alias for pipeline results.
pub type PipelineResult<T> = Result<T, PipelineError>;
