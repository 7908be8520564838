//! Shared segmentation types.

use crate::config::ChannelSet;
use ndarray::Array2;

/// A superpixel label map: one `u32` segment id per pixel, indexed
/// `[y, x]`, same dimensions as the source image.
///
/// Label 0 is a valid segment id, not a background marker. After
/// connectivity enforcement every label value covers exactly one
/// 4-connected region.
pub type LabelMap = Array2<u32>;

/// One segmentation outcome, explicitly paired with the scale that
/// requested it.
///
/// Carrying the scale here (instead of relying on positions in the
/// request list) keeps artifact routing correct even if an
/// implementation ever reorders or drops scales it cannot satisfy.
#[derive(Debug, Clone)]
pub struct ScaleResult {
    /// Requested target superpixel count.
    pub scale: u32,
    /// Label map produced for this scale.
    pub labels: LabelMap,
    /// Superpixel count actually reached; at most `scale`, lower when
    /// splitting exhausted before the target.
    pub achieved: u32,
}

/// Tunables captured by a segmenter at construction, so a single
/// `segment` call per image carries the whole run configuration.
#[derive(Debug, Clone)]
pub struct SegmenterOptions {
    /// Minimum stddev x occupied value range for a segment to split.
    pub split_threshold: f64,
    /// Histogram bins used when scoring candidate splits.
    pub bins: u32,
    /// Minimum pixels per segment; no split may produce a smaller side.
    pub min_segment_size: u32,
    /// Channel families turned into planes.
    pub channels: ChannelSet,
    /// Box-blur the planes before splitting.
    pub blur: bool,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            split_threshold: 0.0,
            bins: 32,
            min_segment_size: 64,
            channels: ChannelSet::ALL,
            blur: false,
        }
    }
}
