mod channels;
mod connectivity;
mod histsplit;
pub mod types;

pub use connectivity::{ConnectivityEnforcer, FloodRelabeler};
pub use histsplit::HistogramSegmenter;
pub use types::{LabelMap, ScaleResult, SegmenterOptions};

use crate::error::SegmentError;
use image::RgbImage;

/// A segmentation capability: one call per image yields a label map for
/// every requested scale.
pub trait Segmenter {
    /// Segment `image` at each requested scale. The result has one entry
    /// per scale, in request order; an empty scale list yields an empty
    /// result. Each map pairs its labels with the scale it was requested
    /// at and the segment count actually achieved.
    fn segment(&self, image: &RgbImage, scales: &[u32]) -> Result<Vec<ScaleResult>, SegmentError>;
}

/// Create the default segmenter (hierarchical histogram splitting).
pub fn create_default_segmenter(
    opts: SegmenterOptions,
) -> Result<Box<dyn Segmenter>, SegmentError> {
    let segmenter = HistogramSegmenter::new(opts)?;
    Ok(Box::new(segmenter))
}
