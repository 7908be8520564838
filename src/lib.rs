//! Multi-scale superpixel segmentation for directories of images.
//!
//! One batch run discovers the images under an input directory,
//! segments each image at every requested granularity, enforces label
//! connectivity on each resulting map, writes label grids (CSV) and
//! contour overlays (PNG) into per-granularity subdirectories, and
//! appends the batch's average wall and CPU segmentation times to a
//! cumulative runtime log.
//!
//! The library exposes the pieces separately; [`pipeline::run_batch`]
//! wires them together the way the `supix` binary does.

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod segmentation;
pub mod source;
pub mod timing;

pub use config::{ChannelSet, RunConfig};
pub use error::{PipelineError, PipelineResult, SegmentError};
pub use pipeline::{run_batch, BatchSummary};
pub use segmentation::{
    create_default_segmenter, ConnectivityEnforcer, FloodRelabeler, HistogramSegmenter, LabelMap,
    ScaleResult, Segmenter, SegmenterOptions,
};
