//! Run configuration.
//!
//! A [`RunConfig`] is assembled once (by the CLI or by a test) and shared
//! read-only with every stage of the batch.

use crate::error::{PipelineError, PipelineResult};
use std::path::PathBuf;

/// Color channel families fed to the segmenter.
///
/// Each enabled family contributes three planes (nine planes when all are
/// enabled). At least one family must be enabled for segmentation to make
/// sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSet {
    pub rgb: bool,
    pub hsv: bool,
    pub lab: bool,
}

impl ChannelSet {
    /// All three families enabled.
    pub const ALL: ChannelSet = ChannelSet {
        rgb: true,
        hsv: true,
        lab: true,
    };

    /// True when no family is enabled.
    pub fn is_empty(&self) -> bool {
        !(self.rgb || self.hsv || self.lab)
    }

    /// Number of channel planes the set resolves to.
    pub fn plane_count(&self) -> usize {
        3 * (self.rgb as usize + self.hsv as usize + self.lab as usize)
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::ALL
    }
}

/// Immutable value set for one batch run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory of images to process.
    pub input_dir: PathBuf,
    /// Label CSV output base directory. `None` disables label output.
    pub output_dir: Option<PathBuf>,
    /// Contour visualization base directory. `None` disables it.
    pub vis_dir: Option<PathBuf>,
    /// Prefix prepended to every output filename.
    pub prefix: String,
    /// Target superpixel counts, one label map per value, in this order.
    /// Duplicates are permitted but wasteful.
    pub scales: Vec<u32>,
    /// Minimum stddev x histogram width for a segment to keep splitting.
    pub split_threshold: f64,
    /// Number of histogram bins used when scoring splits.
    pub bins: u32,
    /// Minimum segment size in pixels; no split may produce a smaller side.
    pub min_segment_size: u32,
    /// Channel families fed to the segmenter.
    pub channels: ChannelSet,
    /// Box-blur channel planes before splitting.
    pub blur: bool,
    /// Verbose per-image diagnostics.
    pub wordy: bool,
    /// Treat artifact write failures as fatal to the whole run.
    pub strict_writes: bool,
}

impl RunConfig {
    /// Configuration with the defaults of the command line tool: all
    /// channels, 32 bins, minimum segment size 64, no outputs.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            vis_dir: None,
            prefix: String::new(),
            scales: Vec::new(),
            split_threshold: 0.0,
            bins: 32,
            min_segment_size: 64,
            channels: ChannelSet::ALL,
            blur: false,
            wordy: false,
            strict_writes: false,
        }
    }

    /// Reject degenerate parameter values before any image is touched.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.scales.iter().any(|&s| s == 0) {
            return Err(PipelineError::Config(
                "superpixel targets must be positive".into(),
            ));
        }
        if self.bins == 0 {
            return Err(PipelineError::Config("bins must be positive".into()));
        }
        if self.min_segment_size == 0 {
            return Err(PipelineError::Config(
                "minimum segment size must be positive".into(),
            ));
        }
        if !self.split_threshold.is_finite() || self.split_threshold < 0.0 {
            return Err(PipelineError::Config(
                "split threshold must be a non-negative number".into(),
            ));
        }
        if self.channels.is_empty() {
            return Err(PipelineError::Config(
                "at least one color channel family must be enabled".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let mut config = RunConfig::new("images");
        config.scales = vec![100, 400];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_scale_is_rejected() {
        let mut config = RunConfig::new("images");
        config.scales = vec![100, 0];
        assert!(matches!(
            config.validate(),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn zero_bins_and_zero_min_size_are_rejected() {
        let mut config = RunConfig::new("images");
        config.bins = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::new("images");
        config.min_segment_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_split_threshold_is_rejected() {
        let mut config = RunConfig::new("images");
        config.split_threshold = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_channel_set_is_rejected() {
        let mut config = RunConfig::new("images");
        config.channels = ChannelSet {
            rgb: false,
            hsv: false,
            lab: false,
        };
        assert!(config.validate().is_err());
        assert_eq!(config.channels.plane_count(), 0);
        assert!(config.channels.is_empty());
    }

    #[test]
    fn plane_count_matches_enabled_families() {
        assert_eq!(ChannelSet::ALL.plane_count(), 9);
        let rgb_only = ChannelSet {
            rgb: true,
            hsv: false,
            lab: false,
        };
        assert_eq!(rgb_only.plane_count(), 3);
    }
}
