//! Hierarchical histogram-threshold segmentation.
//!
//! The image starts as one segment. The splittable segment with the
//! strongest color separation is split in two at an Otsu threshold,
//! over and over, until the largest requested granularity is reached
//! or nothing remains splittable. The label grid is snapshotted each
//! time the running segment count equals a requested granularity, so
//! one pass serves every scale.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

use image::RgbImage;
use ndarray::Array2;

use crate::error::SegmentError;
use crate::segmentation::channels::channel_planes;
use crate::segmentation::types::{ScaleResult, SegmenterOptions};
use crate::segmentation::Segmenter;

/// Histogram-splitting [`Segmenter`].
///
/// Configuration is captured at construction; [`segment`](Segmenter::segment)
/// carries only the per-call inputs (image and requested scales).
pub struct HistogramSegmenter {
    opts: SegmenterOptions,
}

/// How to split one segment: threshold the given channel plane at a
/// histogram bin boundary. Pixels binned at or above `cut` form the new
/// segment; the rest keep the old label.
struct SplitPlan {
    channel: usize,
    lo: f32,
    bin_scale: f32,
    cut: usize,
}

impl SplitPlan {
    fn goes_upper(&self, value: f32) -> bool {
        (((value - self.lo) * self.bin_scale).round() as usize) >= self.cut
    }
}

/// A splittable segment queued by separation score. Ordered so the
/// max-heap pops the highest score first, breaking ties toward the
/// smaller label for determinism.
struct Candidate {
    score: f64,
    label: u32,
    plan: SplitPlan,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.label.cmp(&self.label))
    }
}

impl HistogramSegmenter {
    /// Build a segmenter, rejecting degenerate options up front.
    pub fn new(opts: SegmenterOptions) -> Result<Self, SegmentError> {
        if opts.channels.is_empty() {
            return Err(SegmentError::NoChannels);
        }
        if opts.bins == 0 {
            return Err(SegmentError::InvalidOption(
                "histogram bins must be positive",
            ));
        }
        if opts.min_segment_size == 0 {
            return Err(SegmentError::InvalidOption(
                "minimum segment size must be positive",
            ));
        }
        if !opts.split_threshold.is_finite() || opts.split_threshold < 0.0 {
            return Err(SegmentError::InvalidOption(
                "split threshold must be finite and non-negative",
            ));
        }
        Ok(Self { opts })
    }

    /// Find the best split for one segment, or `None` if the segment is
    /// not splittable (too small, too uniform, or below the score
    /// threshold on every channel).
    ///
    /// For each channel the separation score is the population standard
    /// deviation times the occupied value range; among channels passing
    /// the score threshold, the one with the strongest feasible Otsu cut
    /// (both sides at least the minimum segment size) wins.
    fn plan_split(&self, label: u32, pixels: &[usize], planes: &[Vec<f32>]) -> Option<Candidate> {
        let min_size = self.opts.min_segment_size as usize;
        if pixels.len() < 2 * min_size {
            return None;
        }
        let bins = self.opts.bins as usize;

        let mut best: Option<(f64, f64, SplitPlan)> = None;
        for (channel, plane) in planes.iter().enumerate() {
            let mut lo = f32::INFINITY;
            let mut hi = f32::NEG_INFINITY;
            let mut sum = 0.0f64;
            let mut sum_sq = 0.0f64;
            for &i in pixels {
                let v = plane[i];
                lo = lo.min(v);
                hi = hi.max(v);
                sum += v as f64;
                sum_sq += (v as f64) * (v as f64);
            }
            if hi <= lo {
                continue;
            }
            let n = pixels.len() as f64;
            let variance = (sum_sq / n - (sum / n) * (sum / n)).max(0.0);
            let score = variance.sqrt() * ((hi - lo) as f64);
            if score <= self.opts.split_threshold {
                continue;
            }

            let bin_scale = (bins as f32 - 1.0) / (hi - lo);
            let mut hist = vec![0usize; bins];
            for &i in pixels {
                let b = (((plane[i] - lo) * bin_scale).round() as usize).min(bins - 1);
                hist[b] += 1;
            }
            let weighted_total: f64 = hist
                .iter()
                .enumerate()
                .map(|(b, &c)| (b as f64) * (c as f64))
                .sum();

            // Otsu over bin indices, restricted to cuts leaving at least
            // min_size pixels on each side.
            let mut below = 0usize;
            let mut weighted_below = 0.0f64;
            let mut best_sep = -1.0f64;
            let mut best_cut = 0usize;
            for cut in 1..bins {
                below += hist[cut - 1];
                weighted_below += ((cut - 1) as f64) * (hist[cut - 1] as f64);
                let above = pixels.len() - below;
                if below < min_size || above < min_size {
                    continue;
                }
                let mu_below = weighted_below / below as f64;
                let mu_above = (weighted_total - weighted_below) / above as f64;
                let d = mu_below - mu_above;
                let sep = (below as f64) * (above as f64) * d * d;
                if sep > best_sep {
                    best_sep = sep;
                    best_cut = cut;
                }
            }
            if best_sep < 0.0 {
                continue;
            }
            if best.as_ref().map_or(true, |(sep, _, _)| best_sep > *sep) {
                best = Some((
                    best_sep,
                    score,
                    SplitPlan {
                        channel,
                        lo,
                        bin_scale,
                        cut: best_cut,
                    },
                ));
            }
        }

        best.map(|(_, score, plan)| Candidate { score, label, plan })
    }
}

impl Segmenter for HistogramSegmenter {
    fn segment(&self, image: &RgbImage, scales: &[u32]) -> Result<Vec<ScaleResult>, SegmentError> {
        if scales.is_empty() {
            return Ok(Vec::new());
        }
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SegmentError::EmptyImage);
        }
        let w = width as usize;
        let h = height as usize;
        let n = w * h;

        let planes = channel_planes(image, self.opts.channels, self.opts.blur);

        let mut labels = vec![0u32; n];
        let mut segments: Vec<Vec<usize>> = vec![(0..n).collect()];
        let mut count: u32 = 1;

        let mut pending: BTreeSet<u32> = scales.iter().copied().collect();
        let target = pending.iter().next_back().copied().unwrap_or(0);
        let mut snapshots: HashMap<u32, Vec<u32>> = HashMap::new();
        if pending.remove(&count) {
            snapshots.insert(count, labels.clone());
        }

        let mut heap = BinaryHeap::new();
        if let Some(cand) = self.plan_split(0, &segments[0], &planes) {
            heap.push(cand);
        }

        while count < target {
            let Some(cand) = heap.pop() else {
                break;
            };
            let parent = std::mem::take(&mut segments[cand.label as usize]);
            let plane = &planes[cand.plan.channel];
            let mut keep = Vec::new();
            let mut moved = Vec::new();
            for &i in &parent {
                if cand.plan.goes_upper(plane[i]) {
                    moved.push(i);
                } else {
                    keep.push(i);
                }
            }
            let new_label = count;
            for &i in &moved {
                labels[i] = new_label;
            }
            segments[cand.label as usize] = keep;
            segments.push(moved);
            count += 1;

            if pending.remove(&count) {
                snapshots.insert(count, labels.clone());
            }
            if let Some(next) = self.plan_split(cand.label, &segments[cand.label as usize], &planes)
            {
                heap.push(next);
            }
            if let Some(next) = self.plan_split(new_label, &segments[new_label as usize], &planes) {
                heap.push(next);
            }
        }

        // Results in request order. Scales never reached fall back to the
        // final grid; duplicates share the same snapshot.
        let mut results = Vec::with_capacity(scales.len());
        for &scale in scales {
            let (flat, achieved) = match snapshots.get(&scale) {
                Some(snap) => (snap, scale),
                None => (&labels, count),
            };
            let grid = Array2::from_shape_fn((h, w), |(y, x)| flat[y * w + x]);
            results.push(ScaleResult {
                scale,
                labels: grid,
                achieved,
            });
        }
        Ok(results)
    }
}
