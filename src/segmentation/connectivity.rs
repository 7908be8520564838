//! Label connectivity enforcement.
//!
//! Segmenters may emit maps where one label covers several spatially
//! separate regions. The enforcer relabels such maps so every label
//! denotes exactly one 4-connected region, which downstream consumers
//! of the label grids rely on.

use std::collections::{HashSet, VecDeque};

use crate::segmentation::types::LabelMap;

/// Relabels a map so each label value covers one connected region.
pub trait ConnectivityEnforcer {
    /// Returns the relabeled map and the number of extra disconnected
    /// components that received fresh labels. Idempotent: a map that is
    /// already connected comes back equal, with a count of 0.
    fn enforce(&self, labels: &LabelMap) -> (LabelMap, u32);
}

/// Flood-fill relabeler with 4-connectivity.
///
/// Components are discovered in row-major scan order. The first
/// component found for each input label keeps that label; every further
/// component of the same label gets a fresh label above the map's
/// maximum, in discovery order. Already-connected maps therefore pass
/// through untouched.
pub struct FloodRelabeler;

impl ConnectivityEnforcer for FloodRelabeler {
    fn enforce(&self, labels: &LabelMap) -> (LabelMap, u32) {
        let (h, w) = labels.dim();
        let mut out = labels.clone();
        if h == 0 || w == 0 {
            return (out, 0);
        }

        let mut next = labels
            .iter()
            .copied()
            .max()
            .map_or(0, |m| m.saturating_add(1));
        let mut claimed: HashSet<u32> = HashSet::new();
        let mut visited = vec![false; h * w];
        let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
        let mut extra = 0u32;

        for y in 0..h {
            for x in 0..w {
                if visited[y * w + x] {
                    continue;
                }
                let original = labels[[y, x]];
                let assigned = if claimed.insert(original) {
                    original
                } else {
                    // Fresh labels saturate at the top of the label
                    // space rather than wrapping.
                    let fresh = next;
                    next = next.saturating_add(1);
                    extra += 1;
                    fresh
                };

                visited[y * w + x] = true;
                queue.push_back((y, x));
                while let Some((cy, cx)) = queue.pop_front() {
                    out[[cy, cx]] = assigned;
                    let mut visit = |ny: usize, nx: usize| {
                        if !visited[ny * w + nx] && labels[[ny, nx]] == original {
                            visited[ny * w + nx] = true;
                            queue.push_back((ny, nx));
                        }
                    };
                    if cy > 0 {
                        visit(cy - 1, cx);
                    }
                    if cy + 1 < h {
                        visit(cy + 1, cx);
                    }
                    if cx > 0 {
                        visit(cy, cx - 1);
                    }
                    if cx + 1 < w {
                        visit(cy, cx + 1);
                    }
                }
            }
        }

        (out, extra)
    }
}
