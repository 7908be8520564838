//! Batch timing accounting.
//!
//! Each image's segmentation call is measured on two clocks at once:
//! wall time via `Instant` and process CPU time (user plus system) via
//! `cpu_time::ProcessTime`. Per-image records feed a running batch
//! accumulator whose averages land in a cumulative runtime log.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use cpu_time::ProcessTime;

/// Wall and CPU seconds for one measured interval.
#[derive(Debug, Clone, Copy)]
pub struct TimingRecord {
    pub wall_s: f64,
    pub cpu_s: f64,
}

/// Measures one interval on both clocks.
pub struct Timer {
    wall: Instant,
    cpu: ProcessTime,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            wall: Instant::now(),
            cpu: ProcessTime::now(),
        }
    }

    pub fn stop(self) -> TimingRecord {
        TimingRecord {
            wall_s: self.wall.elapsed().as_secs_f64(),
            cpu_s: self.cpu.elapsed().as_secs_f64(),
        }
    }
}

/// Running totals over a batch.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchTiming {
    wall_sum: f64,
    cpu_sum: f64,
    count: usize,
}

impl BatchTiming {
    pub fn record(&mut self, record: TimingRecord) {
        self.wall_sum += record.wall_s;
        self.cpu_sum += record.cpu_s;
        self.count += 1;
    }

    /// Number of records accumulated so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Average per-image times, or `None` when nothing was recorded. An
    /// empty batch reports nothing instead of dividing by zero.
    pub fn averages(&self) -> Option<TimingRecord> {
        if self.count == 0 {
            return None;
        }
        Some(TimingRecord {
            wall_s: self.wall_sum / self.count as f64,
            cpu_s: self.cpu_sum / self.count as f64,
        })
    }
}

/// Location of the cumulative runtime log under an output directory.
pub fn runtime_log_path(dir: &Path, prefix: &str) -> PathBuf {
    dir.join(format!("{prefix}runtime.txt"))
}

/// Append one `"<cpu> <wall>"` line to the runtime log, creating the
/// file on first use. One line accumulates per batch run, so the file
/// keeps history across invocations.
pub fn append_runtime_log(path: &Path, avg: TimingRecord) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{} {}", avg.cpu_s, avg.wall_s)?;
    file.flush()
}
