//! Label grid serialization.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::segmentation::LabelMap;

/// Write a label map as a plain integer grid: one line per image row,
/// columns comma-separated, no header. Dimensions are implicit in the
/// grid shape.
pub fn write_label_csv(path: &Path, labels: &LabelMap) -> io::Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    for row in labels.rows() {
        let mut first = true;
        for &label in row {
            if first {
                first = false;
            } else {
                out.write_all(b",")?;
            }
            write!(out, "{label}")?;
        }
        out.write_all(b"\n")?;
    }
    out.flush()
}
