mod contours;
mod labels;
mod router;

pub use contours::draw_contours;
pub use labels::write_label_csv;
pub use router::OutputRouter;
