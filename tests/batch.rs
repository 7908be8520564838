//! End-to-end batch scenarios over real temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use supix::{
    run_batch, ChannelSet, FloodRelabeler, HistogramSegmenter, LabelMap, PipelineError, RunConfig,
    ScaleResult, SegmentError, Segmenter, SegmenterOptions,
};

/// Deterministic stand-in segmenter: `scale` vertical strips, each one
/// connected, so connectivity enforcement passes maps through.
struct StripSegmenter;

impl Segmenter for StripSegmenter {
    fn segment(&self, image: &RgbImage, scales: &[u32]) -> Result<Vec<ScaleResult>, SegmentError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SegmentError::EmptyImage);
        }
        Ok(scales
            .iter()
            .map(|&scale| {
                let strips = scale.clamp(1, width);
                let labels = LabelMap::from_shape_fn((height as usize, width as usize), |(_, x)| {
                    (x as u32) * strips / width
                });
                ScaleResult {
                    scale,
                    labels,
                    achieved: strips,
                }
            })
            .collect())
    }
}

fn scratch(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("supix-batch-{tag}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn save_two_tone(path: &Path, width: u32, height: u32) {
    let image = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    image.save(path).unwrap();
}

fn config_with(input: &Path, scales: Vec<u32>) -> RunConfig {
    let mut config = RunConfig::new(input);
    config.scales = scales;
    config
}

#[test]
fn artifacts_land_in_per_scale_directories() {
    let root = scratch("artifacts");
    let input = root.join("input");
    fs::create_dir_all(&input).unwrap();
    save_two_tone(&input.join("a.jpg"), 24, 16);
    save_two_tone(&input.join("b.png"), 24, 16);

    let out = root.join("out");
    let mut config = config_with(&input, vec![100, 400]);
    config.output_dir = Some(out.clone());

    let summary = run_batch(&config, &StripSegmenter, &FloodRelabeler).unwrap();
    assert_eq!(summary.images, 2);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.write_failures, 0);
    assert_eq!(summary.timing.count(), 2);

    for scale in ["100", "400"] {
        for stem in ["a", "b"] {
            let path = out.join(scale).join(format!("{stem}.csv"));
            assert!(path.is_file(), "missing {}", path.display());
        }
    }

    // Label grid dimensions are implicit in the file shape.
    let grid = fs::read_to_string(out.join("100").join("a.csv")).unwrap();
    assert_eq!(grid.lines().count(), 16);
    assert_eq!(grid.lines().next().unwrap().split(',').count(), 24);

    // One batch, one runtime line.
    let runtime = fs::read_to_string(out.join("runtime.txt")).unwrap();
    assert_eq!(runtime.lines().count(), 1);
    let fields: Vec<_> = runtime.split_whitespace().collect();
    assert_eq!(fields.len(), 2);
    for field in fields {
        assert!(field.parse::<f64>().unwrap() >= 0.0);
    }

    // Visualization stayed disabled.
    assert!(!root.join("vis").exists());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn empty_input_directory_is_a_silent_run() {
    let root = scratch("empty");
    let input = root.join("input");
    fs::create_dir_all(&input).unwrap();
    let out = root.join("out");
    let vis = root.join("vis");

    let mut config = config_with(&input, vec![100]);
    config.output_dir = Some(out.clone());
    config.vis_dir = Some(vis.clone());

    let summary = run_batch(&config, &StripSegmenter, &FloodRelabeler).unwrap();
    assert_eq!(summary.images, 0);
    assert_eq!(summary.processed, 0);
    assert!(summary.timing.averages().is_none());

    // Scale directories exist for both bases, but nothing was timed, so
    // no runtime record appears.
    assert!(out.join("100").is_dir());
    assert!(vis.join("100").is_dir());
    assert!(!out.join("runtime.txt").exists());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn missing_input_directory_creates_nothing() {
    let root = scratch("missing");
    let out = root.join("out");

    let mut config = config_with(&root.join("no-such-input"), vec![100]);
    config.output_dir = Some(out.clone());

    let err = run_batch(&config, &StripSegmenter, &FloodRelabeler).unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
    assert!(!out.exists());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn undecodable_image_is_skipped_and_the_batch_continues() {
    let root = scratch("undecodable");
    let input = root.join("input");
    fs::create_dir_all(&input).unwrap();
    save_two_tone(&input.join("a.png"), 20, 10);
    save_two_tone(&input.join("b.png"), 20, 10);
    fs::write(input.join("c.png"), b"not an image").unwrap();

    let out = root.join("out");
    let mut config = config_with(&input, vec![5]);
    config.output_dir = Some(out.clone());

    let summary = run_batch(&config, &StripSegmenter, &FloodRelabeler).unwrap();
    assert_eq!(summary.images, 3);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.timing.count(), 2);
    assert!(out.join("5").join("a.csv").is_file());
    assert!(out.join("5").join("b.csv").is_file());
    assert!(!out.join("5").join("c.csv").exists());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn disabled_outputs_create_no_directories() {
    let root = scratch("disabled");
    let input = root.join("input");
    fs::create_dir_all(&input).unwrap();
    save_two_tone(&input.join("a.png"), 20, 10);

    let config = config_with(&input, vec![4]);
    let summary = run_batch(&config, &StripSegmenter, &FloodRelabeler).unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.timing.count(), 1);

    // Nothing but the input directory appears under the scratch root.
    let entries: Vec<_> = fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["input"]);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn csv_write_failure_aborts_remaining_scales_for_that_image() {
    let root = scratch("write-failure");
    let input = root.join("input");
    fs::create_dir_all(&input).unwrap();
    save_two_tone(&input.join("a.png"), 20, 10);
    save_two_tone(&input.join("b.png"), 20, 10);

    let out = root.join("out");
    // A directory squatting on a.csv's path makes that write fail.
    fs::create_dir_all(out.join("5").join("a.csv")).unwrap();

    let mut config = config_with(&input, vec![5, 9]);
    config.output_dir = Some(out.clone());

    let summary = run_batch(&config, &StripSegmenter, &FloodRelabeler).unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.write_failures, 1);
    assert_eq!(summary.timing.count(), 2);

    // a lost its remaining scale, b is complete.
    assert!(!out.join("9").join("a.csv").exists());
    assert!(out.join("5").join("b.csv").is_file());
    assert!(out.join("9").join("b.csv").is_file());

    // The batch still reports its averages.
    assert!(out.join("runtime.txt").is_file());

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn strict_writes_turn_a_write_failure_fatal() {
    let root = scratch("strict");
    let input = root.join("input");
    fs::create_dir_all(&input).unwrap();
    save_two_tone(&input.join("a.png"), 20, 10);

    let out = root.join("out");
    fs::create_dir_all(out.join("5").join("a.csv")).unwrap();

    let mut config = config_with(&input, vec![5]);
    config.output_dir = Some(out.clone());
    config.strict_writes = true;

    let err = run_batch(&config, &StripSegmenter, &FloodRelabeler).unwrap_err();
    assert!(matches!(err, PipelineError::Write { .. }));

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn histogram_segmenter_end_to_end_with_visualizations() {
    let root = scratch("end-to-end");
    let input = root.join("input");
    fs::create_dir_all(&input).unwrap();
    save_two_tone(&input.join("shapes.png"), 24, 16);

    let out = root.join("out");
    let vis = root.join("vis");
    let mut config = config_with(&input, vec![2, 50]);
    config.output_dir = Some(out.clone());
    config.vis_dir = Some(vis.clone());
    config.prefix = "x-".into();

    let segmenter = HistogramSegmenter::new(SegmenterOptions {
        channels: ChannelSet::ALL,
        ..SegmenterOptions::default()
    })
    .unwrap();

    let summary = run_batch(&config, &segmenter, &FloodRelabeler).unwrap();
    assert_eq!(summary.processed, 1);

    // Scale 2 separates the halves; 50 is unreachable on a two-tone
    // image and falls back to the final grid.
    let coarse = fs::read_to_string(out.join("2").join("x-shapes.csv")).unwrap();
    let first_row: Vec<_> = coarse.lines().next().unwrap().split(',').collect();
    assert_eq!(first_row.len(), 24);
    assert_eq!(first_row[0], "0");
    assert_eq!(first_row[23], "1");
    let fine = fs::read_to_string(out.join("50").join("x-shapes.csv")).unwrap();
    assert_eq!(fine, coarse);

    // Contour overlays exist for both scales and paint the label edge.
    for scale in ["2", "50"] {
        let path = vis.join(scale).join("x-shapes.png");
        let overlay = image::open(&path).unwrap().to_rgb8();
        assert_eq!(overlay.dimensions(), (24, 16));
        assert_eq!(*overlay.get_pixel(11, 0), Rgb([255, 0, 0]));
        assert_eq!(*overlay.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    // A second run appends a second runtime line.
    run_batch(&config, &segmenter, &FloodRelabeler).unwrap();
    let runtime = fs::read_to_string(out.join("x-runtime.txt")).unwrap();
    assert_eq!(runtime.lines().count(), 2);

    fs::remove_dir_all(&root).unwrap();
}
