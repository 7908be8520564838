//! Batch controller: composes enumeration, segmentation, connectivity
//! enforcement, artifact writing and timing into one run.

use crate::config::RunConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::output::{draw_contours, write_label_csv, OutputRouter};
use crate::segmentation::{ConnectivityEnforcer, Segmenter};
use crate::source::{list_images, ImageEntry};
use crate::timing::{append_runtime_log, runtime_log_path, BatchTiming, Timer, TimingRecord};

/// What one batch run did.
#[derive(Debug)]
pub struct BatchSummary {
    /// Images enumerated under the input directory.
    pub images: usize,
    /// Images segmented successfully; each contributed a timing record.
    pub processed: usize,
    /// Images skipped after a decode or segmentation failure.
    pub skipped: usize,
    /// Artifact writes that failed and were tolerated.
    pub write_failures: usize,
    /// Accumulated segmentation times.
    pub timing: BatchTiming,
}

/// One image's outcome: its timing record plus any tolerated artifact
/// write failures.
struct ImageOutcome {
    record: TimingRecord,
    write_failures: usize,
}

/// Run one batch over the configured input directory.
///
/// Stage order per image: decode, segment (timed), enforce connectivity,
/// write artifacts. Decode and segmentation failures skip the image;
/// an artifact write failure aborts the image's remaining scales and,
/// with strict writes, the whole batch. Configuration problems (bad
/// input directory, unwritable output base) are fatal before any image
/// is touched.
pub fn run_batch(
    config: &RunConfig,
    segmenter: &dyn Segmenter,
    enforcer: &dyn ConnectivityEnforcer,
) -> PipelineResult<BatchSummary> {
    config.validate()?;

    // Enumerate before creating anything: a bad input directory must
    // not leave output directories behind.
    let entries = list_images(&config.input_dir)?;

    let csv_router = config
        .output_dir
        .as_deref()
        .map(|base| OutputRouter::create(base, &config.scales))
        .transpose()?;
    let vis_router = config
        .vis_dir
        .as_deref()
        .map(|base| OutputRouter::create(base, &config.scales))
        .transpose()?;

    let total = entries.len();
    tracing::info!(
        "processing {} images from {}",
        total,
        config.input_dir.display()
    );

    let mut summary = BatchSummary {
        images: total,
        processed: 0,
        skipped: 0,
        write_failures: 0,
        timing: BatchTiming::default(),
    };

    for (index, entry) in entries.iter().enumerate() {
        tracing::debug!("{}/{}: {}", index + 1, total, entry.id);
        match process_image(
            config,
            segmenter,
            enforcer,
            entry,
            csv_router.as_ref(),
            vis_router.as_ref(),
        ) {
            Ok(outcome) => {
                summary.timing.record(outcome.record);
                summary.write_failures += outcome.write_failures;
                summary.processed += 1;
            }
            Err(PipelineError::Segmentation { path, message }) => {
                tracing::warn!("skipping {}: {}", path.display(), message);
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    // Final report and cumulative runtime record. An empty batch
    // reports nothing and appends nothing.
    if let Some(avg) = summary.timing.averages() {
        tracing::info!(
            "averages over {} images: {:.4}s cpu, {:.4}s wall",
            summary.timing.count(),
            avg.cpu_s,
            avg.wall_s
        );
        if let Some(router) = &csv_router {
            let log = runtime_log_path(router.base(), &config.prefix);
            if let Err(e) = append_runtime_log(&log, avg) {
                if config.strict_writes {
                    return Err(PipelineError::Write {
                        path: log,
                        message: e.to_string(),
                    });
                }
                tracing::warn!("could not append {}: {}", log.display(), e);
            }
        }
    }

    Ok(summary)
}

fn process_image(
    config: &RunConfig,
    segmenter: &dyn Segmenter,
    enforcer: &dyn ConnectivityEnforcer,
    entry: &ImageEntry,
    csv_router: Option<&OutputRouter>,
    vis_router: Option<&OutputRouter>,
) -> PipelineResult<ImageOutcome> {
    // Decode
    let image = image::open(&entry.path)
        .map_err(|e| PipelineError::Segmentation {
            path: entry.path.clone(),
            message: e.to_string(),
        })?
        .to_rgb8();

    // Segment; the timed interval covers exactly this call
    let timer = Timer::start();
    let results = segmenter
        .segment(&image, &config.scales)
        .map_err(|e| PipelineError::Segmentation {
            path: entry.path.clone(),
            message: e.to_string(),
        })?;
    let record = timer.stop();
    tracing::debug!(
        "{}: segmented in {:.3}s wall, {:.3}s cpu",
        entry.id,
        record.wall_s,
        record.cpu_s
    );

    let stem = entry
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| String::from("image"));

    let mut write_failures = 0usize;
    for result in &results {
        // Enforce connectivity on each map before it is persisted
        let (map, extra) = enforcer.enforce(&result.labels);
        tracing::debug!(
            "scale {}: {} superpixels achieved, {} disconnected components relabeled",
            result.scale,
            result.achieved,
            extra
        );

        let mut scale_failed = false;

        if let Some(router) = csv_router {
            let path = router.artifact_path(result.scale, &config.prefix, &stem, "csv");
            if let Err(e) = write_label_csv(&path, &map) {
                if config.strict_writes {
                    return Err(PipelineError::Write {
                        path,
                        message: e.to_string(),
                    });
                }
                tracing::warn!("could not write {}: {}", path.display(), e);
                write_failures += 1;
                scale_failed = true;
            }
        }

        // The visualization write is attempted even when the CSV for
        // the same scale failed.
        if let Some(router) = vis_router {
            let path = router.artifact_path(result.scale, &config.prefix, &stem, "png");
            let overlay = draw_contours(&image, &map);
            if let Err(e) = overlay.save(&path) {
                if config.strict_writes {
                    return Err(PipelineError::Write {
                        path,
                        message: e.to_string(),
                    });
                }
                tracing::warn!("could not write {}: {}", path.display(), e);
                write_failures += 1;
                scale_failed = true;
            }
        }

        // A failed scale aborts the image's remaining scales.
        if scale_failed {
            break;
        }
    }

    Ok(ImageOutcome {
        record,
        write_failures,
    })
}
