use anyhow::{ensure, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use ndarray::{Array4, Axis};

use crate::align;
use crate::classify;
use crate::config::Config;
use crate::container::{self, DatasetAttributes, SplitTensors};
use crate::raster;
use crate::split;
use crate::store::{OverlayStore, PNG_DATA_URI_HEADER};
use crate::tiler::{self, Example};

/// Counts reported by a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Overlay records that contributed examples.
    pub processed: usize,
    /// Overlay records skipped for an unsupported encoding.
    pub skipped: usize,
    /// Total examples across all splits.
    pub examples: usize,
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

/// Runs the whole build: fetches every overlay record, converts it into
/// examples, then splits the accumulated example list once and writes the
/// output artifact once. Records are processed strictly in fetch order; any
/// fatal error aborts the run with no cleanup of a partially written output.
pub fn run<S: OverlayStore>(config: &Config, store: &S) -> Result<RunSummary> {
    ensure!(
        config.input_size >= 1 && config.output_size >= 1,
        "Tile sizes must be at least 1 pixel, got input {} and output {}",
        config.input_size,
        config.output_size
    );

    let record_count = store.count()?;
    info!("{} map label overlays found.", record_count);

    let progress = ProgressBar::new(record_count);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.set_message("Processing overlay records...");

    let mut examples: Vec<Example> = Vec::new();
    let mut processed = 0usize;
    let mut skipped = 0usize;

    for record in store.records()? {
        let record = record?;

        let (header, _) = record.image_parts()?;
        if header != PNG_DATA_URI_HEADER {
            warn!(
                "Ignoring overlay with type {} (only PNG overlays supported for now)",
                header
            );
            skipped += 1;
            progress.inc(1);
            continue;
        }

        let overlay = record.decode_overlay()?;

        let tile_path = config
            .tiles_dir
            .join(format!("{}.{}", record.tile, config.tiles_extension));
        let reference = raster::read_reference_tile(&tile_path)?;

        let (_, reference_height, reference_width) = reference.dim();
        let tiles_v = reference_height / config.input_size;
        let tiles_h = reference_width / config.input_size;
        ensure!(
            tiles_v >= 1 && tiles_h >= 1,
            "Reference tile {:?} of {}x{} is smaller than the {}-pixel input tile size",
            tile_path,
            reference_height,
            reference_width,
            config.input_size
        );

        let indicator = classify::classify_pixels(&overlay, &config.palette)?;
        let label = align::block_mean(&indicator, tiles_v, tiles_h)?;

        let mut record_examples = tiler::cut_and_augment(
            &reference,
            &label,
            config.input_size,
            config.output_size,
            config.rotate,
            config.flip,
        )?;
        examples.append(&mut record_examples);
        processed += 1;
        progress.inc(1);

        info!(
            "Added examples by {} <{}>",
            record.author_name, record.author_email
        );
    }

    progress.finish_with_message("All overlay records processed.");

    ensure!(!examples.is_empty(), "No examples were produced; nothing to write");

    let (x_all, y_all) = stack_examples(&examples)?;
    info!("X shape: {:?}", x_all.dim());
    info!("y shape: {:?}", y_all.dim());

    let splits = split::split_indices(examples.len(), config.fractions, config.seed);
    drop(examples);

    let attributes = DatasetAttributes {
        input_bands: x_all.dim().1 as i64,
        output_bands: y_all.dim().1 as i64,
        input_size: x_all.dim().2 as i64,
        output_size: y_all.dim().2 as i64,
    };

    let train = select_split(&x_all, &y_all, &splits.train);
    let validation = select_split(&x_all, &y_all, &splits.validation);
    let test = select_split(&x_all, &y_all, &splits.test);

    container::write_dataset(&config.output, &train, &validation, &test, &attributes)?;

    info!(
        "Wrote {:?} with {} training examples, {} validation examples and {} test examples.",
        config.output,
        splits.train.len(),
        splits.validation.len(),
        splits.test.len()
    );

    Ok(RunSummary {
        processed,
        skipped,
        examples: x_all.dim().0,
        train: splits.train.len(),
        validation: splits.validation.len(),
        test: splits.test.len(),
    })
}

/// Stacks the example list into example-major input and label tensors. All
/// examples must share one shape; reference tiles with mismatched band counts
/// or sizes cannot be combined into a single dataset.
fn stack_examples(examples: &[Example]) -> Result<(Array4<f32>, Array4<f32>)> {
    let x_dim = examples[0].input.dim();
    let y_dim = examples[0].label.dim();

    for example in examples {
        ensure!(
            example.input.dim() == x_dim && example.label.dim() == y_dim,
            "Examples have mismatched shapes: all reference tiles must share band count and size"
        );
    }

    let mut x = Array4::<f32>::zeros((examples.len(), x_dim.0, x_dim.1, x_dim.2));
    let mut y = Array4::<f32>::zeros((examples.len(), y_dim.0, y_dim.1, y_dim.2));

    for (i, example) in examples.iter().enumerate() {
        x.index_axis_mut(Axis(0), i).assign(&example.input);
        y.index_axis_mut(Axis(0), i).assign(&example.label);
    }

    Ok((x, y))
}

fn select_split(x: &Array4<f32>, y: &Array4<f32>, indices: &[usize]) -> SplitTensors {
    SplitTensors {
        x: x.select(Axis(0), indices),
        y: y.select(Axis(0), indices),
    }
}
