use anyhow::{ensure, Result};
use ndarray::{s, Array3};

use crate::augment::{self, FlipAxis};

/// One training example: an input tile cut from the reference raster and the
/// matching label tile cut from the aligned occupancy map. Immutable once
/// created.
#[derive(Debug, Clone)]
pub struct Example {
    pub input: Array3<f32>,
    pub label: Array3<f32>,
}

/// Cuts the paired input/label rasters into fixed-size tiles and expands each
/// base tile into its augmentation variants.
///
/// The tile grid is derived from the input raster: as many whole input-sized
/// tiles as fit along each axis, emitted in row-major order. The same grid
/// indices address the label raster with the output tile size. Rotations and
/// flips are applied identically to both members of a pair so that the label
/// stays aligned with its input.
pub fn cut_and_augment(
    input: &Array3<f32>,
    label: &Array3<f32>,
    input_size: usize,
    output_size: usize,
    rotate: bool,
    flip: bool,
) -> Result<Vec<Example>> {
    ensure!(
        input_size >= 1 && output_size >= 1,
        "Tile sizes must be at least 1 pixel, got input {} and output {}",
        input_size,
        output_size
    );

    let (_, input_height, input_width) = input.dim();
    let (_, label_height, label_width) = label.dim();
    let tiles_v = input_height / input_size;
    let tiles_h = input_width / input_size;

    ensure!(
        label_height >= tiles_v * output_size && label_width >= tiles_h * output_size,
        "Label raster of {}x{} cannot cover a {}x{} grid of {}-pixel tiles",
        label_height,
        label_width,
        tiles_v,
        tiles_h,
        output_size
    );

    let plan = augment::variants(rotate, flip);
    let mut examples = Vec::with_capacity(tiles_v * tiles_h * plan.len());

    for ti in 0..tiles_v {
        for tj in 0..tiles_h {
            let input_tile = input.slice(s![
                ..,
                ti * input_size..(ti + 1) * input_size,
                tj * input_size..(tj + 1) * input_size
            ]);
            let label_tile = label.slice(s![
                ..,
                ti * output_size..(ti + 1) * output_size,
                tj * output_size..(tj + 1) * output_size
            ]);

            for &(turns, flip_axis) in &plan {
                let input_rotated = augment::rot90(input_tile.view(), turns);
                let label_rotated = augment::rot90(label_tile.view(), turns);

                let (input_variant, label_variant) = match flip_axis {
                    Some(axis) => (
                        augment::flip(input_rotated.view(), axis),
                        augment::flip(label_rotated.view(), axis),
                    ),
                    None => (input_rotated, label_rotated),
                };

                examples.push(Example {
                    input: input_variant,
                    label: label_variant,
                });
            }
        }
    }

    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    /// One-band raster whose pixel values encode their (row, col) position.
    fn indexed_raster(height: usize, width: usize) -> Array3<f32> {
        let mut raster = Array3::<f32>::zeros((1, height, width));
        for i in 0..height {
            for j in 0..width {
                raster[[0, i, j]] = (i * width + j) as f32;
            }
        }
        raster
    }

    #[test]
    fn base_tile_count_matches_the_grid() {
        let input = indexed_raster(4, 2);
        let label = indexed_raster(4, 2);

        let examples = cut_and_augment(&input, &label, 2, 2, false, false).unwrap();
        assert_eq!(examples.len(), 2);
    }

    #[test]
    fn tiles_are_emitted_in_row_major_order() {
        let input = indexed_raster(4, 4);
        let label = indexed_raster(4, 4);

        let examples = cut_and_augment(&input, &label, 2, 2, false, false).unwrap();
        assert_eq!(examples.len(), 4);

        // Top-left pixels of the four tiles, row by row.
        assert_eq!(examples[0].input[[0, 0, 0]], 0.0);
        assert_eq!(examples[1].input[[0, 0, 0]], 2.0);
        assert_eq!(examples[2].input[[0, 0, 0]], 8.0);
        assert_eq!(examples[3].input[[0, 0, 0]], 10.0);
    }

    #[test]
    fn rotation_multiplies_the_example_count_by_four() {
        let input = indexed_raster(4, 2);
        let label = indexed_raster(4, 2);

        let examples = cut_and_augment(&input, &label, 2, 2, true, false).unwrap();
        assert_eq!(examples.len(), 8);
    }

    #[test]
    fn flip_alone_multiplies_the_example_count_by_three() {
        let input = indexed_raster(4, 2);
        let label = indexed_raster(4, 2);

        let examples = cut_and_augment(&input, &label, 2, 2, false, true).unwrap();
        assert_eq!(examples.len(), 6);
    }

    #[test]
    fn rotation_and_flip_multiply_the_example_count_by_eight() {
        let input = indexed_raster(4, 2);
        let label = indexed_raster(4, 2);

        let examples = cut_and_augment(&input, &label, 2, 2, true, true).unwrap();
        assert_eq!(examples.len(), 16);
    }

    #[test]
    fn rotation_moves_input_and_label_markers_identically() {
        // A single 2x2 tile with an asymmetric marker in the top-right corner
        // of both members of the pair.
        let mut input = Array3::<f32>::zeros((1, 2, 2));
        let mut label = Array3::<f32>::zeros((1, 2, 2));
        input[[0, 0, 1]] = 7.0;
        label[[0, 0, 1]] = 1.0;

        let examples = cut_and_augment(&input, &label, 2, 2, true, false).unwrap();

        // Variant 1 is the 90 degree counter-clockwise rotation: the
        // top-right corner moves to the top-left.
        assert_eq!(examples[1].input[[0, 0, 0]], 7.0);
        assert_eq!(examples[1].label[[0, 0, 0]], 1.0);
        assert_eq!(examples[1].input[[0, 0, 1]], 0.0);
        assert_eq!(examples[1].label[[0, 0, 1]], 0.0);
    }

    #[test]
    fn input_and_output_tile_sizes_may_differ() {
        let input = indexed_raster(4, 4);
        let label = indexed_raster(2, 2);

        let examples = cut_and_augment(&input, &label, 2, 1, false, false).unwrap();
        assert_eq!(examples.len(), 4);
        assert_eq!(examples[0].input.dim(), (1, 2, 2));
        assert_eq!(examples[0].label.dim(), (1, 1, 1));
        assert_eq!(examples[3].label[[0, 0, 0]], 3.0);
    }

    #[test]
    fn partial_tiles_at_the_edges_are_dropped() {
        let input = indexed_raster(5, 3);
        let label = indexed_raster(5, 3);

        let examples = cut_and_augment(&input, &label, 2, 2, false, false).unwrap();
        assert_eq!(examples.len(), 2);
    }

    #[test]
    fn rejects_a_label_raster_that_cannot_cover_the_grid() {
        let input = indexed_raster(4, 4);
        let label = indexed_raster(2, 2);

        assert!(cut_and_augment(&input, &label, 2, 2, false, false).is_err());
    }
}
