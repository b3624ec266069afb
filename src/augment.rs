use ndarray::{Array3, ArrayView3, Axis};

/// Spatial axis along which a tile is mirrored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipAxis {
    /// Mirror over the row axis (top row becomes bottom row).
    Vertical,
    /// Mirror over the column axis (left column becomes right column).
    Horizontal,
}

/// Enumerates the augmentation variants of one base tile as (counter-clockwise
/// quarter turns, optional flip of the rotated tile) pairs.
///
/// Flips are only emitted for the 0 and 90 degree rotations: flipping the 180
/// and 270 degree rotations would reproduce the other two flip variants and
/// add no coverage.
pub fn variants(rotate: bool, flip: bool) -> Vec<(usize, Option<FlipAxis>)> {
    let mut plan = Vec::new();

    for turns in 0..4 {
        plan.push((turns, None));

        if turns < 2 && flip {
            plan.push((turns, Some(FlipAxis::Vertical)));
            plan.push((turns, Some(FlipAxis::Horizontal)));
        }

        if !rotate {
            break;
        }
    }

    plan
}

/// Rotates a CxSxS tile counter-clockwise by the given number of quarter
/// turns over the two spatial axes. The channel axis is untouched.
pub fn rot90(tile: ArrayView3<f32>, turns: usize) -> Array3<f32> {
    let mut view = tile;
    for _ in 0..(turns % 4) {
        view.swap_axes(1, 2);
        view.invert_axis(Axis(1));
    }
    view.to_owned()
}

/// Mirrors a CxSxS tile along the given spatial axis.
pub fn flip(tile: ArrayView3<f32>, axis: FlipAxis) -> Array3<f32> {
    let mut view = tile;
    match axis {
        FlipAxis::Vertical => view.invert_axis(Axis(1)),
        FlipAxis::Horizontal => view.invert_axis(Axis(2)),
    }
    view.to_owned()
}
