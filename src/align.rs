use anyhow::{ensure, Result};
use ndarray::Array3;

/// Reduces a CxHxW indicator stack by block-averaging over non-overlapping
/// (factor_v x factor_h) blocks, leaving the channel axis untouched. Each
/// output pixel is the mean occupancy of its class over the corresponding
/// block, so a 0/1 input yields soft labels in [0, 1].
///
/// The factors are the number of input-tile subdivisions along each axis of
/// the reference raster; a stack whose spatial size is not an exact multiple
/// of them indicates a mismatched overlay/reference pairing and is fatal.
pub fn block_mean(stack: &Array3<f32>, factor_v: usize, factor_h: usize) -> Result<Array3<f32>> {
    let (channels, height, width) = stack.dim();

    ensure!(
        factor_v >= 1 && factor_h >= 1,
        "Tile subdivision counts must be at least 1, got {}x{}",
        factor_v,
        factor_h
    );
    ensure!(
        height % factor_v == 0,
        "Overlay height {} should be a multiple of the {} tile division(s)",
        height,
        factor_v
    );
    ensure!(
        width % factor_h == 0,
        "Overlay width {} should be a multiple of the {} tile division(s)",
        width,
        factor_h
    );

    let out_height = height / factor_v;
    let out_width = width / factor_h;
    let block_size = (factor_v * factor_h) as f32;
    let mut out = Array3::<f32>::zeros((channels, out_height, out_width));

    for c in 0..channels {
        for oi in 0..out_height {
            for oj in 0..out_width {
                let mut sum = 0.0;
                for bi in 0..factor_v {
                    for bj in 0..factor_h {
                        sum += stack[[c, oi * factor_v + bi, oj * factor_h + bj]];
                    }
                }
                out[[c, oi, oj]] = sum / block_size;
            }
        }
    }

    Ok(out)
}
