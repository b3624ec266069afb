use anyhow::{ensure, Result};
use ndarray::Array3;

use crate::palette::Palette;

/// Gets a HxWxK image and produces a CxHxW stack where the c-th plane is 1.0
/// exactly at the pixels whose full channel vector equals the c-th palette
/// color. Matching is exact; there is no tolerance. Planes overlap wherever
/// palette colors coincide in the source image.
///
/// The output is f32 rather than boolean so that it can be block-averaged
/// into fractional occupancy labels downstream.
pub fn classify_pixels(image: &Array3<u8>, palette: &Palette) -> Result<Array3<f32>> {
    let (height, width, channels) = image.dim();

    ensure!(
        palette.color_len() == channels,
        "Classes should be in the same color space as the image: palette colors have {} channel(s), image has {}",
        palette.color_len(),
        channels
    );

    let mut planes = Array3::<f32>::zeros((palette.len(), height, width));

    for (c, color) in palette.colors().iter().enumerate() {
        let key = color.channels();
        for i in 0..height {
            for j in 0..width {
                if (0..channels).all(|b| image[[i, j, b]] == key[b]) {
                    planes[[c, i, j]] = 1.0;
                }
            }
        }
    }

    Ok(planes)
}
