use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use anyhow::{anyhow, ensure, Result};
use memmap2::MmapOptions;
use ndarray::Array3;
use tiff::decoder::{Decoder, DecodingResult, Limits};

/// Reads a multi-band reference tile into a channel-major (bands, H, W)
/// array. Samples of any supported integer or float type are converted to
/// f32. Missing or undecodable tiles are fatal for the run.
pub fn read_reference_tile(path: &Path) -> Result<Array3<f32>> {
    let file = File::open(path)
        .map_err(|e| anyhow!("Failed to open reference tile {:?}: {}", path, e))?;

    // Memory-map the file and decode from the mapping.
    let mmap = unsafe { MmapOptions::new().map(&file) }
        .map_err(|e| anyhow!("Failed to mmap {:?}: {}", path, e))?;

    let cursor = Cursor::new(&mmap[..]);
    let mut decoder = Decoder::new(cursor)
        .map_err(|e| anyhow!("Failed to create TIFF decoder for {:?}: {}", path, e))?;
    decoder = decoder.with_limits(Limits::unlimited());

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| anyhow!("Failed to read dimensions from {:?}: {}", path, e))?;

    let data: Vec<f32> = match decoder.read_image() {
        Ok(DecodingResult::U8(v)) => v.into_iter().map(|x| x as f32).collect(),
        Ok(DecodingResult::U16(v)) => v.into_iter().map(|x| x as f32).collect(),
        Ok(DecodingResult::U32(v)) => v.into_iter().map(|x| x as f32).collect(),
        Ok(DecodingResult::I16(v)) => v.into_iter().map(|x| x as f32).collect(),
        Ok(DecodingResult::I32(v)) => v.into_iter().map(|x| x as f32).collect(),
        Ok(DecodingResult::F32(v)) => v,
        Ok(DecodingResult::F64(v)) => v.into_iter().map(|x| x as f32).collect(),
        Ok(_) => return Err(anyhow!("Unsupported sample format in {:?}", path)),
        Err(e) => return Err(anyhow!("Failed to decode reference tile {:?}: {}", path, e)),
    };

    let pixels = height as usize * width as usize;
    ensure!(
        pixels > 0 && data.len() % pixels == 0,
        "Data length mismatch in {:?}: {} samples for {}x{} pixels",
        path,
        data.len(),
        height,
        width
    );
    let bands = data.len() / pixels;
    ensure!(bands >= 1, "Reference tile {:?} has no bands", path);

    // Samples are interleaved (H, W, bands); rearrange to band-major.
    let interleaved = Array3::from_shape_vec((height as usize, width as usize, bands), data)
        .map_err(|e| anyhow!("Failed to shape TIFF data from {:?}: {}", path, e))?;

    Ok(interleaved.permuted_axes([2, 0, 1]).as_standard_layout().to_owned())
}
