use std::path::PathBuf;

use crate::palette::Palette;

/// Default class colors: background, water and roads as drawn by the
/// labeling tool.
pub const DEFAULT_CLASS_COLORS: [&str; 3] = ["00000000", "ff0000ff", "ffff00ff"];

/// Immutable configuration for one dataset build run. Constructed once from
/// the command line and passed by reference to every pipeline stage.
#[derive(Debug, Clone)]
pub struct Config {
    /// Side length of the tiles extracted from the reference imagery.
    pub input_size: usize,
    /// Side length of the label tiles to be produced by the model.
    pub output_size: usize,
    /// Path of the output dataset artifact.
    pub output: PathBuf,
    /// Ordered class palette; its order fixes the label channel indices.
    pub palette: Palette,
    /// Directory containing the reference tiles.
    pub tiles_dir: PathBuf,
    /// File extension of the reference tiles.
    pub tiles_extension: String,
    /// Train, validation and test fractions, in that order.
    pub fractions: [f64; 3],
    /// Augment the dataset with 90/180/270 degree rotations.
    pub rotate: bool,
    /// Augment the dataset with vertical and horizontal flips.
    pub flip: bool,
    /// Optional shuffle seed for reproducible splits.
    pub seed: Option<u64>,
}
