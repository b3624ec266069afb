use std::path::PathBuf;

use anyhow::Result;
use env_logger::{Builder, Env};
use log::info;
use structopt::StructOpt;

use build_dataset::config::{Config, DEFAULT_CLASS_COLORS};
use build_dataset::palette::Palette;
use build_dataset::pipeline;
use build_dataset::store::MongoOverlayStore;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "build_dataset",
    about = "Build a training dataset from map labelings stored in MongoDB"
)]
struct Opt {
    /// URL used to connect to MongoDB
    #[structopt(
        short = "m",
        long = "mongo-url",
        default_value = "mongodb://localhost:27017"
    )]
    mongo_url: String,

    /// Name of the MongoDB database where map labelings are stored
    #[structopt(short = "d", long = "database", default_value = "openafro")]
    database: String,

    /// Size of the tiles extracted from the input
    #[structopt(short = "i", long = "input-size", default_value = "128")]
    input_size: usize,

    /// Size of the tiles to be produced by the model
    #[structopt(short = "t", long = "output-size", default_value = "128")]
    output_size: usize,

    /// Path to the output dataset file
    #[structopt(
        short = "o",
        long = "output",
        parse(from_os_str),
        default_value = "dataset.npz"
    )]
    output: PathBuf,

    /// Color of all classes present in the overlay, as hex strings
    /// (defaults to 00000000 ff0000ff ffff00ff)
    #[structopt(long = "class-colors")]
    class_colors: Vec<String>,

    /// Path to the directory containing reference tiles (input to the model)
    #[structopt(long = "tiles-dir", parse(from_os_str))]
    tiles_dir: PathBuf,

    /// Extension of reference tile images
    #[structopt(short = "e", long = "tiles-extension", default_value = "tif")]
    tiles_extension: String,

    /// Fraction of tiles to put in the training set
    #[structopt(long = "train", default_value = "0.8")]
    train: f64,

    /// Fraction of tiles to put in the validation set
    #[structopt(long = "validation", default_value = "0.1")]
    validation: f64,

    /// Fraction of tiles to put in the test set
    #[structopt(long = "test", default_value = "0.1")]
    test: f64,

    /// Augment data by rotating tiles
    #[structopt(long = "rotate")]
    rotate: bool,

    /// Augment data by flipping tiles
    #[structopt(long = "flip")]
    flip: bool,

    /// Seed for the split shuffle (omit for a fresh random split per run)
    #[structopt(long = "seed")]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_secs();
    builder.init();

    let opt = Opt::from_args();

    let class_colors: Vec<String> = if opt.class_colors.is_empty() {
        DEFAULT_CLASS_COLORS.iter().map(|c| c.to_string()).collect()
    } else {
        opt.class_colors.clone()
    };

    let config = Config {
        input_size: opt.input_size,
        output_size: opt.output_size,
        output: opt.output.clone(),
        palette: Palette::parse(&class_colors)?,
        tiles_dir: opt.tiles_dir.clone(),
        tiles_extension: opt.tiles_extension.clone(),
        fractions: [opt.train, opt.validation, opt.test],
        rotate: opt.rotate,
        flip: opt.flip,
        seed: opt.seed,
    };

    info!("Starting build_dataset...");
    info!("Tiles dir: {:?}", config.tiles_dir);
    info!("Output: {:?}", config.output);
    info!("Classes: {:?}", config.palette.colors());

    let store = MongoOverlayStore::connect(&opt.mongo_url, &opt.database)?;
    pipeline::run(&config, &store)?;

    Ok(())
}
