use anyhow::{anyhow, Result};
use base64::engine::general_purpose;
use base64::Engine as _;
use image::DynamicImage;
use mongodb::sync::{Client, Collection};
use ndarray::Array3;
use serde::Deserialize;

/// Collection holding the labelings recorded by the annotation tool.
pub const OVERLAY_COLLECTION: &str = "maplabeloverlays";

/// The only overlay encoding the pipeline understands.
pub const PNG_DATA_URI_HEADER: &str = "data:image/png;base64";

/// One labeling as recorded in the annotation store: the identifier of the
/// tile it was drawn over, the overlay image as a base64 data URI and the
/// annotator's contact details. Immutable once fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct OverlayRecord {
    pub tile: String,
    #[serde(rename = "authorName")]
    pub author_name: String,
    #[serde(rename = "authorEmail")]
    pub author_email: String,
    pub image: String,
}

impl OverlayRecord {
    /// Splits the data URI into its header and base64 payload.
    pub fn image_parts(&self) -> Result<(&str, &str)> {
        self.image
            .split_once(',')
            .ok_or_else(|| anyhow!("Overlay for tile {} has a malformed data URI", self.tile))
    }

    /// Decodes the overlay into a (H, W, K) channel-interleaved array, where
    /// K is the channel count of the embedded PNG. Only call this after the
    /// data URI header has been checked; decode failures here are fatal.
    pub fn decode_overlay(&self) -> Result<Array3<u8>> {
        let (_, payload) = self.image_parts()?;

        let bytes = general_purpose::STANDARD.decode(payload).map_err(|e| {
            anyhow!("Failed to decode base64 overlay for tile {}: {}", self.tile, e)
        })?;

        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
            .map_err(|e| anyhow!("Failed to decode PNG overlay for tile {}: {}", self.tile, e))?;

        let (channels, height, width, raw) = match decoded {
            DynamicImage::ImageLuma8(b) => (1, b.height() as usize, b.width() as usize, b.into_raw()),
            DynamicImage::ImageLumaA8(b) => (2, b.height() as usize, b.width() as usize, b.into_raw()),
            DynamicImage::ImageRgb8(b) => (3, b.height() as usize, b.width() as usize, b.into_raw()),
            DynamicImage::ImageRgba8(b) => (4, b.height() as usize, b.width() as usize, b.into_raw()),
            other => {
                return Err(anyhow!(
                    "Unsupported overlay pixel format {:?} for tile {}",
                    other.color(),
                    self.tile
                ))
            }
        };

        Array3::from_shape_vec((height, width, channels), raw)
            .map_err(|e| anyhow!("Failed to shape overlay data for tile {}: {}", self.tile, e))
    }
}

/// Read interface of the annotation store: the total number of overlay
/// records plus a lazy, finite, non-restartable sequence of all of them.
pub trait OverlayStore {
    fn count(&self) -> Result<u64>;
    fn records(&self) -> Result<Box<dyn Iterator<Item = Result<OverlayRecord>> + '_>>;
}

/// Annotation store backed by the MongoDB database the labeling tool writes
/// to.
pub struct MongoOverlayStore {
    collection: Collection<OverlayRecord>,
}

impl MongoOverlayStore {
    pub fn connect(url: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(url)
            .map_err(|e| anyhow!("Failed to connect to annotation store at {}: {}", url, e))?;
        let collection = client.database(database).collection(OVERLAY_COLLECTION);
        Ok(MongoOverlayStore { collection })
    }
}

impl OverlayStore for MongoOverlayStore {
    fn count(&self) -> Result<u64> {
        self.collection
            .count_documents(None, None)
            .map_err(|e| anyhow!("Failed to count overlay records: {}", e))
    }

    fn records(&self) -> Result<Box<dyn Iterator<Item = Result<OverlayRecord>> + '_>> {
        let cursor = self
            .collection
            .find(None, None)
            .map_err(|e| anyhow!("Failed to query overlay records: {}", e))?;

        Ok(Box::new(cursor.map(|document| {
            document.map_err(|e| anyhow!("Failed to read overlay record: {}", e))
        })))
    }
}
