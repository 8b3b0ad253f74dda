use crate::error::{ContainerError, ContainerResult};
use image::{ImageError, RgbaImage};

/// A decoded page, ready for presentation
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: RgbaImage,
}

impl DecodedImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { width: pixels.width(), height: pixels.height(), pixels }
    }

    /// Size of the decoded pixel buffer in bytes
    pub fn decoded_bytes(&self) -> usize {
        self.pixels.as_raw().len()
    }
}

/// Bytes to pixels
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> ContainerResult<DecodedImage>;
}

/// Decoder backed by the `image` crate's format detection
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn decode(&self, bytes: &[u8]) -> ContainerResult<DecodedImage> {
        let image = image::load_from_memory(bytes).map_err(|err| match err {
            ImageError::Unsupported(reason) => ContainerError::UnsupportedFormat(reason.to_string()),
            other => ContainerError::Corrupt(other.to_string()),
        })?;

        Ok(DecodedImage::from_rgba(image.to_rgba8()))
    }
}
