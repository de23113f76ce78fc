//! Upload validation and image recompression.
//!
//! Every upload leaves here as a small baseline JPEG, base64-encoded, whatever
//! format it arrived in. Transparent pixels are composited onto white first,
//! since JPEG has no alpha channel.

use base64::{engine::general_purpose, Engine as _};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, Rgb, RgbImage};
use thiserror::Error;

const ALLOWED_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No file part in the request")]
    MissingFile,

    #[error("No selected image")]
    NoFileSelected,

    #[error("Invalid image format. Must be PNG, JPG, or JPEG")]
    InvalidFormat,
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The upload is not a raster image we can read.
    #[error("Unable to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),
}

/// Check the client-supplied filename. The extension is a gate only; the
/// decoder sniffs the real format from the bytes.
pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError::NoFileSelected);
    }

    let lower = filename.to_lowercase();
    if ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat)
    }
}

/// A recompressed upload ready to be inlined into a provider request.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub width: u32,
    pub height: u32,
    /// Size of the JPEG before base64 encoding.
    pub jpeg_len: usize,
    /// Standard base64, no line wrapping.
    pub base64: String,
}

impl NormalizedImage {
    pub fn data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.base64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImageNormalizer {
    quality: u8,
}

impl ImageNormalizer {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Decode, flatten and re-encode. CPU bound; call from a blocking task.
    pub fn normalize(&self, bytes: &[u8]) -> Result<NormalizedImage, NormalizeError> {
        let decoded = image::load_from_memory(bytes).map_err(NormalizeError::Decode)?;

        let rgb = if decoded.color().has_alpha() {
            flatten_onto_white(&decoded)
        } else {
            decoded.to_rgb8()
        };

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .encode_image(&rgb)
            .map_err(NormalizeError::Encode)?;

        Ok(NormalizedImage {
            width: rgb.width(),
            height: rgb.height(),
            jpeg_len: jpeg.len(),
            base64: general_purpose::STANDARD.encode(&jpeg),
        })
    }
}

/// Alpha-composite onto an opaque white canvas of the same size.
pub(crate) fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }

    out
}
