//! Local image fix-ups ahead of inpainting.
//!
//! Flux fill rejects inputs under 256 px per side and expects a mask with the
//! exact dimensions of the image it is applied to.

use super::ProviderError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;

/// Smallest side length accepted by the fill model.
pub const MIN_SIDE: u32 = 256;

pub(crate) fn decode(bytes: &[u8], what: &str) -> Result<DynamicImage, ProviderError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| ProviderError::InvalidResponse(format!("Could not decode {}: {}", what, e)))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ProviderError::InvalidResponse(format!("{} has no pixels", what)));
    }
    Ok(image)
}

/// Size an image must be scaled to so both sides reach [`MIN_SIDE`], keeping
/// its aspect ratio. `None` when it is already large enough.
pub(crate) fn upscaled_size(width: u32, height: u32) -> Option<(u32, u32)> {
    if width >= MIN_SIDE && height >= MIN_SIDE {
        return None;
    }
    let shortest = u64::from(width.min(height).max(1));
    let scale = |length: u32| {
        let scaled = (u64::from(length) * u64::from(MIN_SIDE)).div_ceil(shortest);
        u32::try_from(scaled).unwrap_or(u32::MAX)
    };
    Some((scale(width), scale(height)))
}

/// Upscale an undersized image. `None` when no resize was needed.
pub(crate) fn upscale(image: &DynamicImage) -> Option<DynamicImage> {
    upscaled_size(image.width(), image.height())
        .map(|(width, height)| image.resize_exact(width, height, FilterType::Lanczos3))
}

/// Stretch a mask onto the image dimensions. `None` when they already match.
pub(crate) fn fit_mask(mask: &DynamicImage, image: &DynamicImage) -> Option<DynamicImage> {
    let (width, height) = image.dimensions();
    (mask.dimensions() != (width, height))
        .then(|| mask.resize_exact(width, height, FilterType::Lanczos3))
}

pub(crate) fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>, ProviderError> {
    // JPEG has no alpha channel.
    encode(&DynamicImage::ImageRgb8(image.to_rgb8()), ImageFormat::Jpeg)
}

pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ProviderError> {
    encode(image, ImageFormat::Png)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, ProviderError> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, format)
        .map_err(|e| ProviderError::InvalidResponse(format!("Could not encode image: {}", e)))?;
    Ok(bytes.into_inner())
}
