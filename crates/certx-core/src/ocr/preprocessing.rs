//! Page image preparation before OCR.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::models::config::OcrConfig;

/// Prepare a page for recognition.
///
/// Narrow scans (phone photos, low-DPI scans) are upscaled by
/// `upscale_factor` with a cubic filter, then the page is converted to
/// grayscale.
pub fn prepare_page(image: &DynamicImage, config: &OcrConfig) -> DynamicImage {
    let (width, height) = image.dimensions();

    let scaled = if width < config.upscale_below_width && config.upscale_factor > 1 {
        let (new_width, new_height) = (
            width.saturating_mul(config.upscale_factor),
            height.saturating_mul(config.upscale_factor),
        );
        debug!(
            "Upscaling page {}x{} -> {}x{}",
            width, height, new_width, new_height
        );
        image.resize_exact(new_width, new_height, FilterType::CatmullRom)
    } else {
        image.clone()
    };

    DynamicImage::ImageLuma8(scaled.to_luma8())
}
