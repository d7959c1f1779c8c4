use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Longest edge handed to the OCR engine. Phone captures run 3000–4000 px;
/// recognition gains nothing past ~300 DPI.
const MAX_OCR_DIMENSION: u32 = 2800;

/// Load a card photo from disk and return normalized PNG bytes ready for OCR.
pub fn prepare_for_ocr(path: &Path) -> Result<Vec<u8>, PreprocessError> {
    let img = image::open(path)?;
    encode_as_png(normalize(img))
}

/// Normalize raw upload bytes (JPEG / PNG / WEBP / …) into OCR-ready PNG bytes.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(normalize(img))
}

/// Downscale oversized captures, then grayscale + contrast stretch.
fn normalize(img: DynamicImage) -> DynamicImage {
    let img = if img.width() > MAX_OCR_DIMENSION || img.height() > MAX_OCR_DIMENSION {
        img.resize(
            MAX_OCR_DIMENSION,
            MAX_OCR_DIMENSION,
            image::imageops::FilterType::Lanczos3,
        )
    } else {
        img
    };

    DynamicImage::ImageLuma8(stretch_contrast(img.to_luma8()))
}

/// Remap the luminance histogram onto the full 0–255 range. Card backgrounds
/// photograph as a narrow gray band; uniform images are returned as-is.
fn stretch_contrast(gray: GrayImage) -> GrayImage {
    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px == min_px {
        return gray;
    }

    let range = (max_px - min_px) as u32;
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    })
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
