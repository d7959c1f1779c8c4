use image::{DynamicImage, GrayImage};

use crate::types::SharpnessReport;

/// Laplacian-variance score below which a card photo is too blurry to read.
/// 100–120 is the usual band for printed text.
pub const DEFAULT_SHARPNESS_THRESHOLD: f64 = 110.0;

/// Score an already-decoded image for sharpness.
pub fn assess_sharpness(image: &DynamicImage, threshold: f64) -> SharpnessReport {
    let gray = image.to_luma8();
    SharpnessReport::scored(laplacian_variance(&gray), threshold)
}

/// Decode raw upload bytes and score them. A decode failure is folded into
/// the report rather than raised, so a corrupt upload reads as "not clear".
pub fn assess_sharpness_bytes(data: &[u8], threshold: f64) -> SharpnessReport {
    match image::load_from_memory(data) {
        Ok(img) => assess_sharpness(&img, threshold),
        Err(e) => SharpnessReport::unreadable(threshold, e.to_string()),
    }
}

/// Variance of the 4-neighbor discrete Laplacian over the luminance channel.
///
/// Sharp photos have strong edges, so the second derivative swings hard and
/// its variance is large; defocus flattens it. Images smaller than 3×3 have
/// no interior pixels and score 0.0.
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = (gray.width() as i64, gray.height() as i64);
    if w < 3 || h < 3 {
        return 0.0;
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let px =
                |dx: i64, dy: i64| gray.get_pixel((x + dx) as u32, (y + dy) as u32).0[0] as f64;
            let lap = px(0, -1) + px(0, 1) + px(-1, 0) + px(1, 0) - 4.0 * px(0, 0);
            sum += lap;
            sum_sq += lap * lap;
            count += 1;
        }
    }

    let mean = sum / count as f64;
    sum_sq / count as f64 - mean * mean
}
