//! Image quality outlier detection
//!
//! Works on the luma channel:
//! - **Sharpness:** variance of the 4-neighbour Laplacian (low = blurred)
//! - **Brightness:** mean luma
//! - **Contrast:** luma standard deviation
//!
//! Each triggered rule adds its weight to the frame risk (blur 0.40,
//! exposure 0.25, contrast 0.20, tiny image 0.15).

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

/// Laplacian variance below which an image counts as blurred
pub const BLUR_THRESHOLD: f64 = 100.0;
/// Mean luma below which an image is under-exposed
pub const DARK_THRESHOLD: f64 = 40.0;
/// Mean luma above which an image is over-exposed
pub const BRIGHT_THRESHOLD: f64 = 215.0;
/// Luma standard deviation below which contrast is too low
pub const CONTRAST_THRESHOLD: f64 = 20.0;
/// Images smaller than this on either side are suspicious
pub const MIN_SIDE_PX: u32 = 64;

const BLUR_WEIGHT: f64 = 0.40;
const EXPOSURE_WEIGHT: f64 = 0.25;
const CONTRAST_WEIGHT: f64 = 0.20;
const TINY_WEIGHT: f64 = 0.15;

/// Technical signals for one image or video frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSignals {
    pub width: u32,
    pub height: u32,
    pub sharpness: f64,
    pub brightness: f64,
    pub contrast: f64,
    /// Sharpness mapped onto 0..100
    pub quality_score: f64,
    /// Names of the triggered rules
    pub anomalies: Vec<String>,
    /// 0..1
    pub risk: f64,
}

/// Technical signals aggregated over every analysed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSummary {
    pub frames: Vec<TechnicalSignals>,
    /// Mean per-frame risk (0 when there are no frames)
    pub mean_risk: f64,
}

impl TechnicalSummary {
    pub fn from_frames(frames: Vec<TechnicalSignals>) -> Self {
        let mean_risk = if frames.is_empty() {
            0.0
        } else {
            frames.iter().map(|f| f.risk).sum::<f64>() / frames.len() as f64
        };
        Self {
            frames,
            mean_risk: mean_risk.clamp(0.0, 1.0),
        }
    }
}

pub struct TechnicalExtractor;

impl TechnicalExtractor {
    pub fn analyze(image: &DynamicImage) -> TechnicalSignals {
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();

        let sharpness = laplacian_variance(&luma);
        let (brightness, contrast) = luma_stats(&luma);
        let quality_score = (sharpness / 10.0).min(100.0);

        let mut anomalies = Vec::new();
        let mut risk = 0.0;
        if sharpness < BLUR_THRESHOLD {
            anomalies.push("blur".to_string());
            risk += BLUR_WEIGHT;
        }
        if brightness < DARK_THRESHOLD {
            anomalies.push("underexposed".to_string());
            risk += EXPOSURE_WEIGHT;
        } else if brightness > BRIGHT_THRESHOLD {
            anomalies.push("overexposed".to_string());
            risk += EXPOSURE_WEIGHT;
        }
        if contrast < CONTRAST_THRESHOLD {
            anomalies.push("low_contrast".to_string());
            risk += CONTRAST_WEIGHT;
        }
        if width < MIN_SIDE_PX || height < MIN_SIDE_PX {
            anomalies.push("tiny".to_string());
            risk += TINY_WEIGHT;
        }

        TechnicalSignals {
            width,
            height,
            sharpness,
            brightness,
            contrast,
            quality_score,
            anomalies,
            risk: f64::min(risk, 1.0),
        }
    }
}

/// Variance of the 4-neighbour Laplacian over interior pixels
fn laplacian_variance(luma: &GrayImage) -> f64 {
    let (width, height) = luma.dimensions();
    if width < 3 || height < 3 {
        return 0.0;
    }

    let px = |x: u32, y: u32| f64::from(luma.get_pixel(x, y)[0]);
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut count = 0.0;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let lap = 4.0 * px(x, y) - px(x - 1, y) - px(x + 1, y) - px(x, y - 1) - px(x, y + 1);
            sum += lap;
            sum_sq += lap * lap;
            count += 1.0;
        }
    }

    let mean = sum / count;
    (sum_sq / count - mean * mean).max(0.0)
}

/// (mean, standard deviation) of luma
fn luma_stats(luma: &GrayImage) -> (f64, f64) {
    let (width, height) = luma.dimensions();
    let count = width as usize * height as usize;
    if count == 0 {
        return (0.0, 0.0);
    }
    let (sum, sum_sq) = luma.pixels().fold((0.0, 0.0), |(s, sq), p| {
        let v = f64::from(p[0]);
        (s + v, sq + v * v)
    });
    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn checkerboard(side: u32, tile: u32) -> DynamicImage {
        let img = RgbImage::from_fn(side, side, |x, y| {
            if (x / tile + y / tile) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    fn flat(side: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(side, side, Luma([value])))
    }

    #[test]
    fn test_sharp_image_has_no_anomalies() {
        let signals = TechnicalExtractor::analyze(&checkerboard(128, 8));
        assert!(signals.sharpness > BLUR_THRESHOLD, "sharpness {}", signals.sharpness);
        assert!(signals.contrast > 100.0);
        assert!(signals.anomalies.is_empty(), "anomalies {:?}", signals.anomalies);
        assert_eq!(signals.risk, 0.0);
        assert_eq!(signals.quality_score, 100.0);
    }

    #[test]
    fn test_flat_image_is_blurred_and_flat() {
        let signals = TechnicalExtractor::analyze(&flat(128, 128));
        assert_eq!(signals.sharpness, 0.0);
        assert_eq!(signals.contrast, 0.0);
        assert_eq!(signals.anomalies, vec!["blur", "low_contrast"]);
        assert!((signals.risk - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_tiny_dark_image_caps_at_one() {
        let signals = TechnicalExtractor::analyze(&flat(16, 0));
        assert_eq!(signals.anomalies, vec!["blur", "underexposed", "low_contrast", "tiny"]);
        assert!((signals.risk - 1.0).abs() < 1e-9);
        assert!(signals.risk <= 1.0);
    }

    #[test]
    fn test_degenerate_dimensions() {
        let signals = TechnicalExtractor::analyze(&flat(2, 250));
        assert_eq!(signals.sharpness, 0.0);
        assert!(signals.anomalies.contains(&"overexposed".to_string()));
    }

    #[test]
    fn test_summary_mean_risk() {
        let frames = vec![
            TechnicalExtractor::analyze(&checkerboard(128, 8)),
            TechnicalExtractor::analyze(&flat(128, 128)),
        ];
        let summary = TechnicalSummary::from_frames(frames);
        assert!((summary.mean_risk - 0.3).abs() < 1e-9);
        assert_eq!(TechnicalSummary::from_frames(Vec::new()).mean_risk, 0.0);
    }
}
