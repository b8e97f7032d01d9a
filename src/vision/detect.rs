//! Raster-to-grid extraction.
//!
//! A fixed 12x80 logical grid is laid over the image's actual pixel
//! dimensions, each axis scaled independently, and every cell is judged
//! by the mean darkness of its central sub-region. The only hard failure
//! is undecodable image bytes; everything else degrades into the
//! confidence score.

use image::GrayImage;
use imageproc::contrast::{ThresholdType, stretch_contrast, threshold};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::grid::{GridMode, HoleGrid};

/// Mean inverted brightness above which a cell counts as punched.
pub const DARKNESS_THRESHOLD: f64 = 0.3;

/// Minimum acceptable confidence for a photographed card.
pub const REAL_CONFIDENCE_FLOOR: f64 = 0.95;

/// Fraction of each cell edge skipped on either side, so only the
/// central 50% x 50% sub-region is sampled. Avoids printed grid lines
/// and neighbor-cell bleed.
const CELL_INSET: f64 = 0.25;

const BINARY_MIDPOINT: u8 = 128;

const WEIGHT_VALIDITY: f64 = 0.4;
const WEIGHT_ALIGNMENT: f64 = 0.4;
const WEIGHT_RATIO: f64 = 0.2;

#[derive(Debug, Error)]
#[error("failed to decode image: {0}")]
pub struct ImageDecodeError(#[from] pub image::ImageError);

/// Image-level facts recorded alongside the extracted grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMeta {
    pub image_width: u32,
    pub image_height: u32,
    pub detected_columns: usize,
}

/// Extraction result: a classic grid plus a confidence estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchPattern {
    pub grid: HoleGrid,
    pub confidence: f64,
    pub metadata: PatternMeta,
}

/// Grayscale, contrast-normalize, and binarize raw image bytes.
pub fn preprocess_image(bytes: &[u8]) -> Result<GrayImage, ImageDecodeError> {
    let gray = image::load_from_memory(bytes)?.to_luma8();
    let (lo, hi) = brightness_range(&gray);
    let stretched = if hi > lo {
        stretch_contrast(&gray, lo, hi, 0, 255)
    } else {
        gray
    };
    Ok(threshold(&stretched, BINARY_MIDPOINT, ThresholdType::Binary))
}

/// Observed min and max luma values across the image.
fn brightness_range(image: &GrayImage) -> (u8, u8) {
    let mut lo = u8::MAX;
    let mut hi = u8::MIN;
    for pixel in image.pixels() {
        let value = pixel.0[0];
        lo = lo.min(value);
        hi = hi.max(value);
    }
    (lo, hi)
}

/// Run the full extraction pipeline on raw image bytes.
pub fn detect_holes(bytes: &[u8]) -> Result<PunchPattern, ImageDecodeError> {
    let binary = preprocess_image(bytes)?;
    Ok(detect_holes_in(&binary))
}

/// Extract a punch pattern from an already-binarized image.
pub fn detect_holes_in(binary: &GrayImage) -> PunchPattern {
    let (width, height) = binary.dimensions();
    let mode = GridMode::Classic;
    let cell_width = width as f64 / mode.cols() as f64;
    let cell_height = height as f64 / mode.rows() as f64;

    let grid = HoleGrid::from_fn(mode, |row, col| {
        let darkness = cell_darkness(
            binary,
            col as f64 * cell_width,
            row as f64 * cell_height,
            cell_width,
            cell_height,
        );
        darkness > DARKNESS_THRESHOLD
    });

    let confidence = calculate_confidence(&grid);
    let detected_columns = grid.punched_columns();
    PunchPattern {
        grid,
        confidence,
        metadata: PatternMeta {
            image_width: width,
            image_height: height,
            detected_columns,
        },
    }
}

/// Mean inverted brightness over the central sub-region of one cell.
fn cell_darkness(image: &GrayImage, x: f64, y: f64, width: f64, height: f64) -> f64 {
    let (image_width, image_height) = image.dimensions();
    let x0 = (x + width * CELL_INSET).floor() as u32;
    let y0 = (y + height * CELL_INSET).floor() as u32;
    let x1 = ((x + width * (1.0 - CELL_INSET)).ceil() as u32)
        .max(x0 + 1)
        .min(image_width);
    let y1 = ((y + height * (1.0 - CELL_INSET)).ceil() as u32)
        .max(y0 + 1)
        .min(image_height);

    let mut total = 0.0;
    let mut samples = 0u32;
    for py in y0..y1 {
        for px in x0..x1 {
            let brightness = image.get_pixel(px, py).0[0] as f64 / 255.0;
            total += 1.0 - brightness;
            samples += 1;
        }
    }
    if samples == 0 {
        0.0
    } else {
        total / samples as f64
    }
}

/// Weighted plausibility score for an extracted grid.
pub fn calculate_confidence(grid: &HoleGrid) -> f64 {
    let counts: Vec<usize> = (0..grid.cols())
        .map(|col| grid.column_holes(col))
        .filter(|&count| count > 0)
        .collect();

    // Column validity: punched columns must hold between 1 and rows()
    // holes. Always true today; kept as a signal for stricter bounds.
    let validity = if counts.is_empty() {
        1.0
    } else {
        let valid = counts
            .iter()
            .filter(|&&count| (1..=grid.rows()).contains(&count))
            .count();
        valid as f64 / counts.len() as f64
    };

    // Alignment: per-column hole counts on a real card cluster tightly.
    let alignment = if counts.len() > 1 {
        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        let variance = counts
            .iter()
            .map(|&count| (count as f64 - mean).powi(2))
            .sum::<f64>()
            / counts.len() as f64;
        (1.0 - variance.sqrt() / mean).max(0.0)
    } else {
        1.0
    };

    let total_holes = grid.total_holes();
    let total_cells = grid.rows() * grid.cols();
    let ratio = if total_holes == 0 {
        0.0
    } else if total_holes * 2 > total_cells {
        0.3
    } else {
        1.0
    };

    (WEIGHT_VALIDITY * validity + WEIGHT_ALIGNMENT * alignment + WEIGHT_RATIO * ratio)
        .clamp(0.0, 1.0)
}

/// Acceptance gate for downstream decoding.
///
/// Virtual (user-drawn) grids must score exactly 1.0: any noise there is
/// an upstream logic error, not a tolerable vision artifact.
pub fn is_confidence_acceptable(confidence: f64, is_virtual: bool) -> bool {
    if is_virtual {
        confidence >= 1.0
    } else {
        confidence >= REAL_CONFIDENCE_FLOOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_grid_scores_below_plausible_grid() {
        let blank = HoleGrid::blank(GridMode::Classic);
        // One punch pair per column across ten columns.
        let plausible = HoleGrid::from_fn(GridMode::Classic, |row, col| {
            col < 10 && (row == 0 || row == 3)
        });
        assert!(calculate_confidence(&blank) < calculate_confidence(&plausible));
        assert_eq!(calculate_confidence(&plausible), 1.0);
    }

    #[test]
    fn saturated_grid_is_penalized() {
        let noise = HoleGrid::from_fn(GridMode::Classic, |_, _| true);
        let plausible = HoleGrid::from_fn(GridMode::Classic, |row, _| row == 2);
        assert!(calculate_confidence(&noise) < calculate_confidence(&plausible));
    }

    #[test]
    fn uneven_columns_lower_alignment() {
        let even = HoleGrid::from_fn(GridMode::Classic, |row, col| col < 20 && row < 2);
        let uneven = HoleGrid::from_fn(GridMode::Classic, |row, col| match col {
            0..10 => row < 1,
            10..20 => row < 9,
            _ => false,
        });
        assert!(calculate_confidence(&uneven) < calculate_confidence(&even));
    }

    #[test]
    fn acceptance_bar_is_stricter_for_virtual_cards() {
        assert!(is_confidence_acceptable(0.96, false));
        assert!(!is_confidence_acceptable(0.94, false));
        assert!(is_confidence_acceptable(1.0, true));
        assert!(!is_confidence_acceptable(0.99, true));
    }

    #[test]
    fn garbage_bytes_fail_preprocessing() {
        assert!(preprocess_image(b"definitely not an image").is_err());
    }
}
