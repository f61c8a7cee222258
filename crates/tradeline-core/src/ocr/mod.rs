//! OCR backends and post-OCR text correction.

pub mod correction;
#[cfg(feature = "ocr")]
mod engine;

#[cfg(feature = "ocr")]
pub use engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Vertical band (pixels) within which boxes count as one text row.
const ROW_HEIGHT: f32 = 20.0;

/// A recognized text region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }

    fn row(&self) -> i32 {
        (self.rect().1 / ROW_HEIGHT) as i32
    }
}

/// OCR output for one page image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrPage {
    /// Boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Page text: one line per row, boxes in a row separated by a column gap.
    pub text: String,

    /// Mean box confidence, 0 for an empty page.
    pub confidence: f32,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrPage {
    /// Build a page from unordered boxes.
    pub fn from_boxes(mut boxes: Vec<TextBox>, image_size: (u32, u32)) -> Self {
        boxes.sort_by(|a, b| {
            a.row().cmp(&b.row()).then_with(|| {
                a.rect()
                    .0
                    .partial_cmp(&b.rect().0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        let mut lines: Vec<String> = Vec::new();
        let mut current_row = None;
        for b in &boxes {
            let text = b.text.trim();
            if text.is_empty() {
                continue;
            }
            match lines.last_mut() {
                Some(line) if current_row == Some(b.row()) => {
                    line.push_str("  ");
                    line.push_str(text);
                }
                _ => lines.push(text.to_string()),
            }
            current_row = Some(b.row());
        }

        let confidence = if boxes.is_empty() {
            0.0
        } else {
            boxes.iter().map(|b| b.confidence).sum::<f32>() / boxes.len() as f32
        };

        Self {
            boxes,
            text: lines.join("\n"),
            confidence,
            image_size,
        }
    }
}

/// A text recognizer usable from blocking extraction tasks.
pub trait OcrBackend: Send + Sync {
    /// Recognize all text on one page image.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrPage, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(text: &str, x: f32, y: f32, confidence: f32) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_reading_order_rows() {
        let page = OcrPage::from_boxes(
            vec![
                text_box("$25,000", 200.0, 42.0, 0.9),
                text_box("CAPITAL ONE", 10.0, 5.0, 0.8),
                text_box("Credit Limit:", 10.0, 45.0, 1.0),
            ],
            (300, 100),
        );

        assert_eq!(page.text, "CAPITAL ONE\nCredit Limit:  $25,000");
        assert!((page.confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_empty_page() {
        let page = OcrPage::from_boxes(Vec::new(), (10, 10));
        assert_eq!(page.text, "");
        assert_eq!(page.confidence, 0.0);
    }
}
