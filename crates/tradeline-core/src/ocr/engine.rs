//! OCR backend using `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{OcrBackend, OcrPage, TextBox};

/// Detection model file expected in the model directory.
pub const DET_MODEL: &str = "det.onnx";
/// Recognition model file expected in the model directory.
pub const REC_MODEL: &str = "latin_rec.onnx";
/// Character dictionary expected in the model directory.
pub const DICTIONARY: &str = "latin_dict.txt";

/// PaddleOCR detection + recognition through `pure-onnx-ocr`.
///
/// The inner engine is locked per page, so concurrent callers run one at a
/// time.
pub struct PureOcrEngine {
    engine: Mutex<pure_onnx_ocr::engine::OcrEngine>,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Create an engine from model files in a directory.
    pub fn from_dir(model_dir: &Path, config: &OcrConfig) -> Result<Self, OcrError> {
        for file in [DET_MODEL, REC_MODEL, DICTIONARY] {
            if !model_dir.join(file).exists() {
                return Err(OcrError::ModelLoad(format!(
                    "{} not found in {}",
                    file,
                    model_dir.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&model_dir.join(DET_MODEL))
            .rec_model_path(&model_dir.join(REC_MODEL))
            .dictionary_path(&model_dir.join(DICTIONARY))
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine: Mutex::new(engine),
            keep_unk: config.keep_unk,
        })
    }

    /// Engine from the configured model directory, if one is set.
    pub fn from_config(config: &OcrConfig) -> Result<Option<Self>, OcrError> {
        config
            .model_dir
            .as_deref()
            .map(|dir| Self::from_dir(dir, config))
            .transpose()
    }
}

impl OcrBackend for PureOcrEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<OcrPage, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();
        debug!("Running OCR on {}x{} image", width, height);

        let engine = self
            .engine
            .lock()
            .map_err(|_| OcrError::Recognition("OCR engine lock poisoned".to_string()))?;
        let results = engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
                confidence: r.confidence,
            })
            .collect();

        let page = OcrPage::from_boxes(boxes, (width, height));
        info!(
            "OCR complete: {} text boxes in {}ms (confidence {:.2})",
            page.boxes.len(),
            start.elapsed().as_millis(),
            page.confidence
        );
        Ok(page)
    }
}

/// First four exterior points of a polygon as `[x1, y1, ..., x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_models() {
        let dir = tempfile::tempdir().unwrap();
        let err = PureOcrEngine::from_dir(dir.path(), &OcrConfig::default()).err().unwrap();
        assert!(matches!(err, OcrError::ModelLoad(_)));
    }

    #[test]
    fn test_no_model_dir_configured() {
        assert!(PureOcrEngine::from_config(&OcrConfig::default()).unwrap().is_none());
    }
}
