//! Extraction methods run by the document extractor.

use std::sync::Arc;

use tracing::debug;

use super::{ExtractionMethod, ExtractionStrategy, RawExtraction, Result};
use crate::error::{ExtractionError, OcrError};
use crate::ocr::OcrBackend;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// The `%PDF-` header may sit anywhere in the first kilobyte.
const HEADER_WINDOW: usize = 1024;

fn ensure_pdf(method: ExtractionMethod, data: &[u8]) -> Result<()> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    if window.windows(5).any(|w| w == b"%PDF-") {
        Ok(())
    } else {
        Err(ExtractionError::Skipped {
            method: method.to_string(),
            reason: "input is not a PDF".to_string(),
        })
    }
}

/// Whole-document text through pdf-extract's layout pass.
pub struct PdfExtractMethod;

impl ExtractionStrategy for PdfExtractMethod {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::PdfExtract
    }

    fn extract(&self, data: &[u8]) -> Result<RawExtraction> {
        ensure_pdf(self.method(), data)?;
        let text = PdfExtractor::from_bytes(data)?.extract_text()?;
        Ok(RawExtraction::text(text))
    }
}

/// Per-page content-stream text through lopdf.
pub struct LopdfMethod;

impl ExtractionStrategy for LopdfMethod {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Lopdf
    }

    fn extract(&self, data: &[u8]) -> Result<RawExtraction> {
        ensure_pdf(self.method(), data)?;
        let text = PdfExtractor::from_bytes(data)?.extract_pages_text()?;
        Ok(RawExtraction::text(text))
    }
}

/// OCR over images embedded in the document.
pub struct OcrMethod {
    engine: Arc<dyn OcrBackend>,
    max_file_bytes: usize,
}

impl OcrMethod {
    pub fn new(engine: Arc<dyn OcrBackend>, max_file_bytes: usize) -> Self {
        Self {
            engine,
            max_file_bytes,
        }
    }
}

impl ExtractionStrategy for OcrMethod {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Ocr
    }

    fn extract(&self, data: &[u8]) -> Result<RawExtraction> {
        if data.len() > self.max_file_bytes {
            return Err(OcrError::TooLarge {
                size: data.len(),
                limit: self.max_file_bytes,
            }
            .into());
        }
        ensure_pdf(self.method(), data)?;

        let images = PdfExtractor::from_bytes(data)?.extract_all_images()?;
        if images.is_empty() {
            return Err(OcrError::NoImages.into());
        }

        let mut pages = Vec::with_capacity(images.len());
        let mut confidence_sum = 0.0f64;
        for (i, image) in images.iter().enumerate() {
            let page = self.engine.recognize(image)?;
            debug!("OCR image {}: {} chars, confidence {:.2}", i + 1, page.text.len(), page.confidence);
            confidence_sum += page.confidence as f64;
            pages.push(page.text);
        }

        Ok(RawExtraction {
            text: pages.join("\n\n"),
            ocr_confidence: Some(confidence_sum / images.len() as f64),
        })
    }
}
