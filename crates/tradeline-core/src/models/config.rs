//! Configuration structures for the tradeline pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::tradeline::CreditBureau;
use crate::normalize::currency::CurrencyContract;

/// Main configuration for the tradeline pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Document extraction configuration.
    pub extraction: ExtractionConfig,

    /// OCR path configuration.
    pub ocr: OcrConfig,

    /// Bureau detection configuration.
    pub bureau: BureauConfig,

    /// Field normalization configuration.
    pub normalization: NormalizationConfig,

    /// Negative-account classifier configuration.
    pub negative: NegativeConfig,

    /// Validation and scoring configuration.
    pub validation: ValidationConfig,
}

/// Extraction fan-out configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Upper bound for the whole concurrent extraction phase, in seconds.
    pub timeout_secs: u64,

    /// Minimum text length for an extraction to count as usable.
    pub min_text_length: usize,

    /// Minimum number of distinct credit-report keywords in usable text.
    pub min_keyword_hits: usize,

    /// Run the pdf-extract text method.
    pub enable_pdf_extract: bool,

    /// Run the lopdf content-stream method.
    pub enable_lopdf: bool,

    /// Run the OCR method when an engine is available.
    pub enable_ocr: bool,

    /// Detect tables in extracted text.
    pub detect_tables: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            min_text_length: 100,
            min_keyword_hits: 3,
            enable_pdf_extract: true,
            enable_lopdf: true,
            enable_ocr: true,
            detect_tables: true,
        }
    }
}

/// OCR path configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory containing `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: Option<PathBuf>,

    /// Files larger than this are not sent through OCR.
    pub max_file_bytes: usize,

    /// Keep `[UNK]` tokens in recognized text.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            max_file_bytes: 5 * 1024 * 1024,
            keep_unk: false,
        }
    }
}

/// Bureau detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BureauConfig {
    /// Bureau used when no detection method scores positively.
    pub default_bureau: CreditBureau,
}

impl Default for BureauConfig {
    fn default() -> Self {
        Self {
            default_bureau: CreditBureau::Experian,
        }
    }
}

/// Field normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Output contract for `credit_limit` and `account_balance`.
    pub currency_contract: CurrencyContract,

    /// Correct OCR-damaged field labels in account blocks before matching.
    pub ocr_correction: bool,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            currency_contract: CurrencyContract::WholeDollar,
            ocr_correction: true,
        }
    }
}

/// Negative-account classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativeConfig {
    /// Score at or above which an account is negative.
    pub threshold: f64,
}

impl Default for NegativeConfig {
    fn default() -> Self {
        Self { threshold: 0.35 }
    }
}

/// Validation and confidence scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum confidence (0-100) for a record to be valid.
    pub min_confidence: f64,

    /// OCR quality used when the caller supplies none (0.0 - 1.0).
    pub default_ocr_quality: f64,

    /// Earliest plausible year for `date_opened`.
    pub min_opened_year: i32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_confidence: 50.0,
            default_ocr_quality: 0.8,
            min_opened_year: 1950,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"negative": {"threshold": 0.5}}"#).unwrap();
        assert_eq!(config.negative.threshold, 0.5);
        assert_eq!(config.extraction.timeout_secs, 120);
        assert_eq!(config.bureau.default_bureau, CreditBureau::Experian);
        assert_eq!(config.normalization.currency_contract, CurrencyContract::WholeDollar);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PipelineConfig::default();
        config.validation.min_confidence = 65.0;
        config.save(&path).unwrap();

        let loaded = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.validation.min_confidence, 65.0);
    }
}
