//! Concurrent document text extraction.
//!
//! Every enabled method runs as its own blocking task on an owned copy of
//! the document and validates its own output. The whole phase is bounded by
//! one timeout; the first successful method in declaration order wins.

mod methods;
pub mod tables;

pub use methods::{LopdfMethod, OcrMethod, PdfExtractMethod};
pub use tables::detect_tables;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::ocr::OcrBackend;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// A table: rows of cell strings.
pub type Table = Vec<Vec<String>>;

/// Keywords counted by the quality check (distinct hits).
pub const CREDIT_REPORT_KEYWORDS: &[&str] = &[
    "credit",
    "balance",
    "account",
    "tradeline",
    "payment",
    "creditor",
    "experian",
    "equifax",
    "transunion",
    "report",
    "limit",
    "opened",
    "status",
];

/// How the document text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    PdfExtract,
    Lopdf,
    Ocr,
    PreExtracted,
    /// The concurrent phase hit its timeout.
    Timeout,
    /// Every method failed.
    None,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PdfExtract => "pdf_extract",
            Self::Lopdf => "lopdf",
            Self::Ocr => "ocr",
            Self::PreExtracted => "pre_extracted",
            Self::Timeout => "timeout",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-document extraction result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub text: String,
    pub tables: Vec<Table>,
    pub method: ExtractionMethod,
    /// Mean recognition confidence when the text came from OCR.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f64>,
}

impl ExtractionResult {
    /// An unsuccessful result; callers fall back to a paid path.
    pub fn failed(method: ExtractionMethod) -> Self {
        Self {
            success: false,
            text: String::new(),
            tables: Vec::new(),
            method,
            ocr_confidence: None,
        }
    }
}

/// Text produced by one method, before tables are detected.
#[derive(Debug, Clone, Default)]
pub struct RawExtraction {
    pub text: String,
    pub ocr_confidence: Option<f64>,
}

impl RawExtraction {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ocr_confidence: None,
        }
    }
}

/// One way of getting text out of a document.
pub trait ExtractionStrategy: Send + Sync {
    fn method(&self) -> ExtractionMethod;

    /// Extract text. Runs on a blocking thread.
    fn extract(&self, data: &[u8]) -> Result<RawExtraction>;
}

/// Minimum length and keyword coverage for usable text.
#[derive(Debug, Clone)]
pub struct QualityCheck {
    pub min_text_length: usize,
    pub min_keyword_hits: usize,
}

impl QualityCheck {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
            min_keyword_hits: config.min_keyword_hits,
        }
    }

    /// Number of distinct report keywords present (case-insensitive).
    pub fn keyword_hits(text: &str) -> usize {
        let lower = text.to_lowercase();
        CREDIT_REPORT_KEYWORDS
            .iter()
            .filter(|k| lower.contains(*k))
            .count()
    }

    pub fn check(&self, method: ExtractionMethod, text: &str) -> Result<()> {
        let length = text.trim().chars().count();
        if length < self.min_text_length {
            return Err(ExtractionError::LowQuality {
                method: method.to_string(),
                reason: format!("{} chars, need {}", length, self.min_text_length),
            });
        }

        let hits = Self::keyword_hits(text);
        if hits < self.min_keyword_hits {
            return Err(ExtractionError::LowQuality {
                method: method.to_string(),
                reason: format!("{} report keywords, need {}", hits, self.min_keyword_hits),
            });
        }

        Ok(())
    }
}

impl Default for QualityCheck {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

/// Runs extraction methods concurrently and picks the winner.
pub struct DocumentExtractor {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
    quality: QualityCheck,
    timeout: Duration,
    detect_tables: bool,
}

impl DocumentExtractor {
    /// Extractor with the free PDF text methods enabled in `config`.
    pub fn new(config: &ExtractionConfig) -> Self {
        let mut strategies: Vec<Arc<dyn ExtractionStrategy>> = Vec::new();
        if config.enable_pdf_extract {
            strategies.push(Arc::new(PdfExtractMethod));
        }
        if config.enable_lopdf {
            strategies.push(Arc::new(LopdfMethod));
        }

        Self {
            strategies,
            quality: QualityCheck::from_config(config),
            timeout: Duration::from_secs(config.timeout_secs),
            detect_tables: config.detect_tables,
        }
    }

    /// Extractor with no methods; add them with `with_strategy`.
    pub fn empty(config: &ExtractionConfig) -> Self {
        Self {
            strategies: Vec::new(),
            ..Self::new(config)
        }
    }

    /// Append the OCR method (runs last in winner order).
    pub fn with_ocr(self, engine: Arc<dyn OcrBackend>, max_file_bytes: usize) -> Self {
        self.with_strategy(Arc::new(OcrMethod::new(engine, max_file_bytes)))
    }

    /// Append a method.
    pub fn with_strategy(mut self, strategy: Arc<dyn ExtractionStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Set the timeout for the concurrent phase.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured methods in winner order.
    pub fn methods(&self) -> Vec<ExtractionMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    /// Run all methods on the document.
    pub async fn extract(&self, data: Arc<[u8]>) -> ExtractionResult {
        if self.strategies.is_empty() {
            warn!("No extraction methods configured");
            return ExtractionResult::failed(ExtractionMethod::None);
        }

        let handles: Vec<_> = self
            .strategies
            .iter()
            .map(|strategy| {
                let strategy = Arc::clone(strategy);
                let data = Arc::clone(&data);
                let quality = self.quality.clone();
                tokio::task::spawn_blocking(move || {
                    let raw = strategy.extract(&data)?;
                    quality.check(strategy.method(), &raw.text)?;
                    Ok::<_, ExtractionError>(raw)
                })
            })
            .collect();

        let gather = async move {
            let mut outcomes = Vec::with_capacity(handles.len());
            for handle in handles {
                outcomes.push(handle.await);
            }
            outcomes
        };

        let outcomes = match tokio::time::timeout(self.timeout, gather).await {
            Ok(outcomes) => outcomes,
            Err(_) => {
                warn!("Extraction timed out after {:?}", self.timeout);
                return ExtractionResult::failed(ExtractionMethod::Timeout);
            }
        };

        let mut winner = None;
        for (strategy, outcome) in self.strategies.iter().zip(outcomes) {
            let method = strategy.method();
            let outcome = outcome.unwrap_or_else(|e| {
                Err(ExtractionError::Task {
                    method: method.to_string(),
                    reason: e.to_string(),
                })
            });
            match outcome {
                Ok(raw) if winner.is_none() => winner = Some((method, raw)),
                Ok(_) => debug!("{} also succeeded", method),
                Err(e) => warn!("Extraction method {} failed: {}", method, e),
            }
        }

        match winner {
            Some((method, raw)) => {
                info!("Extracted {} chars with {}", raw.text.len(), method);
                self.finish(method, raw)
            }
            None => {
                warn!("All extraction methods failed");
                ExtractionResult::failed(ExtractionMethod::None)
            }
        }
    }

    /// Wrap caller-supplied text; the quality check still sets `success`.
    pub fn from_text(&self, text: String, tables: Vec<Table>) -> ExtractionResult {
        let success = match self.quality.check(ExtractionMethod::PreExtracted, &text) {
            Ok(()) => true,
            Err(e) => {
                debug!("Pre-extracted text: {}", e);
                false
            }
        };
        let tables = if tables.is_empty() && self.detect_tables {
            detect_tables(&text)
        } else {
            tables
        };

        ExtractionResult {
            success,
            text,
            tables,
            method: ExtractionMethod::PreExtracted,
            ocr_confidence: None,
        }
    }

    fn finish(&self, method: ExtractionMethod, raw: RawExtraction) -> ExtractionResult {
        let tables = if self.detect_tables {
            detect_tables(&raw.text)
        } else {
            Vec::new()
        };
        debug!("Detected {} tables", tables.len());

        ExtractionResult {
            success: true,
            text: raw.text,
            tables,
            method,
            ocr_confidence: raw.ocr_confidence,
        }
    }
}
