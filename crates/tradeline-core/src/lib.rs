//! Core library for credit report tradeline extraction.
//!
//! This crate provides:
//! - concurrent PDF text extraction (pdf-extract, lopdf, optional OCR)
//! - bureau detection and bureau-aware section parsing
//! - field normalization (currency, dates, account numbers, creditors)
//! - negative-account classification and batch deduplication
//! - field validation and confidence scoring

pub mod bureau;
pub mod dedup;
pub mod error;
pub mod extraction;
pub mod models;
pub mod negative;
pub mod normalize;
pub mod ocr;
pub mod parser;
pub mod pdf;
pub mod pipeline;
pub mod validation;

pub use bureau::{BureauDetection, BureauDetector, BureauSource};
pub use dedup::{deduplicate, DedupReport};
pub use error::{Result, TradelineError};
pub use extraction::{DocumentExtractor, ExtractionMethod, ExtractionResult, Table};
pub use models::{AccountStatus, AccountType, CreditBureau, PersistenceRecord, PipelineConfig, Tradeline};
pub use negative::{NegativeAssessment, NegativeClassifier};
pub use ocr::{OcrBackend, OcrPage, TextBox};
#[cfg(feature = "ocr")]
pub use ocr::PureOcrEngine;
pub use parser::{RawAccount, ReportParser};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{PipelineOutput, ProcessingStats, RunContext, TradelinePipeline, UsageCounters, UsageSnapshot};
pub use validation::{FieldCheck, Severity, ValidationPipeline, ValidationResult};
