//! Error types for the tradeline-core library.

use thiserror::Error;

/// Main error type for the tradeline library.
#[derive(Error, Debug)]
pub enum TradelineError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Section parsing error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Page number out of range.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The document is too large for the OCR path.
    #[error("document too large for OCR: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    /// No page images were found to run OCR on.
    #[error("no images found for OCR")]
    NoImages,
}

/// Errors raised by a single extraction method.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The method produced text that failed the quality check.
    #[error("{method} output failed quality check: {reason}")]
    LowQuality { method: String, reason: String },

    /// The method is not available for this input.
    #[error("{method} skipped: {reason}")]
    Skipped { method: String, reason: String },

    /// The extraction task panicked or was cancelled.
    #[error("{method} task failed: {reason}")]
    Task { method: String, reason: String },

    /// PDF-level failure inside a method.
    #[error(transparent)]
    Pdf(#[from] PdfError),

    /// OCR-level failure inside a method.
    #[error(transparent)]
    Ocr(#[from] OcrError),
}

/// Errors raised while parsing a report section into account blocks.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A section contained no recognizable account block.
    #[error("no account blocks in section {section}")]
    EmptySection { section: usize },

    /// An account block was found but yielded no usable fields.
    #[error("account block at line {line} has no usable fields")]
    NoFields { line: usize },
}

/// Result type for the tradeline library.
pub type Result<T> = std::result::Result<T, TradelineError>;
