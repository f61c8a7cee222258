//! End-to-end document processing.
//!
//! extract → detect bureau → parse → normalize → classify → discard
//! unidentifiable → deduplicate → validate.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::bureau::{BureauDetection, BureauDetector};
use crate::dedup::deduplicate;
use crate::error::{Result, TradelineError};
use crate::extraction::{DocumentExtractor, ExtractionMethod, ExtractionResult, Table};
use crate::models::{CreditBureau, PipelineConfig, Tradeline};
use crate::negative::NegativeClassifier;
use crate::normalize::build_tradeline;
use crate::ocr::OcrBackend;
use crate::parser::{ParseStrategy, ReportParser};
use crate::validation::{Severity, ValidationPipeline, ValidationResult};

/// Caller-supplied context for one run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Owner written onto every tradeline.
    pub user_id: Option<String>,
    /// Overrides bureau detection.
    pub bureau_hint: Option<CreditBureau>,
    /// OCR quality for scoring; falls back to the extractor's value.
    pub ocr_confidence: Option<f64>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_bureau_hint(mut self, bureau: CreditBureau) -> Self {
        self.bureau_hint = Some(bureau);
        self
    }

    pub fn with_ocr_confidence(mut self, confidence: f64) -> Self {
        self.ocr_confidence = Some(confidence);
        self
    }
}

/// Counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub extraction_success: bool,
    pub parse_strategy: Option<ParseStrategy>,
    pub sections_found: usize,
    pub parse_failures: usize,
    pub accounts_parsed: usize,
    /// Records with neither creditor nor account number.
    pub discarded: usize,
    pub missing_account_number: usize,
    pub duplicates_removed: usize,
    pub negative_accounts: usize,
    pub severity_counts: BTreeMap<Severity, usize>,
}

/// Everything one run produces. `validations[i]` belongs to `tradelines[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub extraction_method: ExtractionMethod,
    pub bureau: BureauDetection,
    pub tradelines: Vec<Tradeline>,
    pub validations: Vec<ValidationResult>,
    pub stats: ProcessingStats,
}

/// Usage counters shared across concurrent runs.
#[derive(Debug, Default)]
pub struct UsageCounters {
    documents: AtomicU64,
    pdf_extract: AtomicU64,
    lopdf: AtomicU64,
    ocr: AtomicU64,
    pre_extracted: AtomicU64,
    failed: AtomicU64,
    tradelines: AtomicU64,
}

/// Point-in-time copy of [`UsageCounters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub documents: u64,
    pub pdf_extract: u64,
    pub lopdf: u64,
    pub ocr: u64,
    pub pre_extracted: u64,
    pub failed: u64,
    pub tradelines: u64,
}

impl UsageCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, method: ExtractionMethod, tradelines: usize) {
        self.documents.fetch_add(1, Ordering::Relaxed);
        let counter = match method {
            ExtractionMethod::PdfExtract => &self.pdf_extract,
            ExtractionMethod::Lopdf => &self.lopdf,
            ExtractionMethod::Ocr => &self.ocr,
            ExtractionMethod::PreExtracted => &self.pre_extracted,
            ExtractionMethod::Timeout | ExtractionMethod::None => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.tradelines.fetch_add(tradelines as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            documents: self.documents.load(Ordering::Relaxed),
            pdf_extract: self.pdf_extract.load(Ordering::Relaxed),
            lopdf: self.lopdf.load(Ordering::Relaxed),
            ocr: self.ocr.load(Ordering::Relaxed),
            pre_extracted: self.pre_extracted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            tradelines: self.tradelines.load(Ordering::Relaxed),
        }
    }
}

/// The full tradeline pipeline.
pub struct TradelinePipeline {
    config: PipelineConfig,
    extractor: DocumentExtractor,
    detector: BureauDetector,
    classifier: NegativeClassifier,
    validator: ValidationPipeline,
    counters: Option<Arc<UsageCounters>>,
}

impl TradelinePipeline {
    /// Build the pipeline. The OCR method is added when a model directory
    /// is configured; a configured but unloadable model is an error.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let mut extractor = DocumentExtractor::new(&config.extraction);

        #[cfg(feature = "ocr")]
        if config.extraction.enable_ocr {
            if let Some(engine) = crate::ocr::PureOcrEngine::from_config(&config.ocr)? {
                extractor = extractor.with_ocr(Arc::new(engine), config.ocr.max_file_bytes);
            }
        }

        Ok(Self::with_extractor(config, extractor))
    }

    /// Pipeline around a custom extractor.
    pub fn with_extractor(config: PipelineConfig, extractor: DocumentExtractor) -> Self {
        Self {
            detector: BureauDetector::new(&config.bureau),
            classifier: NegativeClassifier::new(&config.negative),
            validator: ValidationPipeline::new(&config.validation),
            extractor,
            config,
            counters: None,
        }
    }

    /// Add an OCR backend as the last extraction method.
    pub fn with_ocr_backend(mut self, backend: Arc<dyn OcrBackend>) -> Self {
        self.extractor = self.extractor.with_ocr(backend, self.config.ocr.max_file_bytes);
        self
    }

    pub fn with_counters(mut self, counters: Arc<UsageCounters>) -> Self {
        self.counters = Some(counters);
        self
    }

    pub fn with_validator(mut self, validator: ValidationPipeline) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract and process a document.
    pub async fn process_document(&self, data: Vec<u8>, ctx: &RunContext) -> PipelineOutput {
        info!("Processing document ({} bytes)", data.len());
        let extraction = self.extractor.extract(Arc::from(data)).await;
        self.process_extraction(extraction, ctx)
    }

    /// Process pre-extracted text and tables.
    pub fn process_text(&self, text: &str, tables: Vec<Table>, ctx: &RunContext) -> PipelineOutput {
        let extraction = self.extractor.from_text(text.to_string(), tables);
        if !extraction.success {
            debug!("Pre-extracted text is below the quality bar, parsing anyway");
        }
        self.process_extraction(extraction, ctx)
    }

    /// Process a `.pdf` or `.txt` file.
    pub async fn process_path(&self, path: &Path, ctx: &RunContext) -> Result<PipelineOutput> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("pdf") => {
                let data = std::fs::read(path)?;
                Ok(self.process_document(data, ctx).await)
            }
            Some("txt") => {
                let text = std::fs::read_to_string(path)?;
                Ok(self.process_text(&text, Vec::new(), ctx))
            }
            _ => Err(TradelineError::Config(format!(
                "unsupported input {}, expected .pdf or .txt",
                path.display()
            ))),
        }
    }

    fn process_extraction(&self, extraction: ExtractionResult, ctx: &RunContext) -> PipelineOutput {
        let method = extraction.method;
        let mut stats = ProcessingStats {
            extraction_success: extraction.success,
            ..Default::default()
        };

        let bureau = self.detector.detect(&extraction.text, ctx.bureau_hint);

        if method != ExtractionMethod::PreExtracted && !extraction.success {
            warn!("Extraction failed ({}), no tradelines produced", method);
            self.record_usage(method, 0);
            return PipelineOutput {
                extraction_method: method,
                bureau,
                tradelines: Vec::new(),
                validations: Vec::new(),
                stats,
            };
        }

        let parser = ReportParser::new(bureau.bureau)
            .with_label_correction(self.config.normalization.ocr_correction);
        let parsed = parser.parse(&extraction.text, &extraction.tables);
        stats.parse_strategy = Some(parsed.strategy);
        stats.sections_found = parsed.sections;
        stats.parse_failures = parsed.failures;
        stats.accounts_parsed = parsed.accounts.len();

        let ocr_confidence = ctx.ocr_confidence.or(extraction.ocr_confidence);
        let mut tradelines = Vec::with_capacity(parsed.accounts.len());
        for raw in &parsed.accounts {
            let mut tradeline = build_tradeline(raw, bureau.bureau, &self.config.normalization);
            if !tradeline.is_identifiable() {
                stats.discarded += 1;
                continue;
            }
            tradeline.user_id = ctx.user_id.clone();
            tradeline.ocr_confidence = ocr_confidence;
            self.classifier.apply(&mut tradeline);
            tradelines.push(tradeline);
        }

        let (tradelines, report) = deduplicate(tradelines);
        stats.missing_account_number = report.missing_account_number;
        stats.duplicates_removed = report.duplicates_removed;
        stats.negative_accounts = tradelines.iter().filter(|t| t.is_negative).count();

        let validations = self.validator.validate_batch(&tradelines);
        for validation in &validations {
            *stats.severity_counts.entry(validation.severity).or_insert(0) += 1;
        }

        info!(
            "{} tradelines from {} ({} bureau, {} negative)",
            tradelines.len(),
            method,
            bureau.bureau,
            stats.negative_accounts
        );
        self.record_usage(method, tradelines.len());

        PipelineOutput {
            extraction_method: method,
            bureau,
            tradelines,
            validations,
            stats,
        }
    }

    fn record_usage(&self, method: ExtractionMethod, tradelines: usize) {
        if let Some(counters) = &self.counters {
            counters.record(method, tradelines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bureau::BureauSource;
    use crate::extraction::{ExtractionStrategy, RawExtraction};
    use crate::models::{AccountStatus, AccountType};
    use pretty_assertions::assert_eq;

    const REPORT: &str = "EXPERIAN CREDIT REPORT\n\
        Prepared for JANE DOE\n\
        \n\
        CAPITAL ONE 414709844770****\n\
        Account Type: Revolving\n\
        Balance: $0\n\
        Credit Limit: $25,000\n\
        Date Opened: 01/23/2013\n\
        Account Status: Current\n\
        \n\
        PORTFOLIO RECOVERY 600012345678****\n\
        Account Type: Installment\n\
        Balance: $2,500\n\
        Date Opened: 03/01/2019\n\
        Account Status: Charge Off\n\
        \n\
        CAPITAL ONE 414709844770****\n\
        Account Type: Revolving\n\
        Balance: $0\n\
        Credit Limit: $25,000\n\
        Date Opened: 01/23/2013\n\
        Account Status: Current";

    struct FixedText(&'static str);

    impl ExtractionStrategy for FixedText {
        fn method(&self) -> ExtractionMethod {
            ExtractionMethod::Lopdf
        }

        fn extract(&self, _data: &[u8]) -> crate::extraction::Result<RawExtraction> {
            Ok(RawExtraction::text(self.0))
        }
    }

    fn pipeline() -> TradelinePipeline {
        TradelinePipeline::with_extractor(
            PipelineConfig::default(),
            DocumentExtractor::empty(&Default::default()),
        )
        .with_validator(
            ValidationPipeline::default()
                .with_today(chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
        )
    }

    #[test]
    fn test_process_text_end_to_end() {
        let ctx = RunContext::new().with_user_id("user-1");
        let output = pipeline().process_text(REPORT, Vec::new(), &ctx);

        assert_eq!(output.extraction_method, ExtractionMethod::PreExtracted);
        assert_eq!(output.bureau.bureau, CreditBureau::Experian);
        assert_eq!(output.bureau.source, BureauSource::Detected);
        assert_eq!(output.stats.parse_strategy, Some(ParseStrategy::RealWorld));
        assert_eq!(output.stats.accounts_parsed, 3);
        assert_eq!(output.stats.duplicates_removed, 1);
        assert_eq!(output.tradelines.len(), 2);
        assert_eq!(output.validations.len(), 2);

        let capital = &output.tradelines[0];
        assert_eq!(capital.creditor_name.as_deref(), Some("CAPITAL ONE"));
        assert_eq!(capital.account_number.as_deref(), Some("414709844770****"));
        assert_eq!(capital.account_type, Some(AccountType::Revolving));
        assert_eq!(capital.account_status, Some(AccountStatus::Current));
        assert_eq!(capital.date_opened.as_deref(), Some("01/23/2013"));
        assert_eq!(capital.credit_limit.as_deref(), Some("$25,000"));
        assert_eq!(capital.account_balance.as_deref(), Some("$0"));
        assert_eq!(capital.user_id.as_deref(), Some("user-1"));
        assert!(!capital.is_negative);
        assert_eq!(output.validations[0].confidence, 98.0);
        assert!(output.validations[0].valid);

        let recovery = &output.tradelines[1];
        assert!(recovery.is_negative);
        assert!(recovery.negative_confidence >= 0.5);
        assert_eq!(output.stats.negative_accounts, 1);
    }

    #[test]
    fn test_bureau_hint_wins() {
        let ctx = RunContext::new().with_bureau_hint(CreditBureau::TransUnion);
        let output = pipeline().process_text(REPORT, Vec::new(), &ctx);
        assert_eq!(output.bureau.bureau, CreditBureau::TransUnion);
        assert!(output
            .tradelines
            .iter()
            .all(|t| t.credit_bureau == CreditBureau::TransUnion));
    }

    #[tokio::test]
    async fn test_process_document_counts_usage() {
        let counters = Arc::new(UsageCounters::new());
        let extractor = DocumentExtractor::empty(&Default::default()).with_strategy(Arc::new(FixedText(REPORT)));
        let pipeline = TradelinePipeline::with_extractor(PipelineConfig::default(), extractor)
            .with_counters(Arc::clone(&counters));

        let output = pipeline.process_document(b"%PDF-1.4".to_vec(), &RunContext::new()).await;
        assert_eq!(output.extraction_method, ExtractionMethod::Lopdf);
        assert_eq!(output.tradelines.len(), 2);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.documents, 1);
        assert_eq!(snapshot.lopdf, 1);
        assert_eq!(snapshot.tradelines, 2);
    }

    #[tokio::test]
    async fn test_failed_extraction_yields_nothing() {
        let counters = Arc::new(UsageCounters::new());
        let pipeline = pipeline().with_counters(Arc::clone(&counters));

        let output = pipeline.process_document(Vec::new(), &RunContext::new()).await;
        assert_eq!(output.extraction_method, ExtractionMethod::None);
        assert!(output.tradelines.is_empty());
        assert!(!output.stats.extraction_success);
        assert_eq!(counters.snapshot().failed, 1);
    }

    #[test]
    fn test_context_ocr_confidence_feeds_scoring() {
        let ctx = RunContext::new().with_ocr_confidence(0.5);
        let output = pipeline().process_text(REPORT, Vec::new(), &ctx);

        assert_eq!(output.tradelines[0].ocr_confidence, Some(0.5));
        assert_eq!(output.validations[0].contributions["ocr_quality"], 5.0);
        assert_eq!(output.validations[0].confidence, 95.0);
    }

    struct BlankOcr;

    impl OcrBackend for BlankOcr {
        fn recognize(
            &self,
            _image: &image::DynamicImage,
        ) -> std::result::Result<crate::ocr::OcrPage, crate::error::OcrError> {
            Err(crate::error::OcrError::NoImages)
        }
    }

    #[test]
    fn test_ocr_backend_runs_last() {
        let pipeline = pipeline().with_ocr_backend(Arc::new(BlankOcr));
        assert_eq!(pipeline.extractor.methods(), vec![ExtractionMethod::Ocr]);

        let pipeline = TradelinePipeline::with_extractor(
            PipelineConfig::default(),
            DocumentExtractor::new(&Default::default()),
        )
        .with_ocr_backend(Arc::new(BlankOcr));
        assert_eq!(pipeline.extractor.methods().last(), Some(&ExtractionMethod::Ocr));
    }

    #[tokio::test]
    async fn test_unsupported_path() {
        let result = pipeline()
            .process_path(Path::new("report.docx"), &RunContext::new())
            .await;
        assert!(matches!(result, Err(TradelineError::Config(_))));
    }
}
