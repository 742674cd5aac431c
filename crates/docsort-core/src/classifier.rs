use std::path::Path;
use std::sync::Arc;

use crate::backend::{OcrEngine, PdfBackend, QrDetector};
use crate::document::UploadedDocument;
use crate::extract::{OcrSettings, get_text};
use crate::introspect::modification_evidence;
use crate::keywords::{BANK_KEYWORDS, BANK_STATEMENT_LABEL, SALARY_KEYWORDS, SALARY_SLIP_LABEL};
use crate::ocr::TesseractCli;
use crate::qr::{RqrrDetector, has_qr};
use crate::scoring::score;
use crate::{ClassificationResult, ClassifyError, Config};

/// Label for documents that miss the threshold.
pub const OTHER_LABEL: &str = "Other";

/// What one classifier looks for and how much evidence it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierProfile {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
    pub threshold: u32,
    /// Add a point when any page carries a QR code.
    pub include_qr: bool,
}

impl ClassifierProfile {
    pub fn bank_statement(threshold: u32) -> Self {
        Self {
            label: BANK_STATEMENT_LABEL,
            keywords: BANK_KEYWORDS,
            threshold,
            include_qr: true,
        }
    }

    pub fn salary_slip(threshold: u32) -> Self {
        Self {
            label: SALARY_SLIP_LABEL,
            keywords: SALARY_KEYWORDS,
            threshold,
            include_qr: false,
        }
    }
}

/// The external capabilities a classifier calls into, shared across requests.
#[derive(Clone)]
pub struct Engines {
    pub pdf: Arc<dyn PdfBackend>,
    pub ocr: Arc<dyn OcrEngine>,
    pub qr: Arc<dyn QrDetector>,
}

impl Engines {
    /// Tesseract OCR and `rqrr` QR detection over the given PDF backend.
    pub fn new(pdf: Arc<dyn PdfBackend>, config: &Config) -> Self {
        Self {
            pdf,
            ocr: Arc::new(TesseractCli::new(
                config.tesseract_path.clone(),
                config.ocr_language.clone(),
            )),
            qr: Arc::new(RqrrDetector),
        }
    }
}

pub struct Classifier {
    profile: ClassifierProfile,
    config: Arc<Config>,
    engines: Engines,
}

impl Classifier {
    pub fn new(profile: ClassifierProfile, config: Arc<Config>, engines: Engines) -> Self {
        Self {
            profile,
            config,
            engines,
        }
    }

    pub fn bank_statement(config: Arc<Config>, engines: Engines) -> Self {
        let profile = ClassifierProfile::bank_statement(config.bank_threshold);
        Self::new(profile, config, engines)
    }

    pub fn salary_slip(config: Arc<Config>, engines: Engines) -> Self {
        let profile = ClassifierProfile::salary_slip(config.salary_threshold);
        Self::new(profile, config, engines)
    }

    pub fn profile(&self) -> &ClassifierProfile {
        &self.profile
    }

    fn ocr_settings(&self) -> OcrSettings<'_> {
        OcrSettings {
            scratch_root: &self.config.scratch_root,
            scratch_prefix: &self.config.scratch_prefix,
            dpi: self.config.render_dpi,
        }
    }

    /// Classify an uploaded document. The upload's file is removed before
    /// this returns, whatever the outcome.
    pub fn classify(
        &self,
        document: UploadedDocument,
    ) -> Result<ClassificationResult, ClassifyError> {
        let result = self.classify_path(document.path());
        drop(document);
        result
    }

    /// Classify a file the caller owns. The file is left in place.
    pub fn classify_path(&self, path: &Path) -> Result<ClassificationResult, ClassifyError> {
        let doc = self.engines.pdf.open(path)?;
        let (text, scanned) = get_text(doc.as_ref(), self.engines.ocr.as_ref(), self.ocr_settings())?;
        tracing::debug!(scanned, chars = text.len(), "text extracted");

        let qr_probe = self.profile.include_qr.then(|| {
            || has_qr(doc.as_ref(), self.engines.qr.as_ref(), self.config.render_dpi)
        });
        let match_count = score(&text, self.profile.keywords, &self.config.scoring, qr_probe)?;
        tracing::debug!(profile = self.profile.label, match_count, "keywords scored");

        let classification = if match_count >= self.profile.threshold {
            self.profile.label
        } else {
            OTHER_LABEL
        };

        let evidence = modification_evidence(doc.as_ref());

        tracing::info!(
            profile = self.profile.label,
            classification,
            match_count,
            threshold = self.profile.threshold,
            scanned,
            pdf_modified = evidence.modified,
            "classified document"
        );

        Ok(ClassificationResult {
            classification: classification.to_string(),
            match_count,
            scanned,
            pdf_modified: evidence.modified,
            creation_date: evidence.creation_date,
            modification_date: evidence.modification_date,
        })
    }

    /// Extracted text and whether OCR was needed, without scoring.
    pub fn extract_text(&self, path: &Path) -> Result<(String, bool), ClassifyError> {
        let doc = self.engines.pdf.open(path)?;
        get_text(doc.as_ref(), self.engines.ocr.as_ref(), self.ocr_settings())
    }
}
