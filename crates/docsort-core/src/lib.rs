use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod classifier;
pub mod config_file;
pub mod document;
pub mod extract;
pub mod introspect;
pub mod keywords;
pub mod mock;
pub mod ocr;
pub mod qr;
pub mod scoring;

// Re-export for convenience
pub use backend::{
    BackendError, MetadataKey, OcrEngine, OcrError, PageImage, PdfBackend, PdfDocument,
    QrDetector, QrError,
};
pub use classifier::{Classifier, ClassifierProfile, Engines, OTHER_LABEL};
pub use document::UploadedDocument;
pub use introspect::ModificationEvidence;
pub use ocr::TesseractCli;
pub use qr::RqrrDetector;
pub use scoring::{BonusPolicy, ScoringPolicy, token_set_ratio};

/// Errors that abort a classification.
///
/// Metadata failures are not here: they degrade into
/// [`ModificationEvidence`] instead of propagating.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error(transparent)]
    Pdf(#[from] BackendError),
    #[error(transparent)]
    Ocr(#[from] OcrError),
    #[error(transparent)]
    Qr(#[from] QrError),
    #[error("failed to write page image: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Verdict for one document, in the shape returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub classification: String,
    pub match_count: u32,
    pub scanned: bool,
    pub pdf_modified: bool,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
}

/// Process-wide classification settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bank_threshold: u32,
    pub salary_threshold: u32,
    pub scoring: ScoringPolicy,
    /// Rasterization resolution for OCR and QR detection.
    pub render_dpi: u32,
    /// Parent directory for per-call OCR scratch directories and uploads.
    pub scratch_root: std::path::PathBuf,
    pub scratch_prefix: String,
    pub tesseract_path: String,
    pub ocr_language: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank_threshold: 8,
            salary_threshold: 7,
            scoring: ScoringPolicy::default(),
            render_dpi: 200,
            scratch_root: std::env::temp_dir(),
            scratch_prefix: "docsort-ocr-".to_string(),
            tesseract_path: "tesseract".to_string(),
            ocr_language: "eng".to_string(),
        }
    }
}

impl Config {
    /// Create `scratch_root` if it is missing. Uploads and OCR scratch
    /// directories are created inside it.
    pub fn create_scratch_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.scratch_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_scratch_root_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            scratch_root: dir.path().join("nested").join("scratch"),
            ..Config::default()
        };
        config.create_scratch_root().unwrap();
        assert!(config.scratch_root.is_dir());

        // Existing directory is fine, and uploads can be written there.
        config.create_scratch_root().unwrap();
        let doc = UploadedDocument::persist(b"%PDF-1.4", &config.scratch_root).unwrap();
        assert!(doc.path().starts_with(&config.scratch_root));
    }
}
