use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("failed to render page {page}: {message}")]
    RenderError { page: usize, message: String },
    #[error("failed to read metadata: {0}")]
    MetadataError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("failed to run OCR engine '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("OCR engine exited with code {code}: {stderr}")]
    Failed { code: i32, stderr: String },
}

#[derive(Error, Debug)]
pub enum QrError {
    #[error("page image is {width}x{height} but holds {len} bytes")]
    InvalidImage { width: u32, height: u32, len: usize },
}

/// Metadata fields read from the document information dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey {
    CreationDate,
    ModDate,
}

/// One rasterized page as 8-bit grayscale, row-major, no padding.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl PageImage {
    /// Check that the pixel buffer matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() == self.width as usize * self.height as usize
    }
}

/// Trait for PDF parsing backends.
///
/// The backend only opens files; everything page-level goes through the
/// returned [`PdfDocument`], so a document is parsed once per classification.
pub trait PdfBackend: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError>;
}

/// An opened PDF.
pub trait PdfDocument {
    fn page_count(&self) -> Result<usize, BackendError>;

    /// Extractable text of one page (0-based). Empty for image-only pages.
    fn page_text(&self, index: usize) -> Result<String, BackendError>;

    /// Rasterize one page (0-based) to grayscale at `dpi`.
    fn render_page(&self, index: usize, dpi: u32) -> Result<PageImage, BackendError>;

    /// Raw, unparsed metadata value. `Ok(None)` when absent or empty.
    fn metadata(&self, key: MetadataKey) -> Result<Option<String>, BackendError>;
}

/// Optical character recognition over an image file.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image_path: &Path) -> Result<String, OcrError>;
}

/// QR code presence check over one rasterized page.
pub trait QrDetector: Send + Sync {
    fn detect(&self, page: &PageImage) -> Result<bool, QrError>;
}
