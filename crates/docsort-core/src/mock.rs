//! Mock backends for testing.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{
    BackendError, MetadataKey, OcrEngine, OcrError, PageImage, PdfBackend, PdfDocument,
    QrDetector, QrError,
};

/// One scripted page of a [`MockPdf`].
#[derive(Clone, Debug, Default)]
pub struct MockPage {
    pub text: String,
    /// Simulate a rasterization failure for this page.
    pub render_fails: bool,
}

impl MockPage {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            render_fails: false,
        }
    }

    /// An image-only page with no text layer.
    pub fn image_only() -> Self {
        Self::default()
    }
}

/// Scripted metadata for a [`MockPdf`].
#[derive(Clone, Debug, Default)]
pub enum MockMetadata {
    #[default]
    Absent,
    Dates {
        created: Option<String>,
        modified: Option<String>,
    },
    /// Every metadata read fails with this message.
    Broken(String),
}

/// A hand-rolled mock implementing both [`PdfBackend`] and the documents it opens.
///
/// Rendered pages are 2x2 images filled with the page index, so detectors can
/// tell pages apart.
#[derive(Clone, Debug, Default)]
pub struct MockPdf {
    pub pages: Vec<MockPage>,
    pub metadata: MockMetadata,
    /// If set, `open` fails with this message.
    pub open_error: Option<String>,
}

impl MockPdf {
    pub fn with_pages(pages: Vec<MockPage>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn with_dates(mut self, created: Option<&str>, modified: Option<&str>) -> Self {
        self.metadata = MockMetadata::Dates {
            created: created.map(str::to_string),
            modified: modified.map(str::to_string),
        };
        self
    }

    pub fn unreadable(message: &str) -> Self {
        Self {
            open_error: Some(message.to_string()),
            ..Self::default()
        }
    }
}

impl PdfBackend for MockPdf {
    fn open(&self, _path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        match &self.open_error {
            Some(msg) => Err(BackendError::OpenError(msg.clone())),
            None => Ok(Box::new(self.clone())),
        }
    }
}

impl PdfDocument for MockPdf {
    fn page_count(&self) -> Result<usize, BackendError> {
        Ok(self.pages.len())
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        self.pages
            .get(index)
            .map(|p| p.text.clone())
            .ok_or_else(|| BackendError::ExtractionError(format!("no page {index}")))
    }

    fn render_page(&self, index: usize, _dpi: u32) -> Result<PageImage, BackendError> {
        let page = self.pages.get(index).ok_or(BackendError::RenderError {
            page: index,
            message: "out of range".into(),
        })?;
        if page.render_fails {
            return Err(BackendError::RenderError {
                page: index,
                message: "scripted failure".into(),
            });
        }
        Ok(PageImage {
            width: 2,
            height: 2,
            pixels: vec![index as u8; 4],
        })
    }

    fn metadata(&self, key: MetadataKey) -> Result<Option<String>, BackendError> {
        match &self.metadata {
            MockMetadata::Absent => Ok(None),
            MockMetadata::Dates { created, modified } => Ok(match key {
                MetadataKey::CreationDate => created.clone(),
                MetadataKey::ModDate => modified.clone(),
            }),
            MockMetadata::Broken(msg) => Err(BackendError::MetadataError(msg.clone())),
        }
    }
}

/// Mock OCR engine returning scripted text per call.
///
/// Records every image path it was given and whether the file existed at the
/// time of the call.
pub struct MockOcr {
    responses: Mutex<Vec<Result<String, String>>>,
    seen: Mutex<Vec<(PathBuf, bool)>>,
    call_count: AtomicUsize,
}

impl MockOcr {
    /// Responses are consumed in order; once exhausted, calls return "".
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().rev().collect()),
            seen: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(PathBuf, bool)> {
        self.seen.lock().unwrap().clone()
    }
}

impl OcrEngine for MockOcr {
    fn recognize(&self, image_path: &Path) -> Result<String, OcrError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((image_path.to_path_buf(), image_path.exists()));
        match self.responses.lock().unwrap().pop() {
            Some(Ok(text)) => Ok(text),
            Some(Err(stderr)) => Err(OcrError::Failed { code: 1, stderr }),
            None => Ok(String::new()),
        }
    }
}

/// Mock QR detector that reports a code on the listed page indices.
pub struct MockQr {
    qr_pages: Vec<u8>,
    call_count: AtomicUsize,
}

impl MockQr {
    pub fn on_pages(qr_pages: &[u8]) -> Self {
        Self {
            qr_pages: qr_pages.to_vec(),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn none() -> Self {
        Self::on_pages(&[])
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl QrDetector for MockQr {
    fn detect(&self, page: &PageImage) -> Result<bool, QrError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(page
            .pixels
            .first()
            .is_some_and(|marker| self.qr_pages.contains(marker)))
    }
}
