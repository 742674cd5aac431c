use std::path::Path;

use mupdf::{Colorspace, Document, Matrix, MetadataName, Page, TextPageFlags};

use docsort_core::{BackendError, MetadataKey, PageImage, PdfBackend, PdfDocument};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the scoring and classification code does not
/// transitively depend on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;
        tracing::debug!(path = %path.display(), "opened PDF");
        Ok(Box::new(MupdfDocument { document }))
    }
}

/// A document opened by [`MupdfBackend`].
pub struct MupdfDocument {
    document: Document,
}

impl MupdfDocument {
    fn load_page(&self, index: usize) -> Result<Page, mupdf::Error> {
        self.document.load_page(index as i32)
    }
}

impl PdfDocument for MupdfDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        let count = self
            .document
            .page_count()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        Ok(count.max(0) as usize)
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        let page = self
            .load_page(index)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        // One output line per text line, in block order
        let mut page_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }

    fn render_page(&self, index: usize, dpi: u32) -> Result<PageImage, BackendError> {
        let render_err = |e: mupdf::Error| BackendError::RenderError {
            page: index,
            message: e.to_string(),
        };

        let page = self.load_page(index).map_err(render_err)?;
        let scale = dpi as f32 / 72.0;
        let pixmap = page
            .to_pixmap(
                &Matrix::new_scale(scale, scale),
                &Colorspace::device_gray(),
                false,
                false,
            )
            .map_err(render_err)?;

        let width = pixmap.width();
        let height = pixmap.height();
        let samples = pixmap.samples();
        let channels = pixmap.n().max(1) as usize;
        let stride = if height == 0 {
            0
        } else {
            samples.len() / height as usize
        };

        // Keep the first (gray) channel and drop any row padding
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for row in samples.chunks(stride.max(1)).take(height as usize) {
            pixels.extend(
                row.chunks(channels)
                    .take(width as usize)
                    .map(|px| px[0]),
            );
        }

        let image = PageImage {
            width,
            height,
            pixels,
        };
        if !image.is_well_formed() {
            return Err(BackendError::RenderError {
                page: index,
                message: format!("unexpected pixmap layout ({} bytes)", samples.len()),
            });
        }
        Ok(image)
    }

    fn metadata(&self, key: MetadataKey) -> Result<Option<String>, BackendError> {
        let name = match key {
            MetadataKey::CreationDate => MetadataName::CreationDate,
            MetadataKey::ModDate => MetadataName::ModDate,
        };
        let value = self
            .document
            .metadata(name)
            .map_err(|e| BackendError::MetadataError(e.to_string()))?;
        Ok(Some(value).filter(|v| !v.is_empty()))
    }
}
