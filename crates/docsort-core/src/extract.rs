use std::path::Path;

use crate::ClassifyError;
use crate::backend::{BackendError, OcrEngine, PageImage, PdfDocument};
use crate::introspect::is_scanned;

/// Where OCR page images are written and at what resolution.
#[derive(Debug, Clone, Copy)]
pub struct OcrSettings<'a> {
    pub scratch_root: &'a Path,
    pub scratch_prefix: &'a str,
    pub dpi: u32,
}

/// Native text of every page, joined with single spaces in page order.
pub fn extract_native(doc: &dyn PdfDocument) -> Result<String, BackendError> {
    let pages = (0..doc.page_count()?)
        .map(|index| doc.page_text(index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pages.join(" "))
}

fn save_png(page: PageImage, path: &Path) -> Result<(), ClassifyError> {
    let (width, height) = (page.width, page.height);
    let image = image::GrayImage::from_raw(width, height, page.pixels).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("pixel buffer does not fit {}x{}", width, height),
        )
    })?;
    image.save(path)?;
    Ok(())
}

/// Rasterize every page, OCR the images in page order and concatenate the
/// results, each followed by a space.
///
/// Page images live in a scratch directory unique to this call. It is
/// removed when the function returns, including on failure.
pub fn extract_via_ocr(
    doc: &dyn PdfDocument,
    ocr: &dyn OcrEngine,
    settings: OcrSettings<'_>,
) -> Result<String, ClassifyError> {
    let scratch = tempfile::Builder::new()
        .prefix(settings.scratch_prefix)
        .tempdir_in(settings.scratch_root)?;
    tracing::debug!(dir = %scratch.path().display(), "created OCR scratch directory");

    let mut full_text = String::new();
    for index in 0..doc.page_count()? {
        let image_path = scratch.path().join(format!("page_{index}.png"));
        save_png(doc.render_page(index, settings.dpi)?, &image_path)?;

        let text = ocr.recognize(&image_path)?;
        tracing::debug!(page = index, chars = text.len(), "OCR page done");
        full_text.push_str(&text);
        full_text.push(' ');
    }
    Ok(full_text)
}

/// Extract the document's text, using OCR when no page has a text layer.
/// Returns the text and whether OCR was used.
pub fn get_text(
    doc: &dyn PdfDocument,
    ocr: &dyn OcrEngine,
    settings: OcrSettings<'_>,
) -> Result<(String, bool), ClassifyError> {
    let scanned = is_scanned(doc)?;
    let text = if scanned {
        extract_via_ocr(doc, ocr, settings)?
    } else {
        extract_native(doc)?
    };
    tracing::debug!(scanned, chars = text.len(), "text extracted");
    Ok((text, scanned))
}
