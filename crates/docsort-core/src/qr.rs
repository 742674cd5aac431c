use crate::ClassifyError;
use crate::backend::{PageImage, PdfDocument, QrDetector, QrError};

/// QR detection with `rqrr`: a page matches when any located grid decodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDetector;

impl QrDetector for RqrrDetector {
    fn detect(&self, page: &PageImage) -> Result<bool, QrError> {
        if !page.is_well_formed() {
            return Err(QrError::InvalidImage {
                width: page.width,
                height: page.height,
                len: page.pixels.len(),
            });
        }
        let width = page.width as usize;
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width, page.height as usize, |x, y| {
                page.pixels[y * width + x]
            });
        let grids = prepared.detect_grids();
        Ok(grids.iter().any(|grid| grid.decode().is_ok()))
    }
}

/// Rasterize pages in order and stop at the first one carrying a QR code.
/// A document with no pages has no QR code.
pub fn has_qr(
    doc: &dyn PdfDocument,
    detector: &dyn QrDetector,
    dpi: u32,
) -> Result<bool, ClassifyError> {
    for index in 0..doc.page_count()? {
        let page = doc.render_page(index, dpi)?;
        if detector.detect(&page)? {
            tracing::debug!(page = index, "QR code found");
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPage, MockPdf, MockQr};

    fn pages(n: usize) -> MockPdf {
        MockPdf::with_pages((0..n).map(|_| MockPage::image_only()).collect())
    }

    #[test]
    fn test_has_qr_first_match_short_circuits() {
        let detector = MockQr::on_pages(&[1]);
        assert!(has_qr(&pages(4), &detector, 200).unwrap());
        assert_eq!(detector.call_count(), 2);
    }

    #[test]
    fn test_has_qr_no_match() {
        let detector = MockQr::none();
        assert!(!has_qr(&pages(3), &detector, 200).unwrap());
        assert_eq!(detector.call_count(), 3);
    }

    #[test]
    fn test_has_qr_zero_pages() {
        let detector = MockQr::on_pages(&[0]);
        assert!(!has_qr(&pages(0), &detector, 200).unwrap());
        assert_eq!(detector.call_count(), 0);
    }

    #[test]
    fn test_has_qr_render_error_propagates() {
        let doc = MockPdf::with_pages(vec![MockPage {
            render_fails: true,
            ..MockPage::default()
        }]);
        let err = has_qr(&doc, &MockQr::none(), 200).unwrap_err();
        assert!(matches!(err, ClassifyError::Pdf(_)));
    }

    /// Draw `data` as a QR code on a white page, `scale` pixels per module,
    /// with a four-module quiet zone.
    fn qr_page(data: &[u8], scale: usize) -> PageImage {
        let code = qrcode::QrCode::new(data).unwrap();
        let modules = code.width();
        let colors = code.to_colors();
        let side = (modules + 8) * scale;
        let mut pixels = vec![255u8; side * side];
        for y in 0..side {
            for x in 0..side {
                let (mx, my) = (x / scale, y / scale);
                let inside = (4..modules + 4).contains(&mx) && (4..modules + 4).contains(&my);
                if inside && colors[(my - 4) * modules + (mx - 4)] == qrcode::Color::Dark {
                    pixels[y * side + x] = 0;
                }
            }
        }
        PageImage {
            width: side as u32,
            height: side as u32,
            pixels,
        }
    }

    #[test]
    fn test_rqrr_detects_rendered_code() {
        let page = qr_page(b"IBAN PK36SCBL0000001123456702", 6);
        assert!(page.is_well_formed());
        assert!(RqrrDetector.detect(&page).unwrap());
    }

    #[test]
    fn test_rqrr_blank_page_has_no_code() {
        let page = PageImage {
            width: 64,
            height: 64,
            pixels: vec![255; 64 * 64],
        };
        assert!(!RqrrDetector.detect(&page).unwrap());
    }

    #[test]
    fn test_rqrr_rejects_short_buffer() {
        let page = PageImage {
            width: 10,
            height: 10,
            pixels: vec![0; 5],
        };
        assert!(matches!(
            RqrrDetector.detect(&page),
            Err(QrError::InvalidImage { len: 5, .. })
        ));
    }
}
