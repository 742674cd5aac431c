use crate::backend::{BackendError, MetadataKey, PdfDocument};

/// Whether the document needs OCR: true only when no page has any
/// non-whitespace text. Stops at the first page with text.
pub fn is_scanned(doc: &dyn PdfDocument) -> Result<bool, BackendError> {
    for index in 0..doc.page_count()? {
        if !doc.page_text(index)?.trim().is_empty() {
            tracing::debug!(page = index, "native text found");
            return Ok(false);
        }
    }
    Ok(true)
}

/// Creation/modification timestamps and whether they differ.
///
/// `modified == false` means "no evidence of modification", which includes
/// the case where the metadata could not be read at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModificationEvidence {
    pub modified: bool,
    pub creation_date: Option<String>,
    /// Carries a `Metadata error: ...` diagnostic when metadata was unreadable.
    pub modification_date: Option<String>,
}

impl ModificationEvidence {
    fn from_dates(creation_date: Option<String>, modification_date: Option<String>) -> Self {
        let modified = matches!(
            (&creation_date, &modification_date),
            (Some(c), Some(m)) if c != m
        );
        Self {
            modified,
            creation_date,
            modification_date,
        }
    }

    fn unavailable(err: &BackendError) -> Self {
        Self {
            modified: false,
            creation_date: None,
            modification_date: Some(format!("Metadata error: {}", err)),
        }
    }
}

fn read_dates(doc: &dyn PdfDocument) -> Result<(Option<String>, Option<String>), BackendError> {
    let created = doc.metadata(MetadataKey::CreationDate)?;
    let modified = doc.metadata(MetadataKey::ModDate)?;
    Ok((created, modified))
}

/// Compare the raw creation and modification dates. Never fails.
pub fn modification_evidence(doc: &dyn PdfDocument) -> ModificationEvidence {
    match read_dates(doc) {
        Ok((created, modified)) => ModificationEvidence::from_dates(created, modified),
        Err(e) => {
            tracing::warn!(error = %e, "metadata unavailable");
            ModificationEvidence::unavailable(&e)
        }
    }
}
