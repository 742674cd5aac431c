use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// An uploaded file materialized at a unique temporary path.
///
/// The file is removed when the value is dropped, so every exit path of a
/// classification releases it.
#[derive(Debug)]
pub struct UploadedDocument {
    file: NamedTempFile,
}

impl UploadedDocument {
    /// Write `data` to a fresh `upload-*.pdf` file under `dir`.
    pub fn persist(data: &[u8], dir: &Path) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        file.write_all(data)?;
        file.flush()?;
        tracing::debug!(path = %file.path().display(), bytes = data.len(), "stored upload");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
