use axum::extract::Multipart;

/// Form field carrying the document.
pub const FILE_FIELD: &str = "file";

/// An uploaded file held in memory until it is written to disk.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Why a multipart upload could not be used.
#[derive(Debug, PartialEq, Eq)]
pub enum UploadError {
    /// The form has no `file` field.
    Missing,
    /// The body could not be read as multipart.
    Malformed(String),
}

/// Pull the `file` field out of a multipart form, ignoring anything else.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedFile, UploadError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::Malformed(format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == FILE_FIELD {
            let filename = field.file_name().unwrap_or("upload.pdf").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| UploadError::Malformed(format!("Failed to read file data: {}", e)))?
                .to_vec();
            file = Some(UploadedFile { filename, data });
        } else {
            // Ignore unknown fields
            let _ = field.bytes().await;
        }
    }

    file.ok_or(UploadError::Missing)
}
