use std::path::Path;
use std::process::Command;

use crate::backend::{OcrEngine, OcrError};

/// OCR through the `tesseract` command-line program.
///
/// Runs `tesseract <image> stdout -l <language>` and returns its stdout.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    program: String,
    language: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
            language: "eng".to_string(),
        }
    }
}

impl TesseractCli {
    pub fn new(program: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: language.into(),
        }
    }

    /// Check that the program can be launched.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.program)
            .arg(image_path.as_os_str())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .map_err(|source| OcrError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
