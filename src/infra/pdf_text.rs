use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::app::ports::TextExtractorPort;
use crate::domain::Document;
use crate::error::{ClerkError, Result};

/// Extracts PDF text with `pdf-extract` from a scratch copy of the upload
pub struct PdfTextExtractor {
    upload_dir: PathBuf,
}

impl PdfTextExtractor {
    /// Creates `upload_dir` if it does not exist yet
    pub fn new(upload_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self { upload_dir })
    }
}

#[async_trait]
impl TextExtractorPort for PdfTextExtractor {
    async fn extract_pdf_text(&self, document: &Document) -> Result<String> {
        let mut temp = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(&self.upload_dir)?;
        temp.write_all(&document.bytes)?;
        temp.flush()?;
        debug!("Wrote {} bytes of {} to {}", document.bytes.len(), document.file_name, temp.path().display());

        let file = document.file_name.clone();
        // The temp file is removed when `temp` drops, after the blocking read finishes
        let result = tokio::task::spawn_blocking(move || {
            let text = pdf_extract::extract_text(temp.path());
            drop(temp);
            text
        })
        .await
        .map_err(|e| ClerkError::TextExtraction { file: file.clone(), message: e.to_string() })?;

        let text = result.map_err(|e| ClerkError::TextExtraction { file: file.clone(), message: e.to_string() })?;
        info!("Extracted text from {} ({} chars)", file, text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_pdf_is_a_text_extraction_error_and_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = PdfTextExtractor::new(dir.path().join("uploads")).unwrap();

        let err = extractor
            .extract_pdf_text(&Document::new("roto.pdf", b"not a pdf".to_vec()))
            .await
            .unwrap_err();

        assert!(matches!(err, ClerkError::TextExtraction { ref file, .. } if file == "roto.pdf"));
        let leftovers = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
        assert_eq!(leftovers, 0);
    }
}
