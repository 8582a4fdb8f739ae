//! PDF text extraction.
//!
//! `pdf-extract` is synchronous and CPU bound, so parsing runs on the blocking
//! pool. Handlers only see the `TextExtractor` trait.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF parse error: {0}")]
    Pdf(String),

    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, pdf: Bytes) -> Result<String, ExtractError>;
}

/// Default extractor backed by `pdf_extract::extract_text_from_mem`.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, pdf: Bytes) -> Result<String, ExtractError> {
        tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&pdf).map_err(|e| ExtractError::Pdf(e.to_string()))
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_non_pdf_bytes() {
        let result = PdfTextExtractor
            .extract(Bytes::from_static(b"plain text, not a pdf"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rejects_empty_input() {
        let result = PdfTextExtractor.extract(Bytes::new()).await;
        assert!(result.is_err());
    }
}
