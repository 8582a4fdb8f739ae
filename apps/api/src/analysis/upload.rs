//! Multipart intake for `POST /upload`.
//!
//! The `resume` field is streamed to a uniquely named file in the upload
//! directory and read back before extraction. The file lives exactly as long
//! as the request: [`TempResume::remove`] deletes it on the normal paths, and
//! dropping a `TempResume` (e.g. a cancelled request) deletes it as well.

use std::path::{Path, PathBuf};

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::analysis::AnalysisError;

pub const RESUME_FIELD: &str = "resume";
pub const JD_FIELD: &str = "jd";

/// An uploaded resume persisted to the upload directory.
#[derive(Debug)]
pub struct TempResume {
    path: TempPath,
    size: u64,
}

impl TempResume {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub async fn read(&self) -> std::io::Result<Bytes> {
        tokio::fs::read(&self.path).await.map(Bytes::from)
    }

    /// Deletes the file. Failures are logged, never returned.
    pub fn remove(self) {
        let path: PathBuf = self.path.to_path_buf();
        match self.path.close() {
            Ok(()) => debug!(path = %path.display(), "Removed uploaded resume"),
            Err(e) => warn!(path = %path.display(), "Error deleting file: {e}"),
        }
    }
}

/// Fields collected from the multipart body. Either may be absent.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub resume: Option<TempResume>,
    pub job_description: Option<String>,
}

impl UploadForm {
    /// Splits into the two required parts, or removes whatever was received
    /// and reports the request as incomplete.
    pub fn into_parts(self) -> Result<(TempResume, String), AnalysisError> {
        match self {
            UploadForm {
                resume: Some(resume),
                job_description: Some(jd),
            } => Ok((resume, jd)),
            other => {
                other.discard();
                Err(AnalysisError::MissingInput)
            }
        }
    }

    fn discard(self) {
        if let Some(resume) = self.resume {
            resume.remove();
        }
    }
}

/// Reads the multipart body, writing the first non-empty `resume` field to
/// `upload_dir`. A blank `jd` counts as missing; unknown fields are skipped.
pub async fn read_upload_form(
    upload_dir: &Path,
    mut multipart: Multipart,
) -> Result<UploadForm, AnalysisError> {
    let mut form = UploadForm::default();

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                form.discard();
                return Err(multipart_error(e));
            }
        };

        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(RESUME_FIELD) if form.resume.is_none() => {
                match write_resume(upload_dir, &mut field).await {
                    Ok(resume) => form.resume = resume,
                    Err(e) => {
                        form.discard();
                        return Err(e);
                    }
                }
            }
            Some(JD_FIELD) => match field.text().await {
                Ok(text) => {
                    form.job_description = Some(text).filter(|jd| !jd.trim().is_empty());
                }
                Err(e) => {
                    form.discard();
                    return Err(multipart_error(e));
                }
            },
            other => debug!(field = ?other, "Skipping multipart field"),
        }
    }

    Ok(form)
}

/// Streams one field into a fresh temp file. Returns `None` for an empty upload.
async fn write_resume(
    upload_dir: &Path,
    field: &mut axum::extract::multipart::Field<'_>,
) -> Result<Option<TempResume>, AnalysisError> {
    let named = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(".pdf")
        .tempfile_in(upload_dir)?;
    let (file, path) = named.into_parts();
    let mut file = tokio::fs::File::from_std(file);
    let mut size = 0u64;

    let written = async {
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        file.flush().await?;
        Ok::<(), AnalysisError>(())
    }
    .await;
    drop(file);

    let resume = TempResume { path, size };
    match written {
        Ok(()) if size > 0 => {
            debug!(path = %resume.path().display(), size, "Stored uploaded resume");
            Ok(Some(resume))
        }
        Ok(()) => {
            resume.remove();
            Ok(None)
        }
        Err(e) => {
            resume.remove();
            Err(e)
        }
    }
}

fn multipart_error(e: MultipartError) -> AnalysisError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AnalysisError::TooLarge
    } else {
        warn!("Malformed multipart body: {}", e.body_text());
        AnalysisError::MissingInput
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_resume(dir: &Path) -> TempResume {
        let named = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(".pdf")
            .tempfile_in(dir)
            .unwrap();
        std::fs::write(named.path(), b"%PDF-1.4").unwrap();
        TempResume {
            path: named.into_temp_path(),
            size: 8,
        }
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_remove_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let resume = stored_resume(dir.path());
        assert_eq!(file_count(dir.path()), 1);

        resume.remove();
        assert_eq!(file_count(dir.path()), 0);
    }

    #[test]
    fn test_remove_tolerates_a_file_already_gone() {
        let dir = tempfile::tempdir().unwrap();
        let resume = stored_resume(dir.path());
        std::fs::remove_file(resume.path()).unwrap();

        // Logged, not surfaced.
        resume.remove();
        assert_eq!(file_count(dir.path()), 0);
    }

    #[test]
    fn test_incomplete_form_discards_the_resume() {
        let dir = tempfile::tempdir().unwrap();
        let form = UploadForm {
            resume: Some(stored_resume(dir.path())),
            job_description: None,
        };

        assert!(matches!(form.into_parts(), Err(AnalysisError::MissingInput)));
        assert_eq!(file_count(dir.path()), 0);
    }
}
