// src/types/request.rs
//! Inputs validated locally before anything is sent to the backend

use crate::core::artifact_store::PDF_CONTENT_TYPE;
use crate::error::InputError;
use crate::utils::get_file_extension;
use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upload cap for résumé files
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

// ===== Cover Letter Form =====

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverLetterDetails {
    pub job_description: String,
    pub company_name: String,
    pub position_title: String,
    pub hiring_manager_name: Option<String>,
    pub additional_notes: Option<String>,
}

impl CoverLetterDetails {
    pub fn new(
        company_name: impl Into<String>,
        position_title: impl Into<String>,
        job_description: impl Into<String>,
    ) -> Self {
        Self {
            job_description: job_description.into(),
            company_name: company_name.into(),
            position_title: position_title.into(),
            hiring_manager_name: None,
            additional_notes: None,
        }
    }

    pub fn with_hiring_manager(mut self, name: impl Into<String>) -> Self {
        self.hiring_manager_name = Some(name.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.additional_notes = Some(notes.into());
        self
    }

    pub fn validate(&self) -> Result<(), InputError> {
        if self.company_name.trim().is_empty() {
            return Err(InputError::MissingField("company_name"));
        }
        if self.position_title.trim().is_empty() {
            return Err(InputError::MissingField("position_title"));
        }
        if self.job_description.trim().is_empty() {
            return Err(InputError::MissingField("job_description"));
        }
        Ok(())
    }

    /// Query parameters; blank optional fields are left out
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("job_description", self.job_description.as_str()),
            ("company_name", self.company_name.as_str()),
            ("position_title", self.position_title.as_str()),
        ];
        let optional = [
            ("hiring_manager_name", self.hiring_manager_name.as_deref()),
            ("additional_notes", self.additional_notes.as_deref()),
        ];
        for (key, value) in optional {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                pairs.push((key, value));
            }
        }
        pairs
    }
}

// ===== Résumé Upload =====

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeFile {
    pub file_name: String,
    /// Declared MIME type, when the source provides one
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<&str>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.map(String::from),
            data: data.into(),
        }
    }

    pub async fn from_path(path: &Path) -> anyhow::Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume.pdf")
            .to_string();
        Ok(Self::new(file_name, None, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_pdf(&self) -> bool {
        match self.content_type.as_deref() {
            Some(mime) => mime.eq_ignore_ascii_case(PDF_CONTENT_TYPE),
            None => get_file_extension(&self.file_name).as_deref() == Some("pdf"),
        }
    }

    /// Type check only, as done at file selection time
    pub fn check_type(&self) -> Result<(), InputError> {
        if self.is_pdf() {
            Ok(())
        } else {
            Err(InputError::InvalidFileType(
                self.content_type
                    .clone()
                    .unwrap_or_else(|| self.file_name.clone()),
            ))
        }
    }

    /// Full upload validation: PDF, non-empty, under `limit` bytes
    pub fn validate(&self, limit: u64) -> Result<(), InputError> {
        self.check_type()?;
        if self.data.is_empty() {
            return Err(InputError::EmptyFile);
        }
        if self.size() > limit {
            return Err(InputError::FileTooLarge {
                size: self.size(),
                limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: Option<&str>, size: usize) -> ResumeFile {
        ResumeFile::new(name, mime, vec![b'%'; size])
    }

    #[test]
    fn test_cover_letter_validation() {
        let details = CoverLetterDetails::new("Acme", "Engineer", "Build things");
        assert!(details.validate().is_ok());

        let details = CoverLetterDetails::new("  ", "Engineer", "Build things");
        assert_eq!(details.validate(), Err(InputError::MissingField("company_name")));

        let details = CoverLetterDetails::new("Acme", "", "Build things");
        assert_eq!(details.validate(), Err(InputError::MissingField("position_title")));

        let details = CoverLetterDetails::new("Acme", "Engineer", "");
        assert_eq!(details.validate(), Err(InputError::MissingField("job_description")));
    }

    #[test]
    fn test_cover_letter_query_pairs() {
        let details = CoverLetterDetails::new("Acme", "Engineer", "Build things")
            .with_hiring_manager("Ada")
            .with_notes(" ");
        let pairs = details.query_pairs();
        assert_eq!(pairs.len(), 4);
        assert!(pairs.contains(&("hiring_manager_name", "Ada")));
        assert!(!pairs.iter().any(|(k, _)| *k == "additional_notes"));
    }

    #[test]
    fn test_pdf_detection() {
        assert!(file("cv.pdf", None, 1).is_pdf());
        assert!(file("cv.PDF", None, 1).is_pdf());
        assert!(file("cv", Some("application/pdf"), 1).is_pdf());
        assert!(!file("cv.pdf", Some("image/png"), 1).is_pdf());
        assert!(!file("cv.docx", None, 1).is_pdf());
    }

    #[test]
    fn test_upload_validation() {
        assert!(file("cv.pdf", None, 2 * 1024 * 1024).validate(MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(file("cv.pdf", None, 0).validate(MAX_UPLOAD_BYTES), Err(InputError::EmptyFile));
        assert!(matches!(
            file("cv.pdf", None, 11 * 1024 * 1024).validate(MAX_UPLOAD_BYTES),
            Err(InputError::FileTooLarge { .. })
        ));
        assert!(matches!(
            file("cv.txt", Some("text/plain"), 10).validate(MAX_UPLOAD_BYTES),
            Err(InputError::InvalidFileType(t)) if t == "text/plain"
        ));
    }
}
