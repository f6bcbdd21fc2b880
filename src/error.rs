// src/error.rs
//! Error taxonomy shared by the workflow, the résumé service and the document pipeline.

use crate::core::artifact_store::ArtifactKind;

/// Local validation failures. These never reach the network layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("No file selected")]
    NoFileSelected,

    #[error("The selected file is empty")]
    EmptyFile,

    #[error("Unsupported file type: {0}. Please select a PDF file")]
    InvalidFileType(String),

    #[error("File too large: {:.1}MB (max {:.0}MB)", megabytes(.size), megabytes(.limit))]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// The primary error type of the client core.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No session, or the backend rejected the credential.
    #[error("Authentication required")]
    AuthRequired,

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Response did not contain a PDF payload")]
    PayloadMissing,

    #[error("Failed to decode PDF payload: {0}")]
    DecodeError(String),

    #[error("A {0} generation is already in progress")]
    AlreadyInProgress(ArtifactKind),

    #[error("No {0} available to download")]
    NotAvailable(ArtifactKind),

    #[error("No response from server: {0}")]
    NetworkError(String),

    #[error("Server error ({status}): {}", details(.message))]
    ServerError { status: u16, message: Option<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / 1024.0 / 1024.0
}

fn details(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("no details")
}

impl ClientError {
    /// Stable error code for presentation and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthRequired => "AUTH_REQUIRED",
            Self::InvalidInput(InputError::InvalidFileType(_)) => "INVALID_FILE_TYPE",
            Self::InvalidInput(InputError::FileTooLarge { .. }) => "FILE_TOO_LARGE",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::PayloadMissing => "PAYLOAD_MISSING",
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::AlreadyInProgress(_) => "ALREADY_IN_PROGRESS",
            Self::NotAvailable(_) => "NOT_AVAILABLE",
            Self::NetworkError(_) => "NETWORK_ERROR",
            Self::ServerError { .. } => "SERVER_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// `AuthRequired` must open a login prompt instead of an error banner.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    pub fn server(status: u16, message: Option<String>) -> Self {
        Self::ServerError { status, message }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Self::AuthRequired;
            }
            return Self::server(status.as_u16(), Some(e.to_string()));
        }
        if e.is_decode() {
            return Self::DecodeError(e.to_string());
        }
        Self::NetworkError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ClientError::AuthRequired.code(), "AUTH_REQUIRED");
        assert_eq!(
            ClientError::from(InputError::FileTooLarge {
                size: 11,
                limit: 10
            })
            .code(),
            "FILE_TOO_LARGE"
        );
        assert_eq!(
            ClientError::from(InputError::MissingField("company_name")).code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            ClientError::AlreadyInProgress(ArtifactKind::Resume).code(),
            "ALREADY_IN_PROGRESS"
        );
    }

    #[test]
    fn test_requires_login() {
        assert!(ClientError::AuthRequired.requires_login());
        assert!(!ClientError::PayloadMissing.requires_login());
    }

    #[test]
    fn test_messages() {
        let err = ClientError::server(500, Some("Failed to get jobs".to_string()));
        assert_eq!(err.to_string(), "Server error (500): Failed to get jobs");

        let err = ClientError::server(502, None);
        assert_eq!(err.to_string(), "Server error (502): no details");

        let err = InputError::FileTooLarge {
            size: 11 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
        };
        assert_eq!(err.to_string(), "File too large: 11.0MB (max 10MB)");

        assert_eq!(
            ClientError::NotAvailable(ArtifactKind::CoverLetter).to_string(),
            "No cover letter available to download"
        );
    }
}
