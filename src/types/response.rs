// src/types/response.rs
use serde::{Deserialize, Serialize};

// ===== Service Response Types =====

/// `{ "pdf": "<hex>" }` returned by every generation endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PdfPayloadResponse {
    pub pdf: Option<String>,
}

/// Cover-letter generation answers with either a ready PDF or a saved draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverLetterGenerationResponse {
    pub pdf: Option<String>,
    #[serde(alias = "cover_letter_id")]
    pub id: Option<String>,
    pub content: Option<String>,
}

/// A saved cover letter, as listed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLetterRecord {
    #[serde(alias = "cover_letter_id")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub job_description: Option<String>,
    /// Naive ISO-8601 timestamp as produced by the backend
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Login / signup answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Error body; FastAPI uses `detail`, other handlers use `message`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub detail: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .or_else(|| match self.detail {
                Some(serde_json::Value::String(s)) => Some(s),
                Some(other) => Some(other.to_string()),
                None => None,
            })
    }
}
