// src/core/backend.rs
//! Contract of the remote job-agent service.
//!
//! The workflow, the résumé service and the document pipeline only talk to this trait, so the
//! HTTP client can be swapped for a scripted backend in tests. Every authenticated call borrows
//! the bearer token for the duration of the request only.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ClientResult;
use crate::types::response::{
    CoverLetterGenerationResponse, CoverLetterRecord, PdfPayloadResponse, TokenResponse,
};
use crate::types::{CoverLetterDetails, JobListing, ResumeAnalysis, ResumeFile};

#[async_trait]
pub trait JobAgentBackend: Send + Sync {
    // --- Authentication ---
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<TokenResponse>;

    async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ClientResult<TokenResponse>;

    // --- Résumé analysis ---
    async fn upload_resume(&self, token: &str, file: &ResumeFile) -> ClientResult<ResumeAnalysis>;

    /// `Ok(None)` when the user has no stored analysis
    async fn fetch_resume_data(&self, token: &str) -> ClientResult<Option<ResumeAnalysis>>;

    // --- Job matching ---
    async fn find_jobs(
        &self,
        token: &str,
        analysis: Option<&ResumeAnalysis>,
    ) -> ClientResult<Vec<JobListing>>;

    // --- Document generation ---
    async fn build_custom_resume(
        &self,
        token: &str,
        job_description: &str,
    ) -> ClientResult<PdfPayloadResponse>;

    async fn build_cover_letter(
        &self,
        token: &str,
        details: &CoverLetterDetails,
    ) -> ClientResult<CoverLetterGenerationResponse>;

    /// Raw PDF bytes of a saved cover letter
    async fn download_cover_letter(&self, token: &str, cover_letter_id: &str) -> ClientResult<Bytes>;

    async fn list_cover_letters(&self, token: &str) -> ClientResult<Vec<CoverLetterRecord>>;

    async fn build_combined(
        &self,
        token: &str,
        cover_letter_id: &str,
        job_description: &str,
    ) -> ClientResult<PdfPayloadResponse>;
}
