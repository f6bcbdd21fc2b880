// src/core/testing.rs
//! Scripted backend shared by the unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::core::backend::JobAgentBackend;
use crate::error::{ClientError, ClientResult};
use crate::types::response::{
    CoverLetterGenerationResponse, CoverLetterRecord, PdfPayloadResponse, TokenResponse,
};
use crate::types::resume_data::Skills;
use crate::types::{CoverLetterDetails, JobListing, ResumeAnalysis, ResumeFile};

pub(crate) const RESUME_PDF: &[u8] = b"%PDF-1.4 resume";
pub(crate) const LETTER_PDF: &[u8] = b"%PDF-1.4 letter";
pub(crate) const COMBINED_PDF: &[u8] = b"%PDF-1.4 combined";

/// Forced failure for one backend call
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Status(u16, &'static str),
    Unauthorized,
    Offline,
}

impl Reply {
    fn to_error(&self) -> ClientError {
        match self {
            Reply::Status(code, message) => ClientError::server(*code, Some(message.to_string())),
            Reply::Unauthorized => ClientError::AuthRequired,
            Reply::Offline => ClientError::NetworkError("connection refused".to_string()),
        }
    }
}

pub(crate) fn sample_analysis() -> ResumeAnalysis {
    ResumeAnalysis {
        professional_summary: Some("Backend engineer".to_string()),
        skills: Some(Skills {
            technical_skills: Some(vec!["Rust".to_string(), "PostgreSQL".to_string()]),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub(crate) fn sample_jobs(n: usize) -> Vec<JobListing> {
    (0..n)
        .map(|i| JobListing {
            title: format!("Engineer {}", i),
            company: "Acme".to_string(),
            url: format!("https://jobs.example/{}", i),
            ..Default::default()
        })
        .collect()
}

pub(crate) fn pdf_file(size: usize) -> ResumeFile {
    ResumeFile::new("resume.pdf", Some("application/pdf"), vec![b'%'; size])
}

pub(crate) struct FakeBackend {
    stored: Mutex<Option<ResumeAnalysis>>,
    jobs: Mutex<Vec<JobListing>>,
    resume_pdf: Mutex<Option<String>>,
    combined_pdf: Mutex<Option<String>>,
    cover_letter: Mutex<CoverLetterGenerationResponse>,
    failures: Mutex<HashMap<&'static str, Reply>>,
    calls: Mutex<Vec<&'static str>>,
    gate: Option<Arc<Notify>>,
    in_flight: AtomicUsize,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            stored: Mutex::new(None),
            jobs: Mutex::new(sample_jobs(8)),
            resume_pdf: Mutex::new(Some(hex::encode(RESUME_PDF))),
            combined_pdf: Mutex::new(Some(hex::encode(COMBINED_PDF))),
            cover_letter: Mutex::new(CoverLetterGenerationResponse {
                pdf: Some(hex::encode(LETTER_PDF)),
                id: Some("cl-1".to_string()),
                content: None,
            }),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Upload, job search and generation calls wait on the returned `Notify` before answering.
    pub(crate) fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mut fake = Self::new();
        fake.gate = Some(gate.clone());
        (fake, gate)
    }

    pub(crate) fn with_stored(self, analysis: ResumeAnalysis) -> Self {
        *self.stored.lock().unwrap() = Some(analysis);
        self
    }

    pub(crate) fn set_jobs(&self, jobs: Vec<JobListing>) {
        *self.jobs.lock().unwrap() = jobs;
    }

    pub(crate) fn set_resume_pdf(&self, hex: Option<&str>) {
        *self.resume_pdf.lock().unwrap() = hex.map(String::from);
    }

    pub(crate) fn set_cover_letter(&self, response: CoverLetterGenerationResponse) {
        *self.cover_letter.lock().unwrap() = response;
    }

    pub(crate) fn fail(&self, call: &'static str, reply: Reply) {
        self.failures.lock().unwrap().insert(call, reply);
    }

    pub(crate) fn recover(&self, call: &'static str) {
        self.failures.lock().unwrap().remove(call);
    }

    pub(crate) fn calls(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Yield until `n` gated requests are waiting.
    pub(crate) async fn wait_in_flight(&self, n: usize) {
        while self.in_flight() < n {
            tokio::task::yield_now().await;
        }
    }

    async fn enter(&self, call: &'static str, gated: bool) -> ClientResult<()> {
        self.calls.lock().unwrap().push(call);
        if gated {
            if let Some(gate) = &self.gate {
                self.in_flight.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        }
        match self.failures.lock().unwrap().get(call) {
            Some(reply) => Err(reply.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl JobAgentBackend for FakeBackend {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<TokenResponse> {
        self.enter("sign_in", false).await?;
        if password != "secret" {
            return Err(ClientError::server(401, Some("Incorrect email or password".to_string())));
        }
        Ok(TokenResponse {
            access_token: format!("token-{}", email),
            token_type: Some("bearer".to_string()),
            email: email.to_string(),
            first_name: Some("Jane".to_string()),
            last_name: None,
        })
    }

    async fn register(
        &self,
        email: &str,
        _password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ClientResult<TokenResponse> {
        self.enter("register", false).await?;
        Ok(TokenResponse {
            access_token: format!("token-{}", email),
            token_type: Some("bearer".to_string()),
            email: email.to_string(),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
        })
    }

    async fn upload_resume(&self, _token: &str, _file: &ResumeFile) -> ClientResult<ResumeAnalysis> {
        self.enter("upload_resume", true).await?;
        Ok(sample_analysis())
    }

    async fn fetch_resume_data(&self, _token: &str) -> ClientResult<Option<ResumeAnalysis>> {
        self.enter("fetch_resume_data", false).await?;
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn find_jobs(
        &self,
        _token: &str,
        _analysis: Option<&ResumeAnalysis>,
    ) -> ClientResult<Vec<JobListing>> {
        self.enter("find_jobs", true).await?;
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn build_custom_resume(
        &self,
        _token: &str,
        _job_description: &str,
    ) -> ClientResult<PdfPayloadResponse> {
        self.enter("build_custom_resume", true).await?;
        Ok(PdfPayloadResponse {
            pdf: self.resume_pdf.lock().unwrap().clone(),
        })
    }

    async fn build_cover_letter(
        &self,
        _token: &str,
        _details: &CoverLetterDetails,
    ) -> ClientResult<CoverLetterGenerationResponse> {
        self.enter("build_cover_letter", true).await?;
        Ok(self.cover_letter.lock().unwrap().clone())
    }

    async fn download_cover_letter(&self, _token: &str, _cover_letter_id: &str) -> ClientResult<Bytes> {
        self.enter("download_cover_letter", true).await?;
        Ok(Bytes::from_static(LETTER_PDF))
    }

    async fn list_cover_letters(&self, _token: &str) -> ClientResult<Vec<CoverLetterRecord>> {
        self.enter("list_cover_letters", false).await?;
        Ok(vec![CoverLetterRecord {
            id: "cl-1".to_string(),
            content: "Dear hiring manager".to_string(),
            job_description: Some("Build things".to_string()),
            created_at: None,
        }])
    }

    async fn build_combined(
        &self,
        _token: &str,
        _cover_letter_id: &str,
        _job_description: &str,
    ) -> ClientResult<PdfPayloadResponse> {
        self.enter("build_combined", true).await?;
        Ok(PdfPayloadResponse {
            pdf: self.combined_pdf.lock().unwrap().clone(),
        })
    }
}
