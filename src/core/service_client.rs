// src/core/service_client.rs
//! HTTP implementation of the job-agent backend

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, error, info, trace};

use crate::config::ClientConfig;
use crate::core::artifact_store::PDF_CONTENT_TYPE;
use crate::core::backend::JobAgentBackend;
use crate::error::{ClientError, ClientResult, InputError};
use crate::types::response::{
    CoverLetterGenerationResponse, CoverLetterRecord, ErrorBody, PdfPayloadResponse,
    TokenResponse,
};
use crate::types::{CoverLetterDetails, JobListing, ResumeAnalysis, ResumeFile};

const LOGIN_ENDPOINT: &str = "/auth/login";
const SIGNUP_ENDPOINT: &str = "/auth/signup";
const UPLOAD_RESUME_ENDPOINT: &str = "/resume/upload";
const RESUME_DATA_ENDPOINT: &str = "/resume/get-resume-data";
const GET_JOBS_ENDPOINT: &str = "/jobs/get-jobs";
const CUSTOM_RESUME_ENDPOINT: &str = "/resume/build-custom-resume";
const CUSTOM_COVER_LETTER_ENDPOINT: &str = "/cover-letter/build-custom-cover-letter";
const COVER_LETTER_DOWNLOAD_ENDPOINT: &str = "/cover-letter/download";
const COVER_LETTER_LIST_ENDPOINT: &str = "/cover-letter/list";
const COMBINED_ENDPOINT: &str = "/resume/build-resume-with-cover-letter";

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Create new service client with configuration
    pub fn new(base_url: String, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        Self::new(config.backend_url.clone(), config.timeout_secs)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// `endpoint` with `segment` appended as a single percent-encoded path segment.
    fn url_with_segment(&self, endpoint: &str, segment: &str) -> ClientResult<Url> {
        let mut url = Url::parse(&self.url(endpoint))
            .map_err(|e| ClientError::NetworkError(format!("invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::NetworkError("backend URL cannot have a path".to_string()))?
            .push(segment);
        Ok(url)
    }

    fn get(&self, endpoint: &str, token: &str) -> RequestBuilder {
        self.client.get(self.url(endpoint)).bearer_auth(token)
    }

    fn post(&self, endpoint: &str, token: &str) -> RequestBuilder {
        self.client.post(self.url(endpoint)).bearer_auth(token)
    }

    /// Send a request and turn every non-2xx answer into a typed error
    async fn send(&self, request: RequestBuilder, what: &str) -> ClientResult<Response> {
        let response = request.send().await.map_err(|e| {
            error!("{} request failed: {}", what, e);
            ClientError::NetworkError(e.to_string())
        })?;

        let status = response.status();
        trace!("{} response status: {}", what, status);

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            info!("{} rejected the credential ({})", what, status);
            return Err(ClientError::AuthRequired);
        }

        let error_text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&error_text)
            .ok()
            .and_then(ErrorBody::into_message)
            .or_else(|| Some(error_text.trim().to_string()).filter(|t| !t.is_empty()));

        error!("{} error response {}: {:?}", what, status, message);
        Err(ClientError::server(status.as_u16(), message))
    }
}

#[async_trait]
impl JobAgentBackend for ServiceClient {
    async fn sign_in(&self, email: &str, password: &str) -> ClientResult<TokenResponse> {
        let payload = serde_json::json!({ "email": email, "password": password });
        let request = self.client.post(self.url(LOGIN_ENDPOINT)).json(&payload);

        info!("Signing in {}", email);
        let response = self.send(request, "Login").await?;
        Ok(response.json::<TokenResponse>().await?)
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ClientResult<TokenResponse> {
        let payload = serde_json::json!({
            "email": email,
            "password": password,
            "first_name": first_name,
            "last_name": last_name,
        });
        let request = self.client.post(self.url(SIGNUP_ENDPOINT)).json(&payload);

        info!("Registering {}", email);
        let response = self.send(request, "Signup").await?;
        Ok(response.json::<TokenResponse>().await?)
    }

    async fn upload_resume(&self, token: &str, file: &ResumeFile) -> ClientResult<ResumeAnalysis> {
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(PDF_CONTENT_TYPE)
            .map_err(|e| InputError::InvalidFileType(e.to_string()))?;
        let form = Form::new().part("file", part);

        info!(
            "Uploading resume: {}, size: {}",
            file.file_name,
            file.size()
        );
        let request = self.post(UPLOAD_RESUME_ENDPOINT, token).multipart(form);
        let response = self.send(request, "Resume upload").await?;
        Ok(response.json::<ResumeAnalysis>().await?)
    }

    async fn fetch_resume_data(&self, token: &str) -> ClientResult<Option<ResumeAnalysis>> {
        let request = self.get(RESUME_DATA_ENDPOINT, token);
        let response = match self.send(request, "Resume data").await {
            Ok(response) => response,
            Err(ClientError::ServerError { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let data: Value = response.json().await?;
        match data {
            Value::Null => Ok(None),
            Value::Object(ref map) if map.is_empty() => Ok(None),
            data => {
                let analysis: ResumeAnalysis = serde_json::from_value(data)
                    .map_err(|e| ClientError::DecodeError(e.to_string()))?;
                Ok(Some(analysis).filter(|a| !a.is_empty()))
            }
        }
    }

    async fn find_jobs(
        &self,
        token: &str,
        analysis: Option<&ResumeAnalysis>,
    ) -> ClientResult<Vec<JobListing>> {
        let payload = serde_json::json!({ "resume_information": analysis });

        info!("Calling job matching service: {}", self.url(GET_JOBS_ENDPOINT));
        let request = self.post(GET_JOBS_ENDPOINT, token).json(&payload);
        let response = self.send(request, "Job matching").await?;

        let data: Value = response.json().await?;
        let jobs = JobListing::parse_match_response(data);
        debug!("Job matching returned {} listings", jobs.len());
        Ok(jobs)
    }

    async fn build_custom_resume(
        &self,
        token: &str,
        job_description: &str,
    ) -> ClientResult<PdfPayloadResponse> {
        let request = self
            .get(CUSTOM_RESUME_ENDPOINT, token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("job_description", job_description)]);

        info!("Requesting custom resume generation");
        let response = self.send(request, "Custom resume").await?;
        Ok(response.json::<PdfPayloadResponse>().await?)
    }

    async fn build_cover_letter(
        &self,
        token: &str,
        details: &CoverLetterDetails,
    ) -> ClientResult<CoverLetterGenerationResponse> {
        let request = self
            .get(CUSTOM_COVER_LETTER_ENDPOINT, token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&details.query_pairs());

        info!(
            "Requesting cover letter for {} at {}",
            details.position_title, details.company_name
        );
        let response = self.send(request, "Cover letter").await?;
        Ok(response.json::<CoverLetterGenerationResponse>().await?)
    }

    async fn download_cover_letter(&self, token: &str, cover_letter_id: &str) -> ClientResult<Bytes> {
        let url = self.url_with_segment(COVER_LETTER_DOWNLOAD_ENDPOINT, cover_letter_id)?;
        let request = self.client.get(url).bearer_auth(token);

        info!("Downloading cover letter {}", cover_letter_id);
        let response = self.send(request, "Cover letter download").await?;
        Ok(response.bytes().await?)
    }

    async fn list_cover_letters(&self, token: &str) -> ClientResult<Vec<CoverLetterRecord>> {
        let request = self.get(COVER_LETTER_LIST_ENDPOINT, token);
        let response = self.send(request, "Cover letter list").await?;
        Ok(response.json::<Vec<CoverLetterRecord>>().await?)
    }

    async fn build_combined(
        &self,
        token: &str,
        cover_letter_id: &str,
        job_description: &str,
    ) -> ClientResult<PdfPayloadResponse> {
        let request = self
            .get(COMBINED_ENDPOINT, token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("cover_letter_id", cover_letter_id),
                ("job_description", job_description),
            ]);

        info!("Requesting combined document for cover letter {}", cover_letter_id);
        let response = self.send(request, "Combined document").await?;
        Ok(response.json::<PdfPayloadResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = ServiceClient::new("http://localhost:8000/".to_string(), 5).unwrap();
        assert_eq!(client.url(RESUME_DATA_ENDPOINT), "http://localhost:8000/resume/get-resume-data");
    }

    #[test]
    fn test_cover_letter_id_is_one_path_segment() {
        let client = ServiceClient::new("http://localhost:8000/".to_string(), 5).unwrap();

        let url = client
            .url_with_segment(COVER_LETTER_DOWNLOAD_ENDPOINT, "cl-1")
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/cover-letter/download/cl-1");

        let url = client
            .url_with_segment(COVER_LETTER_DOWNLOAD_ENDPOINT, "a/b?c#d")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/cover-letter/download/a%2Fb%3Fc%23d"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.path_segments().map(|s| s.count()), Some(3));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP connections
        let client = ServiceClient::new("http://127.0.0.1:9".to_string(), 2).unwrap();
        let err = client.fetch_resume_data("token").await.unwrap_err();
        assert!(matches!(err, ClientError::NetworkError(_)), "got {:?}", err);
    }
}
