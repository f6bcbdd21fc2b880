// src/core/pipeline.rs
//! Document generation: résumé, cover letter and combined PDFs.
//!
//! Each generation runs on its own tokio task. The caller awaits the task's result, but
//! dropping the caller's future does not stop the generation: the artifact is still stored
//! when the backend answers. Only one generation per [`ArtifactKind`] may be in flight; a
//! second request for the same kind is rejected with `AlreadyInProgress`.
//!
//! Progress is published per kind on a `watch` channel so a preview can be opened before
//! the document exists and update itself when the status changes.

use bytes::Bytes;
use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};

use crate::auth::{Session, SessionContext};
use crate::core::artifact_store::{Artifact, ArtifactHandle, ArtifactKind, ArtifactStore};
use crate::core::backend::JobAgentBackend;
use crate::core::pdf_payload::decode_pdf_field;
use crate::error::{ClientError, ClientResult, InputError};
use crate::types::response::CoverLetterRecord;
use crate::types::CoverLetterDetails;
use crate::utils::{sanitize_file_name, write_bytes_safe};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Generating,
    Ready(ArtifactHandle),
    /// Cover letter saved as text only; render it with `download_cover_letter(id)`.
    Drafted { id: String },
    Failed { code: &'static str, message: String },
}

/// A cover letter the backend saved without rendering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterDraft {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub enum GenerationResult {
    Ready(Artifact),
    Pending(CoverLetterDraft),
}

impl GenerationResult {
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Ready(artifact) => Some(artifact),
            Self::Pending(_) => None,
        }
    }
}

/// What a finished backend call produced, before it is applied to the store.
enum Produced {
    Pdf {
        data: Bytes,
        file_name: String,
        source_id: Option<String>,
    },
    Draft(CoverLetterDraft),
}

struct StatusChannels {
    resume: watch::Sender<GenerationStatus>,
    cover_letter: watch::Sender<GenerationStatus>,
    combined: watch::Sender<GenerationStatus>,
}

impl StatusChannels {
    fn new() -> Self {
        Self {
            resume: watch::channel(GenerationStatus::Idle).0,
            cover_letter: watch::channel(GenerationStatus::Idle).0,
            combined: watch::channel(GenerationStatus::Idle).0,
        }
    }

    fn get(&self, kind: ArtifactKind) -> &watch::Sender<GenerationStatus> {
        match kind {
            ArtifactKind::Resume => &self.resume,
            ArtifactKind::CoverLetter => &self.cover_letter,
            ArtifactKind::Combined => &self.combined,
        }
    }
}

struct PipelineInner {
    backend: Arc<dyn JobAgentBackend>,
    session: SessionContext,
    download_dir: PathBuf,
    store: Mutex<ArtifactStore>,
    in_flight: Mutex<HashSet<ArtifactKind>>,
    status: StatusChannels,
}

/// Marks a kind as in flight until settled or dropped.
struct FlightGuard {
    inner: Arc<PipelineInner>,
    kind: ArtifactKind,
    settled: bool,
}

impl FlightGuard {
    /// Publish the final status and free the kind under the in-flight lock, so nobody
    /// sees the kind free while its status still says `Generating`.
    fn settle(mut self, status: GenerationStatus) {
        let mut in_flight = self.inner.in_flight();
        self.inner.set_status(self.kind, status);
        in_flight.remove(&self.kind);
        drop(in_flight);
        self.settled = true;
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.inner.in_flight().remove(&self.kind);
        }
    }
}

impl PipelineInner {
    fn store(&self) -> MutexGuard<'_, ArtifactStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_flight(&self) -> MutexGuard<'_, HashSet<ArtifactKind>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, kind: ArtifactKind, status: GenerationStatus) {
        self.status.get(kind).send_replace(status);
    }

    /// Apply a finished generation. Runs on the generation task, whether or not anyone
    /// is still waiting for it.
    fn complete(
        &self,
        kind: ArtifactKind,
        token: &str,
        outcome: ClientResult<Produced>,
        guard: FlightGuard,
    ) -> ClientResult<GenerationResult> {
        let session_current = self
            .session
            .current()
            .is_some_and(|s| s.bearer() == token);

        let (result, status) = match outcome {
            Ok(_) if !session_current => {
                info!("Discarding {} generated for a session that has ended", kind);
                (Err(ClientError::AuthRequired), GenerationStatus::Idle)
            }
            Ok(Produced::Pdf {
                data,
                file_name,
                source_id,
            }) => {
                let artifact = self.store().insert(kind, data, file_name, source_id);
                let handle = artifact.handle;
                (Ok(GenerationResult::Ready(artifact)), GenerationStatus::Ready(handle))
            }
            Ok(Produced::Draft(draft)) => {
                info!("Cover letter {} saved as draft", draft.id);
                let status = GenerationStatus::Drafted {
                    id: draft.id.clone(),
                };
                (Ok(GenerationResult::Pending(draft)), status)
            }
            Err(e) => {
                error!("{} generation failed: {}", kind, e);
                self.session.reject(&e, token);
                let status = GenerationStatus::Failed {
                    code: e.code(),
                    message: e.to_string(),
                };
                (Err(e), status)
            }
        };

        guard.settle(status);
        result
    }
}

#[derive(Clone)]
pub struct DocumentPipeline {
    inner: Arc<PipelineInner>,
}

impl DocumentPipeline {
    pub fn new(
        backend: Arc<dyn JobAgentBackend>,
        session: SessionContext,
        download_dir: PathBuf,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                backend,
                session,
                download_dir,
                store: Mutex::new(ArtifactStore::new()),
                in_flight: Mutex::new(HashSet::new()),
                status: StatusChannels::new(),
            }),
        }
    }

    fn begin(&self, kind: ArtifactKind) -> ClientResult<FlightGuard> {
        if !self.inner.in_flight().insert(kind) {
            warn!("Rejected concurrent {} generation", kind);
            return Err(ClientError::AlreadyInProgress(kind));
        }
        Ok(FlightGuard {
            inner: self.inner.clone(),
            kind,
            settled: false,
        })
    }

    /// Claim the kind, publish `Generating` and run `work` on its own task.
    fn launch<Fut>(
        &self,
        kind: ArtifactKind,
        session: &Session,
        work: Fut,
    ) -> ClientResult<JoinHandle<ClientResult<GenerationResult>>>
    where
        Fut: Future<Output = ClientResult<Produced>> + Send + 'static,
    {
        let guard = self.begin(kind)?;
        self.inner.set_status(kind, GenerationStatus::Generating);

        let inner = self.inner.clone();
        let token = session.access_token.clone();
        let span = info_span!("document_generation", kind = %kind, user = %session.email);

        Ok(tokio::spawn(
            async move {
                let outcome = work.await;
                inner.complete(kind, &token, outcome, guard)
            }
            .instrument(span),
        ))
    }

    async fn join(
        handle: JoinHandle<ClientResult<GenerationResult>>,
    ) -> ClientResult<GenerationResult> {
        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(ClientError::NetworkError(format!(
                "generation task cancelled: {}",
                e
            ))),
        }
    }

    fn expect_ready(result: GenerationResult) -> ClientResult<Artifact> {
        match result {
            GenerationResult::Ready(artifact) => Ok(artifact),
            GenerationResult::Pending(_) => Err(ClientError::PayloadMissing),
        }
    }

    /// Generate a résumé tailored to `job_description`.
    pub async fn generate_resume(&self, job_description: &str) -> ClientResult<Artifact> {
        let session = self.inner.session.require()?;
        let backend = self.inner.backend.clone();
        let token = session.access_token.clone();
        let job_description = job_description.to_string();

        let handle = self.launch(ArtifactKind::Resume, &session, async move {
            let response = backend.build_custom_resume(&token, &job_description).await?;
            let data = decode_pdf_field(response.pdf.as_deref())?;
            Ok(Produced::Pdf {
                data,
                file_name: ArtifactKind::Resume.default_file_name().to_string(),
                source_id: None,
            })
        })?;

        Self::expect_ready(Self::join(handle).await?)
    }

    /// Generate a cover letter. The backend answers with either a rendered PDF or a saved
    /// draft that has to be rendered with [`Self::download_cover_letter`].
    pub async fn generate_cover_letter(
        &self,
        details: &CoverLetterDetails,
    ) -> ClientResult<GenerationResult> {
        details.validate()?;
        let session = self.inner.session.require()?;
        let backend = self.inner.backend.clone();
        let token = session.access_token.clone();
        let details = details.clone();

        let handle = self.launch(ArtifactKind::CoverLetter, &session, async move {
            let response = backend.build_cover_letter(&token, &details).await?;
            let has_pdf = response
                .pdf
                .as_deref()
                .is_some_and(|pdf| !pdf.trim().is_empty());

            if has_pdf {
                let data = decode_pdf_field(response.pdf.as_deref())?;
                let file_name = match &response.id {
                    Some(id) => format!("cover_letter_{}.pdf", id),
                    None => ArtifactKind::CoverLetter.default_file_name().to_string(),
                };
                return Ok(Produced::Pdf {
                    data,
                    file_name,
                    source_id: response.id,
                });
            }

            match response.id {
                Some(id) if !id.is_empty() => Ok(Produced::Draft(CoverLetterDraft {
                    id,
                    content: response.content.unwrap_or_default(),
                })),
                _ => Err(ClientError::PayloadMissing),
            }
        })?;

        Self::join(handle).await
    }

    /// Render a saved cover letter to PDF and make it the live cover-letter artifact.
    pub async fn download_cover_letter(&self, cover_letter_id: &str) -> ClientResult<Artifact> {
        if cover_letter_id.trim().is_empty() {
            return Err(InputError::MissingField("cover_letter_id").into());
        }
        let session = self.inner.session.require()?;
        let backend = self.inner.backend.clone();
        let token = session.access_token.clone();
        let id = cover_letter_id.to_string();

        let handle = self.launch(ArtifactKind::CoverLetter, &session, async move {
            let data = backend.download_cover_letter(&token, &id).await?;
            if data.is_empty() {
                return Err(ClientError::PayloadMissing);
            }
            Ok(Produced::Pdf {
                data,
                file_name: format!("cover_letter_{}.pdf", id),
                source_id: Some(id),
            })
        })?;

        Self::expect_ready(Self::join(handle).await?)
    }

    /// Résumé and cover letter in one document; needs the id of a generated cover letter.
    pub async fn generate_combined(
        &self,
        cover_letter_id: &str,
        job_description: &str,
    ) -> ClientResult<Artifact> {
        if cover_letter_id.trim().is_empty() {
            return Err(InputError::MissingField("cover_letter_id").into());
        }
        let session = self.inner.session.require()?;
        let backend = self.inner.backend.clone();
        let token = session.access_token.clone();
        let id = cover_letter_id.to_string();
        let job_description = job_description.to_string();

        let handle = self.launch(ArtifactKind::Combined, &session, async move {
            let response = backend.build_combined(&token, &id, &job_description).await?;
            let data = decode_pdf_field(response.pdf.as_deref())?;
            Ok(Produced::Pdf {
                data,
                file_name: ArtifactKind::Combined.default_file_name().to_string(),
                source_id: Some(id),
            })
        })?;

        Self::expect_ready(Self::join(handle).await?)
    }

    /// Saved cover letters of the current user
    pub async fn list_cover_letters(&self) -> ClientResult<Vec<CoverLetterRecord>> {
        let session = self.inner.session.require()?;
        self.inner
            .backend
            .list_cover_letters(session.bearer())
            .await
            .inspect_err(|e| {
                self.inner.session.reject(e, session.bearer());
            })
    }

    /// Save the live artifact of `kind` under the download directory.
    pub async fn download_artifact(&self, kind: ArtifactKind) -> ClientResult<PathBuf> {
        let artifact = self.artifact(kind).ok_or(ClientError::NotAvailable(kind))?;
        let path = self
            .inner
            .download_dir
            .join(sanitize_file_name(&artifact.file_name));

        write_bytes_safe(&path, &artifact.data).await?;
        info!(
            "Saved {} to {}, size: {}",
            kind,
            path.display(),
            artifact.size()
        );
        Ok(path)
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<Artifact> {
        self.inner.store().get(kind).cloned()
    }

    pub fn is_live(&self, handle: ArtifactHandle) -> bool {
        self.inner.store().is_live(handle)
    }

    pub fn live_count(&self) -> usize {
        self.inner.store().live_count()
    }

    /// Release the live artifact of `kind`.
    pub fn clear(&self, kind: ArtifactKind) -> bool {
        let released = self.inner.store().release(kind);
        let in_flight = self.inner.in_flight();
        if !in_flight.contains(&kind) {
            self.inner.set_status(kind, GenerationStatus::Idle);
        }
        released
    }

    /// Release every live artifact. Called when the owning view or the session goes away.
    pub fn clear_all(&self) -> usize {
        let released = self.inner.store().release_all();
        let in_flight = self.inner.in_flight();
        for kind in ArtifactKind::ALL {
            if !in_flight.contains(&kind) {
                self.inner.set_status(kind, GenerationStatus::Idle);
            }
        }
        released
    }

    pub fn is_generating_kind(&self, kind: ArtifactKind) -> bool {
        self.inner.in_flight().contains(&kind)
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating_kind(ArtifactKind::Resume)
    }

    pub fn is_generating_cover_letter(&self) -> bool {
        self.is_generating_kind(ArtifactKind::CoverLetter)
    }

    pub fn is_generating_combined(&self) -> bool {
        self.is_generating_kind(ArtifactKind::Combined)
    }

    pub fn status(&self, kind: ArtifactKind) -> GenerationStatus {
        self.inner.status.get(kind).borrow().clone()
    }

    pub fn subscribe(&self, kind: ArtifactKind) -> watch::Receiver<GenerationStatus> {
        self.inner.status.get(kind).subscribe()
    }

    pub fn last_error(&self, kind: ArtifactKind) -> Option<String> {
        match self.status(kind) {
            GenerationStatus::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}
