// src/core/workflow.rs
//! Upload → Analyze → Find-Jobs flow for one user.
//!
//! Analyze and FindJobs are never exposed without a session: the read accessors report
//! Upload and empty results as soon as the session is gone, and the next mutating call
//! discards whatever the previous session left behind.

use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};

use crate::auth::SessionContext;
use crate::core::backend::JobAgentBackend;
use crate::core::phase::{Phase, PhaseOrchestrator, PhaseStatus};
use crate::core::resume_service::ResumeDataService;
use crate::core::visibility::{visible, VisibilityPolicy, VisibleJobs};
use crate::error::{ClientError, ClientResult, InputError};
use crate::types::{AnalysisSummary, JobListing, ResumeFile};

pub struct ApplicationWorkflow {
    orchestrator: PhaseOrchestrator,
    backend: Arc<dyn JobAgentBackend>,
    resume: Arc<ResumeDataService>,
    session: SessionContext,
    /// Token of the session the state below belongs to
    owner: Option<String>,
    selected_file: Option<ResumeFile>,
    analysis: Option<AnalysisSummary>,
    jobs: Vec<JobListing>,
    is_analyzing: bool,
    is_loading_jobs: bool,
    last_error: Option<String>,
    free_limit: usize,
}

impl ApplicationWorkflow {
    pub fn new(
        backend: Arc<dyn JobAgentBackend>,
        resume: Arc<ResumeDataService>,
        session: SessionContext,
        free_limit: usize,
    ) -> Self {
        let owner = session.current().map(|s| s.access_token);
        Self {
            orchestrator: PhaseOrchestrator::new(),
            backend,
            resume,
            session,
            owner,
            selected_file: None,
            analysis: None,
            jobs: Vec::new(),
            is_analyzing: false,
            is_loading_jobs: false,
            last_error: None,
            free_limit,
        }
    }

    /// Drop state left by a session that ended or was replaced.
    pub fn sync_session(&mut self) {
        let current = self.session.current().map(|s| s.access_token);
        let replaced = self.owner.is_some() && current != self.owner;
        let exposed = current.is_none() && self.orchestrator.current_phase().requires_session();

        if replaced || exposed {
            warn!(
                "Session ended during the {} phase, returning to upload",
                self.orchestrator.current_phase()
            );
            self.discard_state();
            if current.is_none() {
                self.resume.clear();
            }
        }
        self.owner = current;
    }

    fn discard_state(&mut self) {
        self.selected_file = None;
        self.analysis = None;
        self.jobs.clear();
        self.is_analyzing = false;
        self.is_loading_jobs = false;
        self.last_error = None;
        self.orchestrator.go_to(Phase::Upload);
    }

    fn record(&mut self, err: ClientError) -> ClientError {
        // Auth failures prompt for login instead of showing an error
        if !err.requires_login() {
            self.last_error = Some(err.to_string());
        }
        err
    }

    fn exposed(&self) -> bool {
        !self.session.is_authenticated()
    }

    fn is_current_session(&self, token: &str) -> bool {
        self.session
            .current()
            .is_some_and(|current| current.bearer() == token)
    }

    /// Select the résumé to upload. Non-PDF files are refused and clear the selection.
    pub fn select_file(&mut self, file: ResumeFile) -> ClientResult<()> {
        self.sync_session();
        self.selected_file = None;
        self.last_error = None;

        if let Err(e) = file.check_type() {
            return Err(self.record(e.into()));
        }
        info!("Selected {} ({} bytes)", file.file_name, file.size());
        self.selected_file = Some(file);
        Ok(())
    }

    pub async fn handle_upload_submit(&mut self) -> ClientResult<AnalysisSummary> {
        self.sync_session();
        self.last_error = None;

        let file = self
            .selected_file
            .clone()
            .ok_or(InputError::NoFileSelected)
            .map_err(|e| self.record(e.into()))?;
        file.validate(self.resume.max_upload_bytes())
            .map_err(|e| self.record(e.into()))?;
        let session = self.session.require().map_err(|e| self.record(e))?;

        self.orchestrator.go_to(Phase::Analyze);
        self.analysis = None;
        self.is_analyzing = true;
        let result = self.resume.submit(&file).await;
        self.is_analyzing = false;

        match result {
            Ok(analysis) if self.is_current_session(session.bearer()) => {
                let summary = analysis.summary();
                self.analysis = Some(summary.clone());
                Ok(summary)
            }
            Ok(_) => {
                self.sync_session();
                Err(ClientError::AuthRequired)
            }
            Err(e) => {
                self.orchestrator.go_to(Phase::Upload);
                self.sync_session();
                Err(self.record(e))
            }
        }
    }

    /// Request job matches for the current analysis and show them in FindJobs.
    /// On failure the flow returns to Analyze with no listings.
    pub async fn handle_find_jobs(&mut self) -> ClientResult<&[JobListing]> {
        self.sync_session();
        self.last_error = None;
        let session = self.session.require().map_err(|e| self.record(e))?;

        self.orchestrator.go_to(Phase::FindJobs);
        self.jobs.clear();
        self.is_loading_jobs = true;

        let analysis = self.resume.current();
        let span = info_span!("job_search", user = %session.email);
        let result = self
            .backend
            .find_jobs(session.bearer(), analysis.as_ref())
            .instrument(span)
            .await;
        self.is_loading_jobs = false;

        match result {
            Ok(jobs) if self.is_current_session(session.bearer()) => {
                info!("Found {} matching jobs", jobs.len());
                self.jobs = jobs;
                Ok(&self.jobs)
            }
            Ok(_) => {
                self.sync_session();
                Err(ClientError::AuthRequired)
            }
            Err(e) => {
                warn!("Job search failed: {}", e);
                self.session.reject(&e, session.bearer());
                self.jobs.clear();
                self.orchestrator.go_to(Phase::Analyze);
                self.sync_session();
                Err(self.record(e))
            }
        }
    }

    /// Step back: Analyze drops the selection and shown analysis, FindJobs returns to Analyze.
    pub fn handle_go_back(&mut self) {
        self.sync_session();
        match self.orchestrator.current_phase() {
            Phase::Analyze => {
                self.is_analyzing = false;
                self.analysis = None;
                self.selected_file = None;
                self.orchestrator.back();
            }
            Phase::FindJobs => self.orchestrator.back(),
            Phase::Upload => {}
        }
    }

    /// Advance to the next phase. Analyze and FindJobs are not entered without a session.
    pub fn next_phase(&mut self) -> ClientResult<Phase> {
        self.sync_session();
        let gated = self
            .orchestrator
            .current_phase()
            .following()
            .is_some_and(Phase::requires_session);
        if gated {
            self.session.require().map_err(|e| self.record(e))?;
        }
        self.orchestrator.next();
        Ok(self.orchestrator.current_phase())
    }

    /// Reuse the stored analysis instead of uploading again.
    /// Returns `None` when the user has no analysis yet.
    pub fn continue_with_existing_analysis(&mut self) -> ClientResult<Option<AnalysisSummary>> {
        self.sync_session();
        self.session.require().map_err(|e| self.record(e))?;

        let Some(analysis) = self.resume.current().filter(|_| self.resume.has_resume_data()) else {
            return Ok(None);
        };
        let summary = analysis.summary();
        self.analysis = Some(summary.clone());
        self.orchestrator.go_to(Phase::Analyze);
        Ok(Some(summary))
    }

    pub fn reset_process(&mut self) {
        self.discard_state();
        self.resume.clear();
        self.owner = self.session.current().map(|s| s.access_token);
    }

    pub fn current_phase(&self) -> Phase {
        let phase = self.orchestrator.current_phase();
        if phase.requires_session() && self.exposed() {
            Phase::Upload
        } else {
            phase
        }
    }

    pub fn phase_status(&self, phase: Phase) -> PhaseStatus {
        if self.exposed() {
            return phase.status_against(Phase::Upload);
        }
        self.orchestrator.status_of(phase)
    }

    pub fn selected_file(&self) -> Option<&ResumeFile> {
        self.selected_file.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisSummary> {
        if self.exposed() {
            return None;
        }
        self.analysis.as_ref()
    }

    pub fn jobs(&self) -> &[JobListing] {
        if self.exposed() {
            return &[];
        }
        &self.jobs
    }

    pub fn visibility_policy(&self, is_premium: bool) -> VisibilityPolicy {
        let policy = if is_premium {
            VisibilityPolicy::premium()
        } else {
            VisibilityPolicy::free()
        };
        policy.with_free_limit(self.free_limit)
    }

    pub fn visible_jobs(&self, policy: &VisibilityPolicy) -> VisibleJobs<'_> {
        visible(self.jobs(), policy)
    }

    pub fn has_resume_data(&self) -> bool {
        !self.exposed() && self.resume.has_resume_data()
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    pub fn is_loading_jobs(&self) -> bool {
        self.is_loading_jobs
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
