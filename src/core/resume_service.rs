// src/core/resume_service.rs
//! Current résumé analysis for the signed-in user.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, info_span, warn, Instrument};

use crate::auth::SessionContext;
use crate::core::backend::JobAgentBackend;
use crate::error::ClientResult;
use crate::types::{ResumeAnalysis, ResumeFile};

#[derive(Debug, Default)]
struct ResumeState {
    current: Option<ResumeAnalysis>,
    has_resume_data: bool,
    is_loading: bool,
}

pub struct ResumeDataService {
    backend: Arc<dyn JobAgentBackend>,
    session: SessionContext,
    max_upload_bytes: u64,
    state: RwLock<ResumeState>,
}

impl ResumeDataService {
    pub fn new(backend: Arc<dyn JobAgentBackend>, session: SessionContext, max_upload_bytes: u64) -> Self {
        Self {
            backend,
            session,
            max_upload_bytes,
            state: RwLock::new(ResumeState::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ResumeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ResumeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retrieve the most recent analysis for the current session.
    ///
    /// Failures are not fatal: they are logged and leave `has_resume_data` false.
    pub async fn fetch_current(&self) -> Option<ResumeAnalysis> {
        let Some(session) = self.session.current() else {
            self.clear();
            return None;
        };

        self.write().is_loading = true;
        let span = info_span!("resume_fetch", user = %session.email);
        let result = self
            .backend
            .fetch_resume_data(session.bearer())
            .instrument(span)
            .await;

        let mut state = self.write();
        state.is_loading = false;

        // The session may have ended or changed while the request was in flight
        if !self.is_same_session(session.bearer()) {
            info!("Discarding resume data fetched for a session that is no longer current");
            return None;
        }

        match result {
            Ok(Some(analysis)) => {
                info!("Loaded existing resume analysis for {}", session.email);
                state.current = Some(analysis.clone());
                state.has_resume_data = true;
                Some(analysis)
            }
            Ok(None) => {
                info!("No stored resume analysis for {}", session.email);
                state.current = None;
                state.has_resume_data = false;
                None
            }
            Err(e) => {
                warn!("Failed to fetch resume data: {}", e);
                state.current = None;
                state.has_resume_data = false;
                drop(state);
                self.session.reject(&e, session.bearer());
                None
            }
        }
    }

    /// Validate and upload a résumé; the current analysis is replaced only on success.
    pub async fn submit(&self, file: &ResumeFile) -> ClientResult<ResumeAnalysis> {
        file.validate(self.max_upload_bytes)?;
        let session = self.session.require()?;

        let span = info_span!("resume_upload", user = %session.email, file = %file.file_name);
        let result = self
            .backend
            .upload_resume(session.bearer(), file)
            .instrument(span)
            .await;

        match result {
            Ok(analysis) => {
                if self.is_same_session(session.bearer()) {
                    let mut state = self.write();
                    state.current = Some(analysis.clone());
                    state.has_resume_data = true;
                }
                info!("Resume analysed for {}", session.email);
                Ok(analysis)
            }
            Err(e) => {
                warn!("Resume upload failed: {}", e);
                self.session.reject(&e, session.bearer());
                Err(e)
            }
        }
    }

    fn is_same_session(&self, token: &str) -> bool {
        self.session
            .current()
            .is_some_and(|current| current.bearer() == token)
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    pub fn current(&self) -> Option<ResumeAnalysis> {
        self.read().current.clone()
    }

    pub fn has_resume_data(&self) -> bool {
        self.read().has_resume_data
    }

    pub fn is_loading(&self) -> bool {
        self.read().is_loading
    }

    /// Forget the analysis, e.g. when the session ends.
    pub fn clear(&self) {
        *self.write() = ResumeState::default();
    }
}
