// src/app.rs
//! Application root: owns the session and wires the services around it.

use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{Session, SessionContext};
use crate::config::ClientConfig;
use crate::core::backend::JobAgentBackend;
use crate::core::pipeline::DocumentPipeline;
use crate::core::resume_service::ResumeDataService;
use crate::core::service_client::ServiceClient;
use crate::core::workflow::ApplicationWorkflow;
use crate::error::ClientResult;
use crate::types::ResumeAnalysis;

pub struct JobAgentApp {
    config: ClientConfig,
    session: SessionContext,
    backend: Arc<dyn JobAgentBackend>,
    resume: Arc<ResumeDataService>,
    pipeline: DocumentPipeline,
    workflow: ApplicationWorkflow,
}

impl JobAgentApp {
    pub fn new(config: ClientConfig, backend: Arc<dyn JobAgentBackend>) -> Self {
        let session = SessionContext::new();
        let resume = Arc::new(ResumeDataService::new(
            backend.clone(),
            session.clone(),
            config.max_upload_bytes,
        ));
        let pipeline = DocumentPipeline::new(
            backend.clone(),
            session.clone(),
            config.download_dir.clone(),
        );
        let workflow = ApplicationWorkflow::new(
            backend.clone(),
            resume.clone(),
            session.clone(),
            config.free_job_limit,
        );

        Self {
            config,
            session,
            backend,
            resume,
            pipeline,
            workflow,
        }
    }

    /// Build the app against the HTTP backend named in `config`.
    pub fn connect(config: ClientConfig) -> anyhow::Result<Self> {
        let client = ServiceClient::from_config(&config)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> ClientResult<Session> {
        let token = self.backend.sign_in(email, password).await.inspect_err(|e| {
            warn!("Sign in failed for {}: {}", email, e);
        })?;
        let session = Session::from(token);
        self.start_session(session.clone()).await;
        Ok(session)
    }

    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> ClientResult<Session> {
        let token = self
            .backend
            .register(email, password, first_name, last_name)
            .await
            .inspect_err(|e| warn!("Registration failed for {}: {}", email, e))?;
        let session = Session::from(token);
        self.start_session(session.clone()).await;
        Ok(session)
    }

    /// Adopt a credential obtained elsewhere, e.g. a stored token.
    pub async fn resume_session(&mut self, session: Session) -> Option<ResumeAnalysis> {
        self.start_session(session).await
    }

    /// Anything left by a previous user is dropped before the new session is visible.
    async fn start_session(&mut self, session: Session) -> Option<ResumeAnalysis> {
        let released = self.pipeline.clear_all();
        if released > 0 {
            info!("Released {} artifacts from the previous session", released);
        }
        self.session.establish(session);
        self.workflow.reset_process();
        self.resume.fetch_current().await
    }

    /// End the session and release everything that belonged to it.
    pub fn sign_out(&mut self) -> bool {
        let ended = self.session.end();
        let released = self.pipeline.clear_all();
        self.workflow.reset_process();
        info!("Signed out, released {} artifacts", released);
        ended
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn resume(&self) -> &ResumeDataService {
        &self.resume
    }

    pub fn pipeline(&self) -> &DocumentPipeline {
        &self.pipeline
    }

    pub fn workflow(&self) -> &ApplicationWorkflow {
        &self.workflow
    }

    pub fn workflow_mut(&mut self) -> &mut ApplicationWorkflow {
        &mut self.workflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact_store::ArtifactKind;
    use crate::core::phase::Phase;
    use crate::core::testing::{pdf_file, sample_analysis, FakeBackend};

    fn app(fake: FakeBackend) -> (JobAgentApp, Arc<FakeBackend>) {
        let fake = Arc::new(fake);
        let download_dir = std::env::temp_dir().join("applyflow-app-tests");
        let config = ClientConfig::default().with_download_dir(download_dir);
        (JobAgentApp::new(config, fake.clone()), fake)
    }

    #[tokio::test]
    async fn test_sign_in_loads_existing_analysis() {
        let (mut app, fake) = app(FakeBackend::new().with_stored(sample_analysis()));

        let session = app.sign_in("jane@example.com", "secret").await.unwrap();
        assert_eq!(session.bearer(), "token-jane@example.com");
        assert_eq!(session.display_name(), "Jane");
        assert!(app.session().is_authenticated());
        assert!(app.resume().has_resume_data());
        assert!(app.workflow().has_resume_data());
        assert_eq!(fake.calls("fetch_resume_data"), 1);
    }

    #[tokio::test]
    async fn test_failed_sign_in_leaves_no_session() {
        let (mut app, fake) = app(FakeBackend::new());

        let err = app.sign_in("jane@example.com", "wrong").await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::ClientError::ServerError { status: 401, .. }
        ));
        assert!(!app.session().is_authenticated());
        assert_eq!(fake.calls("fetch_resume_data"), 0);
    }

    #[tokio::test]
    async fn test_register_establishes_session() {
        let (mut app, _fake) = app(FakeBackend::new());

        let session = app
            .register("sam@example.com", "pw", "Sam", "Lee")
            .await
            .unwrap();
        assert_eq!(session.display_name(), "Sam Lee");
        assert!(!app.resume().has_resume_data());
    }

    #[tokio::test]
    async fn test_sign_out_tears_everything_down() {
        let (mut app, _fake) = app(FakeBackend::new());
        app.sign_in("jane@example.com", "secret").await.unwrap();

        let workflow = app.workflow_mut();
        workflow.select_file(pdf_file(1024)).unwrap();
        workflow.handle_upload_submit().await.unwrap();
        workflow.handle_find_jobs().await.unwrap();
        let resume = app.pipeline().generate_resume("jd").await.unwrap();

        assert!(app.sign_out());
        assert!(!app.session().is_authenticated());
        assert!(!app.pipeline().is_live(resume.handle));
        assert_eq!(app.pipeline().live_count(), 0);
        assert_eq!(app.workflow().current_phase(), Phase::Upload);
        assert!(app.workflow().selected_file().is_none());
        assert!(app.resume().current().is_none());
        assert!(!app.sign_out());
    }

    #[tokio::test]
    async fn test_switching_user_drops_previous_artifacts() {
        let (mut app, _fake) = app(FakeBackend::new());
        app.sign_in("jane@example.com", "secret").await.unwrap();
        app.pipeline().generate_combined("cl-1", "jd").await.unwrap();

        app.sign_in("sam@example.com", "secret").await.unwrap();
        assert!(app.pipeline().artifact(ArtifactKind::Combined).is_none());
        assert_eq!(
            app.session().current().map(|s| s.email).as_deref(),
            Some("sam@example.com")
        );
    }
}
