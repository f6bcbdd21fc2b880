// src/core/mod.rs
//! Workflow state, document generation and the backend they talk to

pub mod artifact_store;
pub mod backend;
pub mod pdf_payload;
pub mod phase;
pub mod pipeline;
pub mod resume_service;
pub mod service_client;
pub mod visibility;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use artifact_store::{Artifact, ArtifactHandle, ArtifactKind, ArtifactStore};
pub use backend::JobAgentBackend;
pub use phase::{Phase, PhaseOrchestrator, PhaseStatus};
pub use pipeline::{CoverLetterDraft, DocumentPipeline, GenerationResult, GenerationStatus};
pub use resume_service::ResumeDataService;
pub use service_client::ServiceClient;
pub use visibility::{visible, VisibilityPolicy, VisibleJobs};
pub use workflow::ApplicationWorkflow;
