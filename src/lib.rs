pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod types;
pub mod utils;

pub use app::JobAgentApp;
pub use auth::{Session, SessionContext};
pub use config::ClientConfig;
pub use crate::core::{
    Artifact, ArtifactKind, DocumentPipeline, GenerationResult, GenerationStatus, JobAgentBackend,
    Phase, ServiceClient,
};
pub use error::{ClientError, ClientResult, InputError};
