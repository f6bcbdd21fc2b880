// src/core/artifact_store.rs
//! Live binary artifacts, at most one per kind.
//!
//! Every artifact is addressed through an [`ArtifactHandle`]. A handle is registered when the
//! artifact is stored and revoked when the artifact is replaced or released, so a caller holding
//! an old handle can always tell that it no longer points at anything.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Resume,
    CoverLetter,
    Combined,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Resume, Self::CoverLetter, Self::Combined];

    /// Suggested filename for a local save
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Resume => "custom_resume.pdf",
            Self::CoverLetter => "cover_letter.pdf",
            Self::Combined => "resume_with_cover_letter.pdf",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resume => "resume",
            Self::CoverLetter => "cover letter",
            Self::Combined => "combined document",
        };
        f.write_str(name)
    }
}

/// Transient reference to a stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactHandle(Uuid);

impl ArtifactHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifact:{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub handle: ArtifactHandle,
    pub data: Bytes,
    pub file_name: String,
    pub content_type: &'static str,
    pub created_at: DateTime<Utc>,
    /// Backend identifier the artifact can be downloaded again from (cover letters).
    pub source_id: Option<String>,
}

impl Artifact {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Default)]
pub struct ArtifactStore {
    slots: HashMap<ArtifactKind, Artifact>,
    live: HashSet<ArtifactHandle>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new artifact for `kind`, releasing the previous one first.
    pub fn insert(
        &mut self,
        kind: ArtifactKind,
        data: Bytes,
        file_name: impl Into<String>,
        source_id: Option<String>,
    ) -> Artifact {
        self.release(kind);

        let artifact = Artifact {
            kind,
            handle: ArtifactHandle::new(),
            data,
            file_name: file_name.into(),
            content_type: PDF_CONTENT_TYPE,
            created_at: Utc::now(),
            source_id,
        };

        self.live.insert(artifact.handle);
        self.slots.insert(kind, artifact.clone());

        info!(
            "Stored {} artifact {}, size: {}, filename: {}",
            kind,
            artifact.handle,
            artifact.size(),
            artifact.file_name
        );
        artifact
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.slots.get(&kind)
    }

    /// Release the live artifact for `kind`. Returns false when the slot was empty.
    pub fn release(&mut self, kind: ArtifactKind) -> bool {
        match self.slots.remove(&kind) {
            Some(old) => {
                self.live.remove(&old.handle);
                debug!("Released {} artifact {}", kind, old.handle);
                true
            }
            None => false,
        }
    }

    /// Release every live artifact and return how many were released.
    pub fn release_all(&mut self) -> usize {
        ArtifactKind::ALL
            .iter()
            .filter(|kind| self.release(**kind))
            .count()
    }

    pub fn is_live(&self, handle: ArtifactHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Number of handles that have not been revoked yet.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
