// src/core/phase.rs
//! Upload → Analyze → Find-Jobs sequencing.
//!
//! The orchestrator is a pure state machine and knows nothing about sessions; the
//! authentication gate is enforced by [`crate::core::workflow::ApplicationWorkflow`].

use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Phase {
    #[default]
    Upload,
    Analyze,
    FindJobs,
}

impl Phase {
    pub const ORDER: [Phase; 3] = [Phase::Upload, Phase::Analyze, Phase::FindJobs];

    pub fn index(self) -> usize {
        match self {
            Phase::Upload => 0,
            Phase::Analyze => 1,
            Phase::FindJobs => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Phase::Upload => "Upload Resume",
            Phase::Analyze => "Analyze Resume",
            Phase::FindJobs => "Find Jobs",
        }
    }

    pub fn following(self) -> Option<Phase> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn preceding(self) -> Option<Phase> {
        self.index().checked_sub(1).map(|i| Self::ORDER[i])
    }

    /// Where this phase sits relative to `current` in a progress indicator
    pub fn status_against(self, current: Phase) -> PhaseStatus {
        use std::cmp::Ordering;
        match self.index().cmp(&current.index()) {
            Ordering::Less => PhaseStatus::Completed,
            Ordering::Equal => PhaseStatus::Current,
            Ordering::Greater => PhaseStatus::Upcoming,
        }
    }

    /// Phases that may only be shown to an authenticated user
    pub fn requires_session(self) -> bool {
        self != Phase::Upload
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            Phase::Upload => "upload",
            Phase::Analyze => "analyze",
            Phase::FindJobs => "findJobs",
        };
        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    Completed,
    Current,
    Upcoming,
}

#[derive(Debug, Default)]
pub struct PhaseOrchestrator {
    current: Phase,
}

impl PhaseOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_phase(&self) -> Phase {
        self.current
    }

    pub fn go_to(&mut self, phase: Phase) {
        if self.current != phase {
            debug!("Phase transition: {} -> {}", self.current, phase);
        }
        self.current = phase;
    }

    /// Advance one phase; no-op at FindJobs.
    pub fn next(&mut self) {
        if let Some(phase) = self.current.following() {
            self.go_to(phase);
        }
    }

    /// Step back one phase; no-op at Upload.
    pub fn back(&mut self) {
        if let Some(phase) = self.current.preceding() {
            self.go_to(phase);
        }
    }

    pub fn status_of(&self, phase: Phase) -> PhaseStatus {
        phase.status_against(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(phase: Phase) -> PhaseOrchestrator {
        let mut orchestrator = PhaseOrchestrator::new();
        orchestrator.go_to(phase);
        orchestrator
    }

    #[test]
    fn test_initial_phase_is_upload() {
        assert_eq!(PhaseOrchestrator::new().current_phase(), Phase::Upload);
    }

    #[test]
    fn test_next_walks_the_order_and_stops() {
        let mut orchestrator = PhaseOrchestrator::new();
        orchestrator.next();
        assert_eq!(orchestrator.current_phase(), Phase::Analyze);
        orchestrator.next();
        assert_eq!(orchestrator.current_phase(), Phase::FindJobs);
        orchestrator.next();
        assert_eq!(orchestrator.current_phase(), Phase::FindJobs);
    }

    #[test]
    fn test_back() {
        let mut orchestrator = at(Phase::FindJobs);
        orchestrator.back();
        assert_eq!(orchestrator.current_phase(), Phase::Analyze);
        orchestrator.back();
        assert_eq!(orchestrator.current_phase(), Phase::Upload);
        orchestrator.back();
        assert_eq!(orchestrator.current_phase(), Phase::Upload);
    }

    #[test]
    fn test_terminal_and_initial_no_ops_for_every_start() {
        for phase in Phase::ORDER {
            let mut orchestrator = at(phase);
            orchestrator.next();
            orchestrator.next();
            orchestrator.next();
            assert_eq!(orchestrator.current_phase(), Phase::FindJobs);

            let mut orchestrator = at(phase);
            orchestrator.back();
            orchestrator.back();
            orchestrator.back();
            assert_eq!(orchestrator.current_phase(), Phase::Upload);
        }
    }

    #[test]
    fn test_status_of() {
        let orchestrator = at(Phase::Analyze);
        assert_eq!(orchestrator.status_of(Phase::Upload), PhaseStatus::Completed);
        assert_eq!(orchestrator.status_of(Phase::Analyze), PhaseStatus::Current);
        assert_eq!(orchestrator.status_of(Phase::FindJobs), PhaseStatus::Upcoming);
    }

    #[test]
    fn test_phase_metadata() {
        assert_eq!(Phase::FindJobs.title(), "Find Jobs");
        assert_eq!(Phase::FindJobs.to_string(), "findJobs");
        assert_eq!(Phase::Upload.preceding(), None);
        assert_eq!(Phase::FindJobs.following(), None);
        assert!(!Phase::Upload.requires_session());
        assert!(Phase::Analyze.requires_session());
    }
}
