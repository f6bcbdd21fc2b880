// src/types/mod.rs
pub mod jobs;
pub mod request;
pub mod response;
pub mod resume_data;

pub use jobs::JobListing;
pub use request::{CoverLetterDetails, ResumeFile};
pub use resume_data::{AnalysisSummary, ResumeAnalysis};
