// src/types/resume_data.rs
//! Résumé analysis returned by the upload and resume-data endpoints

use serde::{Deserialize, Serialize};

// ===== Resume Analysis Structure =====

/// Structured extraction of an uploaded résumé.
///
/// Unknown fields are kept in `extra` at every level so the analysis can be sent back to
/// the job-match endpoint unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_information: Option<PersonalInformation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_experience: Option<Vec<WorkExperience>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Skills>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInformation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_website: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibilities_achievements: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree_earned: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technologies_used: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ===== Display Summary =====

const NO_SUMMARY: &str = "No professional summary available";
const NO_EDUCATION: &str = "No education information available";

/// The three lines shown on the analysis screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
}

impl ResumeAnalysis {
    /// An analysis with no recognised content counts as "no analysis".
    pub fn is_empty(&self) -> bool {
        self.personal_information.is_none()
            && self.professional_summary.is_none()
            && self.work_experience.is_none()
            && self.education.is_none()
            && self.skills.is_none()
            && self.projects.is_none()
            && self.extra.is_empty()
    }

    pub fn technical_skills(&self) -> &[String] {
        self.skills
            .as_ref()
            .and_then(|s| s.technical_skills.as_deref())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> AnalysisSummary {
        let experience = self
            .professional_summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(NO_SUMMARY)
            .to_string();

        let education = self
            .education
            .as_ref()
            .and_then(|entries| entries.first())
            .and_then(Education::headline)
            .unwrap_or_else(|| NO_EDUCATION.to_string());

        AnalysisSummary {
            skills: self.technical_skills().to_vec(),
            experience,
            education,
        }
    }
}

impl Education {
    /// "degree - institution, year", falling back to whichever part is present
    fn headline(&self) -> Option<String> {
        let degree = self.degree_earned.as_deref().filter(|s| !s.is_empty());
        let institution = self.institution_name.as_deref().filter(|s| !s.is_empty());
        let year = self
            .graduation_year
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|y| format!(", {}", y))
            .unwrap_or_default();

        match (degree, institution) {
            (Some(d), Some(i)) => Some(format!("{} - {}{}", d, i, year)),
            (Some(d), None) => Some(format!("{}{}", d, year)),
            (None, Some(i)) => Some(format!("{}{}", i, year)),
            (None, None) => None,
        }
    }
}
