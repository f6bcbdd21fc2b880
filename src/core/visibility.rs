// src/core/visibility.rs
//! Free-tier cap on how many job listings are shown.

use crate::config::FREE_JOB_LIMIT;
use crate::types::JobListing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityPolicy {
    pub is_premium: bool,
    pub free_limit: usize,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self::free()
    }
}

impl VisibilityPolicy {
    pub fn free() -> Self {
        Self {
            is_premium: false,
            free_limit: FREE_JOB_LIMIT,
        }
    }

    pub fn premium() -> Self {
        Self {
            is_premium: true,
            free_limit: FREE_JOB_LIMIT,
        }
    }

    pub fn with_free_limit(mut self, limit: usize) -> Self {
        self.free_limit = limit;
        self
    }
}

/// The shown prefix of a listing sequence plus how many were held back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleJobs<'a> {
    pub shown: &'a [JobListing],
    pub hidden_count: usize,
}

impl VisibleJobs<'_> {
    pub fn upsell_message(&self) -> Option<String> {
        match self.hidden_count {
            0 => None,
            1 => Some("1 more job available with Premium".to_string()),
            n => Some(format!("{} more jobs available with Premium", n)),
        }
    }
}

/// Listings are borrowed, never reordered or modified.
pub fn visible<'a>(listings: &'a [JobListing], policy: &VisibilityPolicy) -> VisibleJobs<'a> {
    if policy.is_premium {
        return VisibleJobs {
            shown: listings,
            hidden_count: 0,
        };
    }

    let shown = &listings[..listings.len().min(policy.free_limit)];
    VisibleJobs {
        shown,
        hidden_count: listings.len().saturating_sub(policy.free_limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings(n: usize) -> Vec<JobListing> {
        (0..n)
            .map(|i| JobListing {
                title: format!("Job {}", i),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_empty() {
        let result = visible(&[], &VisibilityPolicy::free());
        assert!(result.shown.is_empty());
        assert_eq!(result.hidden_count, 0);
        assert_eq!(result.upsell_message(), None);
    }

    #[test]
    fn test_free_tier_truncates_in_order() {
        let jobs = listings(12);
        let before = jobs.clone();
        let result = visible(&jobs, &VisibilityPolicy::free());

        assert_eq!(result.shown.len(), 5);
        assert_eq!(result.hidden_count, 7);
        assert_eq!(result.shown, &before[..5]);
        assert_eq!(jobs, before);
        assert_eq!(
            result.upsell_message().as_deref(),
            Some("7 more jobs available with Premium")
        );
    }

    #[test]
    fn test_premium_shows_everything() {
        let jobs = listings(12);
        let result = visible(&jobs, &VisibilityPolicy::premium());
        assert_eq!(result.shown.len(), 12);
        assert_eq!(result.hidden_count, 0);
    }

    #[test]
    fn test_fewer_than_limit() {
        let jobs = listings(3);
        let result = visible(&jobs, &VisibilityPolicy::free());
        assert_eq!(result.shown.len(), 3);
        assert_eq!(result.hidden_count, 0);
    }

    #[test]
    fn test_custom_limit() {
        let jobs = listings(8);
        let result = visible(&jobs, &VisibilityPolicy::free().with_free_limit(7));
        assert_eq!(result.shown.len(), 7);
        assert_eq!(result.hidden_count, 1);
        assert_eq!(
            result.upsell_message().as_deref(),
            Some("1 more job available with Premium")
        );

        let result = visible(&jobs, &VisibilityPolicy::free().with_free_limit(0));
        assert!(result.shown.is_empty());
        assert_eq!(result.hidden_count, 8);
    }
}
