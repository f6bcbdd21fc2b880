// src/types/jobs.rs
//! Job listings returned by the match endpoint

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "job_url")]
    pub url: String,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub posted: Option<String>,
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub benefits: Option<Vec<String>>,
}

impl JobListing {
    /// Parse a match response in any of the shapes the backend produces:
    /// a plain array, `{ "jobs": [...] }`, or an object keyed by integer strings.
    pub fn parse_match_response(data: Value) -> Vec<JobListing> {
        match data {
            Value::Array(items) => parse_items(items),
            Value::Object(mut map) => {
                if let Some(Value::Array(items)) = map.remove("jobs") {
                    return parse_items(items);
                }

                let mut numbered: Vec<(u64, Value)> = map
                    .into_iter()
                    .filter_map(|(key, value)| key.parse::<u64>().ok().map(|n| (n, value)))
                    .collect();

                if numbered.is_empty() {
                    warn!("Unexpected job data format, no jobs extracted");
                    return Vec::new();
                }

                numbered.sort_by_key(|(n, _)| *n);
                parse_items(numbered.into_iter().map(|(_, v)| v).collect())
            }
            Value::Null => Vec::new(),
            other => {
                warn!("Unexpected job data format: {}", other);
                Vec::new()
            }
        }
    }
}

fn parse_items(items: Vec<Value>) -> Vec<JobListing> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<JobListing>(item) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!("Skipping malformed job listing: {}", e);
                None
            }
        })
        .collect()
}
