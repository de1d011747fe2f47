use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::challenge::{Challenge, Completion};

/// A challenge together with its completion log, as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeDocument {
    pub challenge: Challenge,

    #[serde(default)]
    pub completions: Vec<Completion>,
}

impl ChallengeDocument {
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let doc = Self::parse(&text)
            .with_context(|| format!("invalid challenge document {}", path.display()))?;

        info!(
            frequency = %doc.challenge.frequency,
            start = %doc.challenge.start_date,
            duration = doc.challenge.duration,
            completions = doc.completions.len(),
            "loaded challenge document"
        );
        Ok(doc)
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("failed to parse challenge json")
    }

    pub fn display_name(&self) -> &str {
        self.challenge.name.as_deref().unwrap_or("challenge")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::Frequency;

    #[test]
    fn parses_document_without_completions() {
        let doc = ChallengeDocument::parse(
            r#"{"challenge": {"start_date": "2026-10-01", "duration": 7, "frequency": "daily"}}"#,
        )
        .expect("parse document");
        assert_eq!(doc.challenge.frequency, Frequency::Daily);
        assert!(doc.completions.is_empty());
        assert_eq!(doc.display_name(), "challenge");
    }

    #[test]
    fn parses_stored_document_with_null_counts() {
        let doc = ChallengeDocument::parse(
            r#"{
  "challenge": {
    "name": "Read",
    "start_date": "2026-10-01",
    "duration": 30,
    "frequency": "per-week",
    "per_week": 3,
    "per_month": null,
    "specific_days": []
  },
  "completions": [ { "date": "2026-10-01" }, { "date": "2026-10-02" } ]
}"#,
        )
        .expect("parse document");
        assert_eq!(doc.display_name(), "Read");
        assert_eq!(doc.challenge.frequency, Frequency::PerWeek);
        assert_eq!(doc.challenge.per_week, 3);
        assert_eq!(doc.challenge.per_month, 1);
        assert_eq!(doc.completions.len(), 2);
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = ChallengeDocument::parse(
            r#"{"challenge": {"start_date": "10/01/2026", "duration": 7, "frequency": "daily"}}"#,
        );
        assert!(err.is_err());
    }
}
