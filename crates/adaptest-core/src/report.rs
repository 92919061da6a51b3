//! Session report with JSON persistence.
//!
//! A report is a finished record for reading and rendering. It is never
//! loaded back into a running session.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Question, SessionConfig};
use crate::session::Termination;
use crate::statistics::{ReviewFilter, SessionSummary};

/// A complete session report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique session identifier.
    pub id: Uuid,
    /// When the session started.
    pub created_at: DateTime<Utc>,
    /// How the session ended; `None` if it was still running.
    pub termination: Option<Termination>,
    /// Wall-clock duration in seconds.
    pub elapsed_secs: u64,
    pub config: SessionConfig,
    pub summary: SessionSummary,
    /// Every question asked, in order.
    pub items: Vec<ReportItem>,
}

/// One asked question with the learner's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportItem {
    /// 1-based position in the session.
    pub number: usize,
    pub question: Question,
    /// Selected option; `None` for a question left unanswered.
    pub selected: Option<usize>,
    pub correct: Option<bool>,
    #[serde(default)]
    pub flagged: bool,
}

impl SessionReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Answered items matching `filter`.
    pub fn review(&self, filter: ReviewFilter) -> impl Iterator<Item = &ReportItem> {
        self.items
            .iter()
            .filter(move |item| item.correct.is_some_and(|c| filter.admits(c)))
    }

    /// Default file name for this report, e.g. `session-20261019-142501.json`.
    pub fn file_stem(&self) -> String {
        format!("session-{}", self.created_at.format("%Y%m%d-%H%M%S"))
    }
}
