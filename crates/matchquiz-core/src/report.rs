//! Game result report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::Level;
use crate::scoring::ScoreResult;
use crate::session::{SessionOutcome, SubmitReason};

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, taken from the local part of the email.
    pub name: String,
    pub email: String,
}

/// A finished game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the matching session was submitted.
    pub created_at: DateTime<Utc>,
    pub player: Player,
    pub level: Level,
    pub score: ScoreResult,
    pub time_taken_secs: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub reason: SubmitReason,
}

impl GameReport {
    pub fn new(player: Player, level: Level, outcome: &SessionOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            player,
            level,
            score: outcome.score,
            time_taken_secs: outcome.time_taken,
            correct_answers: outcome.correct_answers,
            total_questions: outcome.total_questions,
            reason: outcome.reason,
        }
    }

    /// At least one prompt was matched.
    pub fn is_success(&self) -> bool {
        self.correct_answers > 0
    }

    /// One-line result for the results screen.
    pub fn summary(&self) -> String {
        format!(
            "{}: {:.1}/10 ({}/{} matched, {}% accuracy) in {}",
            self.player.name,
            self.score.total_score,
            self.correct_answers,
            self.total_questions,
            self.score.accuracy_percentage,
            format_elapsed(self.time_taken_secs)
        )
    }

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
        let report: GameReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

/// `m:ss`, as shown on the results screen.
pub fn format_elapsed(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
