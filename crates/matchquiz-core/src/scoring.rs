//! Weighted scoring.
//!
//! A result is worth up to 10 points: up to 5 for accuracy and up to 5 for
//! speed. Speed decays linearly from 5 at zero elapsed time to 0 at the time
//! limit; time beyond the limit is clamped.

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Maximum points for each of the two components.
pub const COMPONENT_MAX: f64 = 5.0;

/// Raw performance numbers fed to [`calculate_weighted_score`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub correct_answers: u32,
    pub total_questions: u32,
    /// Elapsed seconds.
    pub time_taken: f64,
    /// Allowed seconds.
    pub time_limit: f64,
}

/// Normalized score with its display-rounded components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    /// 0–10, one decimal place.
    pub total_score: f64,
    /// 0–5, one decimal place.
    pub accuracy_score: f64,
    /// 0–5, one decimal place.
    pub time_score: f64,
    /// 0–100, whole percent.
    pub accuracy_percentage: u32,
}

/// Score a finished attempt.
///
/// The total is rounded from the unrounded component sum, so it is not
/// always equal to `accuracy_score + time_score`.
pub fn calculate_weighted_score(input: &ScoreInput) -> Result<ScoreResult, ScoreError> {
    let ScoreInput {
        correct_answers,
        total_questions,
        time_taken,
        time_limit,
    } = *input;

    if total_questions == 0 {
        return Err(ScoreError::InvalidQuestionCount);
    }
    if correct_answers > total_questions {
        return Err(ScoreError::CorrectAnswersOutOfRange {
            correct: correct_answers,
            total: total_questions,
        });
    }
    if time_taken.is_nan() || time_taken < 0.0 {
        return Err(ScoreError::NegativeTime(time_taken));
    }
    if time_limit.is_nan() || time_limit <= 0.0 {
        return Err(ScoreError::InvalidTimeLimit(time_limit));
    }

    let ratio = correct_answers as f64 / total_questions as f64;
    let accuracy = ratio * COMPONENT_MAX;
    let percentage = ratio * 100.0;

    let effective_time = time_taken.min(time_limit);
    let speed = ((time_limit - effective_time) / time_limit * COMPONENT_MAX).max(0.0);

    Ok(ScoreResult {
        total_score: round_tenths(accuracy + speed),
        accuracy_score: round_tenths(accuracy),
        time_score: round_tenths(speed),
        accuracy_percentage: percentage.round() as u32,
    })
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
