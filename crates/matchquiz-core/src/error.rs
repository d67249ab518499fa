//! Domain error types.
//!
//! Each failure the engine, scorer, or game flow can report has its own
//! variant so callers can branch on the kind without string matching.

use thiserror::Error;

use crate::flow::Screen;

/// Rejected inputs to the weighted scorer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoreError {
    /// `total_questions` was zero.
    #[error("invalid question count: total questions must be greater than 0")]
    InvalidQuestionCount,

    /// `correct_answers` exceeded `total_questions`.
    #[error("correct-answer count out of range: {correct} of {total}")]
    CorrectAnswersOutOfRange { correct: u32, total: u32 },

    /// `time_taken` was negative or not a number.
    #[error("negative time: time taken was {0}s")]
    NegativeTime(f64),

    /// `time_limit` was zero, negative, or not a number.
    #[error("invalid time limit: {0}s")]
    InvalidTimeLimit(f64),
}

/// Errors raised when a matching session cannot be set up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The prompt set was empty.
    #[error("a matching session needs at least one prompt")]
    NoPrompts,

    /// Prompts and answers are paired by index, so their lengths must agree.
    #[error("prompt/answer length mismatch: {prompts} prompts, {answers} answers")]
    LengthMismatch { prompts: usize, answers: usize },

    /// The configured time limit was zero.
    #[error("matching time limit must be at least one second")]
    ZeroTimeLimit,
}

/// Registration form rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("email address is required")]
    EmailRequired,

    #[error("please enter a valid email address: {0}")]
    InvalidEmail(String),
}

/// Errors from the screen router.
#[derive(Debug, Error)]
pub enum FlowError {
    /// An action arrived for a screen that is not the current one.
    #[error("expected the {expected} screen, but the game is on {actual}")]
    UnexpectedScreen { expected: Screen, actual: Screen },

    /// The selected level is missing from the content bank.
    #[error("content bank has no questions for level {0}")]
    MissingLevel(String),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Score(#[from] ScoreError),
}

impl ScoreError {
    /// Returns `true` if the error came from the count arguments rather
    /// than the timing arguments.
    pub fn is_count_error(&self) -> bool {
        matches!(
            self,
            ScoreError::InvalidQuestionCount | ScoreError::CorrectAnswersOutOfRange { .. }
        )
    }
}
