//! Exam and quiz answer models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One submitted answer; never updated after insert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAnswer {
    pub id: i64,
    pub user_id: String,
    pub question_id: i64,
    pub selected_option: String,
    pub is_correct: bool,
    /// Seconds spent answering
    pub time_taken: f64,
    /// 1 for the first attempt at a question
    pub attempt_number: i64,
    pub answered_at: DateTime<Utc>,
}

/// Answer totals for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerStats {
    pub total_answers: i64,
    pub correct_answers: i64,
    pub average_time: f64,
}

/// A timed set of questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub title: String,
    /// Author's user id, if any
    pub created_by: Option<String>,
    /// Time allowed, minutes
    pub duration: i64,
    /// Question ids in exam order
    pub questions: Vec<i64>,
    pub total_questions: i64,
}
