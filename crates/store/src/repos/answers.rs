//! Quiz answer repository
//!
//! Answers are append-only. Correctness and attempt number are fixed at
//! submission.

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, StoreError};
use crate::models::{AnswerStats, Question, UserAnswer};

/// Answer repository
pub struct AnswerRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AnswerRepo<'a> {
    /// Create a new answer repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an answer to a question, grading it against the question
    pub async fn submit(
        &self,
        user_id: &str,
        question: &Question,
        selected_option: &str,
        time_taken: f64,
    ) -> Result<UserAnswer> {
        let is_correct = question.is_correct(selected_option);
        self.insert(user_id, question.id, selected_option, is_correct, time_taken)
            .await
    }

    /// Record an already graded answer
    pub async fn insert(
        &self,
        user_id: &str,
        question_id: i64,
        selected_option: &str,
        is_correct: bool,
        time_taken: f64,
    ) -> Result<UserAnswer> {
        if time_taken < 0.0 {
            return Err(StoreError::invalid("time_taken", "must not be negative"));
        }

        let answered_at = Utc::now();
        // Attempt number is derived in the same statement as the insert
        let row = sqlx::query(
            r#"
            INSERT INTO user_answers (user_id, question_id, selected_option, is_correct, time_taken, attempt_number, answered_at)
            SELECT ?1, ?2, ?3, ?4, ?5, COUNT(*) + 1, ?6
            FROM user_answers WHERE user_id = ?1 AND question_id = ?2
            RETURNING id, attempt_number
            "#,
        )
        .bind(user_id)
        .bind(question_id)
        .bind(selected_option)
        .bind(is_correct)
        .bind(time_taken)
        .bind(format_ts(answered_at))
        .fetch_one(self.pool)
        .await?;

        Ok(UserAnswer {
            id: row.get("id"),
            user_id: user_id.to_string(),
            question_id,
            selected_option: selected_option.to_string(),
            is_correct,
            time_taken,
            attempt_number: row.get("attempt_number"),
            answered_at,
        })
    }

    /// A user's answers, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<UserAnswer>> {
        let rows = sqlx::query(
            "SELECT * FROM user_answers WHERE user_id = ? ORDER BY answered_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_answer).collect()
    }

    /// Whether `answer` is the user's earliest correct answer to its question
    ///
    /// Compares against rows inserted before it, so of two concurrent correct
    /// submissions exactly one is first.
    pub async fn is_first_correct(&self, answer: &UserAnswer) -> Result<bool> {
        if !answer.is_correct {
            return Ok(false);
        }
        let earlier: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM user_answers
            WHERE user_id = ? AND question_id = ? AND is_correct = 1 AND id < ?
            "#,
        )
        .bind(&answer.user_id)
        .bind(answer.question_id)
        .bind(answer.id)
        .fetch_one(self.pool)
        .await?;
        Ok(earlier == 0)
    }

    /// Answer totals for a user; zeroes when none
    pub async fn stats(&self, user_id: &str) -> Result<AnswerStats> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(is_correct), 0) AS correct,
                   COALESCE(AVG(time_taken), 0.0) AS avg_time
            FROM user_answers WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(AnswerStats {
            total_answers: row.get("total"),
            correct_answers: row.get("correct"),
            average_time: row.get("avg_time"),
        })
    }

    fn row_to_answer(row: &SqliteRow) -> Result<UserAnswer> {
        let answered_at: String = row.get("answered_at");
        Ok(UserAnswer {
            id: row.get("id"),
            user_id: row.get("user_id"),
            question_id: row.get("question_id"),
            selected_option: row.get("selected_option"),
            is_correct: row.get("is_correct"),
            time_taken: row.get("time_taken"),
            attempt_number: row.get("attempt_number"),
            answered_at: parse_ts(&answered_at)?,
        })
    }
}
