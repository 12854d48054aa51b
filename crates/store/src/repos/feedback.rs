//! Lesson feedback repository

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::info;

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, StoreError, insert_conflict};
use crate::models::{Feedback, MAX_RATING, MIN_RATING};

/// Feedback repository
pub struct FeedbackRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FeedbackRepo<'a> {
    /// Create a new feedback repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Submit a rating for a lesson
    ///
    /// Fails with `NotFound` for an unknown lesson, `Invalid` for ratings
    /// outside 1 through 5 and `AlreadyExists` when the user already rated
    /// the lesson. The stored rating is left unchanged in that case.
    pub async fn submit(
        &self,
        user_id: &str,
        lesson_id: i64,
        rating: i64,
        comments: Option<&str>,
    ) -> Result<Feedback> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(StoreError::invalid(
                "rating",
                format!("must be between {} and {}", MIN_RATING, MAX_RATING),
            ));
        }

        let lesson_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM lessons WHERE id = ?)")
                .bind(lesson_id)
                .fetch_one(self.pool)
                .await?;
        if !lesson_exists {
            return Err(StoreError::not_found("lesson", lesson_id));
        }

        let created_at = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO feedback (user_id, lesson_id, rating, comments, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(rating)
        .bind(comments)
        .bind(format_ts(created_at))
        .execute(self.pool)
        .await
        .map_err(|e| insert_conflict(e, "feedback", format!("{}/{}", user_id, lesson_id)))?
        .last_insert_rowid();

        info!(user_id, lesson_id, rating, "feedback submitted");

        Ok(Feedback {
            id,
            user_id: user_id.to_string(),
            lesson_id,
            rating,
            comments: comments.map(String::from),
            created_at,
        })
    }

    /// Get a user's feedback for a lesson
    pub async fn get(&self, user_id: &str, lesson_id: i64) -> Result<Option<Feedback>> {
        let row = sqlx::query("SELECT * FROM feedback WHERE user_id = ? AND lesson_id = ?")
            .bind(user_id)
            .bind(lesson_id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::row_to_feedback).transpose()
    }

    /// All feedback, newest first
    pub async fn list(&self) -> Result<Vec<Feedback>> {
        let rows = sqlx::query("SELECT * FROM feedback ORDER BY created_at DESC, id DESC")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(Self::row_to_feedback).collect()
    }

    fn row_to_feedback(row: &SqliteRow) -> Result<Feedback> {
        let created_at: String = row.get("created_at");
        Ok(Feedback {
            id: row.get("id"),
            user_id: row.get("user_id"),
            lesson_id: row.get("lesson_id"),
            rating: row.get("rating"),
            comments: row.get("comments"),
            created_at: parse_ts(&created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use crate::models::Lesson;

    #[tokio::test]
    async fn test_duplicate_feedback_keeps_first_rating() {
        let store = Store::new_memory().await.unwrap();
        let lesson = store.catalog().create_lesson(&Lesson::new("L")).await.unwrap();
        let repo = store.feedback();

        repo.submit("u1", lesson.id, 4, Some("Clear")).await.unwrap();
        let err = repo.submit("u1", lesson.id, 1, None).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let stored = repo.get("u1", lesson.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, 4);
        assert_eq!(stored.comments.as_deref(), Some("Clear"));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rating_bounds() {
        let store = Store::new_memory().await.unwrap();
        let lesson = store.catalog().create_lesson(&Lesson::new("L")).await.unwrap();
        let repo = store.feedback();

        for bad in [0, 6, -1] {
            let err = repo.submit("u1", lesson.id, bad, None).await.unwrap_err();
            assert!(matches!(err, StoreError::Invalid { field: "rating", .. }));
        }
        assert!(repo.get("u1", lesson.id).await.unwrap().is_none());

        let err = repo.submit("u1", 999, 3, None).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "lesson", .. }));
    }
}
