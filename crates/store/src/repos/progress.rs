//! Progress repository
//!
//! One mutable record per (user, lesson). Creation is race tolerant: a
//! concurrent insert that loses on the unique index reads the winner's row.

use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::debug;

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, StoreError, is_unique_violation};
use crate::models::{LessonStatus, UserLesson};

/// Progress repository
pub struct ProgressRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProgressRepo<'a> {
    /// Create a new progress repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get the record for a (user, lesson) pair
    pub async fn get(&self, user_id: &str, lesson_id: i64) -> Result<Option<UserLesson>> {
        let row = sqlx::query("SELECT * FROM user_lessons WHERE user_id = ? AND lesson_id = ?")
            .bind(user_id)
            .bind(lesson_id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    /// A user's records with the given status, by lesson id
    pub async fn list_by_status(
        &self,
        user_id: &str,
        status: LessonStatus,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserLesson>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM user_lessons
            WHERE user_id = ? AND status = ?
            ORDER BY lesson_id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(status.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(Self::row_to_record).collect()
    }

    /// Number of a user's records with the given status
    pub async fn count_by_status(&self, user_id: &str, status: LessonStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_lessons WHERE user_id = ? AND status = ?",
        )
        .bind(user_id)
        .bind(status.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Sum of `time_spent` over a user's records; unknown counts as zero
    pub async fn total_time_spent(&self, user_id: &str) -> Result<f64> {
        let total: Option<f64> = sqlx::query_scalar(
            "SELECT SUM(COALESCE(time_spent, 0.0)) FROM user_lessons WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(total.unwrap_or(0.0))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create a record with an explicit status
    ///
    /// Fails with `AlreadyExists` when the pair already has a record.
    pub async fn create(
        &self,
        user_id: &str,
        lesson_id: i64,
        status: LessonStatus,
    ) -> Result<UserLesson> {
        let mut record = self.insert(user_id, lesson_id).await.map_err(|e| match e {
            StoreError::Database(ref db) if is_unique_violation(db) => {
                StoreError::already_exists("progress", format!("{}/{}", user_id, lesson_id))
            }
            other => other,
        })?;

        record.apply_status(status);
        self.save(&record).await?;
        Ok(record)
    }

    /// Fetch the record for a pair, creating a not-started one if missing
    pub async fn get_or_create(&self, user_id: &str, lesson_id: i64) -> Result<UserLesson> {
        match self.insert(user_id, lesson_id).await {
            Ok(record) => Ok(record),
            Err(StoreError::Database(ref e)) if is_unique_violation(e) => self
                .get(user_id, lesson_id)
                .await?
                .ok_or_else(|| StoreError::not_found("progress", lesson_id)),
            Err(e) => Err(e),
        }
    }

    /// Set the status of an existing record
    ///
    /// Completed implies 100% progress and in-progress implies 50%.
    pub async fn set_status(
        &self,
        user_id: &str,
        lesson_id: i64,
        status: LessonStatus,
    ) -> Result<UserLesson> {
        let mut record = self
            .get(user_id, lesson_id)
            .await?
            .ok_or_else(|| StoreError::not_found("progress", lesson_id))?;

        record.apply_status(status);
        self.save(&record).await?;
        Ok(record)
    }

    /// Mark a record completed with full progress and persist it
    pub async fn mark_completed(&self, record: &mut UserLesson) -> Result<()> {
        record.complete();
        self.save(record).await
    }

    /// Move a record to in-progress unless it is completed
    ///
    /// Persists only when the status changed.
    pub async fn mark_in_progress(&self, record: &mut UserLesson) -> Result<()> {
        if record.start() {
            self.save(record).await?;
        }
        Ok(())
    }

    /// Persist every mutable field of a record
    pub async fn save(&self, record: &UserLesson) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE user_lessons
            SET status = ?, progress_percentage = ?, accuracy_percentage = ?,
                time_spent = ?, points_earned = ?, last_accessed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(record.status.as_str())
        .bind(record.progress_percentage)
        .bind(record.accuracy_percentage)
        .bind(record.time_spent)
        .bind(record.points_earned)
        .bind(record.last_accessed_at.map(format_ts))
        .bind(record.id)
        .execute(self.pool)
        .await?;

        debug!(
            user_id = %record.user_id,
            lesson_id = record.lesson_id,
            status = record.status.as_str(),
            "progress saved"
        );
        Ok(())
    }

    /// Add points to an existing record; no-op when the pair has none
    pub async fn add_points(&self, user_id: &str, lesson_id: i64, points: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE user_lessons SET points_earned = points_earned + ? WHERE user_id = ? AND lesson_id = ?",
        )
        .bind(points)
        .bind(user_id)
        .bind(lesson_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Accuracy
    // =========================================================================

    /// Quiz accuracy of a user on one lesson, 0 through 100
    ///
    /// The denominator is every question under the lesson's quiz contents;
    /// the numerator counts distinct questions the user answered correctly
    /// at least once. Zero when the lesson has no such questions.
    pub async fn compute_accuracy(&self, user_id: &str, lesson_id: i64) -> Result<f64> {
        let row = sqlx::query(
            r#"
            WITH lesson_questions AS (
                SELECT q.id
                FROM questions q
                JOIN contents c ON c.id = q.content_id
                JOIN sections se ON se.id = c.section_id
                JOIN syllabus sy ON sy.id = se.syllabus_id
                WHERE sy.lesson_id = ?1 AND c.content_type = 'quiz'
            )
            SELECT
                (SELECT COUNT(*) FROM lesson_questions) AS total,
                (SELECT COUNT(DISTINCT a.question_id)
                 FROM user_answers a
                 WHERE a.user_id = ?2 AND a.is_correct = 1
                   AND a.question_id IN (SELECT id FROM lesson_questions)) AS correct
            "#,
        )
        .bind(lesson_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        let total: i64 = row.get("total");
        let correct: i64 = row.get("correct");

        Ok(percentage(correct, total))
    }

    /// Recompute accuracy and store it on the existing record
    ///
    /// Returns the stored value, or None when the pair has no record.
    pub async fn persist_accuracy(&self, user_id: &str, lesson_id: i64) -> Result<Option<f64>> {
        let accuracy = self.compute_accuracy(user_id, lesson_id).await?;

        let result = sqlx::query(
            "UPDATE user_lessons SET accuracy_percentage = ? WHERE user_id = ? AND lesson_id = ?",
        )
        .bind(accuracy)
        .bind(user_id)
        .bind(lesson_id)
        .execute(self.pool)
        .await?;

        Ok((result.rows_affected() > 0).then_some(accuracy))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn insert(&self, user_id: &str, lesson_id: i64) -> Result<UserLesson> {
        let now = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO user_lessons (user_id, lesson_id, status, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(LessonStatus::NotStarted.as_str())
        .bind(format_ts(now))
        .execute(self.pool)
        .await?
        .last_insert_rowid();

        Ok(UserLesson {
            id,
            user_id: user_id.to_string(),
            lesson_id,
            status: LessonStatus::NotStarted,
            progress_percentage: 0.0,
            accuracy_percentage: 0.0,
            time_spent: None,
            points_earned: 0,
            last_accessed_at: None,
            created_at: now,
        })
    }

    fn row_to_record(row: &SqliteRow) -> Result<UserLesson> {
        let status: String = row.get("status");
        let last_accessed: Option<String> = row.get("last_accessed_at");
        let created_at: String = row.get("created_at");
        Ok(UserLesson {
            id: row.get("id"),
            user_id: row.get("user_id"),
            lesson_id: row.get("lesson_id"),
            status: LessonStatus::from_str(&status).ok_or_else(|| {
                StoreError::invalid("status", format!("unknown status: {}", status))
            })?,
            progress_percentage: row.get("progress_percentage"),
            accuracy_percentage: row.get("accuracy_percentage"),
            time_spent: row.get("time_spent"),
            points_earned: row.get("points_earned"),
            last_accessed_at: last_accessed.as_deref().map(parse_ts).transpose()?,
            created_at: parse_ts(&created_at)?,
        })
    }
}

/// `part / whole * 100`, or zero when `whole` is zero
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use crate::models::{Content, ContentType, Lesson, Question, Section, SectionType, Syllabus};

    /// Lesson with one quiz content holding `n` questions; returns
    /// (lesson id, question ids)
    async fn lesson_with_questions(store: &Store, n: usize) -> (i64, Vec<i64>) {
        let catalog = store.catalog();
        let lesson = catalog.create_lesson(&Lesson::new("Quiz lesson")).await.unwrap();
        let topic = catalog
            .create_syllabus(&Syllabus::new(lesson.id, "Topic", 0))
            .await
            .unwrap();
        let section = catalog
            .create_section(&Section::new(topic.id, "Quiz", SectionType::Quiz, 0))
            .await
            .unwrap();
        let content = catalog
            .create_content(&Content::new(section.id, "Quiz", ContentType::Quiz))
            .await
            .unwrap();

        let mut ids = Vec::new();
        for i in 0..n {
            let q = catalog
                .create_question(&Question::new(
                    content.id,
                    format!("Q{}", i),
                    vec!["a".into(), "b".into()],
                    "a",
                ))
                .await
                .unwrap();
            ids.push(q.id);
        }
        (lesson.id, ids)
    }

    #[tokio::test]
    async fn test_accuracy_zero_without_questions() {
        let store = Store::new_memory().await.unwrap();
        let (lesson_id, _) = lesson_with_questions(&store, 0).await;

        let accuracy = store.progress().compute_accuracy("u1", lesson_id).await.unwrap();
        assert_eq!(accuracy, 0.0);
    }

    #[tokio::test]
    async fn test_accuracy_seven_of_ten() {
        let store = Store::new_memory().await.unwrap();
        let (lesson_id, questions) = lesson_with_questions(&store, 10).await;
        let answers = store.answers();

        for (i, &q) in questions.iter().enumerate() {
            let selected = if i < 7 { "a" } else { "b" };
            answers.insert("u1", q, selected, i < 7, 5.0).await.unwrap();
        }
        // A repeated correct answer is not double counted
        answers.insert("u1", questions[0], "a", true, 1.0).await.unwrap();

        let accuracy = store.progress().compute_accuracy("u1", lesson_id).await.unwrap();
        assert_eq!(accuracy, 70.0);

        // Other users' answers do not leak
        assert_eq!(
            store.progress().compute_accuracy("u2", lesson_id).await.unwrap(),
            0.0
        );
    }

    #[tokio::test]
    async fn test_non_quiz_content_questions_ignored() {
        let store = Store::new_memory().await.unwrap();
        let (lesson_id, _) = lesson_with_questions(&store, 2).await;
        let catalog = store.catalog();

        let topic = catalog
            .create_syllabus(&Syllabus::new(lesson_id, "Reading", 1))
            .await
            .unwrap();
        let section = catalog
            .create_section(&Section::new(topic.id, "Read", SectionType::Learning, 0))
            .await
            .unwrap();
        let text = catalog
            .create_content(&Content::new(section.id, "Notes", ContentType::Text))
            .await
            .unwrap();
        let stray = catalog
            .create_question(&Question::new(text.id, "Stray", vec!["a".into()], "a"))
            .await
            .unwrap();
        store.answers().insert("u1", stray.id, "a", true, 1.0).await.unwrap();

        assert_eq!(
            store.progress().compute_accuracy("u1", lesson_id).await.unwrap(),
            0.0
        );
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing() {
        let store = Store::new_memory().await.unwrap();
        let lesson = store.catalog().create_lesson(&Lesson::new("L")).await.unwrap();
        let repo = store.progress();

        let first = repo.get_or_create("u1", lesson.id).await.unwrap();
        assert_eq!(first.status, LessonStatus::NotStarted);

        let second = repo.get_or_create("u1", lesson.id).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_create_then_conflict() {
        let store = Store::new_memory().await.unwrap();
        let lesson = store.catalog().create_lesson(&Lesson::new("L")).await.unwrap();
        let repo = store.progress();

        let record = repo
            .create("u1", lesson.id, LessonStatus::Completed)
            .await
            .unwrap();
        assert_eq!(record.progress_percentage, 100.0);

        let err = repo
            .create("u1", lesson.id, LessonStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_set_status_missing_is_not_found() {
        let store = Store::new_memory().await.unwrap();
        let err = store
            .progress()
            .set_status("u1", 42, LessonStatus::InReview)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mark_helpers_persist() {
        let store = Store::new_memory().await.unwrap();
        let lesson = store.catalog().create_lesson(&Lesson::new("L")).await.unwrap();
        let repo = store.progress();

        let mut record = repo.get_or_create("u1", lesson.id).await.unwrap();
        repo.mark_in_progress(&mut record).await.unwrap();
        let stored = repo.get("u1", lesson.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LessonStatus::InProgress);

        repo.mark_completed(&mut record).await.unwrap();
        repo.mark_in_progress(&mut record).await.unwrap();
        let stored = repo.get("u1", lesson.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LessonStatus::Completed);
        assert_eq!(stored.progress_percentage, 100.0);
        assert_eq!(
            repo.count_by_status("u1", LessonStatus::Completed).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_persist_accuracy_requires_record() {
        let store = Store::new_memory().await.unwrap();
        let (lesson_id, questions) = lesson_with_questions(&store, 4).await;
        store.answers().insert("u1", questions[0], "a", true, 1.0).await.unwrap();
        let repo = store.progress();

        assert_eq!(repo.persist_accuracy("u1", lesson_id).await.unwrap(), None);

        repo.get_or_create("u1", lesson_id).await.unwrap();
        assert_eq!(repo.persist_accuracy("u1", lesson_id).await.unwrap(), Some(25.0));
        let stored = repo.get("u1", lesson_id).await.unwrap().unwrap();
        assert_eq!(stored.accuracy_percentage, 25.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 3), 100.0);
    }
}
