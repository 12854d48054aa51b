//! Exam repository

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::info;

use crate::error::{Result, StoreError};
use crate::models::Exam;

/// Exam repository
pub struct ExamRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ExamRepo<'a> {
    /// Create a new exam repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an exam over existing questions, kept in the given order
    pub async fn create(
        &self,
        title: &str,
        created_by: Option<&str>,
        duration: i64,
        questions: &[i64],
    ) -> Result<Exam> {
        if duration < 0 {
            return Err(StoreError::invalid("duration", "must not be negative"));
        }

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query("INSERT INTO exams (title, created_by, duration) VALUES (?, ?, ?)")
            .bind(title)
            .bind(created_by)
            .bind(duration)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for (position, question_id) in questions.iter().enumerate() {
            sqlx::query(
                "INSERT OR IGNORE INTO exam_questions (exam_id, question_id, position) VALUES (?, ?, ?)",
            )
            .bind(id)
            .bind(question_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    StoreError::not_found("question", question_id)
                }
                _ => StoreError::from(e),
            })?;
        }
        tx.commit().await?;

        info!(exam_id = id, title, questions = questions.len(), "exam created");
        self.get(id)
            .await?
            .ok_or_else(|| StoreError::not_found("exam", id))
    }

    /// Get an exam by id
    pub async fn get(&self, id: i64) -> Result<Option<Exam>> {
        let row = sqlx::query("SELECT * FROM exams WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_exam(&row).await?)),
            None => Ok(None),
        }
    }

    /// Every exam, oldest first
    pub async fn list(&self) -> Result<Vec<Exam>> {
        let rows = sqlx::query("SELECT * FROM exams ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        let mut exams = Vec::with_capacity(rows.len());
        for row in &rows {
            exams.push(self.row_to_exam(row).await?);
        }
        Ok(exams)
    }

    async fn row_to_exam(&self, row: &SqliteRow) -> Result<Exam> {
        let id: i64 = row.get("id");
        let questions: Vec<i64> = sqlx::query_scalar(
            "SELECT question_id FROM exam_questions WHERE exam_id = ? ORDER BY position",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Exam {
            id,
            title: row.get("title"),
            created_by: row.get("created_by"),
            duration: row.get("duration"),
            total_questions: questions.len() as i64,
            questions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use crate::models::{Content, ContentType, Lesson, Question, Section, SectionType, Syllabus};

    async fn questions(store: &Store, n: usize) -> Vec<i64> {
        let catalog = store.catalog();
        let lesson = catalog.create_lesson(&Lesson::new("Physics")).await.unwrap();
        let topic = catalog
            .create_syllabus(&Syllabus::new(lesson.id, "Motion", 0))
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
        let mut ids = Vec::with_capacity(n);
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
        ids
    }

    #[tokio::test]
    async fn test_create_and_list_keeps_question_order() {
        let store = Store::new_memory().await.unwrap();
        let ids = questions(&store, 3).await;
        let repo = store.exams();

        let order = vec![ids[2], ids[0], ids[1]];
        let midterm = repo.create("Midterm", None, 45, &order).await.unwrap();
        assert_eq!(midterm.questions, order);
        assert_eq!(midterm.total_questions, 3);

        repo.create("Warm-up", None, 10, &[]).await.unwrap();

        let exams = repo.list().await.unwrap();
        assert_eq!(exams.len(), 2);
        assert_eq!(exams[0].title, "Midterm");
        assert_eq!(exams[0].duration, 45);
        assert_eq!(exams[1].total_questions, 0);
    }

    #[tokio::test]
    async fn test_unknown_question_rolls_back() {
        let store = Store::new_memory().await.unwrap();
        let ids = questions(&store, 1).await;
        let repo = store.exams();

        let err = repo.create("Broken", None, 30, &[ids[0], 999]).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "question", .. }));
        assert!(repo.list().await.unwrap().is_empty());

        let err = repo.create("Negative", None, -1, &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid { field: "duration", .. }));
    }
}
