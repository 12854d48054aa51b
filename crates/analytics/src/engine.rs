//! Analytics engine
//!
//! Every aggregation reads the store on demand. Nothing is cached, so new
//! ledger entries and progress writes are visible to the next call.

use sqlx::Row;
use tracing::debug;
use tutor_store::{ActivityFilter, LessonFilter, LessonStatus, Store, percentage};

use crate::error::{AnalyticsError, Result};
use crate::report::{
    Dashboard, GlobalAnalytics, GradeCount, PerformanceAnalytics, PopularLesson, Recommendation,
    RecommendationReason, ReviewAnalytics, UserAnalytics,
};

/// Default size of each recommendation sublist
pub const DEFAULT_RECOMMENDATION_LIMIT: i64 = 5;

/// Largest accepted recommendation limit
pub const MAX_RECOMMENDATION_LIMIT: i64 = 50;

/// Analytics engine over a store
#[derive(Clone)]
pub struct AnalyticsEngine {
    store: Store,
}

impl AnalyticsEngine {
    /// Create a new analytics engine
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // =========================================================================
    // Accuracy
    // =========================================================================

    /// Quiz accuracy across every lesson the user has a progress record for
    ///
    /// The denominator counts all questions reachable from those lessons;
    /// the numerator counts distinct ones the user answered correctly.
    /// Zero when there are no such questions.
    pub async fn quiz_accuracy(&self, user_id: &str) -> Result<f64> {
        let row = sqlx::query(
            r#"
            WITH reachable AS (
                SELECT q.id
                FROM questions q
                JOIN contents c ON c.id = q.content_id
                JOIN sections se ON se.id = c.section_id
                JOIN syllabus sy ON sy.id = se.syllabus_id
                JOIN user_lessons ul ON ul.lesson_id = sy.lesson_id
                WHERE ul.user_id = ?1
            )
            SELECT
                (SELECT COUNT(*) FROM reachable) AS total,
                (SELECT COUNT(DISTINCT a.question_id)
                 FROM user_answers a
                 WHERE a.user_id = ?1 AND a.is_correct = 1
                   AND a.question_id IN (SELECT id FROM reachable)) AS correct
            "#,
        )
        .bind(user_id)
        .fetch_one(self.store.pool())
        .await?;

        let total: i64 = row.get("total");
        let correct: i64 = row.get("correct");
        debug!(user_id, total, correct, "quiz accuracy");

        Ok(percentage(correct, total))
    }

    // =========================================================================
    // Summaries
    // =========================================================================

    /// Progress summary for one user
    pub async fn dashboard(&self, user_id: &str) -> Result<Dashboard> {
        let progress = self.store.progress();

        let completed_lessons = progress
            .count_by_status(user_id, LessonStatus::Completed)
            .await?;
        let new_lessons = progress
            .count_by_status(user_id, LessonStatus::NotStarted)
            .await?;
        let total_time_spend = progress.total_time_spent(user_id).await?;
        let review_items_count = self.store.reviews().count(user_id, None).await?;
        let total_lessons = self
            .store
            .catalog()
            .count_lessons(&LessonFilter::default())
            .await?;

        Ok(Dashboard {
            completed_lessons,
            review_items_count,
            overall_progress: percentage(completed_lessons, total_lessons),
            new_lessons,
            total_time_spend,
        })
    }

    /// Lesson with the most ledger entries; ties go to the lowest id
    pub async fn most_popular_lesson(&self) -> Result<Option<PopularLesson>> {
        let Some((lesson_id, activity_count)) = self.store.activity().most_popular_lesson().await?
        else {
            return Ok(None);
        };

        let title = self
            .store
            .catalog()
            .get_lesson(lesson_id)
            .await?
            .map(|lesson| lesson.title)
            .unwrap_or_default();

        Ok(Some(PopularLesson {
            lesson_id,
            title,
            activity_count,
        }))
    }

    /// System-wide counters
    pub async fn global(&self) -> Result<GlobalAnalytics> {
        Ok(GlobalAnalytics {
            most_popular_lesson: self.most_popular_lesson().await?,
            total_users: self.store.users().count().await?,
            total_activities: self.store.activity().count_all().await?,
        })
    }

    /// Total ledger time and the full activity list for a user
    pub async fn user(&self, user_id: &str) -> Result<UserAnalytics> {
        let activity = self.store.activity();
        Ok(UserAnalytics {
            total_time_spent: activity.total_time(user_id).await?,
            activities: activity.list(user_id, &ActivityFilter::default()).await?,
        })
    }

    /// Quiz accuracy, mean activity duration and completions by grade
    pub async fn performance(&self, user_id: &str) -> Result<PerformanceAnalytics> {
        let rows = sqlx::query(
            r#"
            SELECT g.name AS grade, COUNT(ul.id) AS n
            FROM user_lessons ul
            JOIN lessons l ON l.id = ul.lesson_id
            LEFT JOIN grades g ON g.id = l.grade_id
            WHERE ul.user_id = ? AND ul.status = ?
            GROUP BY g.name
            ORDER BY g.name
            "#,
        )
        .bind(user_id)
        .bind(LessonStatus::Completed.as_str())
        .fetch_all(self.store.pool())
        .await?;

        let lessons_by_grade = rows
            .iter()
            .map(|row| GradeCount {
                grade: row.get("grade"),
                count: row.get("n"),
            })
            .collect();

        Ok(PerformanceAnalytics {
            quiz_accuracy: self.quiz_accuracy(user_id).await?,
            average_time_spent: self.store.activity().average_time(user_id).await?,
            lessons_by_grade,
        })
    }

    /// Review queue sizes by type
    pub async fn review(&self, user_id: &str) -> Result<ReviewAnalytics> {
        Ok(self.store.reviews().counts_by_type(user_id).await?.into())
    }

    // =========================================================================
    // Recommendations
    // =========================================================================

    /// Lessons to study next
    ///
    /// Up to `limit` lessons the user has not started, then up to `limit`
    /// lessons the user flagged for review. Each sublist is capped on its
    /// own and keeps storage order.
    pub async fn recommend(&self, user_id: &str, limit: i64) -> Result<Vec<Recommendation>> {
        if !(1..=MAX_RECOMMENDATION_LIMIT).contains(&limit) {
            return Err(AnalyticsError::OutOfRange(format!(
                "limit must be between 1 and {}",
                MAX_RECOMMENDATION_LIMIT
            )));
        }

        let catalog = self.store.catalog();
        let not_started = catalog.list_not_started(user_id, limit).await?;
        let in_review = catalog
            .list_with_status(user_id, LessonStatus::InReview, limit)
            .await?;

        let tagged = |reason: RecommendationReason| {
            move |lesson: tutor_store::Lesson| Recommendation {
                lesson_id: lesson.id,
                title: lesson.title,
                reason,
            }
        };

        let recommendations: Vec<_> = not_started
            .into_iter()
            .map(tagged(RecommendationReason::NotStarted))
            .chain(
                in_review
                    .into_iter()
                    .map(tagged(RecommendationReason::FlaggedForReview)),
            )
            .collect();

        debug!(user_id, count = recommendations.len(), "recommendations");
        Ok(recommendations)
    }
}
