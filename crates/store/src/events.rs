//! Progress events and answer submission
//!
//! These operations span several repositories: a progress event updates the
//! tracker and appends to the activity ledger; an answer submission grades
//! the answer, appends a quiz attempt, awards points and refreshes the
//! lesson's stored accuracy.

use tracing::info;

use crate::Store;
use crate::error::{Result, StoreError};
use crate::models::{ActivityKind, LessonStatus, NewActivity, ProgressType, UserAnswer, UserLesson};

/// Whether a lesson-level progress event creates or updates the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressWrite {
    Create,
    Update,
}

/// A user's progress on a lesson, syllabus topic or content item
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    pub progress_type: ProgressType,
    pub item_id: i64,
    pub status: LessonStatus,
}

impl ProgressEvent {
    pub fn new(progress_type: ProgressType, item_id: i64, status: LessonStatus) -> Self {
        Self {
            progress_type,
            item_id,
            status,
        }
    }
}

impl Store {
    /// Apply a progress event and return the affected lesson record
    ///
    /// Lesson events write the status directly: `Create` conflicts on an
    /// existing record and `Update` fails on a missing one. Syllabus and
    /// content events move the parent lesson to in-progress, creating its
    /// record if needed. Every event appends one ledger entry.
    pub async fn apply_progress(
        &self,
        user_id: &str,
        event: &ProgressEvent,
        write: ProgressWrite,
    ) -> Result<UserLesson> {
        let catalog = self.catalog();
        let progress = self.progress();

        let (record, content_id) = match event.progress_type {
            ProgressType::Lesson => {
                if catalog.get_lesson(event.item_id).await?.is_none() {
                    return Err(StoreError::not_found("lesson", event.item_id));
                }
                let record = match write {
                    ProgressWrite::Create => {
                        progress.create(user_id, event.item_id, event.status).await?
                    }
                    ProgressWrite::Update => {
                        progress
                            .set_status(user_id, event.item_id, event.status)
                            .await?
                    }
                };
                (record, None)
            }
            ProgressType::Syllabus => {
                let lesson_id = catalog
                    .lesson_for_syllabus(event.item_id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("syllabus", event.item_id))?;
                let mut record = progress.get_or_create(user_id, lesson_id).await?;
                progress.mark_in_progress(&mut record).await?;
                (record, None)
            }
            ProgressType::Content => {
                let lesson_id = catalog
                    .lesson_for_content(event.item_id)
                    .await?
                    .ok_or_else(|| StoreError::not_found("content", event.item_id))?;
                let mut record = progress.get_or_create(user_id, lesson_id).await?;
                progress.mark_in_progress(&mut record).await?;
                (record, Some(event.item_id))
            }
        };

        let kind = if event.status == LessonStatus::Completed {
            ActivityKind::Completion
        } else {
            ActivityKind::View
        };
        let mut entry = NewActivity::new(kind).lesson(record.lesson_id);
        if let Some(content_id) = content_id {
            entry = entry.content(content_id);
        }
        self.activity().record(user_id, entry).await?;

        info!(
            user_id,
            progress_type = event.progress_type.as_str(),
            item_id = event.item_id,
            status = record.status.as_str(),
            "progress applied"
        );
        Ok(record)
    }

    /// Grade and record an answer, then update the ledger, points and accuracy
    pub async fn submit_answer(
        &self,
        user_id: &str,
        question_id: i64,
        selected_option: &str,
        time_taken: f64,
    ) -> Result<UserAnswer> {
        let catalog = self.catalog();
        let question = catalog
            .get_question(question_id)
            .await?
            .ok_or_else(|| StoreError::not_found("question", question_id))?;

        let answer = self
            .answers()
            .submit(user_id, &question, selected_option, time_taken)
            .await?;
        let location = catalog.locate_question(question_id).await?;

        let mut entry = NewActivity::new(ActivityKind::QuizAttempt)
            .content(question.content_id)
            .duration(time_taken.round() as i64);
        if let Some(location) = location {
            entry = entry.lesson(location.lesson_id);
        }
        self.activity().record(user_id, entry).await?;

        // Points are paid once per question, on the first correct answer
        let award = question.score > 0 && self.answers().is_first_correct(&answer).await?;
        if award {
            let leaderboard = self.leaderboard();
            leaderboard.award_points(user_id, question.score).await?;
            leaderboard.recompute_ranks().await?;
            if let Some(location) = location {
                self.progress()
                    .add_points(user_id, location.lesson_id, question.score)
                    .await?;
            }
        }

        if let Some(location) = location {
            self.progress()
                .persist_accuracy(user_id, location.lesson_id)
                .await?;
        }

        info!(
            user_id,
            question_id,
            correct = answer.is_correct,
            attempt = answer.attempt_number,
            awarded = award,
            "answer submitted"
        );
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActivityFilter, Content, ContentType, Lesson, Question, Section, SectionType, Syllabus,
    };

    struct Fixture {
        lesson_id: i64,
        syllabus_id: i64,
        content_id: i64,
        question_ids: Vec<i64>,
    }

    async fn fixture(store: &Store) -> Fixture {
        let catalog = store.catalog();
        let lesson = catalog.create_lesson(&Lesson::new("Algebra")).await.unwrap();
        let topic = catalog
            .create_syllabus(&Syllabus::new(lesson.id, "Equations", 0))
            .await
            .unwrap();
        let section = catalog
            .create_section(&Section::new(topic.id, "Check", SectionType::Quiz, 0))
            .await
            .unwrap();
        let content = catalog
            .create_content(&Content::new(section.id, "Quiz", ContentType::Quiz))
            .await
            .unwrap();
        let mut question_ids = Vec::new();
        for text in ["1+1", "2+2"] {
            let q = catalog
                .create_question(
                    &Question::new(content.id, text, vec!["a".into(), "b".into()], "a")
                        .with_score(10),
                )
                .await
                .unwrap();
            question_ids.push(q.id);
        }
        Fixture {
            lesson_id: lesson.id,
            syllabus_id: topic.id,
            content_id: content.id,
            question_ids,
        }
    }

    #[tokio::test]
    async fn test_lesson_event_create_then_update() {
        let store = Store::new_memory().await.unwrap();
        let f = fixture(&store).await;

        let event = ProgressEvent::new(ProgressType::Lesson, f.lesson_id, LessonStatus::InProgress);
        let record = store
            .apply_progress("u1", &event, ProgressWrite::Create)
            .await
            .unwrap();
        assert_eq!(record.progress_percentage, 50.0);

        let err = store
            .apply_progress("u1", &event, ProgressWrite::Create)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let done = ProgressEvent::new(ProgressType::Lesson, f.lesson_id, LessonStatus::Completed);
        let record = store
            .apply_progress("u1", &done, ProgressWrite::Update)
            .await
            .unwrap();
        assert_eq!(record.status, LessonStatus::Completed);
        assert_eq!(record.progress_percentage, 100.0);

        let entries = store
            .activity()
            .list("u1", &ActivityFilter::default())
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, ActivityKind::Completion);
        assert_eq!(entries[1].kind, ActivityKind::View);
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let store = Store::new_memory().await.unwrap();
        let f = fixture(&store).await;

        let event = ProgressEvent::new(ProgressType::Lesson, f.lesson_id, LessonStatus::InReview);
        let err = store
            .apply_progress("u1", &event, ProgressWrite::Update)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.activity().count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_content_event_starts_parent_lesson() {
        let store = Store::new_memory().await.unwrap();
        let f = fixture(&store).await;

        let event = ProgressEvent::new(ProgressType::Content, f.content_id, LessonStatus::InProgress);
        let record = store
            .apply_progress("u1", &event, ProgressWrite::Create)
            .await
            .unwrap();
        assert_eq!(record.lesson_id, f.lesson_id);
        assert_eq!(record.status, LessonStatus::InProgress);

        // Completed lessons are not downgraded by finer-grained events
        store
            .progress()
            .set_status("u1", f.lesson_id, LessonStatus::Completed)
            .await
            .unwrap();
        let event = ProgressEvent::new(ProgressType::Syllabus, f.syllabus_id, LessonStatus::InProgress);
        let record = store
            .apply_progress("u1", &event, ProgressWrite::Update)
            .await
            .unwrap();
        assert_eq!(record.status, LessonStatus::Completed);

        let missing = ProgressEvent::new(ProgressType::Syllabus, 999, LessonStatus::InProgress);
        let err = store
            .apply_progress("u1", &missing, ProgressWrite::Create)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "syllabus", .. }));
    }

    #[tokio::test]
    async fn test_submit_answer_updates_points_and_accuracy() {
        let store = Store::new_memory().await.unwrap();
        let f = fixture(&store).await;
        store.progress().get_or_create("u1", f.lesson_id).await.unwrap();

        let first = store
            .submit_answer("u1", f.question_ids[0], "a", 12.4)
            .await
            .unwrap();
        assert!(first.is_correct);
        assert_eq!(first.attempt_number, 1);

        let wrong = store
            .submit_answer("u1", f.question_ids[1], "b", 3.0)
            .await
            .unwrap();
        assert!(!wrong.is_correct);

        let record = store.progress().get("u1", f.lesson_id).await.unwrap().unwrap();
        assert_eq!(record.points_earned, 10);
        assert_eq!(record.accuracy_percentage, 50.0);

        let entry = store.leaderboard().get("u1").await.unwrap().unwrap();
        assert_eq!(entry.points, 10);
        assert_eq!(entry.rank, Some(1));

        let quiz = ActivityFilter {
            kind: Some(ActivityKind::QuizAttempt),
            ..Default::default()
        };
        let entries = store.activity().list("u1", &quiz).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].time_spent, Some(12));
        assert_eq!(entries[1].lesson_id, Some(f.lesson_id));
    }

    #[tokio::test]
    async fn test_repeated_correct_answer_scores_once() {
        let store = Store::new_memory().await.unwrap();
        let f = fixture(&store).await;
        store.progress().get_or_create("u1", f.lesson_id).await.unwrap();

        for _ in 0..5 {
            let answer = store
                .submit_answer("u1", f.question_ids[0], "a", 2.0)
                .await
                .unwrap();
            assert!(answer.is_correct);
        }

        let entry = store.leaderboard().get("u1").await.unwrap().unwrap();
        assert_eq!(entry.points, 10);
        let record = store.progress().get("u1", f.lesson_id).await.unwrap().unwrap();
        assert_eq!(record.points_earned, 10);
        assert_eq!(record.accuracy_percentage, 50.0);

        // A wrong answer first does not forfeit the later correct one
        store
            .submit_answer("u1", f.question_ids[1], "b", 2.0)
            .await
            .unwrap();
        store
            .submit_answer("u1", f.question_ids[1], "a", 2.0)
            .await
            .unwrap();
        let entry = store.leaderboard().get("u1").await.unwrap().unwrap();
        assert_eq!(entry.points, 20);
    }

    #[tokio::test]
    async fn test_submit_unknown_question() {
        let store = Store::new_memory().await.unwrap();
        let err = store.submit_answer("u1", 42, "a", 1.0).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "question", .. }));
        assert_eq!(store.activity().count_all().await.unwrap(), 0);
    }
}
