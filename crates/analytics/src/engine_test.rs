//! Tests for the analytics engine

use tutor_store::{
    ActivityKind, Content, ContentType, Lesson, LessonStatus, NewActivity, Question, ReviewType,
    Section, SectionType, Store, Syllabus, User,
};

use crate::engine::{AnalyticsEngine, DEFAULT_RECOMMENDATION_LIMIT};
use crate::error::AnalyticsError;
use crate::report::{RecommendationReason, format_minutes, format_percent};

async fn setup() -> (Store, AnalyticsEngine) {
    let store = Store::new_memory().await.unwrap();
    let engine = AnalyticsEngine::new(store.clone());
    (store, engine)
}

/// Lesson with one quiz content holding `n` questions; returns (lesson id, question ids)
async fn quiz_lesson(store: &Store, title: &str, n: usize) -> (i64, Vec<i64>) {
    let catalog = store.catalog();
    let lesson = catalog.create_lesson(&Lesson::new(title)).await.unwrap();
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
    (lesson.id, ids)
}

async fn lessons(store: &Store, n: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let lesson = store
            .catalog()
            .create_lesson(&Lesson::new(format!("Lesson {}", i)))
            .await
            .unwrap();
        ids.push(lesson.id);
    }
    ids
}

// =============================================================================
// Accuracy
// =============================================================================

#[tokio::test]
async fn test_quiz_accuracy_zero_without_questions() {
    let (store, engine) = setup().await;
    lessons(&store, 3).await;

    assert_eq!(engine.quiz_accuracy("u1").await.unwrap(), 0.0);
}

#[tokio::test]
async fn test_quiz_accuracy_scoped_to_started_lessons() {
    let (store, engine) = setup().await;
    let (started, questions) = quiz_lesson(&store, "Started", 10).await;
    let (_, other) = quiz_lesson(&store, "Other", 4).await;

    store.progress().get_or_create("u1", started).await.unwrap();
    let answers = store.answers();
    for (i, &q) in questions.iter().enumerate() {
        answers.insert("u1", q, "a", i < 7, 2.0).await.unwrap();
    }
    // Correct answers outside started lessons do not count
    for &q in &other {
        answers.insert("u1", q, "a", true, 2.0).await.unwrap();
    }

    assert_eq!(engine.quiz_accuracy("u1").await.unwrap(), 70.0);
    assert_eq!(engine.quiz_accuracy("u2").await.unwrap(), 0.0);
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_zero_state() {
    let (store, engine) = setup().await;
    lessons(&store, 5).await;

    let dashboard = engine.dashboard("new-user").await.unwrap();
    assert_eq!(dashboard.completed_lessons, 0);
    assert_eq!(dashboard.review_items_count, 0);
    assert_eq!(dashboard.overall_progress, 0.0);
    assert_eq!(format_percent(dashboard.overall_progress), "0.00%");
    assert_eq!(dashboard.new_lessons, 0);
    assert_eq!(dashboard.total_time_spend, 0.0);
}

#[tokio::test]
async fn test_dashboard_zero_when_no_lessons() {
    let (_store, engine) = setup().await;
    let dashboard = engine.dashboard("u1").await.unwrap();
    assert_eq!(dashboard.overall_progress, 0.0);
}

#[tokio::test]
async fn test_dashboard_counts() {
    let (store, engine) = setup().await;
    let ids = lessons(&store, 4).await;
    let progress = store.progress();

    progress.create("u1", ids[0], LessonStatus::Completed).await.unwrap();
    let mut record = progress
        .create("u1", ids[1], LessonStatus::InProgress)
        .await
        .unwrap();
    record.time_spent = Some(90.0);
    progress.save(&record).await.unwrap();
    progress.get_or_create("u1", ids[2]).await.unwrap();

    store.reviews().add("u1", ReviewType::Lesson, ids[3]).await.unwrap();
    store.reviews().add("u1", ReviewType::Question, 8).await.unwrap();

    let dashboard = engine.dashboard("u1").await.unwrap();
    assert_eq!(dashboard.completed_lessons, 1);
    assert_eq!(dashboard.review_items_count, 2);
    assert_eq!(dashboard.overall_progress, 25.0);
    assert_eq!(dashboard.new_lessons, 1);
    assert_eq!(dashboard.total_time_spend, 90.0);
}

#[tokio::test]
async fn test_dashboard_time_ignores_ledger_durations() {
    let (store, engine) = setup().await;
    let (lesson_id, questions) = quiz_lesson(&store, "Algebra", 1).await;
    store.progress().get_or_create("u1", lesson_id).await.unwrap();
    store
        .submit_answer("u1", questions[0], "a", 30.0)
        .await
        .unwrap();

    let dashboard = engine.dashboard("u1").await.unwrap();
    assert_eq!(dashboard.total_time_spend, 0.0);
    assert_eq!(engine.user("u1").await.unwrap().total_time_spent, 30);
}

// =============================================================================
// Global, user and performance
// =============================================================================

#[tokio::test]
async fn test_global_analytics() {
    let (store, engine) = setup().await;
    let ids = lessons(&store, 2).await;

    let empty = engine.global().await.unwrap();
    assert!(empty.most_popular_lesson.is_none());
    assert_eq!(empty.total_activities, 0);

    store.users().create(&User::new("09120000001", "AAAAA1")).await.unwrap();
    store.users().create(&User::new("09120000002", "AAAAA2")).await.unwrap();
    let activity = store.activity();
    for lesson in [ids[1], ids[0], ids[1]] {
        activity
            .record("u1", NewActivity::new(ActivityKind::View).lesson(lesson))
            .await
            .unwrap();
    }
    activity
        .record("u1", NewActivity::new(ActivityKind::View))
        .await
        .unwrap();

    let global = engine.global().await.unwrap();
    let popular = global.most_popular_lesson.unwrap();
    assert_eq!(popular.lesson_id, ids[1]);
    assert_eq!(popular.title, "Lesson 1");
    assert_eq!(popular.activity_count, 2);
    assert_eq!(global.total_users, 2);
    assert_eq!(global.total_activities, 4);
}

#[tokio::test]
async fn test_user_analytics() {
    let (store, engine) = setup().await;

    let empty = engine.user("u1").await.unwrap();
    assert_eq!(empty.total_time_spent, 0);
    assert!(empty.activities.is_empty());

    let activity = store.activity();
    activity
        .record("u1", NewActivity::new(ActivityKind::View).duration(40))
        .await
        .unwrap();
    activity
        .record("u1", NewActivity::new(ActivityKind::QuizAttempt).duration(20))
        .await
        .unwrap();

    let analytics = engine.user("u1").await.unwrap();
    assert_eq!(analytics.total_time_spent, 60);
    assert_eq!(analytics.activities.len(), 2);
    assert_eq!(analytics.activities[0].kind, ActivityKind::QuizAttempt);
}

#[tokio::test]
async fn test_performance_by_grade() {
    let (store, engine) = setup().await;
    let catalog = store.catalog();
    let seventh = catalog.create_grade("Seventh").await.unwrap();
    let eighth = catalog.create_grade("Eighth").await.unwrap();

    let mut ids = Vec::new();
    for grade in [seventh.id, seventh.id, eighth.id] {
        let lesson = catalog
            .create_lesson(&Lesson::new("Graded").with_grade(grade))
            .await
            .unwrap();
        ids.push(lesson.id);
    }
    let ungraded = catalog.create_lesson(&Lesson::new("Free")).await.unwrap();

    let progress = store.progress();
    for &id in &ids[..2] {
        progress.create("u1", id, LessonStatus::Completed).await.unwrap();
    }
    progress.create("u1", ids[2], LessonStatus::InProgress).await.unwrap();
    progress.create("u1", ungraded.id, LessonStatus::Completed).await.unwrap();

    store
        .activity()
        .record("u1", NewActivity::new(ActivityKind::View).duration(90))
        .await
        .unwrap();
    store
        .activity()
        .record("u1", NewActivity::new(ActivityKind::View).duration(30))
        .await
        .unwrap();

    let performance = engine.performance("u1").await.unwrap();
    assert_eq!(performance.quiz_accuracy, 0.0);
    assert_eq!(performance.average_time_spent, 60.0);
    assert_eq!(format_minutes(performance.average_time_spent), "1.00 minutes");

    let by_grade: Vec<_> = performance
        .lessons_by_grade
        .iter()
        .map(|g| (g.grade.as_deref(), g.count))
        .collect();
    assert_eq!(by_grade, [(None, 1), (Some("Seventh"), 2)]);
}

#[tokio::test]
async fn test_review_analytics() {
    let (store, engine) = setup().await;
    let reviews = store.reviews();
    reviews.add("u1", ReviewType::Content, 1).await.unwrap();
    reviews.add("u1", ReviewType::Content, 2).await.unwrap();
    reviews.add("u1", ReviewType::Syllabus, 1).await.unwrap();

    let review = engine.review("u1").await.unwrap();
    assert_eq!(review.total_items, 3);
    assert_eq!(review.analytics.content, 2);
    assert_eq!(review.analytics.lesson, 0);
}

// =============================================================================
// Recommendations
// =============================================================================

#[tokio::test]
async fn test_recommendations_capped_per_sublist() {
    let (store, engine) = setup().await;
    let ids = lessons(&store, 20).await;

    let only_new = engine
        .recommend("u1", DEFAULT_RECOMMENDATION_LIMIT)
        .await
        .unwrap();
    assert_eq!(only_new.len(), 5);
    assert!(
        only_new
            .iter()
            .all(|r| r.reason == RecommendationReason::NotStarted)
    );

    for &id in &ids[..7] {
        store
            .progress()
            .create("u1", id, LessonStatus::InReview)
            .await
            .unwrap();
    }

    let mixed = engine
        .recommend("u1", DEFAULT_RECOMMENDATION_LIMIT)
        .await
        .unwrap();
    assert_eq!(mixed.len(), 10);
    let (new, review): (Vec<_>, Vec<_>) = mixed
        .iter()
        .partition(|r| r.reason == RecommendationReason::NotStarted);
    assert_eq!(new.len(), 5);
    assert_eq!(review.len(), 5);
    // Not-started entries come first and exclude started lessons
    assert_eq!(mixed[0].reason, RecommendationReason::NotStarted);
    assert!(new.iter().all(|r| !ids[..7].contains(&r.lesson_id)));
}

#[tokio::test]
async fn test_recommendation_limit_bounds() {
    let (_store, engine) = setup().await;
    for bad in [0, -1, 51] {
        let err = engine.recommend("u1", bad).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::OutOfRange(_)));
    }
}
