//! Tutor Store
//!
//! SQLite-backed persistence for the lesson catalog and exams, per-user
//! progress, quiz answers, the review queue, feedback, the leaderboard,
//! study goals, the notification inbox and the append-only activity ledger.
//!
//! # Usage
//!
//! ```ignore
//! use tutor_store::Store;
//!
//! // File-based (production)
//! let store = Store::open("data/tutor.db", 5).await?;
//!
//! // In-memory (testing)
//! let store = Store::new_memory().await?;
//!
//! // Access repositories
//! let record = store.progress().get_or_create(&user_id, lesson_id).await?;
//! ```
//!
//! Repositories borrow the pool and are created per call. Operations that
//! touch several repositories (progress events, answer submission) live on
//! [`Store`] itself.

pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod repos;

// Re-exports
pub use db::Store;
pub use error::{Result, StoreError};
pub use events::{ProgressEvent, ProgressWrite};
pub use models::{
    ActivityFilter, ActivityKind, ActivityLog, AnswerStats, BulkOutcome, COMPLETED_PERCENTAGE,
    Category, Content, ContentType, Difficulty, Exam, Feedback, FieldOfStudy, Goal, GoalInput,
    Grade, IN_PROGRESS_PERCENTAGE, LeaderboardEntry, Lesson, LessonFilter, LessonStatus,
    MAX_AVERAGE, MAX_RATING, MIN_RATING, NewActivity, Notification, NotificationType,
    ProgressType, Purpose, Question, QuestionLocation, RankRange, Reminder, ReviewCounts,
    ReviewItem, ReviewType, Section, SectionType, StudyHours, SubCategory, Syllabus, User,
    UserAnswer, UserLesson,
};
pub use repos::{
    ActivityRepo, AnswerRepo, CatalogRepo, ExamRepo, FeedbackRepo, GoalRepo, ItemResolver,
    LeaderboardRepo, NotificationRepo, ProgressRepo, ReviewRepo, UserRepo, percentage,
};

impl Store {
    /// Lessons, their syllabus tree and questions
    pub fn catalog(&self) -> CatalogRepo<'_> {
        CatalogRepo::new(self.pool())
    }

    /// Append-only activity ledger
    pub fn activity(&self) -> ActivityRepo<'_> {
        ActivityRepo::new(self.pool())
    }

    /// Per-user lesson progress
    pub fn progress(&self) -> ProgressRepo<'_> {
        ProgressRepo::new(self.pool())
    }

    /// Review queue
    pub fn reviews(&self) -> ReviewRepo<'_> {
        ReviewRepo::new(self.pool())
    }

    /// Quiz answers
    pub fn answers(&self) -> AnswerRepo<'_> {
        AnswerRepo::new(self.pool())
    }

    /// Lesson feedback
    pub fn feedback(&self) -> FeedbackRepo<'_> {
        FeedbackRepo::new(self.pool())
    }

    /// Points and ranks
    pub fn leaderboard(&self) -> LeaderboardRepo<'_> {
        LeaderboardRepo::new(self.pool())
    }

    /// Timed question sets
    pub fn exams(&self) -> ExamRepo<'_> {
        ExamRepo::new(self.pool())
    }

    /// Study goals
    pub fn goals(&self) -> GoalRepo<'_> {
        GoalRepo::new(self.pool())
    }

    /// Notification inbox and reminders
    pub fn notifications(&self) -> NotificationRepo<'_> {
        NotificationRepo::new(self.pool())
    }

    /// Registered users
    pub fn users(&self) -> UserRepo<'_> {
        UserRepo::new(self.pool())
    }
}
