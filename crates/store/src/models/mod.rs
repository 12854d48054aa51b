//! Store models

mod activity;
mod catalog;
mod exam;
mod feedback;
mod goal;
mod leaderboard;
mod notification;
mod progress;
mod review;
mod user;

pub use activity::{ActivityFilter, ActivityKind, ActivityLog, NewActivity};
pub use catalog::{
    Category, Content, ContentType, Difficulty, Grade, Lesson, LessonFilter, Question,
    QuestionLocation, Section, SectionType, SubCategory, Syllabus,
};
pub use exam::{AnswerStats, Exam, UserAnswer};
pub use feedback::{Feedback, MAX_RATING, MIN_RATING};
pub use goal::{FieldOfStudy, Goal, GoalInput, MAX_AVERAGE, Purpose, RankRange, StudyHours};
pub use leaderboard::LeaderboardEntry;
pub use notification::{Notification, NotificationType, Reminder};
pub use progress::{
    COMPLETED_PERCENTAGE, IN_PROGRESS_PERCENTAGE, LessonStatus, ProgressType, UserLesson,
};
pub use review::{BulkOutcome, ReviewCounts, ReviewItem, ReviewType};
pub use user::User;
