//! Analytics result types
//!
//! Percentages and averages are kept as raw `f64` values. The `*_display`
//! helpers render them the way the HTTP layer shows them.

use serde::Serialize;
use tutor_store::{ActivityLog, ReviewCounts};

/// `12.3456` → `"12.35%"`
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Seconds rendered as minutes with two decimals
pub fn format_minutes(seconds: f64) -> String {
    format!("{:.2} minutes", seconds / 60.0)
}

/// Per-user progress summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub completed_lessons: i64,
    pub review_items_count: i64,
    /// Completed lessons over all lessons, 0 through 100
    pub overall_progress: f64,
    /// Progress records still in `not_started`
    pub new_lessons: i64,
    /// Sum of `time_spent` over progress records, seconds
    ///
    /// Progress events and answer submissions never write `time_spent`; their
    /// durations land in the activity ledger instead. This stays 0 unless a
    /// caller persists time on the progress record itself (see
    /// [`UserAnalytics::total_time_spent`] for ledger time).
    pub total_time_spend: f64,
}

/// Lesson with the most ledger entries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularLesson {
    pub lesson_id: i64,
    pub title: String,
    pub activity_count: i64,
}

/// System-wide counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalAnalytics {
    pub most_popular_lesson: Option<PopularLesson>,
    pub total_users: i64,
    pub total_activities: i64,
}

/// A user's time and activity history
#[derive(Debug, Clone, Serialize)]
pub struct UserAnalytics {
    /// Seconds across all ledger entries
    pub total_time_spent: i64,
    /// Newest first
    pub activities: Vec<ActivityLog>,
}

/// Completed lesson count for one grade
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeCount {
    /// None for lessons without a grade
    pub grade: Option<String>,
    pub count: i64,
}

/// Quiz accuracy, pace and completions by grade
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceAnalytics {
    /// 0 through 100
    pub quiz_accuracy: f64,
    /// Mean ledger duration, seconds
    pub average_time_spent: f64,
    pub lessons_by_grade: Vec<GradeCount>,
}

/// Review item counts by type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewAnalytics {
    pub analytics: ReviewCounts,
    pub total_items: i64,
}

impl From<ReviewCounts> for ReviewAnalytics {
    fn from(counts: ReviewCounts) -> Self {
        Self {
            total_items: counts.total(),
            analytics: counts,
        }
    }
}

/// Why a lesson is recommended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationReason {
    #[serde(rename = "Not started yet")]
    NotStarted,
    #[serde(rename = "Flagged for review")]
    FlaggedForReview,
}

impl RecommendationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not started yet",
            Self::FlaggedForReview => "Flagged for review",
        }
    }
}

/// One recommended lesson
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub lesson_id: i64,
    pub title: String,
    pub reason: RecommendationReason,
}
