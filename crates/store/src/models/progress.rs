//! Lesson progress models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress assigned to a lesson marked in progress
pub const IN_PROGRESS_PERCENTAGE: f64 = 50.0;

/// Progress assigned to a completed lesson
pub const COMPLETED_PERCENTAGE: f64 = 100.0;

/// Per-user lesson status
///
/// Any status may move to any other; only `mark_in_progress` refuses to
/// downgrade a completed lesson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    InReview,
}

const STATUS_CHOICES: &[(&str, &str)] = &[
    ("not_started", "Not Started"),
    ("in_progress", "In Progress"),
    ("completed", "Completed"),
    ("in_review", "In Review"),
];

impl LessonStatus {
    pub const ALL: [LessonStatus; 4] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::InReview,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::InReview => "in_review",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "in_review" => Some(Self::InReview),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        STATUS_CHOICES
            .iter()
            .find(|(value, _)| *value == self.as_str())
            .map(|(_, label)| *label)
            .unwrap_or("")
    }

    /// `(value, label)` pairs for every status
    pub fn choices() -> &'static [(&'static str, &'static str)] {
        STATUS_CHOICES
    }
}

/// What a progress event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressType {
    Lesson,
    Syllabus,
    Content,
}

const PROGRESS_TYPE_CHOICES: &[(&str, &str)] = &[
    ("lesson", "Lesson"),
    ("syllabus", "Syllabus"),
    ("content", "Content"),
];

impl ProgressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lesson => "lesson",
            Self::Syllabus => "syllabus",
            Self::Content => "content",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lesson" => Some(Self::Lesson),
            "syllabus" => Some(Self::Syllabus),
            "content" => Some(Self::Content),
            _ => None,
        }
    }

    /// `(value, label)` pairs for every progress type
    pub fn choices() -> &'static [(&'static str, &'static str)] {
        PROGRESS_TYPE_CHOICES
    }
}

/// Per-user-per-lesson progress record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLesson {
    pub id: i64,
    pub user_id: String,
    pub lesson_id: i64,
    pub status: LessonStatus,
    /// 0 through 100
    pub progress_percentage: f64,
    /// 0 through 100
    pub accuracy_percentage: f64,
    /// Accumulated study time in seconds; unknown when None
    pub time_spent: Option<f64>,
    pub points_earned: i64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserLesson {
    /// Apply a status, deriving the progress percentage where it is implied
    pub fn apply_status(&mut self, status: LessonStatus) {
        self.status = status;
        match status {
            LessonStatus::Completed => self.progress_percentage = COMPLETED_PERCENTAGE,
            LessonStatus::InProgress => self.progress_percentage = IN_PROGRESS_PERCENTAGE,
            LessonStatus::NotStarted | LessonStatus::InReview => {}
        }
        self.last_accessed_at = Some(Utc::now());
    }

    /// Completed with full progress
    pub fn complete(&mut self) {
        self.status = LessonStatus::Completed;
        self.progress_percentage = COMPLETED_PERCENTAGE;
    }

    /// Move to in-progress unless already completed
    ///
    /// Returns whether the status changed.
    pub fn start(&mut self) -> bool {
        if matches!(
            self.status,
            LessonStatus::Completed | LessonStatus::InProgress
        ) {
            return false;
        }
        self.status = LessonStatus::InProgress;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: LessonStatus) -> UserLesson {
        UserLesson {
            id: 1,
            user_id: "u1".into(),
            lesson_id: 1,
            status,
            progress_percentage: 10.0,
            accuracy_percentage: 0.0,
            time_spent: None,
            points_earned: 0,
            last_accessed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(LessonStatus::InReview.label(), "In Review");
        assert_eq!(LessonStatus::NotStarted.label(), "Not Started");
        assert_eq!(LessonStatus::choices().len(), 4);
        for status in LessonStatus::ALL {
            assert_eq!(LessonStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_progress_type_choices() {
        let values: Vec<_> = ProgressType::choices().iter().map(|(v, _)| *v).collect();
        assert_eq!(values, ["lesson", "syllabus", "content"]);
        assert_eq!(ProgressType::from_str("quiz"), None);
    }

    #[test]
    fn test_start_does_not_downgrade_completed() {
        let mut done = record(LessonStatus::Completed);
        assert!(!done.start());
        assert_eq!(done.status, LessonStatus::Completed);

        let mut review = record(LessonStatus::InReview);
        assert!(review.start());
        assert_eq!(review.status, LessonStatus::InProgress);
    }

    #[test]
    fn test_apply_status_percentages() {
        let mut r = record(LessonStatus::NotStarted);
        r.apply_status(LessonStatus::InProgress);
        assert_eq!(r.progress_percentage, 50.0);
        r.apply_status(LessonStatus::InReview);
        assert_eq!(r.progress_percentage, 50.0);
        r.apply_status(LessonStatus::Completed);
        assert_eq!(r.progress_percentage, 100.0);
        assert!(r.last_accessed_at.is_some());
    }
}
