//! Catalog models
//!
//! Lessons and the tree below them: syllabus topics, sections, contents and
//! quiz questions. Grades, categories and sub-categories classify lessons.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// School grade a lesson targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    pub name: String,
}

/// Top-level subject category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Category subdivision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// A lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Row id; zero until stored
    pub id: i64,
    pub title: String,
    pub description: String,
    pub grade_id: Option<i64>,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Lesson {
    /// Create an unsaved lesson
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: String::new(),
            grade_id: None,
            category_id: None,
            sub_category_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_grade(mut self, grade_id: i64) -> Self {
        self.grade_id = Some(grade_id);
        self
    }

    pub fn with_category(mut self, category_id: i64, sub_category_id: Option<i64>) -> Self {
        self.category_id = Some(category_id);
        self.sub_category_id = sub_category_id;
        self
    }
}

/// Lesson listing filter
#[derive(Debug, Clone, Default)]
pub struct LessonFilter {
    pub grade_id: Option<i64>,
    pub category_id: Option<i64>,
    pub sub_category_id: Option<i64>,
    /// Case-insensitive substring match on title or description
    pub search: Option<String>,
}

/// A syllabus topic within a lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Syllabus {
    pub id: i64,
    pub lesson_id: i64,
    pub title: String,
    pub description: String,
    /// Display order within the lesson
    pub position: i64,
    /// Difficulty stars, 1 through 5
    pub stars: i64,
    /// Estimated study time in minutes
    pub estimate_study_time: i64,
}

impl Syllabus {
    pub fn new(lesson_id: i64, title: impl Into<String>, position: i64) -> Self {
        Self {
            id: 0,
            lesson_id,
            title: title.into(),
            description: String::new(),
            position,
            stars: 1,
            estimate_study_time: 0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.stars) {
            return Err(StoreError::invalid("stars", "must be between 1 and 5"));
        }
        if self.estimate_study_time < 0 {
            return Err(StoreError::invalid(
                "estimate_study_time",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

/// Section kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Learning,
    Quiz,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Quiz => "quiz",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "learning" => Some(Self::Learning),
            "quiz" => Some(Self::Quiz),
            _ => None,
        }
    }
}

/// A section within a syllabus topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub syllabus_id: i64,
    pub title: String,
    pub section_type: SectionType,
    pub position: i64,
}

impl Section {
    pub fn new(
        syllabus_id: i64,
        title: impl Into<String>,
        section_type: SectionType,
        position: i64,
    ) -> Self {
        Self {
            id: 0,
            syllabus_id,
            title: title.into(),
            section_type,
            position,
        }
    }
}

/// Content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Video,
    Podcast,
    Quiz,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Video => "video",
            Self::Podcast => "podcast",
            Self::Quiz => "quiz",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(Self::Text),
            "video" => Some(Self::Video),
            "podcast" => Some(Self::Podcast),
            "quiz" => Some(Self::Quiz),
            _ => None,
        }
    }

    /// Media kinds are served from a URL rather than an inline body
    pub fn requires_url(&self) -> bool {
        matches!(self, Self::Video | Self::Podcast)
    }
}

/// A content item within a section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub id: i64,
    pub section_id: i64,
    pub title: String,
    pub content_type: ContentType,
    pub body: String,
    pub url: Option<String>,
}

impl Content {
    pub fn new(section_id: i64, title: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            id: 0,
            section_id,
            title: title.into(),
            content_type,
            body: String::new(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.content_type.requires_url() && self.url.as_deref().is_none_or(str::is_empty) {
            return Err(StoreError::invalid(
                "url",
                format!("required for {} content", self.content_type.as_str()),
            ));
        }
        Ok(())
    }
}

/// Question difficulty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// A multiple-choice quiz question attached to a content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub content_id: i64,
    pub text: String,
    /// Answer options in display order
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    /// Points awarded for a correct answer
    pub score: i64,
}

impl Question {
    pub fn new(
        content_id: i64,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            content_id,
            text: text.into(),
            options,
            correct_answer: correct_answer.into(),
            explanation: String::new(),
            difficulty: Difficulty::default(),
            tags: Vec::new(),
            score: 1,
        }
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    /// Whether the selected option is the correct one
    pub fn is_correct(&self, selected: &str) -> bool {
        self.correct_answer == selected
    }
}

/// Where a question sits in the catalog tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionLocation {
    pub lesson_id: i64,
    pub content_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_content_requires_url() {
        let video = Content::new(1, "Intro", ContentType::Video);
        assert!(video.validate().is_err());

        let video = video.with_url("https://cdn.example.com/intro.mp4");
        assert!(video.validate().is_ok());

        let text = Content::new(1, "Notes", ContentType::Text);
        assert!(text.validate().is_ok());
    }

    #[test]
    fn test_syllabus_star_bounds() {
        let mut topic = Syllabus::new(1, "Fractions", 0);
        assert!(topic.validate().is_ok());
        topic.stars = 6;
        assert!(topic.validate().is_err());
        topic.stars = 3;
        topic.estimate_study_time = -1;
        assert!(topic.validate().is_err());
    }

    #[test]
    fn test_question_correctness_is_exact() {
        let q = Question::new(1, "2+2?", vec!["3".into(), "4".into()], "4");
        assert!(q.is_correct("4"));
        assert!(!q.is_correct("4 "));
        assert!(!q.is_correct("3"));
    }
}
