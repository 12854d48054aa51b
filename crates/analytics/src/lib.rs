//! Tutor Analytics Engine
//!
//! Read-side aggregations over the tutor store.
//!
//! # Overview
//!
//! - **Accuracy**: quiz accuracy scoped to lessons the user has started
//! - **Summaries**: dashboard, global counters, per-user activity, performance
//! - **Review**: queue sizes by review type
//! - **Recommendations**: not-started and flagged-for-review lessons
//!
//! # Usage
//!
//! ```ignore
//! use tutor_analytics::{AnalyticsEngine, format_percent};
//!
//! let engine = AnalyticsEngine::new(store.clone());
//! let dashboard = engine.dashboard(&user_id).await?;
//! println!("{}", format_percent(dashboard.overall_progress));
//! ```

pub mod engine;
pub mod error;
pub mod report;

#[cfg(test)]
mod engine_test;

// Re-exports for convenience
pub use engine::{AnalyticsEngine, DEFAULT_RECOMMENDATION_LIMIT, MAX_RECOMMENDATION_LIMIT};
pub use error::{AnalyticsError, Result};
pub use report::{
    Dashboard, GlobalAnalytics, GradeCount, PerformanceAnalytics, PopularLesson, Recommendation,
    RecommendationReason, ReviewAnalytics, UserAnalytics, format_minutes, format_percent,
};
