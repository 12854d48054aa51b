//! Repositories
//!
//! One borrowed-pool repository per aggregate.

mod activity;
mod answers;
mod catalog;
mod exams;
mod feedback;
mod goals;
mod leaderboard;
mod notifications;
mod progress;
pub(crate) mod review;
mod users;

pub use activity::ActivityRepo;
pub use answers::AnswerRepo;
pub use catalog::CatalogRepo;
pub use exams::ExamRepo;
pub use feedback::FeedbackRepo;
pub use goals::GoalRepo;
pub use leaderboard::LeaderboardRepo;
pub use notifications::NotificationRepo;
pub use progress::{ProgressRepo, percentage};
pub use review::{ItemResolver, ReviewRepo};
pub use users::UserRepo;
