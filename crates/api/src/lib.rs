//! Tutor API
//!
//! HTTP API for the tutor learning backend, built on Axum.
//!
//! # Usage
//!
//! ```ignore
//! use tutor_api::{build_router, AppState};
//!
//! let state = AppState::new(store, otp, &secret, jwt_expires_in, config.pagination);
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! # Endpoints
//!
//! Everything except `/health` lives under `/api/v1`. Authenticated routes
//! take a `tutor_` bearer token issued by `POST /users/login`.
//!
//! ## Users
//! - `POST /users/otp`, `POST /users/otp/verify` - One-time codes
//! - `POST /users/signup`, `POST /users/login` - Identity
//! - `POST /users/password` - Change password
//!
//! ## Lessons
//! - `GET /lessons` - Paginated catalog with grade/category/search filters
//! - `GET /lessons/{id}/syllabus`, `/lessons/syllabus/{id}/sections`,
//!   `/lessons/sections/{id}/contents` - Syllabus tree
//! - `GET|POST|PUT /lessons/progress` - Progress choices and writes
//! - `GET /lessons/dashboard`, `GET /lessons/review` - Progress summaries
//!
//! ## Exams
//! - `GET /exams` - Exam list
//! - `GET /exams/contents/{id}/questions`, `POST /exams/answers`, `GET /exams/stats`
//!
//! ## Review
//! - `GET|POST|DELETE /review/items` - Review queue
//!
//! ## Analytics
//! - `GET /analytics/{user,global,performance,review,recommendations}`
//! - `GET|POST /analytics/activity` - Activity ledger
//! - `POST /analytics/feedback/{lesson_id}`, `GET /analytics/feedback`
//!
//! ## Gamification
//! - `GET /gamification/leaderboard`, `GET /gamification/rank`
//!
//! ## Goals
//! - `GET /goals/choices` - Choice tables
//! - `GET|POST /goals`, `PUT /goals/{id}` - Own study goals
//!
//! ## Notifications
//! - `GET /notifications`, `POST /notifications/{id}/read`,
//!   `DELETE /notifications/{id}` - Inbox
//! - `GET|POST /notifications/reminders` - Reminders

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;
pub mod types;

// Re-exports
pub use auth::{AuthUser, HasAuthProvider, UserInfo};
pub use error::{ApiError, Result};
pub use routes::{RouterOptions, build_router, build_router_with_options};
pub use state::AppState;
pub use types::{MessageResponse, PageParams, PaginatedResponse};
