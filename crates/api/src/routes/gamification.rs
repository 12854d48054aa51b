//! Gamification endpoints
//!
//! The leaderboard is public; a user's own rank needs a token.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use tutor_store::LeaderboardEntry;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{PageParams, PaginatedResponse};

/// Gamification routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leaderboard", get(leaderboard))
        .route("/rank", get(own_rank))
}

/// GET /api/v1/gamification/leaderboard
async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PaginatedResponse<LeaderboardEntry>>> {
    let page = params.resolve(&state.pagination);
    let repo = state.store.leaderboard();

    let entries = repo.list(page.limit(), page.offset()).await?;
    let total = repo.count().await?;

    Ok(Json(PaginatedResponse::new(entries, total, page)))
}

/// GET /api/v1/gamification/rank
async fn own_rank(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<LeaderboardEntry>> {
    state
        .store
        .leaderboard()
        .get(&user.id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No leaderboard entry for this user."))
}
