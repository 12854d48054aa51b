//! Review queue endpoints
//!
//! Bulk add and remove report exactly which ids were applied; ids that
//! were skipped (missing entity, already queued, not queued) are left out.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use tutor_store::{ReviewItem, ReviewType};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::{PageParams, PaginatedResponse};

/// Review routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/items",
        get(list_items).post(add_items).delete(remove_items),
    )
}

// =============================================================================
// Request/Response types
// =============================================================================

/// Bulk add or remove request
#[derive(Debug, Deserialize)]
pub struct ReviewItemsRequest {
    pub review_type: String,
    #[serde(default)]
    pub item_ids: Vec<i64>,
}

impl ReviewItemsRequest {
    fn validate(&self) -> Result<ReviewType> {
        let review_type = parse_review_type(&self.review_type)?;
        if self.item_ids.is_empty() {
            return Err(ApiError::validation("item_ids", "must not be empty"));
        }
        Ok(review_type)
    }
}

fn parse_review_type(value: &str) -> Result<ReviewType> {
    ReviewType::from_str(value)
        .ok_or_else(|| ApiError::validation("review_type", format!("unknown type: {}", value)))
}

#[derive(Debug, Serialize)]
pub struct AddItemsResponse {
    pub message: String,
    pub created_items: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct RemoveItemsResponse {
    pub message: String,
    pub removed_items: Vec<i64>,
}

/// Listing query
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub review_type: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/v1/review/items
async fn add_items(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ReviewItemsRequest>,
) -> Result<(StatusCode, Json<AddItemsResponse>)> {
    let review_type = req.validate()?;
    let catalog = state.store.catalog();
    let outcome = state
        .store
        .reviews()
        .bulk_add(&user.id, review_type, &req.item_ids, &catalog)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddItemsResponse {
            message: format!(
                "Added {} items to the review list.",
                outcome.applied.len()
            ),
            created_items: outcome.applied,
        }),
    ))
}

/// GET /api/v1/review/items
async fn list_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListItemsQuery>,
) -> Result<Json<PaginatedResponse<ReviewItem>>> {
    let review_type = query
        .review_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(parse_review_type)
        .transpose()?;
    let page = PageParams {
        page: query.page,
        page_size: query.page_size,
    }
    .resolve(&state.pagination);

    let reviews = state.store.reviews();
    let items = reviews
        .list_page(&user.id, review_type, page.limit(), page.offset())
        .await?;
    let total = reviews.count(&user.id, review_type).await?;

    Ok(Json(PaginatedResponse::new(items, total, page)))
}

/// DELETE /api/v1/review/items
async fn remove_items(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ReviewItemsRequest>,
) -> Result<Json<RemoveItemsResponse>> {
    let review_type = req.validate()?;
    let outcome = state
        .store
        .reviews()
        .bulk_remove(&user.id, review_type, &req.item_ids)
        .await?;

    Ok(Json(RemoveItemsResponse {
        message: format!(
            "Removed {} items from the review list.",
            outcome.applied.len()
        ),
        removed_items: outcome.applied,
    }))
}
