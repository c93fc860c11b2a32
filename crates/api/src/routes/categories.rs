//! Category route handlers.
//!
//! The active list is served from the in-process cache; every mutation
//! invalidates it.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use sproutly_core::CategoryId;

use crate::db::plants::{PlantFilter, PlantSort};
use crate::db::{CategoryRepository, PlantRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::category::CategoryInput;
use crate::models::{Category, CategoryWithCount, Plant};
use crate::response::{ApiResponse, Paginated, Pagination};
use crate::routes::plants::page_params;
use crate::state::AppState;

/// Active categories, cached.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = state
        .active_categories()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(ApiResponse::ok(categories.as_ref().clone())))
}

/// Categories with plant counts (admin).
#[instrument(skip(state, admin), fields(admin = %admin.0.username))]
pub async fn stats(
    State(state): State<AppState>,
    admin: RequireAdmin,
) -> Result<Json<ApiResponse<Vec<CategoryWithCount>>>> {
    let categories = CategoryRepository::new(state.pool());
    Ok(Json(ApiResponse::ok(categories.list_with_counts().await?)))
}

/// Category detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<ApiResponse<Category>>> {
    let categories = CategoryRepository::new(state.pool());
    let category = categories
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    Ok(Json(ApiResponse::ok(category)))
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryPlantsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Plants in one category, paginated and sorted by name. An unknown
/// category yields an empty page.
#[instrument(skip(state, query))]
pub async fn plants_in(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Query(query): Query<CategoryPlantsQuery>,
) -> Result<Json<Paginated<Plant>>> {
    let plants = PlantRepository::new(state.pool());
    let (page, per_page) = page_params(query.page, query.limit);

    let filter = PlantFilter {
        categories: vec![id],
        ..PlantFilter::default()
    };
    let (results, total) = plants.list(&filter, PlantSort::Name, page, per_page).await?;

    Ok(Json(Paginated::new(
        results,
        Pagination::new(page, per_page, total),
    )))
}

/// Create a category (admin).
#[instrument(skip(state, admin, input), fields(admin = %admin.0.username))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(input): Json<CategoryInput>,
) -> Result<Json<ApiResponse<Category>>> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Category name is required".to_string(),
        ));
    }

    let categories = CategoryRepository::new(state.pool());
    let category = categories.create(&input).await?;
    state.invalidate_categories().await;

    Ok(Json(ApiResponse::with_message(
        category,
        "Category created successfully",
    )))
}

/// Update a category (admin).
#[instrument(skip(state, admin, input), fields(admin = %admin.0.username))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<ApiResponse<Category>>> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Category name is required".to_string(),
        ));
    }

    let categories = CategoryRepository::new(state.pool());
    let category = categories.update(id, &input).await?;
    state.invalidate_categories().await;

    Ok(Json(ApiResponse::with_message(
        category,
        "Category updated successfully",
    )))
}

/// Soft-delete a category (admin). Refused while plants reference it.
#[instrument(skip(state, admin), fields(admin = %admin.0.username))]
pub async fn remove(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<Json<ApiResponse<()>>> {
    let categories = CategoryRepository::new(state.pool());
    categories.soft_delete(id).await?;
    state.invalidate_categories().await;

    Ok(Json(ApiResponse::message_only(
        "Category deleted successfully",
    )))
}
