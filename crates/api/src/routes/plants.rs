//! Plant catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use sproutly_core::{CategoryId, PlantId};

use crate::db::plants::{PlantFilter, PlantSort};
use crate::db::{CategoryRepository, PlantRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Plant;
use crate::models::plant::PlantInput;
use crate::response::{ApiResponse, Paginated, Pagination};
use crate::state::AppState;

pub(crate) const DEFAULT_PAGE_SIZE: u32 = 12;
pub(crate) const MAX_PAGE_SIZE: u32 = 100;
const SEARCH_LIMIT: u32 = 20;

/// Clamp page and per-page parameters to sane bounds.
pub(crate) fn page_params(page: Option<u32>, limit: Option<u32>) -> (u32, u32) {
    (
        page.unwrap_or(1).max(1),
        limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPlantsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub availability: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub pet_friendly: Option<bool>,
    pub air_purifying: Option<bool>,
    pub sort_by: Option<String>,
}

impl ListPlantsQuery {
    fn filter(&self) -> PlantFilter {
        PlantFilter {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            categories: self.category.into_iter().collect(),
            availability: self.availability,
            min_price: self.min_price,
            max_price: self.max_price,
            pet_friendly: self.pet_friendly,
            air_purifying: self.air_purifying,
        }
    }
}

/// Paginated catalog listing with filters.
///
/// When a text search matches no plant directly, the search term is retried
/// against category names: "succulent" still finds the succulents even if no
/// plant mentions the word.
#[instrument(skip(state, query))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListPlantsQuery>,
) -> Result<Json<Paginated<Plant>>> {
    let plants = PlantRepository::new(state.pool());

    let (page, per_page) = page_params(query.page, query.limit);
    let sort = query
        .sort_by
        .as_deref()
        .map(PlantSort::parse)
        .unwrap_or_default();

    let mut filter = query.filter();
    let (mut results, mut total) = plants.list(&filter, sort, page, per_page).await?;

    if total == 0 && category_fallback(&state, &mut filter).await? {
        (results, total) = plants.list(&filter, sort, page, per_page).await?;
    }

    Ok(Json(Paginated::new(
        results,
        Pagination::new(page, per_page, total),
    )))
}

/// Swap the text predicate for the matching category IDs, keeping every
/// other filter. Returns whether a retry is worthwhile.
async fn category_fallback(state: &AppState, filter: &mut PlantFilter) -> Result<bool> {
    let Some(term) = filter.search.take() else {
        return Ok(false);
    };

    let categories = CategoryRepository::new(state.pool());
    let matched = categories.find_matching(&term).await?;
    if matched.is_empty() {
        filter.search = Some(term);
        return Ok(false);
    }

    filter.categories = matched;
    Ok(true)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub category: Option<CategoryId>,
    pub availability: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub pet_friendly: Option<bool>,
    pub air_purifying: Option<bool>,
}

impl SearchQuery {
    fn filter(&self) -> PlantFilter {
        PlantFilter {
            search: self
                .q
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            categories: self.category.into_iter().collect(),
            availability: self.availability,
            min_price: self.min_price,
            max_price: self.max_price,
            pet_friendly: self.pet_friendly,
            air_purifying: self.air_purifying,
        }
    }
}

/// Response payload for the quick search endpoint.
#[derive(Debug, serde::Serialize)]
pub struct SearchResults {
    pub success: bool,
    pub data: Vec<Plant>,
    pub count: usize,
}

/// Quick search: at most 20 plants sorted by name, with the same
/// category-name fallback as [`list`].
#[instrument(skip(state, query))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>> {
    let plants = PlantRepository::new(state.pool());

    let mut filter = query.filter();
    let (mut results, _) = plants
        .list(&filter, PlantSort::Name, 1, SEARCH_LIMIT)
        .await?;

    if results.is_empty() && category_fallback(&state, &mut filter).await? {
        (results, _) = plants
            .list(&filter, PlantSort::Name, 1, SEARCH_LIMIT)
            .await?;
    }

    let count = results.len();
    Ok(Json(SearchResults {
        success: true,
        data: results,
        count,
    }))
}

/// Plant detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<PlantId>,
) -> Result<Json<ApiResponse<Plant>>> {
    let plants = PlantRepository::new(state.pool());
    let plant = plants
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("plant {id}")))?;

    Ok(Json(ApiResponse::ok(plant)))
}

/// Create a plant (admin).
#[instrument(skip(state, admin, input), fields(admin = %admin.0.username))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(input): Json<PlantInput>,
) -> Result<Json<ApiResponse<Plant>>> {
    validate_input(&input)?;

    let plants = PlantRepository::new(state.pool());
    let plant = plants.create(&input).await?;

    Ok(Json(ApiResponse::with_message(
        plant,
        "Plant created successfully",
    )))
}

/// Update a plant (admin).
#[instrument(skip(state, admin, input), fields(admin = %admin.0.username))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<PlantId>,
    Json(input): Json<PlantInput>,
) -> Result<Json<ApiResponse<Plant>>> {
    validate_input(&input)?;

    let plants = PlantRepository::new(state.pool());
    let plant = plants.update(id, &input).await?;

    Ok(Json(ApiResponse::with_message(
        plant,
        "Plant updated successfully",
    )))
}

/// Delete a plant (admin).
#[instrument(skip(state, admin), fields(admin = %admin.0.username))]
pub async fn remove(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<PlantId>,
) -> Result<Json<ApiResponse<()>>> {
    let plants = PlantRepository::new(state.pool());
    plants.delete(id).await?;

    Ok(Json(ApiResponse::message_only("Plant deleted successfully")))
}

fn validate_input(input: &PlantInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Plant name is required".to_string()));
    }
    if input.price < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_clamp_to_bounds() {
        assert_eq!(page_params(None, None), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(page_params(Some(0), Some(0)), (1, 1));
        assert_eq!(page_params(Some(3), Some(500)), (3, MAX_PAGE_SIZE));
    }

    #[test]
    fn search_query_drops_blank_term() {
        let query = SearchQuery {
            q: Some("   ".to_string()),
            ..SearchQuery::default()
        };
        assert!(query.filter().search.is_none());
    }

    #[test]
    fn search_query_trims_and_keeps_filters() {
        let query = SearchQuery {
            q: Some("  monstera ".to_string()),
            category: Some(CategoryId::new(4)),
            availability: Some(true),
            ..SearchQuery::default()
        };
        let filter = query.filter();
        assert_eq!(filter.search.as_deref(), Some("monstera"));
        assert_eq!(filter.categories, vec![CategoryId::new(4)]);
        assert_eq!(filter.availability, Some(true));
    }
}
