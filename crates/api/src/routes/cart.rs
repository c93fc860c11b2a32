//! Cart route handlers.
//!
//! Every handler works through [`ActiveCart`], so logged-in and anonymous
//! shoppers share one code path. Which store backs the cart is decided per
//! request from the session.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use sproutly_core::PlantId;
use sproutly_core::cart::CartAggregate;

use crate::db::PlantRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, PlantSummary};
use crate::response::ApiResponse;
use crate::services::cart::{AccountCart, ActiveCart, CartService, SessionCart};
use crate::state::AppState;

/// One cart line as the client sees it: the stored line plus a live plant
/// summary. `plant` is `None` when the plant has been deleted; the line then
/// contributes nothing to the total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub plant_id: PlantId,
    pub quantity: u32,
    pub added_at: chrono::DateTime<chrono::Utc>,
    pub plant: Option<PlantSummary>,
    pub line_total: Decimal,
}

/// Cart display data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub total: Decimal,
}

impl CartView {
    /// Resolve plant summaries for a cart's lines.
    pub(crate) async fn build(
        catalog: &PlantRepository<'_>,
        cart: &CartAggregate,
    ) -> Result<Self> {
        let summaries = catalog.summaries(&cart.plant_ids()).await?;

        let items = cart
            .items()
            .iter()
            .map(|item| {
                let plant = summaries.iter().find(|s| s.id == item.plant_id).cloned();
                let line_total = plant
                    .as_ref()
                    .map_or(Decimal::ZERO, |p| p.price * Decimal::from(item.quantity));
                CartItemView {
                    plant_id: item.plant_id,
                    quantity: item.quantity,
                    added_at: item.added_at,
                    plant,
                    line_total,
                }
            })
            .collect();

        Ok(Self {
            items,
            item_count: cart.item_count(),
            total: cart.total(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub plant_id: PlantId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub item_count: u32,
}

/// Pick the cart store for this request.
fn active_cart<'a>(
    state: &'a AppState,
    session: &'a Session,
    user: Option<&CurrentUser>,
) -> ActiveCart<'a> {
    match user {
        Some(user) => ActiveCart::Account(AccountCart::new(state.pool(), user.id)),
        None => ActiveCart::Guest(SessionCart::new(session)),
    }
}

/// Current cart with live plant data.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<ApiResponse<CartView>>> {
    let catalog = PlantRepository::new(state.pool());
    let store = active_cart(&state, &session, user.as_ref());
    let cart = CartService::new(&catalog, &store).get().await?;

    Ok(Json(ApiResponse::ok(
        CartView::build(&catalog, &cart).await?,
    )))
}

/// Item count for the cart badge.
#[instrument(skip(state, session, user))]
pub async fn count(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<ApiResponse<CountResponse>>> {
    let catalog = PlantRepository::new(state.pool());
    let store = active_cart(&state, &session, user.as_ref());
    let cart = CartService::new(&catalog, &store).get().await?;

    Ok(Json(ApiResponse::ok(CountResponse {
        item_count: cart.item_count(),
    })))
}

/// Add a plant to the cart.
#[instrument(skip(state, session, user), fields(plant_id = %request.plant_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<ApiResponse<CartView>>> {
    let catalog = PlantRepository::new(state.pool());
    let store = active_cart(&state, &session, user.as_ref());
    let cart = CartService::new(&catalog, &store)
        .add(request.plant_id, request.quantity)
        .await?;

    Ok(Json(ApiResponse::with_message(
        CartView::build(&catalog, &cart).await?,
        "Item added to cart",
    )))
}

/// Set a line's quantity. Zero or negative removes the line.
#[instrument(skip(state, session, user))]
pub async fn update_quantity(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(plant_id): Path<PlantId>,
    Json(request): Json<QuantityRequest>,
) -> Result<Json<ApiResponse<CartView>>> {
    let catalog = PlantRepository::new(state.pool());
    let store = active_cart(&state, &session, user.as_ref());
    let cart = CartService::new(&catalog, &store)
        .set_quantity(plant_id, request.quantity)
        .await?;

    Ok(Json(ApiResponse::ok(
        CartView::build(&catalog, &cart).await?,
    )))
}

/// Remove a line from the cart.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(plant_id): Path<PlantId>,
) -> Result<Json<ApiResponse<CartView>>> {
    let catalog = PlantRepository::new(state.pool());
    let store = active_cart(&state, &session, user.as_ref());
    let cart = CartService::new(&catalog, &store).remove(plant_id).await?;

    Ok(Json(ApiResponse::with_message(
        CartView::build(&catalog, &cart).await?,
        "Item removed from cart",
    )))
}

/// Empty the cart.
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<ApiResponse<CartView>>> {
    let catalog = PlantRepository::new(state.pool());
    let store = active_cart(&state, &session, user.as_ref());
    let cart = CartService::new(&catalog, &store).clear().await?;

    Ok(Json(ApiResponse::with_message(
        CartView::build(&catalog, &cart).await?,
        "Cart cleared",
    )))
}
