//! HTTP route handlers for the Sproutly API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (pings the database)
//!
//! # Auth
//! POST /api/auth/register           - Create an account (logs in, merges guest cart)
//! POST /api/auth/login              - Login (merges guest cart)
//! POST /api/auth/logout             - Logout
//! GET  /api/auth/me                 - Current user profile
//! PUT  /api/auth/profile            - Update own profile
//! POST /api/auth/admin/create       - Create another admin account (admin)
//!
//! # Plants
//! GET  /api/plants                  - Paginated catalog with filters and sort
//! GET  /api/plants/search           - Quick search, at most 20 results
//! GET  /api/plants/{id}             - Plant detail
//! POST /api/plants                  - Create plant (admin)
//! PUT  /api/plants/{id}             - Update plant (admin)
//! DELETE /api/plants/{id}           - Delete plant (admin)
//!
//! # Categories
//! GET  /api/categories              - Active categories
//! GET  /api/categories/stats        - Categories with plant counts (admin)
//! GET  /api/categories/{id}         - Category detail
//! GET  /api/categories/{id}/plants  - Plants in a category, paginated
//! POST /api/categories              - Create category (admin)
//! PUT  /api/categories/{id}         - Update category (admin)
//! DELETE /api/categories/{id}       - Soft-delete category (admin)
//!
//! # Cart (guest or account, decided by session)
//! GET  /api/cart                    - Current cart with plant summaries
//! GET  /api/cart/count              - Item count badge
//! POST /api/cart/items              - Add a plant
//! PUT  /api/cart/items/{plantId}    - Set line quantity (<= 0 removes)
//! DELETE /api/cart/items/{plantId}  - Remove a line
//! DELETE /api/cart                  - Clear the cart
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod plants;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/profile", put(auth::update_profile))
        .route("/admin/create", post(auth::create_admin))
}

/// Create the plant catalog routes router.
pub fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(plants::list).post(plants::create))
        .route("/search", get(plants::search))
        .route(
            "/{id}",
            get(plants::show).put(plants::update).delete(plants::remove),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route("/stats", get(categories::stats))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route("/{id}/plants", get(categories::plants_in))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/count", get(cart::count))
        .route("/items", post(cart::add))
        .route(
            "/items/{plantId}",
            put(cart::update_quantity).delete(cart::remove),
        )
}

/// Assemble the `/api` router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/plants", plant_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
}
