//! Auth route handlers.
//!
//! Login and registration also run guest cart reconciliation: items the
//! shopper collected anonymously move into the account cart (see
//! [`crate::services::cart::reconcile`]).

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::{PlantRepository, UserRepository};
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::set_current_user;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{CurrentUser, User};
use crate::response::ApiResponse;
use crate::routes::cart::CartView;
use crate::services::auth::{AuthService, Registration};
use crate::services::cart::{AccountCart, SessionCart, merge_guest_cart};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Response payload for login and registration.
#[derive(Debug, serde::Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub cart: CartView,
}

/// Register a new account and log it in.
#[instrument(skip(state, session, request), fields(username = %request.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(Registration {
            username: &request.username,
            email: &request.email,
            password: &request.password,
            first_name: request.first_name.as_deref(),
            last_name: request.last_name.as_deref(),
        })
        .await?;

    establish_session(&state, &session, &user).await
}

/// Login with email and password.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&request.email, &request.password).await?;

    establish_session(&state, &session, &user).await
}

/// Shared login tail: rotate the session ID, store the user, merge the
/// guest cart into the account cart.
async fn establish_session(
    state: &AppState,
    session: &Session,
    user: &User,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    // New session ID on privilege change
    session.cycle_id().await.map_err(AppError::Session)?;
    set_current_user(session, &CurrentUser::from(user))
        .await
        .map_err(AppError::Session)?;
    set_sentry_user(user.id.as_i32(), Some(user.email.as_str()));

    let catalog = PlantRepository::new(state.pool());
    let guest = SessionCart::new(session);
    let account = AccountCart::new(state.pool(), user.id);
    let outcome = merge_guest_cart(&catalog, &guest, &account).await?;

    let cart = CartView::build(&catalog, &outcome.cart).await?;
    let body = AuthResponse {
        user: user.clone(),
        cart,
    };

    Ok(Json(match outcome.notification() {
        Some(message) => ApiResponse::with_message(body, message),
        None => ApiResponse::ok(body),
    }))
}

/// Create another admin account (admin only). The caller's session is left
/// untouched; the new admin logs in on their own.
#[instrument(
    skip(state, admin, request),
    fields(admin = %admin.0.username, username = %request.username)
)]
pub async fn create_admin(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<User>>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .create_admin(Registration {
            username: &request.username,
            email: &request.email,
            password: &request.password,
            first_name: request.first_name.as_deref(),
            last_name: request.last_name.as_deref(),
        })
        .await?;

    Ok(Json(ApiResponse::with_message(
        user,
        "Admin user created successfully",
    )))
}

/// Logout: destroy the session entirely.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<ApiResponse<()>>> {
    session.flush().await.map_err(AppError::Session)?;
    clear_sentry_user();

    Ok(Json(ApiResponse::message_only("Logged out successfully")))
}

/// Current user profile, read fresh from the database.
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<ApiResponse<User>>> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;

    Ok(Json(ApiResponse::ok(user)))
}

/// Update the logged-in user's profile.
#[instrument(skip(state, session, request))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<ApiResponse<User>>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .update_profile(
            current.id,
            &request.email,
            request.first_name.as_deref(),
            request.last_name.as_deref(),
        )
        .await?;

    // Keep the session copy in sync with the new email
    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(AppError::Session)?;

    Ok(Json(ApiResponse::with_message(
        user,
        "Profile updated successfully",
    )))
}
