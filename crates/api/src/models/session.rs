//! Session-related types.
//!
//! Types stored in the session for authentication state and the guest cart.

use serde::{Deserialize, Serialize};

use sproutly_core::{Email, Role, UserId};

use crate::models::User;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: String,
    /// User's email address.
    pub email: Email,
    /// User's role.
    pub role: Role,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Session keys for data stored alongside the session cookie.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous (guest) cart document.
    pub const GUEST_CART: &str = "guest_cart";
}
