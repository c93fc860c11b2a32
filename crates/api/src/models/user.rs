//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sproutly_core::{Email, Role, UserId};

/// A registered account.
///
/// The password hash is deliberately not part of this type; it only exists
/// inside the auth service during login and registration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
