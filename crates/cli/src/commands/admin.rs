//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! sproutly-cli admin create -u admin -e admin@example.com -p <password>
//! ```
//!
//! Admin accounts are only ever created here; the HTTP API has no route
//! that grants the admin role.

use tracing::info;

use sproutly_api::db;
use sproutly_api::services::auth::{AuthService, Registration};

/// Create a new admin user.
///
/// # Errors
///
/// Returns an error if the database is unreachable, the email or username
/// is taken, or the password fails validation.
pub async fn create_user(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let auth = AuthService::new(&pool);
    let user = auth
        .create_admin(Registration {
            username,
            email,
            password,
            first_name: None,
            last_name: None,
        })
        .await?;

    info!(id = %user.id, email = %user.email, "Admin user created");
    Ok(())
}
