//! Authentication service.
//!
//! Password registration and login, with argon2 hashing.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use sproutly_core::{Email, Role, UserId};

use crate::db::users::{NewUser, ProfileUpdate, UserRepository};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Fields accepted when registering a new account.
#[derive(Debug)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

/// Authentication service.
///
/// Handles registration, login, profile updates, and admin creation.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new shopper account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UsernameTaken` / `AuthError::EmailTaken` if already registered.
    pub async fn register(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;

        // Checked up front so the client gets a precise message; the unique
        // indexes still catch races.
        let (username_taken, email_taken) = self
            .users
            .availability(registration.username, &email)
            .await?;
        if username_taken {
            return Err(AuthError::UsernameTaken);
        }
        if email_taken {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(registration.password)?;

        let user = self
            .users
            .create(NewUser {
                username: registration.username,
                email: &email,
                password_hash: &password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
                role: Role::User,
            })
            .await?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::AccountDisabled` if the account is deactivated.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }

    /// Create an administrator account. Used by the CLI, not exposed over HTTP.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::register`].
    pub async fn create_admin(&self, registration: Registration<'_>) -> Result<User, AuthError> {
        let email = Email::parse(registration.email)?;
        validate_password(registration.password)?;

        let (username_taken, email_taken) = self
            .users
            .availability(registration.username, &email)
            .await?;
        if username_taken {
            return Err(AuthError::UsernameTaken);
        }
        if email_taken {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(registration.password)?;

        let user = self
            .users
            .create(NewUser {
                username: registration.username,
                email: &email,
                password_hash: &password_hash,
                first_name: registration.first_name,
                last_name: registration.last_name,
                role: Role::Admin,
            })
            .await?;

        Ok(user)
    }

    /// Update a user's own profile fields.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the new email is malformed.
    /// Returns `AuthError::EmailTaken` if another account owns the email.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .update_profile(
                user_id,
                ProfileUpdate {
                    email: &email,
                    first_name,
                    last_name,
                },
            )
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_rejected() {
        assert!(matches!(
            validate_password("seven77"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("eight888").is_ok());
    }

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
