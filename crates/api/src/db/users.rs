//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sproutly_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::User;

/// Row shape shared by every user query.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = Role::parse(&r.role).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("invalid role in database: {}", r.role))
        })?;

        Ok(Self {
            id: UserId::new(r.id),
            username: r.username,
            email,
            first_name: r.first_name,
            last_name: r.last_name,
            role,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, role, is_active, \
                            created_at, updated_at";

/// Fields for creating a new user.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub role: Role,
}

/// Profile fields a user may change about themselves.
#[derive(Debug)]
pub struct ProfileUpdate<'a> {
    pub email: &'a Email,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM shop.app_user WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM shop.app_user WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Look up a user and their password hash for login verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct HashRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row: Option<HashRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM shop.app_user WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Check whether a username or email is already registered.
    ///
    /// Returns `(username_taken, email_taken)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn availability(
        &self,
        username: &str,
        email: &Email,
    ) -> Result<(bool, bool), RepositoryError> {
        let row: (bool, bool) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM shop.app_user WHERE username = $1), \
                    EXISTS(SELECT 1 FROM shop.app_user WHERE email = $2)",
        )
        .bind(username)
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Insert a new user account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::Database` for other query failures.
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO shop.app_user \
                 (username, email, password_hash, first_name, last_name, role) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.username)
        .bind(new_user.email.as_str())
        .bind(new_user.password_hash)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.role.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict("Username or email is already registered".to_string())
            }
            _ => RepositoryError::Database(e),
        })?;

        User::try_from(row)
    }

    /// Update a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict` if the new email belongs to
    /// another account.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate<'_>,
    ) -> Result<User, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE shop.app_user \
             SET email = $2, first_name = $3, last_name = $4, updated_at = now() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(update.email.as_str())
        .bind(update.first_name)
        .bind(update.last_name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict("Email is already in use".to_string())
            }
            _ => RepositoryError::Database(e),
        })?;

        row.map_or(Err(RepositoryError::NotFound), User::try_from)
    }
}
