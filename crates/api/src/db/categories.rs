//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sproutly_core::CategoryId;

use super::RepositoryError;
use crate::models::category::CategoryInput;
use crate::models::{Category, CategoryWithCount};

const DEFAULT_COLOR: &str = "#10B981";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CategoryRow {
    id: i32,
    name: String,
    description: Option<String>,
    icon: Option<String>,
    color: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(r.id),
            name: r.name,
            description: r.description,
            icon: r.icon,
            color: r.color,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const CATEGORY_COLUMNS: &str = "id, name, description, icon, color, is_active, \
                                created_at, updated_at";

/// Repository for category operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active categories sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category WHERE is_active ORDER BY name"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// List active categories together with their plant counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct CountRow {
            #[sqlx(flatten)]
            category: CategoryRow,
            plant_count: i64,
        }

        let rows: Vec<CountRow> = sqlx::query_as(
            "SELECT c.id, c.name, c.description, c.icon, c.color, c.is_active, \
                    c.created_at, c.updated_at, \
                    COUNT(pc.plant_id) AS plant_count \
             FROM shop.category c \
             LEFT JOIN shop.plant_category pc ON pc.category_id = c.id \
             WHERE c.is_active \
             GROUP BY c.id \
             ORDER BY c.name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CategoryWithCount {
                category: r.category.into(),
                plant_count: r.plant_count,
            })
            .collect())
    }

    /// Get a single active category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category WHERE id = $1 AND is_active"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Category::from))
    }

    /// Insert a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken.
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, RepositoryError> {
        let row: CategoryRow = sqlx::query_as(&format!(
            "INSERT INTO shop.category (name, description, icon, color) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(normalize_name(&input.name))
        .bind(&input.description)
        .bind(&input.icon)
        .bind(input.color.as_deref().unwrap_or(DEFAULT_COLOR))
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict("Category with this name already exists".to_string())
            }
            _ => RepositoryError::Database(e),
        })?;

        Ok(row.into())
    }

    /// Update a category's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist or
    /// is inactive.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(&format!(
            "UPDATE shop.category \
             SET name = $2, description = $3, icon = $4, color = COALESCE($5, color), \
                 updated_at = now() \
             WHERE id = $1 AND is_active \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(normalize_name(&input.name))
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.color)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict("Category with this name already exists".to_string())
            }
            _ => RepositoryError::Database(e),
        })?;

        row.map_or(Err(RepositoryError::NotFound), |r| Ok(r.into()))
    }

    /// Soft-delete a category.
    ///
    /// Refused while any plant still references it, so catalog pages never
    /// point at a vanished category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if plants still reference the
    /// category.
    /// Returns `RepositoryError::NotFound` if it does not exist or is
    /// already inactive.
    pub async fn soft_delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let plant_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shop.plant_category WHERE category_id = $1",
        )
        .bind(id.as_i32())
        .fetch_one(self.pool)
        .await?;

        if plant_count > 0 {
            return Err(RepositoryError::Conflict(format!(
                "Cannot delete category: {plant_count} plant(s) still reference it"
            )));
        }

        let result = sqlx::query(
            "UPDATE shop.category SET is_active = FALSE, updated_at = now() \
             WHERE id = $1 AND is_active",
        )
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// IDs of active categories whose name or description matches a search
    /// term. Used as the catalog search fallback when no plant matches the
    /// term directly.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_matching(&self, term: &str) -> Result<Vec<CategoryId>, RepositoryError> {
        let pattern = format!("%{}%", super::plants::like_escape(term));
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM shop.category \
             WHERE is_active AND (name ILIKE $1 OR description ILIKE $1)",
        )
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        Ok(ids.into_iter().map(CategoryId::new).collect())
    }
}

/// Normalize a category name: first letter upper-cased, rest lower-cased.
fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_capitalizes() {
        assert_eq!(normalize_name("succulents"), "Succulents");
        assert_eq!(normalize_name("AIR PLANTS"), "Air plants");
        assert_eq!(normalize_name("  ferns  "), "Ferns");
        assert_eq!(normalize_name(""), "");
    }
}
