//! Plant catalog repository.
//!
//! List queries are assembled with `QueryBuilder` because the storefront
//! exposes free-form filter combinations. Sort keys come from a fixed
//! whitelist; user input is only ever bound, never interpolated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use sproutly_core::cart::{CatalogEntry, PriceBook};
use sproutly_core::{CareLevel, CategoryId, MoistureLevel, PlantId};

use super::RepositoryError;
use super::categories::CategoryRow;
use crate::models::plant::PlantInput;
use crate::models::{Category, Plant, PlantSummary};

/// Filters for the catalog list query. All conditions are ANDed.
#[derive(Debug, Default, Clone)]
pub struct PlantFilter {
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
    /// Restrict to plants in any of these categories.
    pub categories: Vec<CategoryId>,
    pub availability: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub pet_friendly: Option<bool>,
    pub air_purifying: Option<bool>,
}

/// Whitelisted sort orders for catalog listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlantSort {
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl PlantSort {
    /// Parse the `sortBy` query parameter. Unknown values fall back to name.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "priceAsc" => Self::PriceAsc,
            "priceDesc" => Self::PriceDesc,
            "newest" => Self::Newest,
            _ => Self::Name,
        }
    }

    const fn order_clause(self) -> &'static str {
        match self {
            Self::Name => "name ASC",
            Self::PriceAsc => "price ASC",
            Self::PriceDesc => "price DESC",
            Self::Newest => "created_at DESC",
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlantRow {
    id: i32,
    name: String,
    price: Decimal,
    availability: bool,
    description: Option<String>,
    image_url: Option<String>,
    care_level: String,
    water_needs: String,
    light_needs: String,
    height: Option<String>,
    pot_size: Option<String>,
    is_pet_friendly: bool,
    is_air_purifying: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlantRow {
    fn into_plant(self, categories: Vec<Category>) -> Result<Plant, RepositoryError> {
        let care_level = CareLevel::parse(&self.care_level).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("invalid care level: {}", self.care_level))
        })?;
        let water_needs = MoistureLevel::parse(&self.water_needs).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("invalid water needs: {}", self.water_needs))
        })?;
        let light_needs = MoistureLevel::parse(&self.light_needs).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("invalid light needs: {}", self.light_needs))
        })?;

        Ok(Plant {
            id: PlantId::new(self.id),
            name: self.name,
            price: self.price,
            availability: self.availability,
            description: self.description,
            image_url: self.image_url,
            care_level,
            water_needs,
            light_needs,
            height: self.height,
            pot_size: self.pot_size,
            is_pet_friendly: self.is_pet_friendly,
            is_air_purifying: self.is_air_purifying,
            categories,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PLANT_COLUMNS: &str = "id, name, price, availability, description, image_url, care_level, \
                             water_needs, light_needs, height, pot_size, is_pet_friendly, \
                             is_air_purifying, created_at, updated_at";

/// Repository for plant catalog operations.
pub struct PlantRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlantRepository<'a> {
    /// Create a new plant repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List plants matching the filter, one page at a time.
    ///
    /// Returns the page of plants and the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &PlantFilter,
        sort: PlantSort,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Plant>, i64), RepositoryError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM shop.plant p");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::new(format!("SELECT {PLANT_COLUMNS} FROM shop.plant p"));
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY ");
        qb.push(sort.order_clause());
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(per_page));
        qb.push(" OFFSET ");
        qb.push_bind(i64::from(page.saturating_sub(1)) * i64::from(per_page));

        let rows: Vec<PlantRow> = qb.build_query_as().fetch_all(self.pool).await?;
        let plants = self.attach_categories(rows).await?;

        Ok((plants, total))
    }

    /// Get a single plant with its categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PlantId) -> Result<Option<Plant>, RepositoryError> {
        let row: Option<PlantRow> = sqlx::query_as(&format!(
            "SELECT {PLANT_COLUMNS} FROM shop.plant WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_categories(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Insert a new plant and its category links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a referenced category does not
    /// exist.
    pub async fn create(&self, input: &PlantInput) -> Result<Plant, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: PlantRow = sqlx::query_as(&format!(
            "INSERT INTO shop.plant \
                 (name, price, availability, description, image_url, care_level, water_needs, \
                  light_needs, height, pot_size, is_pet_friendly, is_air_purifying) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {PLANT_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(input.price)
        .bind(input.availability)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.care_level.as_str())
        .bind(input.water_needs.as_str())
        .bind(input.light_needs.as_str())
        .bind(&input.height)
        .bind(&input.pot_size)
        .bind(input.is_pet_friendly)
        .bind(input.is_air_purifying)
        .fetch_one(&mut *tx)
        .await?;

        let plant_id = PlantId::new(row.id);
        link_categories(&mut tx, plant_id, &input.categories).await?;
        tx.commit().await?;

        let categories = self.categories_of(plant_id).await?;
        row.into_plant(categories)
    }

    /// Replace a plant's fields and category links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the plant does not exist.
    /// Returns `RepositoryError::Conflict` if a referenced category does not
    /// exist.
    pub async fn update(&self, id: PlantId, input: &PlantInput) -> Result<Plant, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<PlantRow> = sqlx::query_as(&format!(
            "UPDATE shop.plant \
             SET name = $2, price = $3, availability = $4, description = $5, image_url = $6, \
                 care_level = $7, water_needs = $8, light_needs = $9, height = $10, \
                 pot_size = $11, is_pet_friendly = $12, is_air_purifying = $13, \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PLANT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(input.price)
        .bind(input.availability)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.care_level.as_str())
        .bind(input.water_needs.as_str())
        .bind(input.light_needs.as_str())
        .bind(&input.height)
        .bind(&input.pot_size)
        .bind(input.is_pet_friendly)
        .bind(input.is_air_purifying)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound);
        };

        sqlx::query("DELETE FROM shop.plant_category WHERE plant_id = $1")
            .bind(id.as_i32())
            .execute(&mut *tx)
            .await?;
        link_categories(&mut tx, id, &input.categories).await?;
        tx.commit().await?;

        let categories = self.categories_of(id).await?;
        row.into_plant(categories)
    }

    /// Delete a plant. Category links cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the plant does not exist.
    pub async fn delete(&self, id: PlantId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.plant WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Price and availability for a single plant, as the cart sees it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn catalog_entry(
        &self,
        id: PlantId,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        let row = sqlx::query("SELECT id, price, availability FROM shop.plant WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(CatalogEntry {
                plant_id: PlantId::new(r.try_get("id")?),
                price: r.try_get("price")?,
                available: r.try_get("availability")?,
            })),
            None => Ok(None),
        }
    }

    /// Current prices for a set of plants.
    ///
    /// Plants that no longer exist are simply absent; the cart prices those
    /// lines at zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn prices_for(&self, ids: &[PlantId]) -> Result<PriceBook, RepositoryError> {
        if ids.is_empty() {
            return Ok(PriceBook::default());
        }

        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows: Vec<(i32, Decimal)> =
            sqlx::query_as("SELECT id, price FROM shop.plant WHERE id = ANY($1)")
                .bind(&raw_ids)
                .fetch_all(self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, price)| (PlantId::new(id), price))
            .collect())
    }

    /// Condensed plant data for cart views.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summaries(&self, ids: &[PlantId]) -> Result<Vec<PlantSummary>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();
        let rows: Vec<(i32, String, Decimal, bool, Option<String>)> = sqlx::query_as(
            "SELECT id, name, price, availability, image_url FROM shop.plant WHERE id = ANY($1)",
        )
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name, price, availability, image_url)| PlantSummary {
                id: PlantId::new(id),
                name,
                price,
                availability,
                image_url,
            })
            .collect())
    }

    /// Resolve categories for a page of plant rows, preserving row order.
    async fn attach_categories(
        &self,
        rows: Vec<PlantRow>,
    ) -> Result<Vec<Plant>, RepositoryError> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut by_plant = self.categories_by_plant(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let categories = by_plant.remove(&row.id).unwrap_or_default();
                row.into_plant(categories)
            })
            .collect()
    }

    async fn categories_of(&self, id: PlantId) -> Result<Vec<Category>, RepositoryError> {
        let mut by_plant = self.categories_by_plant(&[id.as_i32()]).await?;
        Ok(by_plant.remove(&id.as_i32()).unwrap_or_default())
    }

    async fn categories_by_plant(
        &self,
        plant_ids: &[i32],
    ) -> Result<std::collections::HashMap<i32, Vec<Category>>, RepositoryError> {
        use std::collections::HashMap;

        if plant_ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(sqlx::FromRow)]
        struct JoinRow {
            plant_id: i32,
            #[sqlx(flatten)]
            category: CategoryRow,
        }

        let rows: Vec<JoinRow> = sqlx::query_as(
            "SELECT pc.plant_id, c.id, c.name, c.description, c.icon, c.color, c.is_active, \
                    c.created_at, c.updated_at \
             FROM shop.plant_category pc \
             JOIN shop.category c ON c.id = pc.category_id \
             WHERE pc.plant_id = ANY($1) \
             ORDER BY c.name",
        )
        .bind(plant_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_plant: HashMap<i32, Vec<Category>> = HashMap::new();
        for row in rows {
            by_plant
                .entry(row.plant_id)
                .or_default()
                .push(row.category.into());
        }
        Ok(by_plant)
    }
}

/// Validate and insert the plant/category join rows inside a transaction.
async fn link_categories(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    plant_id: PlantId,
    categories: &[CategoryId],
) -> Result<(), RepositoryError> {
    let mut raw: Vec<i32> = categories.iter().map(|id| id.as_i32()).collect();
    raw.sort_unstable();
    raw.dedup();

    if raw.is_empty() {
        return Ok(());
    }

    let existing: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM shop.category WHERE id = ANY($1)")
            .bind(&raw)
            .fetch_one(&mut **tx)
            .await?;
    if existing != i64::try_from(raw.len()).unwrap_or(i64::MAX) {
        return Err(RepositoryError::Conflict(
            "One or more categories do not exist".to_string(),
        ));
    }

    let mut qb = QueryBuilder::new("INSERT INTO shop.plant_category (plant_id, category_id) ");
    qb.push_values(raw, |mut b, category_id| {
        b.push_bind(plant_id.as_i32()).push_bind(category_id);
    });
    qb.build().execute(&mut **tx).await?;

    Ok(())
}

/// Push the filter's WHERE clause onto a query builder.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PlantFilter) {
    qb.push(" WHERE TRUE");

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", like_escape(search));
        qb.push(" AND (p.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if !filter.categories.is_empty() {
        let raw: Vec<i32> = filter.categories.iter().map(|id| id.as_i32()).collect();
        qb.push(
            " AND p.id IN (SELECT plant_id FROM shop.plant_category WHERE category_id = ANY(",
        );
        qb.push_bind(raw);
        qb.push("))");
    }

    if let Some(availability) = filter.availability {
        qb.push(" AND p.availability = ");
        qb.push_bind(availability);
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND p.price >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND p.price <= ");
        qb.push_bind(max);
    }
    if let Some(pet_friendly) = filter.pet_friendly {
        qb.push(" AND p.is_pet_friendly = ");
        qb.push_bind(pet_friendly);
    }
    if let Some(air_purifying) = filter.air_purifying {
        qb.push(" AND p.is_air_purifying = ");
        qb.push_bind(air_purifying);
    }
}

/// Escape LIKE wildcards in user search input.
pub(crate) fn like_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parse_whitelists() {
        assert_eq!(PlantSort::parse("priceAsc"), PlantSort::PriceAsc);
        assert_eq!(PlantSort::parse("priceDesc"), PlantSort::PriceDesc);
        assert_eq!(PlantSort::parse("newest"), PlantSort::Newest);
        assert_eq!(PlantSort::parse("name"), PlantSort::Name);
        assert_eq!(PlantSort::parse("id; DROP TABLE"), PlantSort::Name);
    }

    #[test]
    fn like_escape_neutralizes_wildcards() {
        assert_eq!(like_escape("100%_pure"), "100\\%\\_pure");
        assert_eq!(like_escape("back\\slash"), "back\\\\slash");
    }
}
