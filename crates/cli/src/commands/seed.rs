//! Seed the plant catalog from a YAML file.
//!
//! Reads categories and plants from YAML and inserts them through the same
//! repositories the API uses. Already-present categories are reused; plants
//! are matched by name and skipped if they exist, so re-running the seed is
//! safe.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, warn};

use sproutly_api::db::{self, CategoryRepository, PlantRepository, RepositoryError};
use sproutly_api::models::category::CategoryInput;
use sproutly_api::models::plant::PlantInput;
use sproutly_core::{CareLevel, CategoryId, MoistureLevel};

#[derive(Debug, Deserialize)]
struct SeedFile {
    categories: Vec<SeedCategory>,
    plants: Vec<SeedPlant>,
}

#[derive(Debug, Deserialize)]
struct SeedCategory {
    name: String,
    description: Option<String>,
    icon: Option<String>,
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedPlant {
    name: String,
    price: Decimal,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    care_level: CareLevel,
    #[serde(default)]
    water_needs: MoistureLevel,
    #[serde(default)]
    light_needs: MoistureLevel,
    #[serde(default)]
    height: Option<String>,
    #[serde(default)]
    pot_size: Option<String>,
    #[serde(default)]
    pet_friendly: bool,
    #[serde(default)]
    air_purifying: bool,
    #[serde(default)]
    categories: Vec<String>,
}

/// Seed the catalog from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if database
/// operations fail.
pub async fn catalog(file_path: &str, clear: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog seed file");
    let content = tokio::fs::read_to_string(path).await?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;
    info!(
        categories = seed.categories.len(),
        plants = seed.plants.len(),
        "Parsed seed file"
    );

    let database_url = super::database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    if clear {
        sqlx::query("DELETE FROM shop.plant").execute(&pool).await?;
        sqlx::query("DELETE FROM shop.category").execute(&pool).await?;
        info!("Cleared existing catalog");
    }

    let categories = CategoryRepository::new(&pool);
    let mut category_ids: HashMap<String, CategoryId> = HashMap::new();

    for seed_category in &seed.categories {
        let input = CategoryInput {
            name: seed_category.name.clone(),
            description: seed_category.description.clone(),
            icon: seed_category.icon.clone(),
            color: seed_category.color.clone(),
        };

        let id = match categories.create(&input).await {
            Ok(category) => category.id,
            Err(RepositoryError::Conflict(_)) => existing_category_id(&pool, &seed_category.name)
                .await?
                .ok_or_else(|| format!("category {} exists but is inactive", seed_category.name))?,
            Err(e) => return Err(e.into()),
        };
        category_ids.insert(seed_category.name.to_lowercase(), id);
    }
    info!(count = category_ids.len(), "Categories ready");

    let plants = PlantRepository::new(&pool);
    let mut inserted = 0_u32;

    for seed_plant in &seed.plants {
        if plant_exists(&pool, &seed_plant.name).await? {
            warn!(name = %seed_plant.name, "Plant already exists, skipping");
            continue;
        }

        let mut plant_categories = Vec::new();
        for name in &seed_plant.categories {
            match category_ids.get(&name.to_lowercase()) {
                Some(id) => plant_categories.push(*id),
                None => warn!(plant = %seed_plant.name, category = %name, "Unknown category"),
            }
        }

        let input = PlantInput {
            name: seed_plant.name.clone(),
            price: seed_plant.price,
            availability: true,
            description: seed_plant.description.clone(),
            image_url: seed_plant.image_url.clone(),
            care_level: seed_plant.care_level,
            water_needs: seed_plant.water_needs,
            light_needs: seed_plant.light_needs,
            height: seed_plant.height.clone(),
            pot_size: seed_plant.pot_size.clone(),
            is_pet_friendly: seed_plant.pet_friendly,
            is_air_purifying: seed_plant.air_purifying,
            categories: plant_categories,
        };

        plants.create(&input).await?;
        inserted += 1;
    }

    info!(inserted, "Seeding complete");
    Ok(())
}

async fn existing_category_id(
    pool: &sqlx::PgPool,
    name: &str,
) -> Result<Option<CategoryId>, RepositoryError> {
    let id: Option<i32> =
        sqlx::query_scalar("SELECT id FROM shop.category WHERE lower(name) = lower($1)")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    Ok(id.map(CategoryId::new))
}

async fn plant_exists(pool: &sqlx::PgPool, name: &str) -> Result<bool, RepositoryError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shop.plant WHERE name = $1)")
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}
