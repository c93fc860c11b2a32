//! Plant catalog models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use sproutly_core::{CareLevel, CategoryId, MoistureLevel, PlantId};

use crate::models::Category;

/// A plant in the catalog, with its categories resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: PlantId,
    pub name: String,
    pub price: Decimal,
    pub availability: bool,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub care_level: CareLevel,
    pub water_needs: MoistureLevel,
    pub light_needs: MoistureLevel,
    pub height: Option<String>,
    pub pot_size: Option<String>,
    pub is_pet_friendly: bool,
    pub is_air_purifying: bool,
    pub categories: Vec<Category>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Condensed plant data embedded in cart views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantSummary {
    pub id: PlantId,
    pub name: String,
    pub price: Decimal,
    pub availability: bool,
    pub image_url: Option<String>,
}

/// Fields accepted when creating or updating a plant.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantInput {
    pub name: String,
    pub price: Decimal,
    #[serde(default = "default_true")]
    pub availability: bool,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub care_level: CareLevel,
    #[serde(default)]
    pub water_needs: MoistureLevel,
    #[serde(default)]
    pub light_needs: MoistureLevel,
    pub height: Option<String>,
    pub pot_size: Option<String>,
    #[serde(default)]
    pub is_pet_friendly: bool,
    #[serde(default)]
    pub is_air_purifying: bool,
    #[serde(default)]
    pub categories: Vec<CategoryId>,
}

const fn default_true() -> bool {
    true
}
