//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::db::{CategoryRepository, RepositoryError};
use crate::models::Category;

/// How long the active-category list may be served from cache.
const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    // Single-entry cache for the active category list; read on every
    // catalog page, invalidated on category mutations.
    categories: Cache<(), Arc<Vec<Category>>>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                categories,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Active categories, served from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the cache is cold and the database
    /// read fails.
    pub async fn active_categories(&self) -> Result<Arc<Vec<Category>>, Arc<RepositoryError>> {
        self.inner
            .categories
            .try_get_with((), async {
                let repo = CategoryRepository::new(self.pool());
                repo.list_active().await.map(Arc::new)
            })
            .await
    }

    /// Drop the cached category list after a category mutation.
    pub async fn invalidate_categories(&self) {
        self.inner.categories.invalidate(&()).await;
    }
}
