pub mod database;
pub mod preferences_repository;

use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct Repository {
    pub pool: Arc<SqlitePool>,
    pub preferences: preferences_repository::PreferencesRepository,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        let pool = Arc::new(pool);
        Self {
            preferences: preferences_repository::PreferencesRepository::new((*pool).clone()),
            pool,
        }
    }
}
