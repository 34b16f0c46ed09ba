use anyhow::Result;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::warn;

use crate::domain::geo::Coordinate;
use crate::domain::job_alert::JobAlertPreferences;
use crate::domain::search::SearchRadius;

const SEARCH_RADIUS_KEY: &str = "search_radius";
const LAST_LOCATION_KEY: &str = "last_known_location";
const JOB_ALERTS_KEY: &str = "job_alert_preferences";

/// Device-local key/value storage.
#[derive(Clone)]
pub struct PreferencesRepository {
    pool: SqlitePool,
}

impl PreferencesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    pub async fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Last used search radius. Values that are not plain integers read as absent.
    pub async fn get_search_radius(&self) -> Result<Option<SearchRadius>> {
        let Some(raw) = self.get_raw(SEARCH_RADIUS_KEY).await? else {
            return Ok(None);
        };

        match raw.parse::<SearchRadius>() {
            Ok(radius) => Ok(Some(radius)),
            Err(e) => {
                warn!(value = %raw, error = %e, "Ignoring unparseable stored search radius");
                Ok(None)
            }
        }
    }

    pub async fn set_search_radius(&self, radius: SearchRadius) -> Result<()> {
        self.set_raw(SEARCH_RADIUS_KEY, &radius.km().to_string()).await
    }

    pub async fn get_last_known_location(&self) -> Result<Option<Coordinate>> {
        self.get_json(LAST_LOCATION_KEY).await
    }

    pub async fn set_last_known_location(&self, location: Coordinate) -> Result<()> {
        self.set_raw(LAST_LOCATION_KEY, &serde_json::to_string(&location)?).await
    }

    pub async fn get_job_alerts(&self) -> Result<Option<JobAlertPreferences>> {
        self.get_json(JOB_ALERTS_KEY).await
    }

    pub async fn set_job_alerts(&self, prefs: &JobAlertPreferences) -> Result<()> {
        self.set_raw(JOB_ALERTS_KEY, &serde_json::to_string(prefs)?).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key = %key, error = %e, "Ignoring corrupt stored preference");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::database::init_test_database;

    async fn setup() -> PreferencesRepository {
        PreferencesRepository::new(init_test_database().await.unwrap())
    }

    #[tokio::test]
    async fn test_radius_roundtrip() {
        let repo = setup().await;
        assert_eq!(repo.get_search_radius().await.unwrap(), None);

        repo.set_search_radius(SearchRadius(25)).await.unwrap();
        assert_eq!(repo.get_search_radius().await.unwrap(), Some(SearchRadius(25)));

        repo.set_search_radius(SearchRadius::UNBOUNDED).await.unwrap();
        assert_eq!(repo.get_search_radius().await.unwrap(), Some(SearchRadius::UNBOUNDED));
    }

    #[tokio::test]
    async fn test_non_numeric_radius_reads_as_absent() {
        let repo = setup().await;
        repo.set_raw(SEARCH_RADIUS_KEY, "far").await.unwrap();
        assert_eq!(repo.get_search_radius().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_last_known_location() {
        let repo = setup().await;
        let here = Coordinate::new(56.95, 24.1);

        repo.set_last_known_location(here).await.unwrap();
        assert_eq!(repo.get_last_known_location().await.unwrap(), Some(here));

        assert!(repo.delete(LAST_LOCATION_KEY).await.unwrap());
        assert_eq!(repo.get_last_known_location().await.unwrap(), None);
        assert!(!repo.delete(LAST_LOCATION_KEY).await.unwrap());
    }

    #[tokio::test]
    async fn test_job_alerts_roundtrip() {
        let repo = setup().await;
        let prefs = JobAlertPreferences::default()
            .with_enabled(true)
            .with_category_toggled("cleaning");

        repo.set_job_alerts(&prefs).await.unwrap();
        assert_eq!(repo.get_job_alerts().await.unwrap(), Some(prefs));
    }

    #[tokio::test]
    async fn test_corrupt_json_reads_as_absent() {
        let repo = setup().await;
        repo.set_raw(LAST_LOCATION_KEY, "{not json").await.unwrap();
        assert_eq!(repo.get_last_known_location().await.unwrap(), None);
    }
}
