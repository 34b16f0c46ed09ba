use taskmap::domain::geo::Coordinate;
use taskmap::domain::job_alert::JobAlertPreferences;
use taskmap::domain::search::SearchRadius;
use taskmap::repository::{Repository, database};
use tempfile::TempDir;

#[tokio::test]
async fn test_preferences_survive_restart() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("taskmap.db");
    let db_path = db_path.to_str().unwrap();

    let here = Coordinate::new(56.9496, 24.1052);
    let alerts = JobAlertPreferences::default()
        .with_enabled(true)
        .with_category_toggled("moving")
        .with_location(here);

    // Scope 1: write
    {
        let repository = Repository::new(database::init_database(db_path).await.unwrap());
        repository.preferences.set_search_radius(SearchRadius(25)).await.unwrap();
        repository.preferences.set_last_known_location(here).await.unwrap();
        repository.preferences.set_job_alerts(&alerts).await.unwrap();
    }

    // Scope 2: reopen and read back
    {
        let repository = Repository::new(database::init_database(db_path).await.unwrap());
        let prefs = &repository.preferences;
        assert_eq!(prefs.get_search_radius().await.unwrap(), Some(SearchRadius(25)));
        assert_eq!(prefs.get_last_known_location().await.unwrap(), Some(here));
        assert_eq!(prefs.get_job_alerts().await.unwrap(), Some(alerts));
    }
}

#[tokio::test]
async fn test_corrupt_radius_is_treated_as_absent() {
    let pool = database::init_test_database().await.unwrap();
    let repository = Repository::new(pool);

    repository.preferences.set_raw("search_radius", "ten").await.unwrap();
    assert_eq!(repository.preferences.get_search_radius().await.unwrap(), None);

    repository.preferences.set_search_radius(SearchRadius::UNBOUNDED).await.unwrap();
    assert_eq!(
        repository.preferences.get_search_radius().await.unwrap(),
        Some(SearchRadius::UNBOUNDED)
    );
}
